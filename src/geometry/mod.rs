//! Geometric primitives shared by the mesh generator and the mask rasterizer.
//!
//! All coordinates live in a single projected coordinate space (Web Mercator,
//! EPSG:3857, by default). Zoom levels map to ground resolution through an
//! explicit [`ResolutionTable`] value; nothing here is process-wide state.
//!
//! Polygons are plain [`geo::Polygon<f64>`] values: one exterior ring plus
//! zero or more interior rings (holes). Multi-part geometries are exploded
//! before they reach the core.

mod extent;
mod resolution;

pub use extent::{Extent, PixelSize};
pub use resolution::{ResolutionTable, WEB_MERCATOR_RESOLUTIONS};

/// Polygon with holes in projected coordinates.
pub type Polygon = geo::Polygon<f64>;
