//! Adapters between the core and the outside world.
//!
//! - [`extents`]: the tile-extent JSON hand-off file and its GeoJSON QA
//!   export
//! - [`sources`]: canvas extents from drawn-region documents or data-store
//!   rows, and polygons from GeoJSON
//!
//! Column reordering and multi-part explosion happen here so the mesh and
//! mask components only ever see canonical [`Extent`](crate::geometry::Extent)
//! values and single polygons.

pub mod extents;
pub mod sources;

pub use extents::{
    extents_from_json, extents_to_json, load_extents, qa_feature_collection, save_extents,
    save_qa_geojson,
};
pub use sources::{
    canvases_from_store_rows, load_drawn_region, load_polygons, load_store_rows,
    parse_drawn_region, polygons_from_geojson, DrawnRegion, StoreRow,
};
