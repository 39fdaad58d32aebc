//! # tile-masker
//!
//! Builds aligned image/mask tile datasets from projected map canvases.
//!
//! A canvas rectangle is cut into a mesh of fixed-pixel-size tiles at a
//! chosen zoom level, with optional overlap between neighbours and an
//! optional safety margin. For each tile, every polygon of a vector layer is
//! clipped to the tile and drawn into a gray + alpha mask, with holes
//! honoured and overlapping polygons never cancelling each other out.
//!
//! ## Architecture
//!
//! - [`geometry`] - Extents, pixel sizes and the zoom-to-resolution table
//! - [`mesh`] - Tile mesh generation and tile naming
//! - [`mask`] - Polygon clipping, rasterization and PNG encoding
//! - [`io`] - Tile-extent persistence and canvas/polygon sources
//! - [`pipeline`] - Parallel mask generation and paired imagery requests
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust
//! use tile_masker::{Extent, MaskRasterizer, MeshGenerator, PixelSize, TileSpec};
//!
//! let generator = MeshGenerator::default();
//! let canvas = Extent::new(144000.0, 6115000.0, 154000.0, 6125000.0).unwrap();
//! let spec = TileSpec::new(PixelSize::square(256), 14).with_overlap(0.25);
//! let tiles = generator.generate(&canvas, &spec).unwrap();
//!
//! let resolution = generator.resolutions().resolution(14).unwrap();
//! let rasterizer = MaskRasterizer::new(resolution, spec.pixel_size);
//! let mask = rasterizer.rasterize(&tiles[0], &[]).unwrap();
//! assert!(mask.is_none());
//! ```

pub mod config;
pub mod error;
pub mod geometry;
pub mod io;
pub mod mask;
pub mod mesh;
pub mod pipeline;

// Re-export commonly used types
pub use config::{Cli, Command, MasksConfig, MeshConfig, TilingArgs};
pub use error::{ConfigError, ExternalServiceError, GeometryError, MaskError, PersistError};
pub use geometry::{Extent, PixelSize, Polygon, ResolutionTable, WEB_MERCATOR_RESOLUTIONS};
pub use io::{
    load_drawn_region, load_extents, load_polygons, load_store_rows, save_extents,
    save_qa_geojson, DrawnRegion,
};
pub use mask::{clip_to_tile, Mask, MaskEncoder, MaskRasterizer, MASK_BACKGROUND, MASK_FILL};
pub use mesh::{tile_positions, MeshGenerator, MeshLayout, TileNaming, TilePosition, TileSpec};
pub use pipeline::{
    ImageryRequest, ImagerySource, MaskPipeline, RunSummary, TileOutcome, TileReport,
};
