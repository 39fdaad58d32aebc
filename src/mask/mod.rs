//! Mask rasterization.
//!
//! # Components
//!
//! - [`clip_to_tile`]: intersects polygons with a tile and splits the result
//!   into independent pieces with holes
//! - [`validate_polygon`]: rejects rings that cannot be filled
//! - [`MaskRasterizer`]: per-piece scratch rendering composited into one
//!   [`Mask`]
//! - [`MaskEncoder`]: gray + alpha PNG encoding

mod clip;
mod encoder;
mod raster;

pub use clip::{clip_to_tile, validate_polygon};
pub use encoder::MaskEncoder;
pub use raster::{Mask, MaskRasterizer, MASK_BACKGROUND, MASK_FILL};
