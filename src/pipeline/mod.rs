//! Dataset generation over a full tile list.
//!
//! ```text
//!  tile extents ──► MaskPipeline ──► rayon workers (one tile each)
//!                                        │
//!                         rasterize ─► encode ─► write {n}_mask.png
//!                                        │
//!                          (mask written) └─► ImagerySource ─► {n}.png
//! ```
//!
//! - [`MaskPipeline`]: runs the workers and collects per-tile reports in mesh
//!   order
//! - [`RunSummary`]: counts and failed tile indices
//! - [`ImagerySource`] / [`ImageryRequest`]: seam for the imagery collaborator

mod imagery;
mod service;

pub use imagery::{ImageryRequest, ImagerySource, DEFAULT_IMAGERY_CRS};
pub use service::{MaskPipeline, RunSummary, TileOutcome, TileReport};
