//! Tile mesh generation.
//!
//! # Overview
//!
//! ```text
//!  canvas (west, south, east, north)
//!  ┌───────────────────────────────────────────┐
//!  │  safety margin                            │
//!  │   ┌────┬─┬────┬─┬────┬─ ─ ─ ┐             │
//!  │   │ 1  │ │ 2  │ │ 3  │  ...  row 1        │
//!  │   ├────┼─┼────┼─┼────┤       │            │
//!  │   │ 4  │ │ 5  │ │ 6  │  ...  row 2        │
//!  │   └────┴─┴────┴─┴────┘─ ─ ─ ┘             │
//!  │                                           │
//!  └───────────────────────────────────────────┘
//! ```
//!
//! - [`MeshGenerator`]: resolves a [`TileSpec`] against a canvas into a
//!   [`MeshLayout`] and enumerates its tile extents
//! - [`tile_positions`]: recovers row/column numbers from the enumeration
//!   order
//! - [`TileNaming`]: output file naming derived from tile positions

mod generator;
mod naming;

pub use generator::{MeshGenerator, MeshLayout, TileSpec};
pub use naming::{tile_positions, TileNaming, TilePosition};
