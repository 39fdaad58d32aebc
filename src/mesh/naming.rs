//! Row/column positions and output file names for tiles.
//!
//! Positions are recovered from the enumeration order alone: a tile whose
//! west bound is not greater than the previous tile's west bound starts a new
//! row. This works on reloaded tile lists and on concatenated meshes of
//! several canvases, where each canvas simply continues the row count.

use clap::ValueEnum;
use serde::Serialize;

use crate::geometry::Extent;

/// Position of a tile in the mesh enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TilePosition {
    /// Position in the tile list (0-indexed)
    pub index: usize,

    /// Row number (1-indexed from the north)
    pub row: usize,

    /// Column number (1-indexed from the west)
    pub column: usize,
}

/// Derive the position of every tile from the list order.
pub fn tile_positions(extents: &[Extent]) -> Vec<TilePosition> {
    let mut positions = Vec::with_capacity(extents.len());
    let mut row = 1;
    let mut column = 0;
    let mut previous_west: Option<f64> = None;

    for (index, extent) in extents.iter().enumerate() {
        match previous_west {
            Some(west) if extent.west <= west => {
                row += 1;
                column = 1;
            }
            _ => column += 1,
        }
        previous_west = Some(extent.west);
        positions.push(TilePosition { index, row, column });
    }

    positions
}

/// File naming scheme for mask and image outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TileNaming {
    /// `{n}_mask.png` / `{n}.png` with `n` the 1-indexed tile number
    #[default]
    Index,
    /// `r{row}_c{column}_mask.png` / `r{row}_c{column}.png`
    Grid,
}

impl TileNaming {
    fn stem(&self, position: &TilePosition) -> String {
        match self {
            TileNaming::Index => format!("{}", position.index + 1),
            TileNaming::Grid => format!("r{}_c{}", position.row, position.column),
        }
    }

    /// File name of the mask for `position`.
    pub fn mask_file_name(&self, position: &TilePosition) -> String {
        format!("{}_mask.png", self.stem(position))
    }

    /// File name of the paired imagery tile for `position`.
    pub fn image_file_name(&self, position: &TilePosition) -> String {
        format!("{}.png", self.stem(position))
    }
}
