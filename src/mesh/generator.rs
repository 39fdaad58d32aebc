//! Regular tile mesh over a canvas extent.
//!
//! The canvas is first shrunk by the safety margin on every side, then covered
//! by fixed-size tiles stepping by `tile * (1 - overlap)`. Every tile has
//! exactly the real-world size `pixel_size * resolution`; overlap only moves
//! tile origins. Tiles are enumerated row-major, rows north to south and
//! columns west to east.

use tracing::debug;

use crate::error::ConfigError;
use crate::geometry::{Extent, PixelSize, ResolutionTable};

/// Slack subtracted before rounding tile counts up, so a working area that is
/// an exact multiple of the step does not gain a spurious extra tile from
/// floating point noise.
const COUNT_EPSILON: f64 = 1e-9;

// =============================================================================
// Tile Spec
// =============================================================================

/// How a canvas extent is cut into tiles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileSpec {
    /// Raster size of each tile
    pub pixel_size: PixelSize,

    /// Fraction of a tile's dimension shared with its neighbour, in [0, 1)
    pub overlap: f64,

    /// Fraction of the canvas dimension excluded on each side, in [0, 0.5)
    pub safety_margin: f64,

    /// Zoom level resolved through the resolution table
    pub zoom_level: u8,
}

impl TileSpec {
    /// Tiles of `pixel_size` at `zoom_level` with no overlap and no margin.
    pub fn new(pixel_size: PixelSize, zoom_level: u8) -> Self {
        Self {
            pixel_size,
            overlap: 0.0,
            safety_margin: 0.0,
            zoom_level,
        }
    }

    pub fn with_overlap(mut self, overlap: f64) -> Self {
        self.overlap = overlap;
        self
    }

    pub fn with_safety_margin(mut self, safety_margin: f64) -> Self {
        self.safety_margin = safety_margin;
        self
    }

    /// Validate everything that does not depend on the resolution table.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pixel_size.validate()?;

        // An overlap of 1 gives a zero step and an unbounded tile count
        if !(0.0..1.0).contains(&self.overlap) {
            return Err(ConfigError::InvalidOverlap(self.overlap));
        }

        // A margin of 0.5 or more leaves no working area
        if !(0.0..0.5).contains(&self.safety_margin) {
            return Err(ConfigError::InvalidSafetyMargin(self.safety_margin));
        }

        Ok(())
    }
}

// =============================================================================
// Mesh Layout
// =============================================================================

/// Resolved grid geometry for one canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshLayout {
    /// West bound of the first column
    pub origin_west: f64,

    /// North bound of the first row
    pub origin_north: f64,

    /// Real-world tile width
    pub tile_width: f64,

    /// Real-world tile height
    pub tile_height: f64,

    /// Horizontal distance between consecutive tile origins
    pub step_x: f64,

    /// Vertical distance between consecutive tile origins
    pub step_y: f64,

    pub columns: usize,
    pub rows: usize,
}

impl MeshLayout {
    /// Total number of tiles.
    pub fn tile_count(&self) -> usize {
        self.columns * self.rows
    }

    /// Extent of the tile at `(row, column)`, both 0-indexed from the
    /// north-west corner.
    pub fn extent_at(&self, row: usize, column: usize) -> Extent {
        let west = self.origin_west + column as f64 * self.step_x;
        let north = self.origin_north - row as f64 * self.step_y;
        Extent {
            west,
            south: north - self.tile_height,
            east: west + self.tile_width,
            north,
        }
    }

    /// All tile extents in generation order.
    pub fn extents(&self) -> impl Iterator<Item = Extent> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.columns).map(move |col| self.extent_at(row, col)))
    }
}

// =============================================================================
// Mesh Generator
// =============================================================================

/// Computes tile extents covering a canvas.
///
/// # Example
///
/// ```
/// use tile_masker::geometry::{Extent, PixelSize, ResolutionTable};
/// use tile_masker::mesh::{MeshGenerator, TileSpec};
///
/// let table = ResolutionTable::from_pairs([(0, 10.0)]).unwrap();
/// let generator = MeshGenerator::new(table);
///
/// let canvas = Extent::new(0.0, 0.0, 20000.0, 10000.0).unwrap();
/// let tiles = generator
///     .generate(&canvas, &TileSpec::new(PixelSize::square(256), 0))
///     .unwrap();
///
/// assert_eq!(tiles.len(), 32);
/// assert_eq!(tiles[0].to_array(), [0.0, 7440.0, 2560.0, 10000.0]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MeshGenerator {
    resolutions: ResolutionTable,
}

impl MeshGenerator {
    pub fn new(resolutions: ResolutionTable) -> Self {
        Self { resolutions }
    }

    pub fn resolutions(&self) -> &ResolutionTable {
        &self.resolutions
    }

    /// Resolve the grid geometry for `canvas` without enumerating tiles.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the tile spec is invalid, the zoom level is not
    /// in the resolution table, or the canvas is degenerate.
    pub fn layout(&self, canvas: &Extent, spec: &TileSpec) -> Result<MeshLayout, ConfigError> {
        spec.validate()?;
        let resolution = self.resolutions.resolution(spec.zoom_level)?;

        // Extents built through struct literals bypass the constructor checks
        let canvas = Extent::new(canvas.west, canvas.south, canvas.east, canvas.north)?;

        let canvas_width = canvas.width().abs();
        let canvas_height = canvas.height().abs();
        let working_width = canvas_width * (1.0 - 2.0 * spec.safety_margin);
        let working_height = canvas_height * (1.0 - 2.0 * spec.safety_margin);

        let tile_width = spec.pixel_size.width as f64 * resolution;
        let tile_height = spec.pixel_size.height as f64 * resolution;

        let step_x = tile_width * (1.0 - spec.overlap);
        let step_y = tile_height * (1.0 - spec.overlap);

        let layout = MeshLayout {
            origin_west: canvas.west + spec.safety_margin * canvas_width,
            origin_north: canvas.north - spec.safety_margin * canvas_height,
            tile_width,
            tile_height,
            step_x,
            step_y,
            columns: tile_count(working_width, tile_width, step_x),
            rows: tile_count(working_height, tile_height, step_y),
        };

        debug!(
            working_width,
            working_height,
            tile_width,
            tile_height,
            columns = layout.columns,
            rows = layout.rows,
            "Resolved mesh layout"
        );

        Ok(layout)
    }

    /// Generate the ordered tile extents covering `canvas`.
    pub fn generate(&self, canvas: &Extent, spec: &TileSpec) -> Result<Vec<Extent>, ConfigError> {
        let layout = self.layout(canvas, spec)?;
        Ok(layout.extents().collect())
    }

    /// Generate meshes for several canvases and concatenate them in input
    /// order.
    ///
    /// Every canvas is validated before any tile is produced.
    pub fn generate_all(
        &self,
        canvases: &[Extent],
        spec: &TileSpec,
    ) -> Result<Vec<Extent>, ConfigError> {
        let layouts = canvases
            .iter()
            .map(|canvas| self.layout(canvas, spec))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(layouts.iter().flat_map(|layout| layout.extents()).collect())
    }
}

/// Number of tiles needed along one axis so the tiles cover the working
/// dimension, with any excess at the far edge.
fn tile_count(working: f64, tile: f64, step: f64) -> usize {
    if working <= tile {
        return 1;
    }
    let extra_steps = ((working - tile) / step - COUNT_EPSILON).ceil();
    extra_steps.max(0.0) as usize + 1
}

// =============================================================================
// Tests
// =============================================================================
