//! Command-line configuration for tile-masker.
//!
//! Two subcommands mirror the two stages of dataset preparation:
//!
//! - `mesh` cuts one or more canvases into tiles and writes the tile-extent
//!   JSON hand-off file
//! - `masks` reloads that file and rasterizes one mask per tile
//!
//! # Environment Variables
//!
//! Tiling options can be set with the `TILE_MASKER_` prefix:
//!
//! - `TILE_MASKER_ZOOM` - Zoom level (default: 14, or the drawn region's zoom)
//! - `TILE_MASKER_TILE_WIDTH` / `TILE_MASKER_TILE_HEIGHT` - Tile size in pixels (default: 256)
//! - `TILE_MASKER_OVERLAP` - Overlap fraction in [0, 1) (default: 0)
//! - `TILE_MASKER_SAFETY` - Safety margin fraction in [0, 0.5) (default: 0)
//! - `TILE_MASKER_THREADS` - Worker threads for mask generation (default: all cores)

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::geometry::{Extent, PixelSize};
use crate::mesh::{TileNaming, TileSpec};

// =============================================================================
// Default Values
// =============================================================================

/// Default tile side in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// Default zoom level when neither the CLI nor the canvas source gives one.
pub const DEFAULT_ZOOM_LEVEL: u8 = 14;

/// Default overlap fraction between neighbouring tiles.
pub const DEFAULT_OVERLAP: f64 = 0.0;

/// Default safety margin fraction on each canvas side.
pub const DEFAULT_SAFETY: f64 = 0.0;

// =============================================================================
// CLI Arguments
// =============================================================================

/// tile-masker - aligned image/mask tile datasets from map canvases.
#[derive(Parser, Debug, Clone)]
#[command(name = "tile-masker")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Cut canvas extents into a tile mesh and save the tile list.
    Mesh(MeshConfig),

    /// Rasterize one polygon mask per tile of a saved tile list.
    Masks(MasksConfig),
}

/// Tile size and scale shared by both stages.
///
/// Both stages must use the same values so masks line up with the mesh.
#[derive(Args, Debug, Clone)]
pub struct TilingArgs {
    /// Zoom level selecting the ground resolution.
    #[arg(long, env = "TILE_MASKER_ZOOM")]
    pub zoom: Option<u8>,

    /// Tile width in pixels.
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE, env = "TILE_MASKER_TILE_WIDTH")]
    pub tile_width: u32,

    /// Tile height in pixels.
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE, env = "TILE_MASKER_TILE_HEIGHT")]
    pub tile_height: u32,
}

impl TilingArgs {
    pub fn pixel_size(&self) -> PixelSize {
        PixelSize::new(self.tile_width, self.tile_height)
    }

    /// The CLI zoom, else the one recorded by the canvas source, else the
    /// default.
    pub fn resolve_zoom(&self, source_zoom: Option<u8>) -> u8 {
        self.zoom.or(source_zoom).unwrap_or(DEFAULT_ZOOM_LEVEL)
    }

    fn validate(&self) -> Result<(), String> {
        self.pixel_size().validate().map_err(|e| e.to_string())
    }
}

// =============================================================================
// Mesh Command
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct MeshConfig {
    /// Canvas extent as `west,south,east,north` (repeatable).
    #[arg(long = "extent", value_parser = parse_extent, allow_hyphen_values = true)]
    pub extents: Vec<Extent>,

    /// Drawn-region document holding the canvas corner pair.
    #[arg(long)]
    pub drawn_region: Option<PathBuf>,

    /// JSON array of data-store rows (`x_min`, `y_max`, `x_max`, `y_min`).
    #[arg(long)]
    pub store_rows: Option<PathBuf>,

    #[command(flatten)]
    pub tiling: TilingArgs,

    /// Fraction of each tile shared with its neighbour.
    #[arg(long, default_value_t = DEFAULT_OVERLAP, env = "TILE_MASKER_OVERLAP")]
    pub overlap: f64,

    /// Fraction of the canvas excluded on each side.
    #[arg(long, default_value_t = DEFAULT_SAFETY, env = "TILE_MASKER_SAFETY")]
    pub safety: f64,

    /// Output tile-extent JSON file.
    #[arg(short, long, default_value = "tile_extents.json")]
    pub output: PathBuf,

    /// Also write the tile rectangles as GeoJSON for visual checks.
    #[arg(long)]
    pub qa_geojson: Option<PathBuf>,
}

impl MeshConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        let sources = usize::from(!self.extents.is_empty())
            + usize::from(self.drawn_region.is_some())
            + usize::from(self.store_rows.is_some());
        if sources != 1 {
            return Err(
                "Exactly one canvas source is required: --extent, --drawn-region or --store-rows"
                    .to_string(),
            );
        }

        self.tiling.validate()?;
        self.tile_spec(DEFAULT_ZOOM_LEVEL)
            .validate()
            .map_err(|e| e.to_string())
    }

    /// Tile spec for the given zoom level.
    pub fn tile_spec(&self, zoom: u8) -> TileSpec {
        TileSpec::new(self.tiling.pixel_size(), zoom)
            .with_overlap(self.overlap)
            .with_safety_margin(self.safety)
    }
}

// =============================================================================
// Masks Command
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct MasksConfig {
    /// Tile-extent JSON file written by `mesh`.
    #[arg(long, default_value = "tile_extents.json")]
    pub extents: PathBuf,

    /// GeoJSON file with the polygons to rasterize.
    #[arg(long)]
    pub polygons: PathBuf,

    #[command(flatten)]
    pub tiling: TilingArgs,

    /// Directory receiving the mask PNGs.
    #[arg(short, long, default_value = "targets")]
    pub output_dir: PathBuf,

    /// Write a blank mask for tiles without polygons instead of skipping them.
    #[arg(long, default_value_t = false)]
    pub emit_empty: bool,

    /// Output file naming scheme.
    #[arg(long, value_enum, default_value_t = TileNaming::Index)]
    pub naming: TileNaming,

    /// Worker threads (0 = one per core).
    #[arg(long, default_value_t = 0, env = "TILE_MASKER_THREADS")]
    pub threads: usize,
}

impl MasksConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        self.tiling.validate()?;
        if self.polygons.as_os_str().is_empty() {
            return Err("A polygon file is required. Set --polygons".to_string());
        }
        Ok(())
    }
}

/// Parse `west,south,east,north`.
pub fn parse_extent(value: &str) -> Result<Extent, String> {
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid number in extent '{}': {}", value, e))?;

    match parts.as_slice() {
        [west, south, east, north] => {
            Extent::new(*west, *south, *east, *north).map_err(|e| e.to_string())
        }
        _ => Err(format!(
            "extent '{}' must have 4 comma-separated values: west,south,east,north",
            value
        )),
    }
}

// =============================================================================
// Tests
// =============================================================================
