//! tile-masker - tile mesh and polygon mask generation.
//!
//! This binary runs one stage of dataset preparation per invocation.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tile_masker::{
    config::{Cli, Command, MasksConfig, MeshConfig},
    error::PersistError,
    geometry::{Extent, ResolutionTable},
    io::{
        load_drawn_region, load_extents, load_polygons, load_store_rows, save_extents,
        save_qa_geojson,
    },
    mask::MaskRasterizer,
    mesh::MeshGenerator,
    pipeline::MaskPipeline,
};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Mesh(config) => run_mesh(config),
        Command::Masks(config) => run_masks(config),
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "tile_masker=debug"
    } else {
        "tile_masker=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

// =============================================================================
// Mesh Command
// =============================================================================

fn run_mesh(config: MeshConfig) -> ExitCode {
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let (canvases, source_zoom) = match load_canvases(&config) {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("Failed to load canvas extents: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let zoom = config.tiling.resolve_zoom(source_zoom);
    let spec = config.tile_spec(zoom);

    info!("Configuration:");
    info!("  Canvases: {}", canvases.len());
    info!("  Zoom level: {}", zoom);
    info!(
        "  Tile size: {}x{} px",
        spec.pixel_size.width, spec.pixel_size.height
    );
    info!("  Overlap: {}", spec.overlap);
    info!("  Safety margin: {}", spec.safety_margin);

    let generator = MeshGenerator::new(ResolutionTable::web_mercator());
    let tiles = match generator.generate_all(&canvases, &spec) {
        Ok(tiles) => tiles,
        Err(e) => {
            error!("Mesh generation failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = save_extents(&config.output, &tiles) {
        error!("Failed to save tile extents: {}", e);
        return ExitCode::FAILURE;
    }

    if let Some(ref qa_path) = config.qa_geojson {
        if let Err(e) = save_qa_geojson(qa_path, &tiles) {
            error!("Failed to write QA GeoJSON: {}", e);
            return ExitCode::FAILURE;
        }
        info!("  QA GeoJSON: {}", qa_path.display());
    }

    info!("Generated {} tile(s) -> {}", tiles.len(), config.output.display());
    ExitCode::SUCCESS
}

/// Canvas extents and the zoom recorded alongside them, if any.
fn load_canvases(config: &MeshConfig) -> Result<(Vec<Extent>, Option<u8>), PersistError> {
    if let Some(ref path) = config.drawn_region {
        let region = load_drawn_region(path)?;
        return Ok((vec![region.canvas], region.zoom));
    }
    if let Some(ref path) = config.store_rows {
        return Ok((load_store_rows(path)?, None));
    }
    Ok((config.extents.clone(), None))
}

// =============================================================================
// Masks Command
// =============================================================================

fn run_masks(config: MasksConfig) -> ExitCode {
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let zoom = config.tiling.resolve_zoom(None);
    let resolution = match ResolutionTable::web_mercator().resolution(zoom) {
        Ok(resolution) => resolution,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let tiles = match load_extents(&config.extents) {
        Ok(tiles) => tiles,
        Err(e) => {
            error!("Failed to load tile extents: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let polygons = match load_polygons(&config.polygons) {
        Ok(polygons) => polygons,
        Err(e) => {
            error!("Failed to load polygons: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if polygons.is_empty() {
        warn!("No polygons loaded; every tile is empty");
    }

    let rasterizer = MaskRasterizer::new(resolution, config.tiling.pixel_size())
        .with_emit_empty(config.emit_empty);
    let pipeline = MaskPipeline::new(rasterizer, &config.output_dir)
        .with_naming(config.naming)
        .with_threads(config.threads);

    let summary = match pipeline.run(&tiles, &polygons) {
        Ok((summary, _reports)) => summary,
        Err(e) => {
            error!("Mask generation failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!(
        "{} of {} tile(s) written to {} ({} empty)",
        summary.written,
        summary.total,
        config.output_dir.display(),
        summary.empty
    );

    if summary.is_success() {
        ExitCode::SUCCESS
    } else {
        error!("{} tile(s) failed: {:?}", summary.failed.len(), summary.failed);
        ExitCode::FAILURE
    }
}
