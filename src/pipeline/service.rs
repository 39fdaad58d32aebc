//! Parallel mask generation over a tile list.
//!
//! Each tile is rasterized independently on a rayon worker; polygons are
//! shared read-only. Results are collected by tile index, so output names and
//! imagery pairing follow the mesh order regardless of completion order.
//! A failing tile is logged and reported in the [`RunSummary`]; it never stops
//! the remaining tiles.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::error::{ExternalServiceError, MaskError};
use crate::geometry::{Extent, Polygon};
use crate::mask::{Mask, MaskEncoder, MaskRasterizer};
use crate::mesh::{tile_positions, TileNaming, TilePosition};

use super::imagery::{ImageryRequest, ImagerySource};

// =============================================================================
// Outcomes
// =============================================================================

/// What happened to one tile.
#[derive(Debug)]
pub enum TileOutcome {
    /// A mask was written
    Written { mask_path: PathBuf },

    /// No polygon intersects the tile and empty masks are not emitted
    Empty,

    /// Rasterizing, encoding or writing the mask failed
    Failed(MaskError),
}

/// Per-tile result of a pipeline run.
#[derive(Debug)]
pub struct TileReport {
    pub position: TilePosition,
    pub outcome: TileOutcome,

    /// Paired image result; `None` when no imagery was requested
    pub imagery: Option<Result<PathBuf, ExternalServiceError>>,
}

/// Totals for a pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub written: usize,
    pub empty: usize,

    /// Indices (0-indexed) of tiles whose mask failed
    pub failed: Vec<usize>,

    /// Indices (0-indexed) of tiles whose mask was written but imagery failed
    pub imagery_failed: Vec<usize>,
}

impl RunSummary {
    fn from_reports(reports: &[TileReport]) -> Self {
        let mut summary = RunSummary {
            total: reports.len(),
            ..Default::default()
        };

        for report in reports {
            match report.outcome {
                TileOutcome::Written { .. } => summary.written += 1,
                TileOutcome::Empty => summary.empty += 1,
                TileOutcome::Failed(_) => summary.failed.push(report.position.index),
            }
            if let Some(Err(_)) = report.imagery {
                summary.imagery_failed.push(report.position.index);
            }
        }

        summary
    }

    /// Whether every tile was processed without a mask failure.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

// =============================================================================
// Mask Pipeline
// =============================================================================

/// Drives mask rasterization, output writing and optional imagery pairing for
/// a whole tile list.
///
/// # Example
///
/// ```no_run
/// use tile_masker::geometry::{Extent, PixelSize, Polygon};
/// use tile_masker::mask::MaskRasterizer;
/// use tile_masker::pipeline::MaskPipeline;
///
/// let tiles = vec![Extent::new(0.0, 0.0, 2560.0, 2560.0).unwrap()];
/// let polygons: Vec<Polygon> = vec![];
///
/// let pipeline = MaskPipeline::new(MaskRasterizer::new(10.0, PixelSize::square(256)), "targets")
///     .with_threads(4);
/// let (summary, _reports) = pipeline.run(&tiles, &polygons).unwrap();
/// println!("{} masks written", summary.written);
/// ```
pub struct MaskPipeline {
    rasterizer: MaskRasterizer,
    encoder: MaskEncoder,
    naming: TileNaming,
    mask_dir: PathBuf,
    imagery: Option<(Arc<dyn ImagerySource>, PathBuf)>,
    threads: Option<usize>,
}

impl MaskPipeline {
    /// Create a pipeline writing masks to `mask_dir`.
    pub fn new(rasterizer: MaskRasterizer, mask_dir: impl Into<PathBuf>) -> Self {
        Self {
            rasterizer,
            encoder: MaskEncoder::new(),
            naming: TileNaming::default(),
            mask_dir: mask_dir.into(),
            imagery: None,
            threads: None,
        }
    }

    pub fn with_naming(mut self, naming: TileNaming) -> Self {
        self.naming = naming;
        self
    }

    /// Limit the number of worker threads; `0` uses rayon's default.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = (threads > 0).then_some(threads);
        self
    }

    /// Fetch a paired image into `image_dir` for every tile that gets a mask.
    pub fn with_imagery(
        mut self,
        source: Arc<dyn ImagerySource>,
        image_dir: impl Into<PathBuf>,
    ) -> Self {
        self.imagery = Some((source, image_dir.into()));
        self
    }

    pub fn rasterizer(&self) -> &MaskRasterizer {
        &self.rasterizer
    }

    /// Rasterize every tile in memory, in tile order.
    pub fn rasterize_all(
        &self,
        tiles: &[Extent],
        polygons: &[Polygon],
    ) -> Vec<Result<Option<Mask>, MaskError>> {
        self.install(|| {
            tiles
                .par_iter()
                .map(|tile| self.rasterizer.rasterize(tile, polygons))
                .collect()
        })
    }

    /// Rasterize and write masks for every tile.
    ///
    /// Returns the summary and one report per tile, in tile order.
    ///
    /// # Errors
    ///
    /// Returns [`MaskError::Config`] before any tile is processed if the
    /// rasterizer settings are invalid or a tile does not span the configured
    /// pixel size at the configured resolution. Also fails if an output
    /// directory cannot be created. Per-tile failures are reported in the
    /// summary.
    pub fn run(
        &self,
        tiles: &[Extent],
        polygons: &[Polygon],
    ) -> Result<(RunSummary, Vec<TileReport>), MaskError> {
        self.rasterizer.validate()?;
        for (index, tile) in tiles.iter().enumerate() {
            self.rasterizer.check_tile(index, tile)?;
        }

        create_dir(&self.mask_dir)?;
        if let Some((_, image_dir)) = &self.imagery {
            create_dir(image_dir)?;
        }

        info!(
            tiles = tiles.len(),
            polygons = polygons.len(),
            emit_empty = self.rasterizer.emit_empty(),
            "Generating masks"
        );

        let positions = tile_positions(tiles);
        let reports: Vec<TileReport> = self.install(|| {
            tiles
                .par_iter()
                .zip(positions.par_iter())
                .map(|(tile, position)| self.process_tile(*position, tile, polygons))
                .collect()
        });

        let summary = RunSummary::from_reports(&reports);
        if summary.is_success() {
            info!(
                written = summary.written,
                empty = summary.empty,
                imagery_failed = summary.imagery_failed.len(),
                "Mask generation finished"
            );
        } else {
            warn!(
                written = summary.written,
                empty = summary.empty,
                failed = ?summary.failed,
                "Mask generation finished with failed tiles"
            );
        }

        Ok((summary, reports))
    }

    fn process_tile(&self, position: TilePosition, tile: &Extent, polygons: &[Polygon]) -> TileReport {
        let outcome = match self.write_mask(&position, tile, polygons) {
            Ok(Some(mask_path)) => TileOutcome::Written { mask_path },
            Ok(None) => TileOutcome::Empty,
            Err(e) => {
                warn!(tile = position.index, error = %e, "Mask generation failed");
                TileOutcome::Failed(e)
            }
        };

        // No mask means no paired image
        let imagery = match (&outcome, &self.imagery) {
            (TileOutcome::Written { .. }, Some((source, image_dir))) => {
                Some(self.fetch_image(source.as_ref(), image_dir, &position, tile))
            }
            _ => None,
        };

        TileReport {
            position,
            outcome,
            imagery,
        }
    }

    fn write_mask(
        &self,
        position: &TilePosition,
        tile: &Extent,
        polygons: &[Polygon],
    ) -> Result<Option<PathBuf>, MaskError> {
        let Some(mask) = self.rasterizer.rasterize(tile, polygons)? else {
            debug!(tile = position.index, "No polygon in tile");
            return Ok(None);
        };

        let encoded = self.encoder.encode(&mask)?;
        let path = self.mask_dir.join(self.naming.mask_file_name(position));
        fs::write(&path, &encoded).map_err(|source| MaskError::Write {
            path: path.clone(),
            source,
        })?;

        debug!(tile = position.index, path = %path.display(), "Wrote mask");
        Ok(Some(path))
    }

    fn fetch_image(
        &self,
        source: &dyn ImagerySource,
        image_dir: &Path,
        position: &TilePosition,
        tile: &Extent,
    ) -> Result<PathBuf, ExternalServiceError> {
        let request = ImageryRequest {
            index: position.index,
            extent: *tile,
            pixel_size: self.rasterizer.pixel_size(),
        };

        let result = source.fetch(&request).and_then(|image| {
            let path = image_dir.join(self.naming.image_file_name(position));
            fs::write(&path, &image)
                .map(|_| path)
                .map_err(|e| ExternalServiceError::Store {
                    index: position.index,
                    message: e.to_string(),
                })
        });

        if let Err(ref e) = result {
            warn!(tile = position.index, error = %e, "Imagery fetch failed");
        }
        result
    }

    /// Run `op` on a dedicated pool when a thread count is configured.
    fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        let Some(threads) = self.threads else {
            return op();
        };

        match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => pool.install(op),
            Err(e) => {
                warn!(threads, error = %e, "Cannot build worker pool, using the global pool");
                op()
            }
        }
    }
}

fn create_dir(path: &Path) -> Result<(), MaskError> {
    fs::create_dir_all(path).map_err(|source| MaskError::Write {
        path: path.to_path_buf(),
        source,
    })
}

// =============================================================================
// Tests
// =============================================================================
