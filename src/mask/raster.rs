//! Polygon mask rasterization.
//!
//! # Pipeline
//!
//! ```text
//!  polygons ──► clip to tile ──► pieces (exterior + holes)
//!                                   │
//!                 ┌─────────────────┼─────────────────┐
//!                 ▼                 ▼                 ▼
//!            scratch #1        scratch #2   ...  scratch #n
//!         (fill exterior,   (fill exterior,
//!          clear holes)      clear holes)
//!                 │                 │                 │
//!                 └────────► accumulate (alpha stencil) ◄┘
//!                                   │
//!                                   ▼
//!                         flip vertically ──► Mask
//! ```
//!
//! Each piece is drawn on its own transparent scratch canvas before being
//! composited. Drawing every exterior and then every hole on one shared canvas
//! would let one polygon's hole erase an overlapping polygon's interior.

use image::imageops::flip_vertical_in_place;
use image::{GrayAlphaImage, LumaA};
use tiny_skia::{
    BlendMode, Color, FillRule, Paint, Path, PathBuilder, Pixmap, PixmapPaint, Shader, Transform,
};
use tracing::debug;

use crate::error::{ConfigError, MaskError};
use crate::geometry::{Extent, PixelSize, Polygon};

use super::clip::clip_to_tile;

/// Pixel value for polygon interior: black, opaque.
pub const MASK_FILL: LumaA<u8> = LumaA([0, 255]);

/// Pixel value for background and holes: white, fully transparent.
pub const MASK_BACKGROUND: LumaA<u8> = LumaA([255, 0]);

/// Relative slack allowed between a tile's extent and its expected span.
const TILE_SIZE_TOLERANCE: f64 = 1e-6;

// =============================================================================
// Mask
// =============================================================================

/// Two-channel (luminance + alpha) raster for one tile.
///
/// Row 0 is the tile's northern edge, so the mask is pixel-aligned with a map
/// image requested for the same extent and size.
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    image: GrayAlphaImage,
}

impl Mask {
    /// A mask with every pixel set to background.
    pub fn blank(size: PixelSize) -> Self {
        Self {
            image: GrayAlphaImage::from_pixel(size.width, size.height, MASK_BACKGROUND),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Pixel at column `x`, row `y` (row 0 is north).
    pub fn pixel(&self, x: u32, y: u32) -> LumaA<u8> {
        *self.image.get_pixel(x, y)
    }

    /// Whether the pixel at `(x, y)` is polygon interior.
    pub fn is_opaque(&self, x: u32, y: u32) -> bool {
        self.pixel(x, y).0[1] > 0
    }

    /// Number of polygon interior pixels.
    pub fn opaque_count(&self) -> usize {
        self.image.pixels().filter(|p| p.0[1] > 0).count()
    }

    pub fn as_image(&self) -> &GrayAlphaImage {
        &self.image
    }

    pub fn into_image(self) -> GrayAlphaImage {
        self.image
    }

    /// Convert a composited canvas; the canvas is still south-up.
    fn from_canvas(canvas: &Pixmap) -> Self {
        let width = canvas.width();
        let pixels = canvas.pixels();
        let image = GrayAlphaImage::from_fn(canvas.width(), canvas.height(), |x, y| {
            let pixel = pixels[(y * width + x) as usize];
            match pixel.alpha() {
                0 => MASK_BACKGROUND,
                alpha => LumaA([pixel.demultiply().red(), alpha]),
            }
        });
        Self { image }
    }
}

// =============================================================================
// Mask Rasterizer
// =============================================================================

/// Rasterizes polygons into per-tile masks.
///
/// The rasterizer holds no mutable state: one instance can serve any number
/// of tiles concurrently.
///
/// # Example
///
/// ```
/// use geo::polygon;
/// use tile_masker::geometry::{Extent, PixelSize};
/// use tile_masker::mask::MaskRasterizer;
///
/// let rasterizer = MaskRasterizer::new(1.0, PixelSize::square(100));
/// let tile = Extent::new(0.0, 0.0, 100.0, 100.0).unwrap();
/// let square = polygon![
///     (x: 25.0, y: 25.0), (x: 75.0, y: 25.0), (x: 75.0, y: 75.0), (x: 25.0, y: 75.0),
/// ];
///
/// let mask = rasterizer.rasterize(&tile, &[square]).unwrap().unwrap();
/// assert!(mask.is_opaque(50, 50));
/// assert!(!mask.is_opaque(5, 5));
/// ```
#[derive(Debug, Clone)]
pub struct MaskRasterizer {
    /// Projected units per pixel, shared by both axes
    resolution: f64,

    /// Output raster size
    pixel_size: PixelSize,

    /// Produce a blank mask instead of `None` when nothing intersects a tile
    emit_empty: bool,
}

impl MaskRasterizer {
    /// Create a rasterizer that returns `None` for tiles without polygons.
    pub fn new(resolution: f64, pixel_size: PixelSize) -> Self {
        Self {
            resolution,
            pixel_size,
            emit_empty: false,
        }
    }

    /// Choose whether empty tiles yield a blank mask.
    pub fn with_emit_empty(mut self, emit_empty: bool) -> Self {
        self.emit_empty = emit_empty;
        self
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn pixel_size(&self) -> PixelSize {
        self.pixel_size
    }

    pub fn emit_empty(&self) -> bool {
        self.emit_empty
    }

    /// Check that the resolution and pixel size can produce a mask.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidMaskResolution`] for a zero, negative or
    /// non-finite resolution, and [`ConfigError::InvalidPixelSize`] for a
    /// zero dimension.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.resolution.is_finite() && self.resolution > 0.0) {
            return Err(ConfigError::InvalidMaskResolution(self.resolution));
        }
        self.pixel_size.validate()
    }

    /// Check that `tile` spans exactly the pixel size at this resolution.
    ///
    /// A mismatch means the tiles were meshed at another zoom level or tile
    /// size, so polygons would be drawn at the wrong scale.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TileSizeMismatch`] labelled with `index`.
    pub fn check_tile(&self, index: usize, tile: &Extent) -> Result<(), ConfigError> {
        let expected_width = self.pixel_size.width as f64 * self.resolution;
        let expected_height = self.pixel_size.height as f64 * self.resolution;
        let (width, height) = (tile.width(), tile.height());

        let close = |actual: f64, expected: f64| {
            (actual - expected).abs() <= expected * TILE_SIZE_TOLERANCE
        };
        if close(width, expected_width) && close(height, expected_height) {
            return Ok(());
        }

        Err(ConfigError::TileSizeMismatch {
            index,
            width,
            height,
            expected_width,
            expected_height,
        })
    }

    /// Rasterize `polygons` for `tile`.
    ///
    /// Returns `Ok(None)` when no polygon intersects the tile and empty masks
    /// are not emitted. Invalid polygons are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`MaskError::Config`] if the resolution or pixel size is
    /// invalid, and [`MaskError::CanvasAllocation`] if a canvas of the
    /// configured pixel size cannot be created.
    pub fn rasterize(&self, tile: &Extent, polygons: &[Polygon]) -> Result<Option<Mask>, MaskError> {
        self.validate()?;

        let pieces = clip_to_tile(tile, polygons);

        if pieces.is_empty() {
            return Ok(self.emit_empty.then(|| Mask::blank(self.pixel_size)));
        }

        let mut accumulator = self.new_canvas()?;
        for piece in &pieces {
            let scratch = self.draw_piece(tile, piece)?;
            // Source-over with opaque or fully transparent pixels: opaque
            // pixels overwrite, transparent ones leave the accumulator alone
            accumulator.draw_pixmap(
                0,
                0,
                scratch.as_ref(),
                &PixmapPaint::default(),
                Transform::identity(),
                None,
            );
        }

        let mut mask = Mask::from_canvas(&accumulator);
        // Canvas rows grow downward from the tile's south edge
        flip_vertical_in_place(&mut mask.image);

        debug!(
            pieces = pieces.len(),
            opaque = mask.opaque_count(),
            "Rasterized tile mask"
        );

        Ok(Some(mask))
    }

    fn new_canvas(&self) -> Result<Pixmap, MaskError> {
        Pixmap::new(self.pixel_size.width, self.pixel_size.height).ok_or(
            MaskError::CanvasAllocation {
                width: self.pixel_size.width,
                height: self.pixel_size.height,
            },
        )
    }

    /// Draw one clipped piece: fill the exterior, then clear every hole.
    fn draw_piece(&self, tile: &Extent, piece: &Polygon) -> Result<Pixmap, MaskError> {
        let mut scratch = self.new_canvas()?;

        let fill = Paint {
            shader: Shader::SolidColor(Color::BLACK),
            anti_alias: false,
            ..Default::default()
        };
        let clear = Paint {
            anti_alias: false,
            blend_mode: BlendMode::Clear,
            ..Default::default()
        };

        if let Some(path) = self.ring_path(tile, piece.exterior().coords()) {
            scratch.fill_path(&path, &fill, FillRule::EvenOdd, Transform::identity(), None);
        }
        for hole in piece.interiors() {
            if let Some(path) = self.ring_path(tile, hole.coords()) {
                scratch.fill_path(&path, &clear, FillRule::EvenOdd, Transform::identity(), None);
            }
        }

        Ok(scratch)
    }

    /// Build a closed path in tile pixel space (origin at the south-west
    /// corner, units growing east and north).
    fn ring_path<'a>(
        &self,
        tile: &Extent,
        coords: impl Iterator<Item = &'a geo::Coord<f64>>,
    ) -> Option<Path> {
        let mut builder = PathBuilder::new();
        for (i, coord) in coords.enumerate() {
            let (px, py) = self.to_pixel(tile, coord.x, coord.y);
            if i == 0 {
                builder.move_to(px, py);
            } else {
                builder.line_to(px, py);
            }
        }
        builder.close();
        builder.finish()
    }

    #[inline]
    fn to_pixel(&self, tile: &Extent, x: f64, y: f64) -> (f32, f32) {
        (
            ((x - tile.west) / self.resolution) as f32,
            ((y - tile.south) / self.resolution) as f32,
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
