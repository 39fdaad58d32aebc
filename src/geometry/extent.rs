//! Axis-aligned extents and pixel sizes.

use geo::{coord, Rect};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

use super::Polygon;

// =============================================================================
// Extent
// =============================================================================

/// Axis-aligned rectangle in projected coordinates.
///
/// An `Extent` always satisfies `west < east` and `south < north` with finite
/// bounds; the constructors reject anything else. It serializes as the flat
/// 4-tuple `[west, south, east, north]`, which is the persisted tile-list
/// format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 4]", into = "[f64; 4]")]
pub struct Extent {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl Extent {
    /// Create an extent from `(west, south, east, north)`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidExtent`] if any bound is non-finite or
    /// the rectangle is empty or inverted.
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Result<Self, ConfigError> {
        let invalid = |reason| ConfigError::InvalidExtent {
            west,
            south,
            east,
            north,
            reason,
        };

        if ![west, south, east, north].iter().all(|v| v.is_finite()) {
            return Err(invalid("bounds must be finite"));
        }
        if west >= east {
            return Err(invalid("west must be less than east"));
        }
        if south >= north {
            return Err(invalid("south must be less than north"));
        }

        Ok(Self {
            west,
            south,
            east,
            north,
        })
    }

    /// Create an extent from two opposite corners given in any order.
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Result<Self, ConfigError> {
        Self::new(x1.min(x2), y1.min(y2), x1.max(x2), y1.max(y2))
    }

    /// Create an extent from a data-store row `(x_min, y_max, x_max, y_min)`.
    ///
    /// The store's column naming does not match its content, so the row is
    /// treated as two corners and normalized.
    pub fn from_store_row(x_min: f64, y_max: f64, x_max: f64, y_min: f64) -> Result<Self, ConfigError> {
        Self::from_corners(x_min, y_max, x_max, y_min)
    }

    /// Width in projected units.
    #[inline]
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Height in projected units.
    #[inline]
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Bounds as `[west, south, east, north]`.
    #[inline]
    pub fn to_array(&self) -> [f64; 4] {
        [self.west, self.south, self.east, self.north]
    }

    /// The extent as a `geo` rectangle.
    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            coord! { x: self.west, y: self.south },
            coord! { x: self.east, y: self.north },
        )
    }

    /// The extent as a closed rectangular polygon without holes.
    pub fn to_polygon(&self) -> Polygon {
        self.to_rect().to_polygon()
    }
}

impl TryFrom<[f64; 4]> for Extent {
    type Error = ConfigError;

    fn try_from(value: [f64; 4]) -> Result<Self, Self::Error> {
        let [west, south, east, north] = value;
        Extent::new(west, south, east, north)
    }
}

impl From<Extent> for [f64; 4] {
    fn from(extent: Extent) -> Self {
        extent.to_array()
    }
}

// =============================================================================
// Pixel Size
// =============================================================================

/// Raster dimensions of a tile in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Square tiles of `side` pixels.
    pub const fn square(side: u32) -> Self {
        Self::new(side, side)
    }

    /// Check that both dimensions are positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidPixelSize {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
