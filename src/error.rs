use std::path::PathBuf;

use thiserror::Error;

/// Errors in tiling parameters or canvas extents.
///
/// These are fatal: no tile can be computed from invalid parameters, so the
/// run stops before any tile work begins.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Extent has inverted, empty, or non-finite bounds
    #[error("Invalid extent ({west}, {south}, {east}, {north}): {reason}")]
    InvalidExtent {
        west: f64,
        south: f64,
        east: f64,
        north: f64,
        reason: &'static str,
    },

    /// Zoom level has no entry in the resolution table
    #[error("Unknown zoom level {zoom}: resolution table covers {min}..={max}")]
    UnknownZoomLevel { zoom: u8, min: u8, max: u8 },

    /// Resolution table entry is not a positive finite number
    #[error("Invalid resolution {resolution} for zoom level {zoom}")]
    InvalidResolution { zoom: u8, resolution: f64 },

    /// Pixel size has a zero dimension
    #[error("Invalid pixel size {width}x{height}: both dimensions must be positive")]
    InvalidPixelSize { width: u32, height: u32 },

    /// Overlap fraction outside [0, 1)
    #[error("Invalid overlap fraction {0}: must lie in [0, 1)")]
    InvalidOverlap(f64),

    /// Safety margin fraction outside [0, 0.5)
    #[error("Invalid safety margin {0}: must lie in [0, 0.5) so the working area stays positive")]
    InvalidSafetyMargin(f64),

    /// Mask resolution is not a positive finite number
    #[error("Invalid mask resolution {0}: must be a positive finite number")]
    InvalidMaskResolution(f64),

    /// A tile's extent does not span the mask pixel size at the mask resolution
    #[error(
        "Tile {index} spans {width}x{height} map units, expected {expected_width}x{expected_height}; \
         was the mesh generated at a different zoom level or tile size?"
    )]
    TileSizeMismatch {
        index: usize,
        width: f64,
        height: f64,
        expected_width: f64,
        expected_height: f64,
    },
}

/// Errors for malformed input polygons.
///
/// A polygon with a geometry error is logged and skipped; it never aborts a run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// A ring contains NaN or infinite coordinates
    #[error("Polygon {polygon}: ring {ring} has a non-finite coordinate")]
    NonFiniteCoordinate { polygon: usize, ring: usize },

    /// A ring has fewer than three distinct vertices
    #[error("Polygon {polygon}: ring {ring} has {vertices} distinct vertices, need at least 3")]
    TooFewVertices {
        polygon: usize,
        ring: usize,
        vertices: usize,
    },

    /// The exterior ring encloses no area
    #[error("Polygon {polygon}: exterior ring encloses zero area")]
    ZeroArea { polygon: usize },
}

/// Mask generation errors.
///
/// Apart from [`MaskError::Config`], these are isolated to the tile that
/// raised them; remaining tiles continue.
#[derive(Debug, Error)]
pub enum MaskError {
    /// Rasterizer settings do not fit the tiles; fatal for the whole run
    #[error("Invalid mask configuration: {0}")]
    Config(#[from] ConfigError),

    /// The scratch canvas could not be allocated at the requested size
    #[error("Cannot allocate a {width}x{height} mask canvas")]
    CanvasAllocation { width: u32, height: u32 },

    /// Encoding the mask to PNG failed
    #[error("Failed to encode mask: {message}")]
    EncodeError { message: String },

    /// Writing the mask file failed
    #[error("Failed to write mask {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures of collaborators outside the core: imagery services, data stores.
#[derive(Debug, Clone, Error)]
pub enum ExternalServiceError {
    /// The imagery service could not be reached or answered with an error
    #[error("Imagery request failed for tile {index}: {message}")]
    Imagery { index: usize, message: String },

    /// Writing the fetched image failed
    #[error("Failed to store image for tile {index}: {message}")]
    Store { index: usize, message: String },
}

/// Errors reading or writing persisted artifacts and source documents.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Filesystem error
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Document is not valid JSON or does not match the expected layout
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Document is valid JSON but misses a required member
    #[error("Malformed document: {0}")]
    Malformed(String),

    /// Document holds an extent that fails validation
    #[error("Invalid extent in document: {0}")]
    Extent(#[from] ConfigError),
}

impl PersistError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PersistError::Io {
            path: path.into(),
            source,
        }
    }
}
