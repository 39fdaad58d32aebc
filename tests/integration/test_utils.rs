//! Test utilities for integration tests.
//!
//! Polygon builders, a fixed resolution table and a mock WMS imagery source
//! that records every request it receives.

use std::collections::HashSet;
use std::sync::Mutex;

use bytes::Bytes;
use geo::{Coord, LineString};
use url::Url;

use tile_masker::error::ExternalServiceError;
use tile_masker::geometry::{PixelSize, Polygon, ResolutionTable};
use tile_masker::mesh::{MeshGenerator, TileSpec};
use tile_masker::pipeline::{ImageryRequest, ImagerySource, DEFAULT_IMAGERY_CRS};

/// Ground resolution used by the tests, in map units per pixel.
pub const TEST_RESOLUTION: f64 = 10.0;

/// Zoom level mapped to [`TEST_RESOLUTION`].
pub const TEST_ZOOM: u8 = 0;

// =============================================================================
// Geometry Helpers
// =============================================================================

pub fn ring(points: &[(f64, f64)]) -> LineString<f64> {
    let mut coords: Vec<Coord<f64>> = points.iter().map(|&(x, y)| Coord { x, y }).collect();
    if let Some(first) = coords.first().copied() {
        coords.push(first);
    }
    LineString::new(coords)
}

/// Counter-clockwise square ring.
pub fn square_ring(x0: f64, y0: f64, x1: f64, y1: f64) -> LineString<f64> {
    ring(&[(x0, y0), (x1, y0), (x1, y1), (x0, y1)])
}

pub fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon {
    Polygon::new(square_ring(x0, y0, x1, y1), vec![])
}

pub fn square_with_hole(outer: (f64, f64, f64, f64), hole: (f64, f64, f64, f64)) -> Polygon {
    Polygon::new(
        square_ring(outer.0, outer.1, outer.2, outer.3),
        vec![square_ring(hole.0, hole.1, hole.2, hole.3)],
    )
}

// =============================================================================
// Mesh Helpers
// =============================================================================

pub fn test_generator() -> MeshGenerator {
    MeshGenerator::new(ResolutionTable::from_pairs([(TEST_ZOOM, TEST_RESOLUTION)]).unwrap())
}

pub fn test_spec() -> TileSpec {
    TileSpec::new(PixelSize::square(256), TEST_ZOOM)
}

// =============================================================================
// Mock Imagery Source
// =============================================================================

/// Base URL of the mock WMS server.
pub const MOCK_WMS_URL: &str = "https://wms.example.test/service";

/// WMS imagery source returning a fixed payload, failing for chosen tiles.
///
/// Each fetch builds the `GetMap` URL a real client would send.
#[derive(Default)]
pub struct MockImagery {
    failing: HashSet<usize>,
    requests: Mutex<Vec<(ImageryRequest, Url)>>,
}

impl MockImagery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(indices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            failing: indices.into_iter().collect(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, sorted by tile index.
    pub fn requests(&self) -> Vec<ImageryRequest> {
        self.sorted().into_iter().map(|(request, _)| request).collect()
    }

    /// `GetMap` URLs built so far, sorted by tile index.
    pub fn urls(&self) -> Vec<Url> {
        self.sorted().into_iter().map(|(_, url)| url).collect()
    }

    fn sorted(&self) -> Vec<(ImageryRequest, Url)> {
        let mut requests = self.requests.lock().unwrap().clone();
        requests.sort_by_key(|(r, _)| r.index);
        requests
    }
}

impl ImagerySource for MockImagery {
    fn fetch(&self, request: &ImageryRequest) -> Result<Bytes, ExternalServiceError> {
        let url = request
            .wms_get_map_url(MOCK_WMS_URL, "ortho", DEFAULT_IMAGERY_CRS)
            .map_err(|e| ExternalServiceError::Imagery {
                index: request.index,
                message: e.to_string(),
            })?;
        self.requests.lock().unwrap().push((*request, url));

        if self.failing.contains(&request.index) {
            return Err(ExternalServiceError::Imagery {
                index: request.index,
                message: "service unavailable".to_string(),
            });
        }

        Ok(Bytes::from(format!("image-{}", request.index)))
    }
}
