//! Clipping polygons against a tile boundary.
//!
//! Each input polygon is intersected with the tile rectangle. One input can
//! yield several disjoint pieces, and each piece keeps its own holes; pieces
//! are returned flat so the rasterizer treats them independently.

use geo::{Area, BooleanOps, BoundingRect, Coord, Intersects, LineString};
use tracing::{debug, warn};

use crate::error::GeometryError;
use crate::geometry::{Extent, Polygon};

/// Check that `polygon` can be clipped and filled.
///
/// `index` is only used to label the error.
pub fn validate_polygon(index: usize, polygon: &Polygon) -> Result<(), GeometryError> {
    let rings = std::iter::once(polygon.exterior()).chain(polygon.interiors());

    for (ring_index, ring) in rings.enumerate() {
        if ring.coords().any(|c| !(c.x.is_finite() && c.y.is_finite())) {
            return Err(GeometryError::NonFiniteCoordinate {
                polygon: index,
                ring: ring_index,
            });
        }

        let vertices = distinct_vertices(ring);
        if vertices < 3 {
            return Err(GeometryError::TooFewVertices {
                polygon: index,
                ring: ring_index,
                vertices,
            });
        }
    }

    // Measured after resolving self-intersections: the signed lobes of a
    // bow-tie cancel in the raw ring's area
    let exterior_only = Polygon::new(polygon.exterior().clone(), vec![]);
    if exterior_only.union(&exterior_only).unsigned_area() == 0.0 {
        return Err(GeometryError::ZeroArea { polygon: index });
    }

    Ok(())
}

/// Count vertices ignoring consecutive repeats and the closing point.
fn distinct_vertices(ring: &LineString<f64>) -> usize {
    let mut previous: Option<&Coord<f64>> = None;
    let mut count = 0;
    for coord in ring.coords() {
        if previous != Some(coord) {
            count += 1;
        }
        previous = Some(coord);
    }
    if count > 1 && ring.0.first() == ring.0.last() {
        count -= 1;
    }
    count
}

/// Intersect every polygon with `tile` and collect the non-empty pieces.
///
/// Invalid polygons are skipped with a warning; polygons whose bounding box
/// misses the tile are skipped without running the boolean operation.
pub fn clip_to_tile(tile: &Extent, polygons: &[Polygon]) -> Vec<Polygon> {
    let tile_rect = tile.to_rect();
    let tile_polygon = tile.to_polygon();
    let mut pieces = Vec::new();

    for (index, polygon) in polygons.iter().enumerate() {
        let Some(bounds) = polygon.bounding_rect() else {
            continue;
        };
        if !bounds.intersects(&tile_rect) {
            continue;
        }

        if let Err(e) = validate_polygon(index, polygon) {
            warn!(error = %e, "Skipping invalid polygon");
            continue;
        }

        let clipped = tile_polygon.intersection(polygon);
        pieces.extend(
            clipped
                .into_iter()
                .filter(|piece| piece.unsigned_area() > 0.0),
        );
    }

    debug!(
        polygons = polygons.len(),
        pieces = pieces.len(),
        "Clipped polygons to tile"
    );

    pieces
}
