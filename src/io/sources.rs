//! Canvas extent and polygon sources.
//!
//! Three input layouts are understood:
//!
//! - **Drawn region**: a GeoJSON-like document produced by the map drawing
//!   tool. The first feature's `properties.extent` holds the corner pair
//!   `[[west, north], [east, south]]`, and the feature may carry a `zoom`.
//! - **Store rows**: JSON array of objects with the data store's
//!   `x_min`, `y_max`, `x_max`, `y_min` columns.
//! - **Polygons**: GeoJSON FeatureCollection, Feature, or bare geometry with
//!   `Polygon` / `MultiPolygon` geometries, already in the tiling coordinate
//!   space.

use std::fs;
use std::path::Path;

use geo::{Coord, LineString};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::PersistError;
use crate::geometry::{Extent, Polygon};

// =============================================================================
// Drawn Region
// =============================================================================

/// Canvas described by a drawn-region document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawnRegion {
    pub canvas: Extent,

    /// Zoom level the region was drawn at, when recorded
    pub zoom: Option<u8>,
}

#[derive(Deserialize)]
struct DrawnDocument {
    features: Vec<DrawnFeature>,
}

#[derive(Deserialize)]
struct DrawnFeature {
    properties: DrawnProperties,
    #[serde(default)]
    zoom: Option<u8>,
}

#[derive(Deserialize)]
struct DrawnProperties {
    extent: Option<[[f64; 2]; 2]>,
}

/// Parse a drawn-region document.
///
/// # Errors
///
/// Returns [`PersistError::Malformed`] if the document has no feature or the
/// first feature has no extent (nothing was drawn), and
/// [`PersistError::Extent`] if the corners describe an empty rectangle.
pub fn parse_drawn_region(json: &str) -> Result<DrawnRegion, PersistError> {
    let document: DrawnDocument = serde_json::from_str(json)?;
    let feature = document
        .features
        .first()
        .ok_or_else(|| PersistError::Malformed("drawn region has no features".to_string()))?;

    let [[west, north], [east, south]] = feature.properties.extent.ok_or_else(|| {
        PersistError::Malformed("first feature has no extent; nothing was drawn".to_string())
    })?;

    Ok(DrawnRegion {
        canvas: Extent::from_corners(west, north, east, south)?,
        zoom: feature.zoom,
    })
}

/// Read and parse a drawn-region document from `path`.
pub fn load_drawn_region(path: impl AsRef<Path>) -> Result<DrawnRegion, PersistError> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|e| PersistError::io(path, e))?;
    parse_drawn_region(&json)
}

// =============================================================================
// Store Rows
// =============================================================================

/// One canvas row as exported from the data store.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct StoreRow {
    pub x_min: f64,
    pub y_max: f64,
    pub x_max: f64,
    pub y_min: f64,
}

impl TryFrom<StoreRow> for Extent {
    type Error = crate::error::ConfigError;

    fn try_from(row: StoreRow) -> Result<Self, Self::Error> {
        Extent::from_store_row(row.x_min, row.y_max, row.x_max, row.y_min)
    }
}

/// Convert a JSON array of store rows into canvas extents.
pub fn canvases_from_store_rows(json: &str) -> Result<Vec<Extent>, PersistError> {
    let rows: Vec<StoreRow> = serde_json::from_str(json)?;
    rows.into_iter()
        .map(|row| Extent::try_from(row).map_err(PersistError::from))
        .collect()
}

/// Read store rows from `path`.
pub fn load_store_rows(path: impl AsRef<Path>) -> Result<Vec<Extent>, PersistError> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|e| PersistError::io(path, e))?;
    let canvases = canvases_from_store_rows(&json)?;
    info!(path = %path.display(), canvases = canvases.len(), "Loaded canvas extents");
    Ok(canvases)
}

// =============================================================================
// Polygons
// =============================================================================

type Position = Vec<f64>;
type Ring = Vec<Position>;

#[derive(Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon {
        coordinates: Vec<Ring>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Ring>>,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Deserialize)]
struct Feature {
    geometry: Option<Geometry>,
}

#[derive(Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

/// Parse polygons from a GeoJSON document, exploding multi-polygons.
///
/// Geometries other than `Polygon` and `MultiPolygon` are ignored.
pub fn polygons_from_geojson(json: &str) -> Result<Vec<Polygon>, PersistError> {
    let value: Value = serde_json::from_str(json)?;
    let geometries = match value.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => serde_json::from_value::<FeatureCollection>(value)?
            .features
            .into_iter()
            .filter_map(|f| f.geometry)
            .collect(),
        Some("Feature") => serde_json::from_value::<Feature>(value)?
            .geometry
            .into_iter()
            .collect(),
        Some(_) => vec![serde_json::from_value::<Geometry>(value)?],
        None => {
            return Err(PersistError::Malformed(
                "GeoJSON object has no \"type\" member".to_string(),
            ))
        }
    };

    let mut polygons = Vec::new();
    for geometry in geometries {
        match geometry {
            Geometry::Polygon { coordinates } => polygons.push(to_polygon(coordinates)?),
            Geometry::MultiPolygon { coordinates } => {
                for part in coordinates {
                    polygons.push(to_polygon(part)?);
                }
            }
            Geometry::Unsupported => debug!("Ignoring non-polygon geometry"),
        }
    }

    Ok(polygons)
}

/// Read polygons from a GeoJSON file.
pub fn load_polygons(path: impl AsRef<Path>) -> Result<Vec<Polygon>, PersistError> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|e| PersistError::io(path, e))?;
    let polygons = polygons_from_geojson(&json)?;
    info!(path = %path.display(), polygons = polygons.len(), "Loaded polygons");
    Ok(polygons)
}

fn to_polygon(rings: Vec<Ring>) -> Result<Polygon, PersistError> {
    let mut rings = rings.into_iter().map(to_line_string);
    let exterior = rings
        .next()
        .ok_or_else(|| PersistError::Malformed("polygon has no rings".to_string()))??;
    let interiors = rings.collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn to_line_string(ring: Ring) -> Result<LineString<f64>, PersistError> {
    ring.into_iter()
        .map(|position| match position.as_slice() {
            [x, y, ..] => Ok(Coord { x: *x, y: *y }),
            _ => Err(PersistError::Malformed(format!(
                "position has {} values, need at least 2",
                position.len()
            ))),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(LineString::new)
}
