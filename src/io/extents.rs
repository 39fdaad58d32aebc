//! Tile extent persistence.
//!
//! The tile list is the durable hand-off between mesh generation and
//! mask/image generation. It is stored as a JSON array of
//! `[west, south, east, north]` arrays; `f64` values are written in their
//! shortest round-trip form, so reloading yields bit-identical extents.

use std::fs;
use std::path::Path;

use serde_json::{json, Value};
use tracing::info;

use crate::error::PersistError;
use crate::geometry::Extent;
use crate::mesh::tile_positions;

/// Serialize extents as pretty-printed JSON.
pub fn extents_to_json(extents: &[Extent]) -> Result<String, PersistError> {
    Ok(serde_json::to_string_pretty(extents)?)
}

/// Parse extents from JSON, rejecting empty or inverted rectangles.
pub fn extents_from_json(json: &str) -> Result<Vec<Extent>, PersistError> {
    Ok(serde_json::from_str(json)?)
}

/// Write the tile list to `path`.
pub fn save_extents(path: impl AsRef<Path>, extents: &[Extent]) -> Result<(), PersistError> {
    let path = path.as_ref();
    let json = extents_to_json(extents)?;
    fs::write(path, json).map_err(|e| PersistError::io(path, e))?;
    info!(path = %path.display(), tiles = extents.len(), "Saved tile extents");
    Ok(())
}

/// Read a tile list written by [`save_extents`].
pub fn load_extents(path: impl AsRef<Path>) -> Result<Vec<Extent>, PersistError> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|e| PersistError::io(path, e))?;
    let extents = extents_from_json(&json)?;
    info!(path = %path.display(), tiles = extents.len(), "Loaded tile extents");
    Ok(extents)
}

/// Build a GeoJSON FeatureCollection with one rectangle per tile, for visual
/// inspection in a GIS tool.
///
/// Each feature carries the tile's `index` (1-indexed, matching the default
/// output names), `row` and `column`.
pub fn qa_feature_collection(extents: &[Extent]) -> Value {
    let features: Vec<Value> = extents
        .iter()
        .zip(tile_positions(extents))
        .map(|(extent, position)| {
            let Extent {
                west,
                south,
                east,
                north,
            } = *extent;
            json!({
                "type": "Feature",
                "properties": {
                    "index": position.index + 1,
                    "row": position.row,
                    "column": position.column,
                },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[
                        [west, south],
                        [east, south],
                        [east, north],
                        [west, north],
                        [west, south],
                    ]],
                },
            })
        })
        .collect();

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

/// Write the QA FeatureCollection to `path`.
pub fn save_qa_geojson(path: impl AsRef<Path>, extents: &[Extent]) -> Result<(), PersistError> {
    let path = path.as_ref();
    let json = serde_json::to_string(&qa_feature_collection(extents))?;
    fs::write(path, json).map_err(|e| PersistError::io(path, e))
}
