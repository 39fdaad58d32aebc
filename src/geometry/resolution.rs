//! Zoom level to ground resolution lookup.

use std::collections::BTreeMap;

use crate::error::ConfigError;

/// Ground resolution in metres per pixel for Web Mercator (EPSG:3857) zoom
/// levels 0 to 21, as published for WMTS tile matrix sets.
pub const WEB_MERCATOR_RESOLUTIONS: [f64; 22] = [
    156543.0339280410,
    78271.5169640205,
    39135.7584820102,
    19567.8792410051,
    9783.9396205026,
    4891.9698102513,
    2445.9849051256,
    1222.9924525628,
    611.4962262814,
    305.7481131407,
    152.8740565704,
    76.4370282852,
    38.2185141426,
    19.1092570713,
    9.5546285356,
    4.7773142678,
    2.3886571339,
    1.1943285670,
    0.5971642835,
    0.2985821417,
    0.1492910709,
    0.0746455354,
];

/// Immutable mapping from integer zoom level to ground resolution
/// (projected units per pixel).
///
/// This is the only coupling between a zoom level and real-world scale. It is
/// passed by value or reference into every component that needs it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionTable {
    levels: BTreeMap<u8, f64>,
}

impl ResolutionTable {
    /// The Web Mercator table for zoom levels 0..=21.
    pub fn web_mercator() -> Self {
        Self {
            levels: WEB_MERCATOR_RESOLUTIONS
                .iter()
                .enumerate()
                .map(|(zoom, res)| (zoom as u8, *res))
                .collect(),
        }
    }

    /// Build a custom table from `(zoom, resolution)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidResolution`] for any non-positive or
    /// non-finite resolution.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (u8, f64)>) -> Result<Self, ConfigError> {
        let mut levels = BTreeMap::new();
        for (zoom, resolution) in pairs {
            if !(resolution.is_finite() && resolution > 0.0) {
                return Err(ConfigError::InvalidResolution { zoom, resolution });
            }
            levels.insert(zoom, resolution);
        }
        Ok(Self { levels })
    }

    /// Resolve the resolution for `zoom`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownZoomLevel`] if the table has no entry.
    pub fn resolution(&self, zoom: u8) -> Result<f64, ConfigError> {
        self.levels
            .get(&zoom)
            .copied()
            .ok_or_else(|| ConfigError::UnknownZoomLevel {
                zoom,
                min: self.levels.keys().next().copied().unwrap_or(0),
                max: self.levels.keys().next_back().copied().unwrap_or(0),
            })
    }

    /// Number of zoom levels in the table.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl Default for ResolutionTable {
    fn default() -> Self {
        Self::web_mercator()
    }
}
