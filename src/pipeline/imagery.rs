//! Paired imagery requests.
//!
//! Imagery is fetched by an external collaborator. The pipeline only
//! guarantees that the extent and pixel size it hands over are exactly those
//! the mask was rasterized for, so image and mask are pixel-aligned.

use bytes::Bytes;
use url::Url;

use crate::error::ExternalServiceError;
use crate::geometry::{Extent, PixelSize};

/// Default output projection for imagery requests.
pub const DEFAULT_IMAGERY_CRS: &str = "EPSG:3857";

/// A request for the imagery tile paired with a mask.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageryRequest {
    /// Tile index in the mesh enumeration (0-indexed)
    pub index: usize,

    /// Bounding box, identical to the mask's tile extent
    pub extent: Extent,

    /// Output size, identical to the mask's pixel size
    pub pixel_size: PixelSize,
}

impl ImageryRequest {
    /// Build a WMS 1.3.0 `GetMap` URL for this request.
    ///
    /// The crate ships no network client; this is a helper for
    /// [`ImagerySource`] implementations backed by a WMS server, so they
    /// request exactly the extent and size the mask was drawn for.
    ///
    /// The bounding box is sent in `west,south,east,north` order, which is the
    /// axis order of projected CRSs such as EPSG:3857.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid URL.
    pub fn wms_get_map_url(
        &self,
        base_url: &str,
        layer: &str,
        crs: &str,
    ) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(base_url)?;
        let [west, south, east, north] = self.extent.to_array();

        url.query_pairs_mut()
            .append_pair("SERVICE", "WMS")
            .append_pair("VERSION", "1.3.0")
            .append_pair("REQUEST", "GetMap")
            .append_pair("LAYERS", layer)
            .append_pair("STYLES", "")
            .append_pair("CRS", crs)
            .append_pair("BBOX", &format!("{},{},{},{}", west, south, east, north))
            .append_pair("WIDTH", &self.pixel_size.width.to_string())
            .append_pair("HEIGHT", &self.pixel_size.height.to_string())
            .append_pair("FORMAT", "image/png");

        Ok(url)
    }
}

/// Source of imagery tiles, such as a web map service client.
///
/// Implementations are called concurrently from the pipeline's workers.
pub trait ImagerySource: Send + Sync {
    /// Fetch the encoded image for `request`.
    fn fetch(&self, request: &ImageryRequest) -> Result<Bytes, ExternalServiceError>;
}
