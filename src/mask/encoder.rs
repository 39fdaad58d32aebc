//! PNG encoding for masks.
//!
//! Masks are written as 8-bit gray + alpha PNGs so the alpha channel, which
//! carries the polygon coverage, survives on disk.

use bytes::Bytes;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use crate::error::MaskError;

use super::raster::Mask;

/// PNG encoder for tile masks.
#[derive(Debug, Clone, Default)]
pub struct MaskEncoder {}

impl MaskEncoder {
    pub fn new() -> Self {
        Self {}
    }

    /// Encode `mask` as a gray + alpha PNG.
    ///
    /// # Errors
    ///
    /// Returns [`MaskError::EncodeError`] if the PNG encoder fails.
    pub fn encode(&self, mask: &Mask) -> Result<Bytes, MaskError> {
        let mut output = Vec::new();
        let encoder = PngEncoder::new(&mut output);

        encoder
            .write_image(
                mask.as_image().as_raw(),
                mask.width(),
                mask.height(),
                ExtendedColorType::La8,
            )
            .map_err(|e| MaskError::EncodeError {
                message: e.to_string(),
            })?;

        Ok(Bytes::from(output))
    }
}
