//! Image encoding: flattened surface → baseline JPEG for a `DCTDecode` XObject.
//!
//! PDF viewers decode `DCTDecode` streams natively, so the JPEG file is
//! embedded byte-for-byte with no further wrapping. Every input is re-encoded,
//! even when it already is a JPEG, so the embedded payload always reflects
//! exactly what was drawn on the surface.

use crate::error::PageError;
use crate::pipeline::surface::Surface;
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};
use tracing::debug;

/// A JPEG payload ready to embed, with its pixel size.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Encode the surface contents as JPEG at `quality` (1–100).
pub fn encode_surface(
    index: usize,
    name: &str,
    surface: &Surface,
    quality: u8,
) -> Result<EncodedImage, PageError> {
    let pixels = surface.pixels();
    let (width, height) = pixels.dimensions();

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, quality.clamp(1, 100))
        .write_image(pixels.as_raw(), width, height, ExtendedColorType::Rgb8)
        .map_err(|e| PageError::EncodeFailed {
            index,
            name: name.to_string(),
            detail: e.to_string(),
        })?;

    debug!("Encoded image {} → {} bytes JPEG", index, jpeg.len());

    Ok(EncodedImage {
        jpeg,
        width,
        height,
    })
}
