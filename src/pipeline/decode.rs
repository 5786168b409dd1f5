//! Image decoding: raw bytes → `DynamicImage`.
//!
//! Decoding never blocks forever. A zero-length payload, an unknown format
//! or corrupt data all come back as an `Err` naming the input. An EXIF
//! orientation tag is applied, so camera photos come out upright.

use crate::error::PageError;
use crate::pipeline::input::InputImage;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader};
use std::io::Cursor;
use tracing::debug;

/// Decode `input` (the `index`-th file, 1-based) into a raster.
///
/// The format is sniffed from the magic bytes first; the declared content
/// type is only used when sniffing finds nothing.
pub fn decode_image(index: usize, input: &InputImage) -> Result<DynamicImage, PageError> {
    let fail = |detail: String| PageError::DecodeFailed {
        index,
        name: input.name.clone(),
        detail,
    };

    if input.bytes.is_empty() {
        return Err(fail("empty file".into()));
    }

    let mut reader = ImageReader::new(Cursor::new(input.bytes.as_slice()))
        .with_guessed_format()
        .map_err(|e| fail(e.to_string()))?;

    if reader.format().is_none() {
        match input
            .content_type
            .as_deref()
            .and_then(ImageFormat::from_mime_type)
        {
            Some(format) => reader.set_format(format),
            None => return Err(fail("unrecognised image format".into())),
        }
    }

    let mut decoder = reader.into_decoder().map_err(|e| fail(e.to_string()))?;
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let mut image = DynamicImage::from_decoder(decoder).map_err(|e| fail(e.to_string()))?;
    image.apply_orientation(orientation);
    if image.width() == 0 || image.height() == 0 {
        return Err(fail("image has no pixels".into()));
    }

    debug!(
        "Decoded image {} ('{}') → {}x{} px",
        index,
        input.name,
        image.width(),
        image.height()
    );
    Ok(image)
}
