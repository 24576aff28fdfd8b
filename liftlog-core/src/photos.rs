//! Progress photo payloads: shrink, re-encode, and store as base64 text.

use std::io::Cursor;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageError, ImageReader};
use log::debug;

use crate::error::TrackerError;

/// Longest allowed side of a stored photo, in pixels.
pub const MAX_PHOTO_SIDE: u32 = 1280;
const JPEG_QUALITY: u8 = 85;

#[derive(Debug, Clone)]
pub struct PreparedPhoto {
    pub image_b64: String,
    pub width: u32,
    pub height: u32,
}

/// Decodes an uploaded JPEG or PNG, shrinks it to fit within
/// `MAX_PHOTO_SIDE` on both axes and re-encodes it as base64 JPEG.
/// Images already within bounds keep their size.
pub fn prepare_photo(bytes: &[u8]) -> Result<PreparedPhoto, TrackerError> {
    let img = image::load_from_memory(bytes)?;
    let (orig_w, orig_h) = (img.width(), img.height());

    let rgb = if orig_w > MAX_PHOTO_SIDE || orig_h > MAX_PHOTO_SIDE {
        DynamicImage::ImageRgb8(img.to_rgb8())
            .thumbnail(MAX_PHOTO_SIDE, MAX_PHOTO_SIDE)
            .to_rgb8()
    } else {
        img.to_rgb8()
    };
    let (width, height) = rgb.dimensions();
    debug!(
        "Prepared photo {}x{} -> {}x{}",
        orig_w, orig_h, width, height
    );

    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY).encode_image(&rgb)?;

    Ok(PreparedPhoto {
        image_b64: STANDARD.encode(&buf),
        width,
        height,
    })
}

/// Returns the stored JPEG bytes.
pub fn decode_photo(image_b64: &str) -> Result<Vec<u8>, TrackerError> {
    Ok(STANDARD.decode(image_b64)?)
}

pub fn photo_dimensions(image_b64: &str) -> Result<(u32, u32), TrackerError> {
    let bytes = decode_photo(image_b64)?;
    let dims = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(ImageError::IoError)?
        .into_dimensions()?;
    Ok(dims)
}
