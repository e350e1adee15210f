//! Profile picture processing.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use thiserror::Error;

/// JPEG quality of stored pictures.
const JPEG_QUALITY: u8 = 85;

/// Errors raised while turning an upload into a profile picture.
#[derive(Debug, Error)]
pub enum PictureError {
    /// Not a PNG or JPEG file.
    #[error("only PNG and JPEG images are accepted")]
    UnsupportedFormat,

    /// Recognised format but the data is corrupt.
    #[error("could not decode image: {0}")]
    Decode(String),

    #[error("could not encode image: {0}")]
    Encode(String),
}

/// Decode a PNG or JPEG upload.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, PictureError> {
    let format = image::guess_format(bytes).map_err(|_| PictureError::UnsupportedFormat)?;
    if !matches!(format, ImageFormat::Png | ImageFormat::Jpeg) {
        return Err(PictureError::UnsupportedFormat);
    }

    image::load_from_memory_with_format(bytes, format)
        .map_err(|e| PictureError::Decode(e.to_string()))
}

/// Crop the largest centred square out of `img`.
pub fn crop_square(img: &DynamicImage) -> DynamicImage {
    let (width, height) = (img.width(), img.height());
    let side = width.min(height);
    img.crop_imm((width - side) / 2, (height - side) / 2, side, side)
}

/// Encode `img` as JPEG, dropping any alpha channel.
pub fn encode_jpeg(img: &DynamicImage) -> Result<Vec<u8>, PictureError> {
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
    img.to_rgb8()
        .write_with_encoder(encoder)
        .map_err(|e| PictureError::Encode(e.to_string()))?;
    Ok(buf)
}

/// Turn an uploaded image into a square `size` x `size` JPEG.
pub fn profile_picture(bytes: &[u8], size: u32) -> Result<Vec<u8>, PictureError> {
    let img = decode(bytes)?;
    let square = crop_square(&img).resize_exact(size, size, FilterType::Lanczos3);
    encode_jpeg(&square)
}
