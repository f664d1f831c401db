//! Image format conversions
//!
//! Photos arrive as whatever Telegram stored them as (usually JPEG), the
//! generation API wants base64-encoded JPEG, and replies go back as PNG.
//! All conversions are pure; buffers live only for the duration of the call.

use base64::Engine;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("not a valid image: {0}")]
    Image(#[from] image::ImageError),
}

/// Re-encode raw photo bytes as base64 JPEG for submission to the
/// generation API.
pub fn to_submission_format(raw: &[u8]) -> Result<String, DecodeError> {
    let decoded = image::load_from_memory(raw)?;
    // JPEG carries no alpha channel
    let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());

    let mut buf = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)?;

    Ok(base64::engine::general_purpose::STANDARD.encode(&buf))
}

/// Re-encode bytes returned by the generation API as PNG for the chat reply.
///
/// The most likely failure point in production: on errors the service can
/// hand back content that is not an image at all.
pub fn to_reply_format(generated: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let decoded = image::load_from_memory(generated)?;

    let mut buf = Vec::new();
    decoded.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;

    Ok(buf)
}
