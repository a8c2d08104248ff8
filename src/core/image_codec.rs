// Data-URL image transport for the HTTP layer

use base64::{engine::general_purpose, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use thiserror::Error;

pub const JPEG_DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

#[derive(Debug, Error)]
pub enum ImageCodecError {
    #[error("Data URL has no payload separator")]
    MissingPayload,

    #[error("Base64 decode failed: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Image decode failed: {0}")]
    Decode(#[source] image::ImageError),

    #[error("JPEG encode failed: {0}")]
    Encode(#[source] image::ImageError),
}

pub type ImageCodecResult<T> = Result<T, ImageCodecError>;

/// Decode a `data:<mime>;base64,<payload>` string into an RGB frame.
/// Whitespace anywhere in the payload is ignored, so line-wrapped base64 is
/// accepted. Any format the `image` crate understands is accepted.
pub fn decode_data_url(data_url: &str) -> ImageCodecResult<RgbImage> {
    let (_, payload) = data_url
        .split_once(',')
        .ok_or(ImageCodecError::MissingPayload)?;

    let compact: Vec<u8> = payload
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    let bytes = general_purpose::STANDARD.decode(compact)?;
    let image = image::load_from_memory(&bytes).map_err(ImageCodecError::Decode)?;
    Ok(image.to_rgb8())
}

/// Encode a frame as a JPEG data URL
pub fn encode_data_url(frame: &RgbImage, quality: u8) -> ImageCodecResult<String> {
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, quality.clamp(1, 100))
        .encode_image(frame)
        .map_err(ImageCodecError::Encode)?;

    let mut url = String::with_capacity(JPEG_DATA_URL_PREFIX.len() + jpeg.len() * 4 / 3 + 4);
    url.push_str(JPEG_DATA_URL_PREFIX);
    general_purpose::STANDARD.encode_string(&jpeg, &mut url);
    Ok(url)
}
