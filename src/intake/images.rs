//! Photo preparation for quote requests: shrink, re-encode, embed as data URI.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{codecs::jpeg::JpegEncoder, imageops::FilterType, DynamicImage, GenericImageView};

/// Size target for a compressed photo.
pub const TARGET_MAX_BYTES: usize = 512 * 1024;
/// Longest edge after resizing.
pub const MAX_DIMENSION: u32 = 800;

const INITIAL_QUALITY: u8 = 70;
const MIN_QUALITY: u8 = 30;
const QUALITY_STEP: u8 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("file is not a JPEG, PNG, GIF or WebP image")]
    Unsupported,

    #[error("image processing error: {0}")]
    Processing(#[from] image::ImageError),

    #[error("compression task failed: {0}")]
    Task(String),
}

/// Detects the image type from its leading bytes.
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.len() < 4 {
        return None;
    }
    match bytes {
        // JPEG: FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        // PNG: 89 50 4E 47
        [0x89, 0x50, 0x4E, 0x47, ..] => Some("image/png"),
        // GIF: 47 49 46 38
        [0x47, 0x49, 0x46, 0x38, ..] => Some("image/gif"),
        // WebP: 52 49 46 46 ... 57 45 42 50
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Some("image/webp"),
        _ => None,
    }
}

/// Scale down to fit `max` on the longest edge. Never upscales.
fn resize_to_fit(img: &DynamicImage, max: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    if width <= max && height <= max {
        return img.clone();
    }
    img.resize(max, max, FilterType::Lanczos3)
}

/// Resizes and re-encodes as JPEG, lowering quality until the target size is
/// met or the quality floor is reached.
pub fn compress(bytes: &[u8]) -> Result<Vec<u8>, ImageError> {
    let img = image::load_from_memory(bytes)?;
    let rgb = resize_to_fit(&img, MAX_DIMENSION).to_rgb8();

    let mut quality = INITIAL_QUALITY;
    loop {
        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, quality).encode_image(&rgb)?;
        if out.len() <= TARGET_MAX_BYTES || quality <= MIN_QUALITY {
            tracing::debug!(
                original_bytes = bytes.len(),
                compressed_bytes = out.len(),
                quality,
                "photo compressed"
            );
            return Ok(out);
        }
        quality = quality.saturating_sub(QUALITY_STEP).max(MIN_QUALITY);
    }
}

pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Turns an uploaded photo into a data URI.
///
/// Compression failures fall back to the original bytes; only files that are
/// not images at all are rejected.
pub async fn prepare(bytes: Vec<u8>) -> Result<String, ImageError> {
    let mime = sniff_mime(&bytes).ok_or(ImageError::Unsupported)?;

    let (result, original) = tokio::task::spawn_blocking(move || {
        let result = compress(&bytes);
        (result, bytes)
    })
    .await
    .map_err(|e| ImageError::Task(e.to_string()))?;

    match result {
        Ok(compressed) => Ok(data_uri("image/jpeg", &compressed)),
        Err(e) => {
            tracing::warn!(error = %e, mime, "photo compression failed, using original");
            Ok(data_uri(mime, &original))
        }
    }
}
