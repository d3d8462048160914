//! Single-pass compression at a caller-chosen quality.

use crate::decode::{resize, DecodedImage};
use crate::encode::{encode, JpegCodec, JpegSaveParams};

use super::types::{CompressionOptions, EncodeResult, Outcome, ProcessingError, Stats};

/// Re-encode `image` once at `options.quality`.
///
/// Images whose longest edge exceeds `options.max_dimension` are first
/// scaled down proportionally; smaller images keep their size. Any pixel
/// layout is converted to RGB before encoding.
///
/// # Errors
///
/// `ProcessingError::EmptyImage` for images without pixels, or the
/// encoder's failure.
pub fn compress_fixed_quality(
    codec: &impl JpegCodec,
    image: &DecodedImage,
    options: &CompressionOptions,
) -> Result<EncodeResult, ProcessingError> {
    if image.is_empty() {
        return Err(ProcessingError::EmptyImage {
            width: image.width(),
            height: image.height(),
        });
    }

    let ratio = resize::fit_ratio(image.width(), image.height(), options.max_dimension);
    let scale_factor = ratio.min(1.0);

    let exif = if options.preserve_exif { image.exif() } else { None };
    let params = JpegSaveParams::new(options.quality).with_exif(exif);

    let rgb = image.to_rgb();
    let encoded = encode(codec, &rgb, scale_factor, &params)?;

    let stats = Stats {
        width: encoded.width,
        height: encoded.height,
        compressed_size: encoded.bytes.len() as u64,
        quality: params.quality,
        scale_factor,
    };

    tracing::info!(
        width = stats.width,
        height = stats.height,
        quality = stats.quality,
        bytes = stats.compressed_size,
        "Compressed at fixed quality"
    );

    Ok(EncodeResult {
        bytes: encoded.bytes,
        stats,
        outcome: Outcome::FixedQuality,
    })
}
