//! JPEG encoding: the single-shot primitive both compressors build on.
//!
//! The codec itself sits behind [`JpegCodec`]. The production
//! [`NativeCodec`] uses mozjpeg with optimized Huffman tables when the
//! `mozjpeg` feature is enabled, and the `image` crate's baseline encoder
//! otherwise. EXIF payloads are spliced into the finished stream as an APP1
//! segment with `img-parts`, so both backends embed metadata identically.

use std::panic::{self, AssertUnwindSafe};

use image::RgbImage;
use img_parts::jpeg::Jpeg;
use img_parts::{Bytes, ImageEXIF};
use thiserror::Error;

use crate::decode::resize;

/// Largest side a baseline JPEG frame header can describe.
pub const MAX_JPEG_DIMENSION: u32 = 65_535;

/// Errors that can occur during JPEG encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero or beyond what a JPEG header can hold
    #[error("Invalid dimensions: {width}x{height} cannot be encoded as JPEG")]
    InvalidDimensions { width: u32, height: u32 },

    /// Scale factor outside (0, 1]
    #[error("Invalid scale factor {0}: must be in (0, 1]")]
    InvalidScaleFactor(f64),

    /// JPEG encoding failed
    #[error("JPEG encoding failed: {0}")]
    EncodingFailed(String),

    /// The encoded stream could not be rewritten with the EXIF segment
    #[error("Failed to embed EXIF metadata: {0}")]
    MetadataEmbedFailed(String),
}

/// Container format written by the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Jpeg,
}

impl OutputFormat {
    /// MIME type of the produced stream.
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
        }
    }
}

/// Encoder settings for one encode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegSaveParams<'a> {
    pub format: OutputFormat,
    /// JPEG quality, 1-100.
    pub quality: u8,
    /// Request encoder-level optimization (optimized Huffman tables).
    pub optimize: bool,
    /// Raw EXIF payload to embed, if any.
    pub exif: Option<&'a [u8]>,
}

impl<'a> JpegSaveParams<'a> {
    /// Optimized JPEG at `quality` (clamped to 1-100), no metadata.
    pub fn new(quality: u8) -> Self {
        Self {
            format: OutputFormat::Jpeg,
            quality: quality.clamp(1, 100),
            optimize: true,
            exif: None,
        }
    }

    /// Embed `exif` in the output when it is `Some`.
    pub fn with_exif(mut self, exif: Option<&'a [u8]>) -> Self {
        self.exif = exif;
        self
    }

    /// Same settings at a different quality.
    pub fn at_quality(mut self, quality: u8) -> Self {
        self.quality = quality.clamp(1, 100);
        self
    }
}

/// A codec able to turn an RGB buffer into a JPEG stream.
pub trait JpegCodec {
    /// Encode `image` exactly as given (no resampling).
    fn encode_rgb(&self, image: &RgbImage, params: &JpegSaveParams<'_>)
        -> Result<Vec<u8>, EncodeError>;
}

/// Production codec: mozjpeg (feature `mozjpeg`) or the `image` crate encoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeCodec;

impl JpegCodec for NativeCodec {
    fn encode_rgb(
        &self,
        image: &RgbImage,
        params: &JpegSaveParams<'_>,
    ) -> Result<Vec<u8>, EncodeError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 || width > MAX_JPEG_DIMENSION || height > MAX_JPEG_DIMENSION {
            return Err(EncodeError::InvalidDimensions { width, height });
        }

        let pixels = image.as_raw();
        let expected = (width as usize) * (height as usize) * 3;
        if pixels.len() != expected {
            return Err(EncodeError::InvalidPixelData {
                expected,
                actual: pixels.len(),
            });
        }

        let encoded = panic::catch_unwind(AssertUnwindSafe(|| {
            encode_pixels(pixels, width, height, params)
        }))
        .map_err(|_| EncodeError::EncodingFailed("codec aborted".to_string()))??;

        match params.exif {
            Some(exif) if !exif.is_empty() => embed_exif(encoded, exif),
            _ => Ok(encoded),
        }
    }
}

/// Output of the encode primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub bytes: Vec<u8>,
    /// Width of the encoded frame.
    pub width: u32,
    /// Height of the encoded frame.
    pub height: u32,
}

/// Encode `image` at `scale_factor` and the given save parameters.
///
/// When `scale_factor < 1` a Lanczos3-resampled working copy of
/// `round(width * f) x round(height * f)` is encoded; the caller's image is
/// never modified.
///
/// # Errors
///
/// `EncodeError::InvalidScaleFactor` for factors outside (0, 1], otherwise
/// whatever the codec reports.
pub fn encode(
    codec: &impl JpegCodec,
    image: &RgbImage,
    scale_factor: f64,
    params: &JpegSaveParams<'_>,
) -> Result<Encoded, EncodeError> {
    if !(scale_factor > 0.0 && scale_factor <= 1.0) {
        return Err(EncodeError::InvalidScaleFactor(scale_factor));
    }

    let working = resize::scale(image, scale_factor);
    let bytes = codec.encode_rgb(&working, params)?;

    Ok(Encoded {
        bytes,
        width: working.width(),
        height: working.height(),
    })
}

/// Encode an RGB image at `quality` with the production codec.
///
/// # Example
///
/// ```
/// use jpegfit_core::encode::encode_jpeg;
///
/// let image = image::RgbImage::from_pixel(100, 100, image::Rgb([128, 128, 128]));
/// let jpeg = encode_jpeg(&image, 90).unwrap();
///
/// // Verify JPEG magic bytes
/// assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
/// ```
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, EncodeError> {
    NativeCodec.encode_rgb(image, &JpegSaveParams::new(quality))
}

#[cfg(feature = "mozjpeg")]
fn encode_pixels(
    pixels: &[u8],
    width: u32,
    height: u32,
    params: &JpegSaveParams<'_>,
) -> Result<Vec<u8>, EncodeError> {
    use mozjpeg::{ColorSpace, Compress};

    let mut comp = Compress::new(ColorSpace::JCS_RGB);
    comp.set_size(width as usize, height as usize);
    comp.set_quality(f32::from(params.quality));
    comp.set_optimize_coding(params.optimize);

    let estimated_size = (pixels.len() / 10).max(4096);
    let mut writer = comp
        .start_compress(Vec::with_capacity(estimated_size))
        .map_err(|e| EncodeError::EncodingFailed(format!("mozjpeg: failed to start: {e}")))?;
    writer
        .write_scanlines(pixels)
        .map_err(|e| EncodeError::EncodingFailed(format!("mozjpeg: failed to write scanlines: {e}")))?;
    writer
        .finish()
        .map_err(|e| EncodeError::EncodingFailed(format!("mozjpeg: failed to finish: {e}")))
}

#[cfg(not(feature = "mozjpeg"))]
fn encode_pixels(
    pixels: &[u8],
    width: u32,
    height: u32,
    params: &JpegSaveParams<'_>,
) -> Result<Vec<u8>, EncodeError> {
    use image::codecs::jpeg::JpegEncoder;
    use image::{ExtendedColorType, ImageEncoder};

    // The baseline encoder has no Huffman optimization; `params.optimize`
    // has no effect here.
    let mut buffer = std::io::Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, params.quality);
    encoder
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}

/// Insert `exif` as the APP1 `Exif` segment of an encoded JPEG stream.
fn embed_exif(jpeg: Vec<u8>, exif: &[u8]) -> Result<Vec<u8>, EncodeError> {
    let mut container = Jpeg::from_bytes(Bytes::from(jpeg))
        .map_err(|e| EncodeError::MetadataEmbedFailed(e.to_string()))?;
    container.set_exif(Some(Bytes::copy_from_slice(exif)));

    let mut output = Vec::new();
    container
        .encoder()
        .write_to(&mut output)
        .map_err(|e| EncodeError::MetadataEmbedFailed(e.to_string()))?;

    Ok(output)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
