//! Core types for image decoding.

use image::{DynamicImage, RgbImage};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for image decoding operations.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// No bytes were supplied.
    #[error("Empty image payload")]
    Empty,

    /// The file format is not recognized or supported.
    #[error("Invalid or unsupported image format")]
    UnsupportedFormat,

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),
}

/// Pixel layout of a decoded image, before JPEG normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorMode {
    /// 8 or 16 bit RGB.
    Rgb,
    /// RGB with alpha. Palette images with transparency decode to this.
    Rgba,
    /// Grayscale.
    Luma,
    /// Grayscale with alpha.
    LumaAlpha,
    /// Floating point or otherwise unusual layouts.
    Other,
}

/// A decoded image together with the EXIF blob carried by its container.
///
/// The EXIF blob is the raw TIFF payload (starting with `II*\0` or `MM\0*`),
/// without the `Exif\0\0` APP1 prefix.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Decoded pixels in whatever layout the codec produced.
    pub image: DynamicImage,
    /// Raw EXIF payload, if the container had one.
    pub exif: Option<Vec<u8>>,
}

impl DecodedImage {
    /// Wrap a decoded image with no metadata.
    pub fn new(image: DynamicImage) -> Self {
        Self { image, exif: None }
    }

    /// Wrap a decoded image together with its EXIF payload.
    pub fn with_exif(image: DynamicImage, exif: Option<Vec<u8>>) -> Self {
        Self { image, exif }
    }

    /// Create a DecodedImage from an image::RgbImage.
    pub fn from_rgb_image(img: RgbImage) -> Self {
        Self::new(DynamicImage::ImageRgb8(img))
    }

    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Layout of the decoded pixels.
    pub fn color_mode(&self) -> ColorMode {
        match self.image {
            DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgb16(_) => ColorMode::Rgb,
            DynamicImage::ImageRgba8(_) | DynamicImage::ImageRgba16(_) => ColorMode::Rgba,
            DynamicImage::ImageLuma8(_) | DynamicImage::ImageLuma16(_) => ColorMode::Luma,
            DynamicImage::ImageLumaA8(_) | DynamicImage::ImageLumaA16(_) => ColorMode::LumaAlpha,
            _ => ColorMode::Other,
        }
    }

    /// Convert to 8-bit RGB, the only layout handed to the JPEG encoder.
    ///
    /// Alpha is discarded rather than composited, matching a plain mode
    /// conversion.
    pub fn to_rgb(&self) -> RgbImage {
        self.image.to_rgb8()
    }

    /// EXIF payload as a slice, if present.
    pub fn exif(&self) -> Option<&[u8]> {
        self.exif.as_deref()
    }

    /// Check if this is an empty/invalid image.
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}
