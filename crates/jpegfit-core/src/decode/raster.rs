//! Raster decoding with EXIF extraction.

use std::io::Cursor;

use image::{ImageError, ImageReader};
use img_parts::{Bytes, DynImage, ImageEXIF};

use super::{DecodeError, DecodedImage};

/// Decode an image of any compiled-in format from bytes.
///
/// The format is guessed from the magic bytes, never from a file name or a
/// declared content type. Orientation metadata is **not** applied here; the
/// EXIF payload is carried on the returned image so the caller can decide
/// whether to normalize it.
///
/// # Errors
///
/// Returns `DecodeError::Empty` for an empty buffer,
/// `DecodeError::UnsupportedFormat` if no decoder recognizes the bytes, and
/// `DecodeError::CorruptedFile` if decoding starts but fails.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::UnsupportedFormat);
    }

    let img = reader.decode().map_err(|e| match e {
        ImageError::Unsupported(_) => DecodeError::UnsupportedFormat,
        other => DecodeError::CorruptedFile(other.to_string()),
    })?;

    Ok(DecodedImage::with_exif(img, extract_exif(bytes)))
}

/// Pull the raw EXIF payload out of a JPEG, PNG or WebP container.
///
/// Returns `None` when the container has no EXIF, or when the container
/// itself cannot be parsed. Pixel decoding is unaffected either way.
pub fn extract_exif(bytes: &[u8]) -> Option<Vec<u8>> {
    let container = DynImage::from_bytes(Bytes::copy_from_slice(bytes)).ok()??;
    container
        .exif()
        .filter(|exif| !exif.is_empty())
        .map(|exif| exif.to_vec())
}
