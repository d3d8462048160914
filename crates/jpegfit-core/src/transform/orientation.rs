//! EXIF orientation normalization.
//!
//! Reads the `Orientation` tag from the primary IFD of an EXIF payload and
//! rotates the pixels so they are stored upright.
//!
//! Only the pure rotations are honoured:
//!
//! ```text
//! tag 3 -> 180° counter-clockwise
//! tag 6 -> 270° counter-clockwise (90° clockwise)
//! tag 8 ->  90° counter-clockwise (270° clockwise)
//! ```
//!
//! Mirrored orientations (2, 4, 5, 7) and out-of-range values are left
//! untouched. Quarter turns swap width and height; the canvas always grows
//! to the rotated bounds, nothing is cropped.
//!
//! After a rotation the EXIF payload is kept with its orientation entry
//! rewritten to 1, so every other tag survives a later re-embed.

use exif::{In, Reader, Tag};
use image::DynamicImage;
use thiserror::Error;

use crate::decode::DecodedImage;

/// Errors reading the orientation tag.
///
/// These never leave [`normalize`]; they are logged and the image is passed
/// through unchanged.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The EXIF payload could not be parsed as TIFF.
    #[error("Unreadable EXIF metadata: {0}")]
    Unreadable(String),

    /// The tag exists but does not hold an unsigned integer.
    #[error("Orientation tag has a non-integer value")]
    InvalidValue,
}

/// Lossless rotation derived from an orientation tag.
///
/// Angles are counter-clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    None,
    Ccw90,
    Ccw180,
    Ccw270,
}

impl Rotation {
    /// Map an EXIF orientation value to a rotation.
    pub fn from_orientation(value: u32) -> Self {
        match value {
            3 => Rotation::Ccw180,
            6 => Rotation::Ccw270,
            8 => Rotation::Ccw90,
            _ => Rotation::None,
        }
    }

    /// Counter-clockwise angle in degrees.
    pub fn degrees(self) -> u16 {
        match self {
            Rotation::None => 0,
            Rotation::Ccw90 => 90,
            Rotation::Ccw180 => 180,
            Rotation::Ccw270 => 270,
        }
    }

    /// Rotate `image`, returning `None` when no transform applies.
    pub fn apply(self, image: &DynamicImage) -> Option<DynamicImage> {
        // image's quarter-turn helpers rotate clockwise.
        match self {
            Rotation::None => None,
            Rotation::Ccw90 => Some(image.rotate270()),
            Rotation::Ccw180 => Some(image.rotate180()),
            Rotation::Ccw270 => Some(image.rotate90()),
        }
    }
}

/// Read the orientation value from a raw EXIF (TIFF) payload.
///
/// Returns `Ok(None)` when the payload parses but has no orientation tag.
pub fn read_orientation(exif: &[u8]) -> Result<Option<u32>, MetadataError> {
    let parsed = Reader::new()
        .read_raw(exif.to_vec())
        .map_err(|e| MetadataError::Unreadable(e.to_string()))?;

    let Some(field) = parsed.get_field(Tag::Orientation, In::PRIMARY) else {
        return Ok(None);
    };

    field
        .value
        .get_uint(0)
        .map(Some)
        .ok_or(MetadataError::InvalidValue)
}

const ORIENTATION_TAG: u16 = 0x0112;
const TYPE_SHORT: u16 = 3;
const TYPE_LONG: u16 = 4;
const IFD_ENTRY_LEN: usize = 12;

/// TIFF byte order, from the `II` / `MM` header mark.
#[derive(Debug, Clone, Copy)]
enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    fn read_u16(self, buf: &[u8], at: usize) -> Option<u16> {
        let bytes: [u8; 2] = buf.get(at..at.checked_add(2)?)?.try_into().ok()?;
        Some(match self {
            ByteOrder::Little => u16::from_le_bytes(bytes),
            ByteOrder::Big => u16::from_be_bytes(bytes),
        })
    }

    fn read_u32(self, buf: &[u8], at: usize) -> Option<u32> {
        let bytes: [u8; 4] = buf.get(at..at.checked_add(4)?)?.try_into().ok()?;
        Some(match self {
            ByteOrder::Little => u32::from_le_bytes(bytes),
            ByteOrder::Big => u32::from_be_bytes(bytes),
        })
    }

    fn u16_bytes(self, value: u16) -> [u8; 2] {
        match self {
            ByteOrder::Little => value.to_le_bytes(),
            ByteOrder::Big => value.to_be_bytes(),
        }
    }

    fn u32_bytes(self, value: u32) -> [u8; 4] {
        match self {
            ByteOrder::Little => value.to_le_bytes(),
            ByteOrder::Big => value.to_be_bytes(),
        }
    }
}

fn truncated() -> MetadataError {
    MetadataError::Unreadable("truncated primary IFD".to_string())
}

/// Rewrite the primary IFD's orientation value to 1 (upright), in place.
///
/// Only the value bytes of the orientation entry change; every other tag,
/// offset and maker note stays byte for byte the same. Returns `Ok(false)`
/// when the primary IFD has no orientation entry.
pub fn reset_orientation(exif: &mut [u8]) -> Result<bool, MetadataError> {
    let order = match exif.get(0..2) {
        Some(b"II") => ByteOrder::Little,
        Some(b"MM") => ByteOrder::Big,
        _ => {
            return Err(MetadataError::Unreadable(
                "missing TIFF byte order mark".to_string(),
            ))
        }
    };

    let ifd = order.read_u32(exif, 4).ok_or_else(truncated)? as usize;
    let entries = order.read_u16(exif, ifd).ok_or_else(truncated)?;

    for index in 0..usize::from(entries) {
        let entry = ifd
            .checked_add(2 + index * IFD_ENTRY_LEN)
            .ok_or_else(truncated)?;
        if order.read_u16(exif, entry).ok_or_else(truncated)? != ORIENTATION_TAG {
            continue;
        }

        let field_type = order.read_u16(exif, entry + 2).ok_or_else(truncated)?;
        let count = order.read_u32(exif, entry + 4).ok_or_else(truncated)?;
        if count != 1 {
            return Err(MetadataError::InvalidValue);
        }

        // Single values sit left-justified in the entry's 4-byte value slot.
        let value = entry + 8;
        match field_type {
            TYPE_SHORT => exif
                .get_mut(value..value + 2)
                .ok_or_else(truncated)?
                .copy_from_slice(&order.u16_bytes(1)),
            TYPE_LONG => exif
                .get_mut(value..value + 4)
                .ok_or_else(truncated)?
                .copy_from_slice(&order.u32_bytes(1)),
            _ => return Err(MetadataError::InvalidValue),
        }
        return Ok(true);
    }

    Ok(false)
}

/// Rotate a decoded image upright according to its EXIF orientation.
///
/// Images without EXIF, without an orientation tag, or with a tag that maps
/// to no rotation come back as they went in. Malformed metadata is logged at
/// `warn` and also passes through unchanged.
///
/// When a rotation is applied the EXIF payload is kept with its orientation
/// reset to 1, so a later re-embed cannot rotate the already-upright pixels
/// a second time. If the entry cannot be rewritten the payload is dropped.
pub fn normalize(image: DecodedImage) -> DecodedImage {
    let Some(exif) = image.exif() else {
        return image;
    };

    let value = match read_orientation(exif) {
        Ok(Some(value)) => value,
        Ok(None) => return image,
        Err(err) => {
            tracing::warn!(error = %err, "Could not read orientation; leaving image as is");
            return image;
        }
    };

    let rotation = Rotation::from_orientation(value);
    match rotation.apply(&image.image) {
        Some(rotated) => {
            tracing::debug!(
                orientation = value,
                degrees = rotation.degrees(),
                "Applied orientation"
            );
            let exif = image.exif.and_then(upright_exif);
            DecodedImage::with_exif(rotated, exif)
        }
        None => image,
    }
}

fn upright_exif(mut blob: Vec<u8>) -> Option<Vec<u8>> {
    match reset_orientation(&mut blob) {
        Ok(true) => Some(blob),
        Ok(false) => {
            tracing::warn!("Orientation entry not found in primary IFD; dropping EXIF");
            None
        }
        Err(err) => {
            tracing::warn!(error = %err, "Could not reset orientation; dropping EXIF");
            None
        }
    }
}

#[cfg(test)]
pub(crate) fn tiff_with_orientation(value: u16) -> Vec<u8> {
    let mut blob = Vec::with_capacity(26);
    blob.extend_from_slice(b"II*\0");
    blob.extend_from_slice(&8u32.to_le_bytes());
    // One IFD entry: Orientation, SHORT, count 1
    blob.extend_from_slice(&1u16.to_le_bytes());
    blob.extend_from_slice(&0x0112u16.to_le_bytes());
    blob.extend_from_slice(&3u16.to_le_bytes());
    blob.extend_from_slice(&1u32.to_le_bytes());
    blob.extend_from_slice(&value.to_le_bytes());
    blob.extend_from_slice(&[0, 0]);
    // No next IFD
    blob.extend_from_slice(&0u32.to_le_bytes());
    blob
}
