//! Pixel transforms applied before compression.
//!
//! Currently this is orientation normalization only: rotating pixels upright
//! from the EXIF `Orientation` tag.
//!
//! # Coordinate System
//!
//! - Rotation angles are in degrees, positive = counter-clockwise
//! - Origin is top-left corner

mod orientation;

pub use orientation::{normalize, read_orientation, reset_orientation, MetadataError, Rotation};

#[cfg(test)]
pub(crate) use orientation::tiff_with_orientation;
