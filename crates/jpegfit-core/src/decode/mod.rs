//! Image decoding boundary for jpegfit.
//!
//! This module provides functionality for:
//! - Decoding any compiled-in raster format (JPEG, PNG, WebP, GIF, BMP)
//! - Extracting the raw EXIF payload from the container
//! - Proportional Lanczos3 resampling shared by both compressors
//!
//! Decoding is the only place where untrusted bytes are parsed. Everything
//! downstream receives a well-formed [`DecodedImage`].
//!
//! # Examples
//!
//! ```ignore
//! use jpegfit_core::decode::decode_image;
//!
//! let bytes = std::fs::read("photo.png").unwrap();
//! let image = decode_image(&bytes).unwrap();
//! println!("Decoded {}x{} {:?}", image.width(), image.height(), image.color_mode());
//! ```

mod raster;
pub mod resize;
mod types;

pub use raster::{decode_image, extract_exif};
pub use types::{ColorMode, DecodeError, DecodedImage};
