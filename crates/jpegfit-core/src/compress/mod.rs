//! The two compressors.
//!
//! - [`compress_fixed_quality`]: one encode at a caller-chosen quality,
//!   after fitting the image within a maximum dimension
//! - [`compress_to_size`]: a bounded search over (scale, quality) aiming at
//!   a byte budget, with tight and relaxed acceptance bands
//!
//! Both are generic over [`JpegCodec`](crate::encode::JpegCodec) and never
//! mutate the caller's image.
//!
//! # Examples
//!
//! ```ignore
//! use jpegfit_core::compress::{compress_to_size, CompressionOptions, SizeTarget};
//! use jpegfit_core::encode::NativeCodec;
//!
//! let result = compress_to_size(
//!     &NativeCodec,
//!     &image,
//!     SizeTarget::from_kb(50),
//!     &CompressionOptions::default(),
//! )?;
//! println!("{} bytes at q{}", result.stats.compressed_size, result.stats.quality);
//! ```

mod fixed;
mod target;
mod types;

pub use fixed::compress_fixed_quality;
pub use target::{compress_to_size, compress_to_size_traced};
pub use types::{
    CompressionOptions, EncodeResult, Outcome, Probe, ProcessingError, SearchTrace, SizeTarget,
    Stats, MAX_QUALITY, MIN_QUALITY, RELAXED_TOLERANCE, SCALE_LADDER, TIGHT_TOLERANCE,
};
