//! JPEG encoding primitive for jpegfit.
//!
//! This module provides functionality for:
//! - Encoding RGB images to JPEG at a given quality and scale factor
//! - Embedding a raw EXIF payload into the output stream
//!
//! # Architecture
//!
//! Every compressor probe goes through [`encode`], which resamples a working
//! copy and hands it to a [`JpegCodec`]. Compressors are generic over the
//! codec, so search behaviour can be exercised against a synthetic codec.
//!
//! # Examples
//!
//! ```ignore
//! use jpegfit_core::encode::{encode, JpegSaveParams, NativeCodec};
//!
//! let image = image::RgbImage::from_pixel(100, 100, image::Rgb([128, 128, 128]));
//! let encoded = encode(&NativeCodec, &image, 0.5, &JpegSaveParams::new(85)).unwrap();
//! println!("Encoded {}x{} into {} bytes", encoded.width, encoded.height, encoded.bytes.len());
//! ```

mod jpeg;

pub use jpeg::{
    encode, encode_jpeg, EncodeError, Encoded, JpegCodec, JpegSaveParams, NativeCodec,
    OutputFormat, MAX_JPEG_DIMENSION,
};
