//! jpegfit core - size-targeting JPEG recompression
//!
//! This crate provides the JPEG recompression engine behind jpegfit:
//! decoding, orientation normalization, a single-shot encode primitive,
//! fixed-quality compression, and the (scale, quality) search that lands an
//! output within a tolerance of a byte budget.
//!
//! Everything is synchronous and owns no shared state; concurrent callers
//! each work on their own image. Logging goes through `tracing`, and the
//! host decides where events end up.

pub mod compress;
pub mod decode;
pub mod encode;
pub mod request;
pub mod transform;

pub use compress::{
    compress_fixed_quality, compress_to_size, compress_to_size_traced, CompressionOptions,
    EncodeResult, Outcome, Probe, ProcessingError, SearchTrace, SizeTarget, Stats,
};
pub use decode::{decode_image, DecodeError, DecodedImage};
pub use encode::{encode, EncodeError, JpegCodec, JpegSaveParams, NativeCodec};
pub use request::{
    process_fixed_quality, process_to_size, CompressedOutput, Endpoint, FixedQualityRequest,
    QualityMode, RequestError, ResponseMeta, SizeTargetRequest,
};
pub use transform::{normalize, reset_orientation, MetadataError, Rotation};
