//! Request boundary: per-endpoint presets, parameter parsing and response
//! metadata.
//!
//! Hosts (the wasm bindings, the CLI) receive raw bytes, a file name and
//! loosely typed form values. This module turns those into compressor
//! options the same way for every host, runs decode, orientation and
//! compression, and describes the result as response metadata.
//!
//! # Examples
//!
//! ```ignore
//! use jpegfit_core::encode::NativeCodec;
//! use jpegfit_core::request::{process_to_size, Endpoint, SizeTargetRequest};
//!
//! let request = SizeTargetRequest::from_form(Endpoint::CompressTo100, Some("80"), Some("premium"))?;
//! let output = process_to_size(&NativeCodec, &bytes, "holiday.png", &request)?;
//! for (name, value) in output.meta.headers() {
//!     println!("{name}: {value}");
//! }
//! ```

use std::ffi::OsStr;
use std::fmt;
use std::num::IntErrorKind;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compress::{
    compress_fixed_quality, compress_to_size, CompressionOptions, Outcome, ProcessingError,
    SizeTarget, Stats,
};
use crate::decode::{decode_image, DecodeError};
use crate::encode::{JpegCodec, OutputFormat};
use crate::transform;

/// Smallest accepted target, in KB.
pub const MIN_TARGET_KB: u32 = 5;

/// Largest accepted target, in KB.
pub const MAX_TARGET_KB: u32 = 1000;

/// Quality used by the fixed-quality endpoint when none is given.
pub const DEFAULT_QUALITY: u8 = 80;

/// Lowest quality the fixed-quality endpoint accepts.
pub const MIN_REQUEST_QUALITY: u8 = 10;

const GENERIC_FAILURE: &str = "An error occurred while processing the image.";

/// Failures reported to the host.
///
/// `Display` carries the full detail for logs; [`RequestError::public_message`]
/// is what a caller should see.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("Processing failed: {0}")]
    Processing(#[from] ProcessingError),

    /// The fixed-quality endpoint was used where a size target is required.
    #[error("Endpoint '{0}' does not take a size target")]
    NotSizeTarget(Endpoint),

    #[error("Unknown endpoint '{0}'")]
    UnknownEndpoint(String),
}

impl RequestError {
    /// Caller-facing message without internal detail.
    pub fn public_message(&self) -> &'static str {
        GENERIC_FAILURE
    }
}

/// The operations a caller can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Endpoint {
    /// Fixed-quality compression.
    Compress,
    ResizeTo20,
    ResizeTo50,
    ResizeTo100,
    CompressTo50,
    CompressTo100,
    CompressTo200,
}

impl Endpoint {
    /// All endpoints, fixed-quality first.
    pub const ALL: [Endpoint; 7] = [
        Endpoint::Compress,
        Endpoint::ResizeTo20,
        Endpoint::ResizeTo50,
        Endpoint::ResizeTo100,
        Endpoint::CompressTo50,
        Endpoint::CompressTo100,
        Endpoint::CompressTo200,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Endpoint::Compress => "compress",
            Endpoint::ResizeTo20 => "resize-to-20",
            Endpoint::ResizeTo50 => "resize-to-50",
            Endpoint::ResizeTo100 => "resize-to-100",
            Endpoint::CompressTo50 => "compress-to-50",
            Endpoint::CompressTo100 => "compress-to-100",
            Endpoint::CompressTo200 => "compress-to-200",
        }
    }

    /// Target used when the supplied value is missing or unparseable.
    ///
    /// `None` for the fixed-quality endpoint.
    pub fn default_target_kb(self) -> Option<u32> {
        match self {
            Endpoint::Compress => None,
            Endpoint::ResizeTo20 => Some(20),
            Endpoint::ResizeTo50 | Endpoint::CompressTo50 => Some(50),
            Endpoint::ResizeTo100 | Endpoint::CompressTo100 => Some(100),
            Endpoint::CompressTo200 => Some(200),
        }
    }

    pub fn is_size_target(self) -> bool {
        self.default_target_kb().is_some()
    }

    /// Whether the endpoint honours a [`QualityMode`].
    pub fn has_quality_modes(self) -> bool {
        self.default_quality_mode().is_some()
    }

    pub fn default_quality_mode(self) -> Option<QualityMode> {
        match self {
            Endpoint::CompressTo50 | Endpoint::CompressTo100 => Some(QualityMode::Balanced),
            Endpoint::CompressTo200 => Some(QualityMode::Premium),
            _ => None,
        }
    }

    /// Probe budget per scale for this endpoint and mode.
    pub fn max_iterations(self, mode: Option<QualityMode>) -> u32 {
        match (self, mode) {
            (Endpoint::CompressTo50, Some(QualityMode::High)) => 15,
            (Endpoint::CompressTo100, Some(QualityMode::Premium)) => 20,
            (Endpoint::CompressTo100, _) => 15,
            (Endpoint::CompressTo200, Some(QualityMode::Premium)) => 25,
            (Endpoint::CompressTo200, _) => 20,
            _ => 10,
        }
    }

    /// File name suffix, before `.jpg`.
    ///
    /// `value` is the quality for [`Endpoint::Compress`] and the clamped
    /// target in KB for the resize endpoints. The compress-to endpoints use
    /// their fixed label.
    pub fn filename_suffix(self, value: u32) -> String {
        match self {
            Endpoint::Compress => format!("compressed_{value}"),
            Endpoint::ResizeTo20 | Endpoint::ResizeTo50 | Endpoint::ResizeTo100 => {
                format!("resized_{value}kb")
            }
            Endpoint::CompressTo50 => "compressed_50kb".to_string(),
            Endpoint::CompressTo100 => "compressed_100kb".to_string(),
            Endpoint::CompressTo200 => "compressed_200kb".to_string(),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Endpoint {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Endpoint::ALL
            .into_iter()
            .find(|endpoint| endpoint.as_str() == wanted)
            .ok_or_else(|| RequestError::UnknownEndpoint(s.to_string()))
    }
}

/// Quality preference for the compress-to endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityMode {
    High,
    Balanced,
    Premium,
    Maximum,
}

impl QualityMode {
    pub fn as_str(self) -> &'static str {
        match self {
            QualityMode::High => "high",
            QualityMode::Balanced => "balanced",
            QualityMode::Premium => "premium",
            QualityMode::Maximum => "maximum",
        }
    }
}

impl fmt::Display for QualityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QualityMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(QualityMode::High),
            "balanced" => Ok(QualityMode::Balanced),
            "premium" => Ok(QualityMode::Premium),
            "maximum" => Ok(QualityMode::Maximum),
            _ => Err(()),
        }
    }
}

/// Parse a target in KB, substituting `default_kb` when absent or invalid
/// and clamping into `[MIN_TARGET_KB, MAX_TARGET_KB]`.
pub fn parse_target_kb(raw: Option<&str>, default_kb: u32) -> u32 {
    parse_clamped(
        raw,
        i64::from(default_kb),
        i64::from(MIN_TARGET_KB),
        i64::from(MAX_TARGET_KB),
    ) as u32
}

/// Parse a fixed-quality value: default 80, clamped into `[10, 100]`.
pub fn parse_quality(raw: Option<&str>) -> u8 {
    parse_clamped(
        raw,
        i64::from(DEFAULT_QUALITY),
        i64::from(MIN_REQUEST_QUALITY),
        100,
    ) as u8
}

/// Integers too long for `i64` still clamp to the nearest bound; anything
/// that is not an integer takes the default.
fn parse_clamped(raw: Option<&str>, default: i64, min: i64, max: i64) -> i64 {
    let parsed = match raw.map(|value| value.trim().parse::<i64>()) {
        Some(Ok(value)) => value,
        Some(Err(err)) => match err.kind() {
            IntErrorKind::PosOverflow => max,
            IntErrorKind::NegOverflow => min,
            _ => default,
        },
        None => default,
    };
    parsed.clamp(min, max)
}

/// File name without its last extension; `"image"` when nothing remains.
pub fn base_name(file_name: &str) -> &str {
    Path::new(file_name)
        .file_stem()
        .and_then(OsStr::to_str)
        .filter(|stem| !stem.is_empty())
        .unwrap_or("image")
}

/// `{base}_{suffix}.jpg` for a response attachment.
pub fn output_filename(file_name: &str, endpoint: Endpoint, value: u32) -> String {
    format!("{}_{}.jpg", base_name(file_name), endpoint.filename_suffix(value))
}

/// Settings for the fixed-quality endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FixedQualityRequest {
    pub quality: u8,
    pub preserve_exif: bool,
    pub auto_rotate: bool,
}

impl Default for FixedQualityRequest {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            preserve_exif: false,
            auto_rotate: false,
        }
    }
}

impl FixedQualityRequest {
    /// Request at `quality`, clamped into `[10, 100]`.
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(MIN_REQUEST_QUALITY, 100),
            ..Self::default()
        }
    }

    pub fn with_preserve_exif(mut self, preserve_exif: bool) -> Self {
        self.preserve_exif = preserve_exif;
        self
    }

    pub fn with_auto_rotate(mut self, auto_rotate: bool) -> Self {
        self.auto_rotate = auto_rotate;
        self
    }
}

/// Settings for a size-target endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeTargetRequest {
    pub endpoint: Endpoint,
    /// Clamped target in KB.
    pub target_kb: u32,
    /// Present only for endpoints with quality modes.
    pub quality_mode: Option<QualityMode>,
    pub preserve_exif: bool,
    pub auto_rotate: bool,
}

impl SizeTargetRequest {
    /// Endpoint defaults: default target and mode, auto-rotate on, EXIF off.
    pub fn new(endpoint: Endpoint) -> Result<Self, RequestError> {
        let target_kb = endpoint
            .default_target_kb()
            .ok_or(RequestError::NotSizeTarget(endpoint))?;

        Ok(Self {
            endpoint,
            target_kb,
            quality_mode: endpoint.default_quality_mode(),
            preserve_exif: false,
            auto_rotate: true,
        })
    }

    /// Build from raw form values, applying parse fallbacks and clamping.
    ///
    /// Unknown quality modes fall back to the endpoint default; modes are
    /// dropped for endpoints that don't use them.
    pub fn from_form(
        endpoint: Endpoint,
        target_kb: Option<&str>,
        quality_mode: Option<&str>,
    ) -> Result<Self, RequestError> {
        let mut request = Self::new(endpoint)?;
        request.target_kb = parse_target_kb(target_kb, request.target_kb);
        if endpoint.has_quality_modes() {
            if let Some(mode) = quality_mode.and_then(|raw| raw.parse().ok()) {
                request.quality_mode = Some(mode);
            }
        }
        Ok(request)
    }

    pub fn with_preserve_exif(mut self, preserve_exif: bool) -> Self {
        self.preserve_exif = preserve_exif;
        self
    }

    pub fn with_auto_rotate(mut self, auto_rotate: bool) -> Self {
        self.auto_rotate = auto_rotate;
        self
    }

    pub fn max_iterations(&self) -> u32 {
        self.endpoint.max_iterations(self.quality_mode)
    }

    pub fn target(&self) -> SizeTarget {
        SizeTarget::from_kb(self.target_kb)
    }

    fn options(&self) -> CompressionOptions {
        CompressionOptions::new()
            .with_preserve_exif(self.preserve_exif)
            .with_auto_rotate(self.auto_rotate)
            .with_max_iterations(self.max_iterations())
    }
}

/// Metadata a host surfaces next to the encoded bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMeta {
    pub original_size: u64,
    pub compressed_size: u64,
    /// Target in bytes, size-target endpoints only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_size: Option<u64>,
    pub quality_used: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_mode: Option<QualityMode>,
    pub filename: String,
    pub content_type: &'static str,
}

impl ResponseMeta {
    /// HTTP-style response headers.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![
            ("Content-Type", self.content_type.to_string()),
            (
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", self.filename),
            ),
            ("Content-Length", self.compressed_size.to_string()),
            ("X-Original-Size", self.original_size.to_string()),
            ("X-Compressed-Size", self.compressed_size.to_string()),
        ];
        if let Some(target) = self.target_size {
            headers.push(("X-Target-Size", target.to_string()));
            headers.push(("X-Quality-Used", self.quality_used.to_string()));
        }
        if let Some(mode) = self.quality_mode {
            headers.push(("X-Quality-Mode", mode.to_string()));
        }
        headers
    }
}

/// A finished request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressedOutput {
    pub bytes: Vec<u8>,
    pub stats: Stats,
    pub outcome: Outcome,
    pub meta: ResponseMeta,
}

/// Decode, optionally orient, and compress at a fixed quality.
pub fn process_fixed_quality(
    codec: &impl JpegCodec,
    bytes: &[u8],
    file_name: &str,
    request: &FixedQualityRequest,
) -> Result<CompressedOutput, RequestError> {
    let run = || -> Result<CompressedOutput, RequestError> {
        let image = prepare(bytes, request.auto_rotate)?;
        let options = CompressionOptions::new()
            .with_quality(request.quality)
            .with_preserve_exif(request.preserve_exif)
            .with_auto_rotate(request.auto_rotate);
        let result = compress_fixed_quality(codec, &image, &options)?;

        let meta = ResponseMeta {
            original_size: bytes.len() as u64,
            compressed_size: result.stats.compressed_size,
            target_size: None,
            quality_used: result.stats.quality,
            quality_mode: None,
            filename: output_filename(file_name, Endpoint::Compress, u32::from(request.quality)),
            content_type: OutputFormat::Jpeg.mime_type(),
        };
        Ok(CompressedOutput {
            bytes: result.bytes,
            stats: result.stats,
            outcome: result.outcome,
            meta,
        })
    };

    run().inspect_err(|err| tracing::error!(error = %err, file = file_name, "Compression error"))
}

/// Decode, optionally orient, and compress towards the request's target.
pub fn process_to_size(
    codec: &impl JpegCodec,
    bytes: &[u8],
    file_name: &str,
    request: &SizeTargetRequest,
) -> Result<CompressedOutput, RequestError> {
    tracing::info!(
        endpoint = %request.endpoint,
        target_kb = request.target_kb,
        quality_mode = request.quality_mode.map(QualityMode::as_str),
        "Processing image with target size"
    );

    let run = || -> Result<CompressedOutput, RequestError> {
        let image = prepare(bytes, request.auto_rotate)?;
        let target = request.target();
        let result = compress_to_size(codec, &image, target, &request.options())?;

        let meta = ResponseMeta {
            original_size: bytes.len() as u64,
            compressed_size: result.stats.compressed_size,
            target_size: Some(target.bytes()),
            quality_used: result.stats.quality,
            quality_mode: request.quality_mode,
            filename: output_filename(file_name, request.endpoint, request.target_kb),
            content_type: OutputFormat::Jpeg.mime_type(),
        };
        Ok(CompressedOutput {
            bytes: result.bytes,
            stats: result.stats,
            outcome: result.outcome,
            meta,
        })
    };

    let output = run()
        .inspect_err(|err| tracing::error!(error = %err, file = file_name, "KB compression error"))?;
    tracing::info!(
        filename = %output.meta.filename,
        bytes = output.meta.compressed_size,
        "Successfully processed image"
    );
    Ok(output)
}

fn prepare(bytes: &[u8], auto_rotate: bool) -> Result<crate::decode::DecodedImage, RequestError> {
    let image = decode_image(bytes)?;
    tracing::debug!(
        width = image.width(),
        height = image.height(),
        color_mode = ?image.color_mode(),
        has_exif = image.exif().is_some(),
        "Decoded upload"
    );
    Ok(if auto_rotate {
        transform::normalize(image)
    } else {
        image
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::NativeCodec;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x * 5 % 256) as u8, (y * 3 % 256) as u8, 100])
        });
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buffer, ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_parse_target_kb() {
        assert_eq!(parse_target_kb(Some("50"), 20), 50);
        assert_eq!(parse_target_kb(Some(" 75 "), 20), 75);
        assert_eq!(parse_target_kb(Some("abc"), 20), 20);
        assert_eq!(parse_target_kb(None, 200), 200);
        assert_eq!(parse_target_kb(Some("1"), 20), 5);
        assert_eq!(parse_target_kb(Some("-40"), 20), 5);
        assert_eq!(parse_target_kb(Some("5000"), 20), 1000);
        assert_eq!(parse_target_kb(Some("12.5"), 50), 50);
    }

    #[test]
    fn test_parse_overlong_integers_clamp() {
        assert_eq!(parse_target_kb(Some("99999999999999999999"), 50), 1000);
        assert_eq!(parse_target_kb(Some("-99999999999999999999"), 50), 5);
        assert_eq!(parse_quality(Some("123456789012345678901234")), 100);
        assert_eq!(parse_quality(Some("-123456789012345678901234")), 10);
    }

    #[test]
    fn test_parse_quality() {
        assert_eq!(parse_quality(None), 80);
        assert_eq!(parse_quality(Some("55")), 55);
        assert_eq!(parse_quality(Some("3")), 10);
        assert_eq!(parse_quality(Some("250")), 100);
        assert_eq!(parse_quality(Some("high")), 80);
    }

    #[test]
    fn test_endpoint_defaults() {
        assert_eq!(Endpoint::Compress.default_target_kb(), None);
        assert_eq!(Endpoint::ResizeTo20.default_target_kb(), Some(20));
        assert_eq!(Endpoint::ResizeTo50.default_target_kb(), Some(50));
        assert_eq!(Endpoint::ResizeTo100.default_target_kb(), Some(100));
        assert_eq!(Endpoint::CompressTo50.default_target_kb(), Some(50));
        assert_eq!(Endpoint::CompressTo100.default_target_kb(), Some(100));
        assert_eq!(Endpoint::CompressTo200.default_target_kb(), Some(200));
    }

    #[test]
    fn test_max_iterations_by_mode() {
        use QualityMode::*;
        assert_eq!(Endpoint::ResizeTo20.max_iterations(None), 10);
        assert_eq!(Endpoint::CompressTo50.max_iterations(Some(High)), 15);
        assert_eq!(Endpoint::CompressTo50.max_iterations(Some(Balanced)), 10);
        assert_eq!(Endpoint::CompressTo100.max_iterations(Some(Premium)), 20);
        assert_eq!(Endpoint::CompressTo100.max_iterations(Some(Maximum)), 15);
        assert_eq!(Endpoint::CompressTo200.max_iterations(Some(Premium)), 25);
        assert_eq!(Endpoint::CompressTo200.max_iterations(Some(High)), 20);
    }

    #[test]
    fn test_endpoint_from_str() {
        assert_eq!("compress".parse::<Endpoint>().unwrap(), Endpoint::Compress);
        assert_eq!("resize_to_20".parse::<Endpoint>().unwrap(), Endpoint::ResizeTo20);
        assert_eq!("Compress-To-200".parse::<Endpoint>().unwrap(), Endpoint::CompressTo200);
        assert!(matches!(
            "resize-to-30".parse::<Endpoint>(),
            Err(RequestError::UnknownEndpoint(_))
        ));
    }

    #[test]
    fn test_size_request_from_form() {
        let request = SizeTargetRequest::from_form(Endpoint::CompressTo100, Some("2000"), Some("PREMIUM")).unwrap();
        assert_eq!(request.target_kb, 1000);
        assert_eq!(request.quality_mode, Some(QualityMode::Premium));
        assert_eq!(request.max_iterations(), 20);
        assert!(request.auto_rotate);
        assert!(!request.preserve_exif);

        let request = SizeTargetRequest::from_form(Endpoint::CompressTo200, None, Some("bogus")).unwrap();
        assert_eq!(request.target_kb, 200);
        assert_eq!(request.quality_mode, Some(QualityMode::Premium));

        let request = SizeTargetRequest::from_form(Endpoint::ResizeTo50, Some("x"), Some("high")).unwrap();
        assert_eq!(request.target_kb, 50);
        assert_eq!(request.quality_mode, None);
    }

    #[test]
    fn test_size_request_rejects_compress() {
        let result = SizeTargetRequest::new(Endpoint::Compress);
        assert!(matches!(result, Err(RequestError::NotSizeTarget(Endpoint::Compress))));
    }

    #[test]
    fn test_output_filename() {
        assert_eq!(output_filename("photo.png", Endpoint::Compress, 80), "photo_compressed_80.jpg");
        assert_eq!(output_filename("a.b.webp", Endpoint::ResizeTo20, 35), "a.b_resized_35kb.jpg");
        assert_eq!(output_filename("scan", Endpoint::CompressTo50, 7), "scan_compressed_50kb.jpg");
        assert_eq!(output_filename("", Endpoint::CompressTo200, 200), "image_compressed_200kb.jpg");
        assert_eq!(base_name(".hidden"), ".hidden");
    }

    #[test]
    fn test_headers_for_size_target() {
        let meta = ResponseMeta {
            original_size: 1000,
            compressed_size: 400,
            target_size: Some(51_200),
            quality_used: 74,
            quality_mode: Some(QualityMode::Balanced),
            filename: "x_compressed_50kb.jpg".to_string(),
            content_type: "image/jpeg",
        };
        let headers = meta.headers();
        let get = |name: &str| {
            headers
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.as_str())
        };

        assert_eq!(get("Content-Type"), Some("image/jpeg"));
        assert_eq!(
            get("Content-Disposition"),
            Some("attachment; filename=\"x_compressed_50kb.jpg\"")
        );
        assert_eq!(get("X-Original-Size"), Some("1000"));
        assert_eq!(get("X-Compressed-Size"), Some("400"));
        assert_eq!(get("X-Target-Size"), Some("51200"));
        assert_eq!(get("X-Quality-Used"), Some("74"));
        assert_eq!(get("X-Quality-Mode"), Some("balanced"));
    }

    #[test]
    fn test_headers_for_fixed_quality() {
        let meta = ResponseMeta {
            original_size: 10,
            compressed_size: 5,
            target_size: None,
            quality_used: 80,
            quality_mode: None,
            filename: "a_compressed_80.jpg".to_string(),
            content_type: "image/jpeg",
        };
        let names: Vec<&str> = meta.headers().iter().map(|(name, _)| *name).collect();
        assert!(!names.contains(&"X-Target-Size"));
        assert!(!names.contains(&"X-Quality-Mode"));
        assert!(names.contains(&"X-Compressed-Size"));
    }

    #[test]
    fn test_process_fixed_quality() {
        let bytes = png_bytes(64, 48);
        let output = process_fixed_quality(&NativeCodec, &bytes, "pic.png", &FixedQualityRequest::new(60)).unwrap();

        assert_eq!(output.meta.filename, "pic_compressed_60.jpg");
        assert_eq!(output.meta.original_size, bytes.len() as u64);
        assert_eq!(output.meta.compressed_size, output.bytes.len() as u64);
        assert_eq!(output.meta.quality_used, 60);
        assert_eq!(&output.bytes[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_process_to_size() {
        let bytes = png_bytes(64, 48);
        let request = SizeTargetRequest::from_form(Endpoint::ResizeTo20, Some("7"), None).unwrap();
        let output = process_to_size(&NativeCodec, &bytes, "pic.png", &request).unwrap();

        assert_eq!(output.meta.filename, "pic_resized_7kb.jpg");
        assert_eq!(output.meta.target_size, Some(7 * 1024));
        assert_eq!(output.meta.quality_used, output.stats.quality);
        assert!((10..=95).contains(&output.stats.quality));
    }

    #[test]
    fn test_process_rejects_garbage() {
        let err = process_to_size(
            &NativeCodec,
            b"definitely not an image",
            "x.png",
            &SizeTargetRequest::new(Endpoint::ResizeTo50).unwrap(),
        )
        .unwrap_err();

        assert!(matches!(err, RequestError::Decode(DecodeError::UnsupportedFormat)));
        assert_eq!(err.public_message(), "An error occurred while processing the image.");
    }
}
