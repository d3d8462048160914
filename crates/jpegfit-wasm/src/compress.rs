//! Compression WASM bindings.
//!
//! This module exposes the two jpegfit operation modes to JavaScript. Inputs
//! arrive as raw upload bytes plus loosely typed form values; parsing,
//! clamping and per-endpoint defaults are applied exactly as the core
//! request layer defines them.
//!
//! # Functions
//!
//! - [`compress_fixed_quality`] - Re-encode at a chosen quality
//! - [`compress_to_size`] - Search for an output near a KB target
//!
//! # Example
//!
//! ```typescript
//! import { compress_to_size } from '@jpegfit/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const result = compress_to_size(bytes, file.name, 'compress-to-100', '100', 'premium');
//! const blob = new Blob([result.bytes()], { type: result.contentType });
//! ```
//!
//! Failures are logged in full to the browser console; the thrown value only
//! carries the generic public message.

use jpegfit_core::request::{
    self, parse_quality, CompressedOutput, Endpoint, FixedQualityRequest, RequestError,
    SizeTargetRequest,
};
use jpegfit_core::NativeCodec;
use wasm_bindgen::prelude::*;

use crate::types::JsCompressed;

/// Re-encode an uploaded image once at a fixed quality.
///
/// # Arguments
///
/// * `bytes` - Raw upload bytes (any supported raster format)
/// * `file_name` - Original file name, used for the output name
/// * `quality` - Quality as typed by the user; default 80, clamped to 10-100
/// * `preserve_exif` - Carry EXIF into the output (default false)
/// * `auto_rotate` - Apply the EXIF orientation first (default false)
#[wasm_bindgen]
pub fn compress_fixed_quality(
    bytes: &[u8],
    file_name: &str,
    quality: Option<String>,
    preserve_exif: Option<bool>,
    auto_rotate: Option<bool>,
) -> Result<JsCompressed, JsValue> {
    run_fixed_quality(bytes, file_name, quality.as_deref(), preserve_exif, auto_rotate)
        .map(JsCompressed::from)
        .map_err(to_js_error)
}

/// Compress an uploaded image towards a size target.
///
/// # Arguments
///
/// * `bytes` - Raw upload bytes (any supported raster format)
/// * `file_name` - Original file name, used for the output name
/// * `endpoint` - One of `resize-to-20`, `resize-to-50`, `resize-to-100`,
///   `compress-to-50`, `compress-to-100`, `compress-to-200`
/// * `target_kb` - Target as typed by the user; invalid values use the
///   endpoint default, valid ones are clamped to 5-1000
/// * `quality_mode` - `high`, `balanced`, `premium` or `maximum`
///   (compress-to endpoints only)
/// * `preserve_exif` - Carry EXIF into the output (default false)
/// * `auto_rotate` - Apply the EXIF orientation first (default true)
#[wasm_bindgen]
pub fn compress_to_size(
    bytes: &[u8],
    file_name: &str,
    endpoint: &str,
    target_kb: Option<String>,
    quality_mode: Option<String>,
    preserve_exif: Option<bool>,
    auto_rotate: Option<bool>,
) -> Result<JsCompressed, JsValue> {
    run_to_size(
        bytes,
        file_name,
        endpoint,
        target_kb.as_deref(),
        quality_mode.as_deref(),
        preserve_exif,
        auto_rotate,
    )
    .map(JsCompressed::from)
    .map_err(to_js_error)
}

fn run_fixed_quality(
    bytes: &[u8],
    file_name: &str,
    quality: Option<&str>,
    preserve_exif: Option<bool>,
    auto_rotate: Option<bool>,
) -> Result<CompressedOutput, RequestError> {
    let defaults = FixedQualityRequest::default();
    let request = FixedQualityRequest::new(parse_quality(quality))
        .with_preserve_exif(preserve_exif.unwrap_or(defaults.preserve_exif))
        .with_auto_rotate(auto_rotate.unwrap_or(defaults.auto_rotate));

    request::process_fixed_quality(&NativeCodec, bytes, file_name, &request)
}

fn run_to_size(
    bytes: &[u8],
    file_name: &str,
    endpoint: &str,
    target_kb: Option<&str>,
    quality_mode: Option<&str>,
    preserve_exif: Option<bool>,
    auto_rotate: Option<bool>,
) -> Result<CompressedOutput, RequestError> {
    let endpoint: Endpoint = endpoint.parse()?;
    let mut request = SizeTargetRequest::from_form(endpoint, target_kb, quality_mode)?;
    if let Some(preserve_exif) = preserve_exif {
        request = request.with_preserve_exif(preserve_exif);
    }
    if let Some(auto_rotate) = auto_rotate {
        request = request.with_auto_rotate(auto_rotate);
    }

    request::process_to_size(&NativeCodec, bytes, file_name, &request)
}

fn to_js_error(err: RequestError) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::error_1(&JsValue::from_str(&format!("jpegfit: {err}")));

    JsValue::from_str(err.public_message())
}
