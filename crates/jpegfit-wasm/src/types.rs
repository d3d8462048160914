//! WASM-compatible wrapper types for compression results.
//!
//! This module provides the JavaScript-facing result type that wraps the core
//! `CompressedOutput`, handling the conversion between Rust and JavaScript
//! data representations.

use jpegfit_core::{CompressedOutput, Outcome, ResponseMeta, Stats};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// A compressed JPEG and everything a caller needs to serve it.
///
/// # Memory Management
///
/// The JPEG bytes are stored in WASM memory. When you call `bytes()`, a copy is
/// made to JavaScript memory as a `Uint8Array`.
#[wasm_bindgen]
pub struct JsCompressed {
    bytes: Vec<u8>,
    stats: Stats,
    outcome: Outcome,
    meta: ResponseMeta,
}

/// Serializable view handed to JavaScript by [`JsCompressed::summary`].
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Summary<'a> {
    stats: &'a Stats,
    outcome: Outcome,
    meta: &'a ResponseMeta,
}

impl From<CompressedOutput> for JsCompressed {
    fn from(output: CompressedOutput) -> Self {
        Self {
            bytes: output.bytes,
            stats: output.stats,
            outcome: output.outcome,
            meta: output.meta,
        }
    }
}

#[wasm_bindgen]
impl JsCompressed {
    /// Returns the JPEG bytes as Uint8Array.
    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    /// Suggested download name, `{base}_{suffix}.jpg`
    #[wasm_bindgen(getter)]
    pub fn filename(&self) -> String {
        self.meta.filename.clone()
    }

    /// Always `image/jpeg`
    #[wasm_bindgen(getter, js_name = contentType)]
    pub fn content_type(&self) -> String {
        self.meta.content_type.to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.stats.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.stats.height
    }

    /// Quality the output was encoded at
    #[wasm_bindgen(getter)]
    pub fn quality(&self) -> u8 {
        self.stats.quality
    }

    #[wasm_bindgen(getter, js_name = scaleFactor)]
    pub fn scale_factor(&self) -> f64 {
        self.stats.scale_factor
    }

    /// Size of the uploaded bytes
    #[wasm_bindgen(getter, js_name = originalSize)]
    pub fn original_size(&self) -> f64 {
        self.meta.original_size as f64
    }

    #[wasm_bindgen(getter, js_name = compressedSize)]
    pub fn compressed_size(&self) -> f64 {
        self.meta.compressed_size as f64
    }

    /// `tight`, `relaxed`, `best_effort`, `fallback` or `fixed_quality`
    #[wasm_bindgen(getter)]
    pub fn outcome(&self) -> String {
        self.outcome.as_str().to_string()
    }

    /// Response headers as an array of `[name, value]` pairs.
    pub fn headers(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.meta.headers())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Stats, outcome and response metadata as a plain object.
    pub fn summary(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.summary_view())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Explicitly free WASM memory.
    ///
    /// This is optional - wasm-bindgen's finalizer will handle cleanup automatically.
    pub fn free(self) {
        // Dropping self releases the memory
    }
}

impl JsCompressed {
    fn summary_view(&self) -> Summary<'_> {
        Summary {
            stats: &self.stats,
            outcome: self.outcome,
            meta: &self.meta,
        }
    }
}
