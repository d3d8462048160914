//! jpegfit WASM - WebAssembly bindings for jpegfit
//!
//! This crate provides WASM bindings to expose the jpegfit-core compression
//! engine to JavaScript/TypeScript callers.
//!
//! # Module Structure
//!
//! - `compress` - Fixed-quality and size-target compression bindings
//! - `types` - WASM-compatible wrapper for compression results
//!
//! # Usage
//!
//! ```typescript
//! import init, { compress_fixed_quality } from '@jpegfit/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const result = compress_fixed_quality(bytes, file.name, '75');
//! console.log(`${result.originalSize} -> ${result.compressedSize} bytes`);
//! ```

use wasm_bindgen::prelude::*;

mod compress;
mod types;

// Re-export public types
pub use compress::{compress_fixed_quality, compress_to_size};
pub use types::JsCompressed;

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Endpoint names accepted by `compress_to_size`.
#[wasm_bindgen]
pub fn size_target_endpoints() -> Vec<String> {
    jpegfit_core::Endpoint::ALL
        .into_iter()
        .filter(|endpoint| endpoint.is_size_target())
        .map(|endpoint| endpoint.as_str().to_string())
        .collect()
}
