//! Options, targets and result records shared by both compressors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::encode::EncodeError;

/// Tolerance for immediate acceptance of a probe.
pub const TIGHT_TOLERANCE: f64 = 0.05;

/// Tolerance for accepting the best candidate once a scale is exhausted.
pub const RELAXED_TOLERANCE: f64 = 0.10;

/// Lowest quality the size search will probe.
pub const MIN_QUALITY: u8 = 10;

/// Highest quality the size search will probe.
pub const MAX_QUALITY: u8 = 95;

/// Scale factors tried by the size search, largest first.
pub const SCALE_LADDER: [f64; 6] = [1.0, 0.9, 0.8, 0.7, 0.6, 0.5];

/// Failures inside a compressor.
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The decoded image has no pixels to encode.
    #[error("Image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}

/// Per-request compression settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompressionOptions {
    /// JPEG quality for the fixed-quality mode (1-100).
    pub quality: u8,
    /// Carry the source EXIF payload into the output.
    pub preserve_exif: bool,
    /// Rotate pixels upright from the EXIF orientation before encoding.
    pub auto_rotate: bool,
    /// Quality probes per scale factor in the size search.
    pub max_iterations: u32,
    /// Longest edge allowed by the fixed-quality mode.
    pub max_dimension: u32,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            quality: 85,
            preserve_exif: true,
            auto_rotate: true,
            max_iterations: 10,
            max_dimension: 3000,
        }
    }
}

impl CompressionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_preserve_exif(mut self, preserve_exif: bool) -> Self {
        self.preserve_exif = preserve_exif;
        self
    }

    pub fn with_auto_rotate(mut self, auto_rotate: bool) -> Self {
        self.auto_rotate = auto_rotate;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension;
        self
    }
}

/// Byte budget for the size search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeTarget {
    bytes: u64,
}

impl SizeTarget {
    /// `kb * 1024` bytes.
    pub fn from_kb(kb: u32) -> Self {
        Self {
            bytes: u64::from(kb) * 1024,
        }
    }

    pub fn from_bytes(bytes: u64) -> Self {
        Self { bytes }
    }

    pub fn bytes(self) -> u64 {
        self.bytes
    }

    /// Absolute distance between `size` and the target.
    pub fn delta(self, size: u64) -> u64 {
        size.abs_diff(self.bytes)
    }

    /// Whether `delta` lies within `tolerance` of the target (inclusive).
    pub fn accepts(self, delta: u64, tolerance: f64) -> bool {
        delta as f64 <= self.bytes as f64 * tolerance
    }
}

/// How a compressor arrived at its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Single encode at a caller-chosen quality.
    FixedQuality,
    /// A probe landed within the tight band.
    Tight,
    /// The best candidate was within the relaxed band after a scale.
    Relaxed,
    /// No band was met; the closest candidate overall.
    BestEffort,
    /// No probe ran; quality 10 at full scale.
    Fallback,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::FixedQuality => "fixed_quality",
            Outcome::Tight => "tight",
            Outcome::Relaxed => "relaxed",
            Outcome::BestEffort => "best_effort",
            Outcome::Fallback => "fallback",
        }
    }
}

/// Dimensions and settings of an encoded output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub width: u32,
    pub height: u32,
    pub compressed_size: u64,
    pub quality: u8,
    pub scale_factor: f64,
}

/// Encoded bytes plus how they were produced.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeResult {
    pub bytes: Vec<u8>,
    pub stats: Stats,
    pub outcome: Outcome,
}

/// One encode performed by the size search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Probe {
    pub scale_factor: f64,
    pub quality: u8,
    pub width: u32,
    pub height: u32,
    pub compressed_size: u64,
    pub delta: u64,
}

/// Result of a size search together with every probe it ran, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchTrace {
    pub result: EncodeResult,
    pub probes: Vec<Probe>,
}

impl SearchTrace {
    /// The first probe with the smallest delta, if any probe ran.
    pub fn closest_probe(&self) -> Option<&Probe> {
        self.probes
            .iter()
            .reduce(|best, probe| if probe.delta < best.delta { probe } else { best })
    }
}
