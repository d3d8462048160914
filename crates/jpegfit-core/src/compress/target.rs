//! Size-targeting compression.
//!
//! # Algorithm
//!
//! The search walks [`SCALE_LADDER`] from full resolution down to half.
//! At each scale it binary-searches JPEG quality over
//! `[MIN_QUALITY, MAX_QUALITY]` for at most `max_iterations` probes:
//!
//! ```text
//! quality = (low + high) / 2
//! size > target  ->  high = quality - 1
//! otherwise      ->  low  = quality + 1
//! stop the scale once low >= high
//! ```
//!
//! A probe within [`TIGHT_TOLERANCE`] of the target is returned at once.
//! After each scale the closest candidate seen so far (across all scales)
//! is returned if it lies within [`RELAXED_TOLERANCE`]. When no scale
//! meets either band the closest candidate overall is returned. If no probe
//! ran at all, a single quality 10 encode at full scale is the result.
//!
//! Worst-case work is `SCALE_LADDER.len() * max_iterations` encodes plus one
//! resample per scale.

use image::RgbImage;

use crate::decode::{resize, DecodedImage};
use crate::encode::{encode, Encoded, JpegCodec, JpegSaveParams};

use super::types::{
    CompressionOptions, EncodeResult, Outcome, Probe, ProcessingError, SearchTrace, SizeTarget,
    Stats, MAX_QUALITY, MIN_QUALITY, RELAXED_TOLERANCE, SCALE_LADDER, TIGHT_TOLERANCE,
};

/// Quality used when the search never probed.
const FALLBACK_QUALITY: u8 = MIN_QUALITY;

/// Compress `image` as close to `target` as the search allows.
///
/// Uses `options.preserve_exif` and `options.max_iterations`; quality and
/// max dimension are ignored. Never fails for a non-empty image unless the
/// codec itself fails.
pub fn compress_to_size(
    codec: &impl JpegCodec,
    image: &DecodedImage,
    target: SizeTarget,
    options: &CompressionOptions,
) -> Result<EncodeResult, ProcessingError> {
    search(codec, image, target, options, |_| {})
}

/// Same as [`compress_to_size`], also returning every probe in order.
pub fn compress_to_size_traced(
    codec: &impl JpegCodec,
    image: &DecodedImage,
    target: SizeTarget,
    options: &CompressionOptions,
) -> Result<SearchTrace, ProcessingError> {
    let mut probes = Vec::new();
    let result = search(codec, image, target, options, |probe| probes.push(*probe))?;
    Ok(SearchTrace { result, probes })
}

/// A probe kept as a potential answer.
struct Candidate {
    encoded: Encoded,
    quality: u8,
    scale_factor: f64,
    delta: u64,
}

impl Candidate {
    fn into_result(self, outcome: Outcome) -> EncodeResult {
        EncodeResult {
            stats: Stats {
                width: self.encoded.width,
                height: self.encoded.height,
                compressed_size: self.encoded.bytes.len() as u64,
                quality: self.quality,
                scale_factor: self.scale_factor,
            },
            bytes: self.encoded.bytes,
            outcome,
        }
    }

    /// Keep whichever of `best` and `self` is closer; earlier wins ties.
    fn closest(self, best: Option<Candidate>) -> Candidate {
        match best {
            Some(previous) if previous.delta <= self.delta => previous,
            _ => self,
        }
    }
}

/// How the probes at one scale ended.
enum ScaleStep {
    Tight(Candidate),
    Exhausted(Option<Candidate>),
}

fn search(
    codec: &impl JpegCodec,
    image: &DecodedImage,
    target: SizeTarget,
    options: &CompressionOptions,
    mut observe: impl FnMut(&Probe),
) -> Result<EncodeResult, ProcessingError> {
    if image.is_empty() {
        return Err(ProcessingError::EmptyImage {
            width: image.width(),
            height: image.height(),
        });
    }

    let rgb = image.to_rgb();
    let exif = if options.preserve_exif { image.exif() } else { None };
    let params = JpegSaveParams::new(MIN_QUALITY).with_exif(exif);

    let mut best: Option<Candidate> = None;

    for scale_factor in SCALE_LADDER {
        let working = resize::scale(&rgb, scale_factor);
        tracing::debug!(
            scale_factor,
            width = working.width(),
            height = working.height(),
            "Searching scale"
        );

        let step = search_quality(
            codec,
            &working,
            scale_factor,
            target,
            &params,
            options.max_iterations,
            best,
            &mut observe,
        )?;

        best = match step {
            ScaleStep::Tight(candidate) => return Ok(finish(candidate, Outcome::Tight, target)),
            ScaleStep::Exhausted(best) => best,
        };

        best = match best {
            Some(candidate) if target.accepts(candidate.delta, RELAXED_TOLERANCE) => {
                return Ok(finish(candidate, Outcome::Relaxed, target));
            }
            other => other,
        };
    }

    if let Some(candidate) = best {
        return Ok(finish(candidate, Outcome::BestEffort, target));
    }

    let encoded = encode(codec, &rgb, 1.0, &params.at_quality(FALLBACK_QUALITY))?;
    let delta = target.delta(encoded.bytes.len() as u64);
    let candidate = Candidate {
        encoded,
        quality: FALLBACK_QUALITY,
        scale_factor: 1.0,
        delta,
    };
    Ok(finish(candidate, Outcome::Fallback, target))
}

/// Binary-search quality at one scale, threading the best candidate through.
#[allow(clippy::too_many_arguments)]
fn search_quality(
    codec: &impl JpegCodec,
    working: &RgbImage,
    scale_factor: f64,
    target: SizeTarget,
    params: &JpegSaveParams<'_>,
    max_iterations: u32,
    mut best: Option<Candidate>,
    observe: &mut impl FnMut(&Probe),
) -> Result<ScaleStep, ProcessingError> {
    let (mut low, mut high) = (MIN_QUALITY, MAX_QUALITY);

    for _ in 0..max_iterations {
        let quality = (low + high) / 2;
        let encoded = encode(codec, working, 1.0, &params.at_quality(quality))?;
        let size = encoded.bytes.len() as u64;
        let delta = target.delta(size);

        let probe = Probe {
            scale_factor,
            quality,
            width: encoded.width,
            height: encoded.height,
            compressed_size: size,
            delta,
        };
        tracing::debug!(scale_factor, quality, size, delta, "Probe");
        observe(&probe);

        let candidate = Candidate {
            encoded,
            quality,
            scale_factor,
            delta,
        };
        if target.accepts(delta, TIGHT_TOLERANCE) {
            return Ok(ScaleStep::Tight(candidate));
        }
        best = Some(candidate.closest(best));

        if size > target.bytes() {
            high = quality - 1;
        } else {
            low = quality + 1;
        }
        if low >= high {
            break;
        }
    }

    Ok(ScaleStep::Exhausted(best))
}

fn finish(candidate: Candidate, outcome: Outcome, target: SizeTarget) -> EncodeResult {
    let delta = candidate.delta;
    let result = candidate.into_result(outcome);
    tracing::info!(
        outcome = outcome.as_str(),
        target = target.bytes(),
        bytes = result.stats.compressed_size,
        delta,
        quality = result.stats.quality,
        scale_factor = result.stats.scale_factor,
        "Size search finished"
    );
    result
}
