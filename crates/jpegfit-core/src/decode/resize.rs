//! Proportional resampling used by both compressors.
//!
//! All functions leave the input untouched and either borrow it (no-op
//! scale) or return a new buffer.

use std::borrow::Cow;

use image::imageops::{self, FilterType};
use image::RgbImage;

/// Compute the dimensions of an image scaled by `factor`.
///
/// Each side is `round(side * factor)`, never below 1 pixel.
pub fn scaled_dimensions(width: u32, height: u32, factor: f64) -> (u32, u32) {
    let scale = |side: u32| ((side as f64 * factor).round() as u32).max(1);
    (scale(width), scale(height))
}

/// Ratio that brings the longest edge down to `max_dimension`.
///
/// Values `>= 1.0` mean the image already fits.
pub fn fit_ratio(width: u32, height: u32, max_dimension: u32) -> f64 {
    let longest = width.max(height);
    if longest == 0 {
        return 1.0;
    }
    max_dimension as f64 / longest as f64
}

/// Resample an image by `factor` with a Lanczos3 filter.
///
/// Factors `>= 1.0` borrow the input unchanged; the engine never upscales.
pub fn scale(image: &RgbImage, factor: f64) -> Cow<'_, RgbImage> {
    if factor >= 1.0 {
        return Cow::Borrowed(image);
    }

    let (width, height) = scaled_dimensions(image.width(), image.height(), factor);
    if (width, height) == image.dimensions() {
        return Cow::Borrowed(image);
    }

    Cow::Owned(imageops::resize(image, width, height, FilterType::Lanczos3))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Scaled sides are the rounded product and stay within the source.
        #[test]
        fn prop_scaled_dimensions_bounded(
            width in 1u32..=8000,
            height in 1u32..=8000,
            factor in 0.01f64..=1.0,
        ) {
            let (w, h) = scaled_dimensions(width, height, factor);
            prop_assert!(w >= 1 && w <= width);
            prop_assert!(h >= 1 && h <= height);
            prop_assert_eq!(w, ((width as f64 * factor).round() as u32).max(1));
            prop_assert_eq!(h, ((height as f64 * factor).round() as u32).max(1));
        }

        /// Fitting never leaves the longest edge above the limit.
        #[test]
        fn prop_fit_ratio_fits(
            width in 1u32..=10000,
            height in 1u32..=10000,
            max_dimension in 1u32..=5000,
        ) {
            let ratio = fit_ratio(width, height, max_dimension);
            if ratio < 1.0 {
                let (w, h) = scaled_dimensions(width, height, ratio);
                prop_assert!(w.max(h) <= max_dimension);
            }
        }
    }
}
