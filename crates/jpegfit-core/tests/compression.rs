// tests/compression.rs
//
// End-to-end tests for jpegfit-core against the real encoder:
// search scenarios, orientation from embedded EXIF, determinism, logging.

use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex};

use image::{DynamicImage, ImageFormat, RgbImage};
use img_parts::jpeg::Jpeg;
use img_parts::{Bytes, ImageEXIF};
use jpegfit_core::compress::{RELAXED_TOLERANCE, SCALE_LADDER};
use jpegfit_core::decode::extract_exif;
use jpegfit_core::encode::{encode_jpeg, JpegSaveParams};
use jpegfit_core::request::{
    process_fixed_quality, process_to_size, Endpoint, FixedQualityRequest, SizeTargetRequest,
};
use jpegfit_core::{
    compress_to_size, compress_to_size_traced, decode_image, encode, CompressionOptions,
    DecodedImage, NativeCodec, Outcome, SearchTrace, SizeTarget,
};

// Deterministic pseudo-random texture, busy enough to resist compression
fn noisy_image(width: u32, height: u32) -> RgbImage {
    let mut state: u32 = 0x2545_f491;
    RgbImage::from_fn(width, height, |x, y| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let n = (state & 0xff) as u8;
        image::Rgb([
            n,
            ((x + n as u32) % 256) as u8,
            ((y * 3 + (state >> 8 & 0x3f)) % 256) as u8,
        ])
    })
}

fn png_bytes(image: RgbImage) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image)
        .write_to(&mut buffer, ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}

// Minimal little-endian TIFF payload holding only an Orientation tag
fn orientation_exif(value: u16) -> Vec<u8> {
    let mut blob = b"II*\0\x08\0\0\0\x01\0\x12\x01\x03\0\x01\0\0\0".to_vec();
    blob.extend_from_slice(&value.to_le_bytes());
    blob.extend_from_slice(&[0, 0, 0, 0, 0, 0]);
    blob
}

// Little-endian TIFF payload with Make="ACM" and an Orientation tag
fn camera_exif(orientation: u16) -> Vec<u8> {
    let mut blob = b"II*\0\x08\0\0\0\x02\0".to_vec();
    blob.extend_from_slice(b"\x0f\x01\x02\0\x04\0\0\0ACM\0");
    blob.extend_from_slice(b"\x12\x01\x03\0\x01\0\0\0");
    blob.extend_from_slice(&orientation.to_le_bytes());
    blob.extend_from_slice(&[0, 0, 0, 0, 0, 0]);
    blob
}

fn make_and_orientation(exif: &[u8]) -> (Vec<u8>, Option<u32>) {
    let parsed = exif::Reader::new().read_raw(exif.to_vec()).unwrap();
    let make = match &parsed.get_field(exif::Tag::Make, exif::In::PRIMARY).unwrap().value {
        exif::Value::Ascii(parts) => parts[0].clone(),
        other => panic!("unexpected Make value {other:?}"),
    };
    let orientation = parsed
        .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|field| field.value.get_uint(0));
    (make, orientation)
}

fn jpeg_with_exif(width: u32, height: u32, exif: &[u8]) -> Vec<u8> {
    let image = RgbImage::from_fn(width, height, |x, _| image::Rgb([(x * 6) as u8, 40, 90]));
    let plain = encode_jpeg(&image, 90).unwrap();

    let mut jpeg = Jpeg::from_bytes(Bytes::from(plain)).unwrap();
    jpeg.set_exif(Some(Bytes::copy_from_slice(exif)));
    let mut out = Vec::new();
    jpeg.encoder().write_to(&mut out).unwrap();
    out
}

fn assert_in_band_or_closest(trace: &SearchTrace, target: SizeTarget) {
    let stats = trace.result.stats;
    let delta = target.delta(stats.compressed_size);
    if target.accepts(delta, RELAXED_TOLERANCE) {
        return;
    }
    let closest = trace.closest_probe().expect("at least one probe");
    assert_eq!(closest.delta, delta);
    assert_eq!(closest.quality, stats.quality);
    assert_eq!(closest.scale_factor, stats.scale_factor);
}

mod search_scenarios {
    use super::*;

    #[test]
    fn test_exact_size_hit_on_first_probe() {
        let image = noisy_image(160, 120);
        let reference = encode(&NativeCodec, &image, 1.0, &JpegSaveParams::new(52)).unwrap();

        let decoded = DecodedImage::from_rgb_image(image);
        let target = SizeTarget::from_bytes(reference.bytes.len() as u64);
        let result = compress_to_size(
            &NativeCodec,
            &decoded,
            target,
            &CompressionOptions::new().with_preserve_exif(false),
        )
        .unwrap();

        assert_eq!(result.outcome, Outcome::Tight);
        assert_eq!(result.stats.quality, 52);
        assert_eq!(result.stats.scale_factor, 1.0);
        assert_eq!(result.bytes, reference.bytes);
    }

    #[test]
    fn test_flat_small_image_stays_full_scale() {
        let bytes = png_bytes(RgbImage::from_pixel(200, 200, image::Rgb([30, 120, 200])));
        let decoded = decode_image(&bytes).unwrap();
        let target = SizeTarget::from_kb(100);

        let trace =
            compress_to_size_traced(&NativeCodec, &decoded, target, &CompressionOptions::new())
                .unwrap();

        assert_eq!(trace.result.stats.scale_factor, 1.0);
        assert_eq!((trace.result.stats.width, trace.result.stats.height), (200, 200));
        assert_in_band_or_closest(&trace, target);
    }

    #[test]
    fn test_busy_image_needs_downscale() {
        let decoded = DecodedImage::from_rgb_image(noisy_image(1600, 1200));
        let target = SizeTarget::from_kb(20);

        let trace =
            compress_to_size_traced(&NativeCodec, &decoded, target, &CompressionOptions::new())
                .unwrap();

        let stats = trace.result.stats;
        assert!(stats.scale_factor < 1.0);
        assert!(SCALE_LADDER.contains(&stats.scale_factor));
        assert!((10..=95).contains(&stats.quality));
        assert_in_band_or_closest(&trace, target);
    }

    #[test]
    #[ignore = "full-size 12 MP search, slow outside release builds"]
    fn test_full_size_photo_to_20kb() {
        let decoded = DecodedImage::from_rgb_image(noisy_image(4000, 3000));
        let target = SizeTarget::from_kb(20);

        let trace =
            compress_to_size_traced(&NativeCodec, &decoded, target, &CompressionOptions::new())
                .unwrap();

        let stats = trace.result.stats;
        assert!(stats.scale_factor < 1.0);
        assert!(SCALE_LADDER.contains(&stats.scale_factor));
        assert_eq!(
            (stats.width, stats.height),
            (
                (4000.0 * stats.scale_factor).round() as u32,
                (3000.0 * stats.scale_factor).round() as u32
            )
        );
        assert_in_band_or_closest(&trace, target);
    }

    #[test]
    fn test_tiny_target_on_large_solid_image_terminates() {
        let decoded =
            DecodedImage::from_rgb_image(RgbImage::from_pixel(4000, 3000, image::Rgb([90, 90, 90])));
        let target = SizeTarget::from_kb(5);
        let options = CompressionOptions::new();

        let trace = compress_to_size_traced(&NativeCodec, &decoded, target, &options).unwrap();

        assert!(trace.probes.len() <= SCALE_LADDER.len() * options.max_iterations as usize);
        assert!(!trace.result.bytes.is_empty());
        assert_in_band_or_closest(&trace, target);
    }
}

mod orientation {
    use super::*;

    #[test]
    fn test_auto_rotate_applies_exif_orientation() {
        let bytes = jpeg_with_exif(48, 24, &orientation_exif(6));
        let request = SizeTargetRequest::new(Endpoint::ResizeTo50)
            .unwrap()
            .with_preserve_exif(true);

        let output = process_to_size(&NativeCodec, &bytes, "tilted.jpg", &request).unwrap();

        // Quarter turn: landscape source comes out portrait
        assert!(output.stats.width < output.stats.height);
        // Orientation already baked into the pixels
        let exif = extract_exif(&output.bytes).unwrap();
        assert_eq!(jpegfit_core::transform::read_orientation(&exif).unwrap(), Some(1));
    }

    #[test]
    fn test_rotated_output_keeps_other_tags() {
        let bytes = jpeg_with_exif(48, 24, &camera_exif(6));
        let request = FixedQualityRequest::new(70)
            .with_preserve_exif(true)
            .with_auto_rotate(true);

        let output = process_fixed_quality(&NativeCodec, &bytes, "camera.jpg", &request).unwrap();

        assert_eq!((output.stats.width, output.stats.height), (24, 48));
        let exif = extract_exif(&output.bytes).unwrap();
        assert_eq!(make_and_orientation(&exif), (b"ACM".to_vec(), Some(1)));
    }

    #[test]
    fn test_size_target_rotated_output_keeps_other_tags() {
        let bytes = jpeg_with_exif(48, 24, &camera_exif(8));
        let request = SizeTargetRequest::new(Endpoint::ResizeTo50)
            .unwrap()
            .with_preserve_exif(true);

        let output = process_to_size(&NativeCodec, &bytes, "camera.jpg", &request).unwrap();

        let exif = extract_exif(&output.bytes).unwrap();
        assert_eq!(make_and_orientation(&exif), (b"ACM".to_vec(), Some(1)));
    }

    #[test]
    fn test_without_auto_rotate_keeps_layout_and_exif() {
        let exif = orientation_exif(8);
        let bytes = jpeg_with_exif(48, 24, &exif);
        let request = FixedQualityRequest::new(70).with_preserve_exif(true);

        let output = process_fixed_quality(&NativeCodec, &bytes, "tilted.jpg", &request).unwrap();

        assert_eq!((output.stats.width, output.stats.height), (48, 24));
        assert_eq!(extract_exif(&output.bytes), Some(exif));
    }

    #[test]
    fn test_upside_down_keeps_dimensions() {
        let bytes = jpeg_with_exif(48, 24, &orientation_exif(3));
        let request = FixedQualityRequest::new(70).with_auto_rotate(true);

        let output = process_fixed_quality(&NativeCodec, &bytes, "flip.jpg", &request).unwrap();

        assert_eq!((output.stats.width, output.stats.height), (48, 24));
    }
}

mod determinism {
    use super::*;

    #[test]
    fn test_same_request_same_bytes() {
        let bytes = png_bytes(noisy_image(120, 90));
        let request = SizeTargetRequest::from_form(Endpoint::CompressTo50, Some("8"), Some("high")).unwrap();

        let first = process_to_size(&NativeCodec, &bytes, "a.png", &request).unwrap();
        let second = process_to_size(&NativeCodec, &bytes, "a.png", &request).unwrap();

        assert_eq!(first.bytes, second.bytes);
        assert_eq!(first.stats, second.stats);
    }
}

mod logging {
    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_malformed_orientation_logged_and_passed_through() {
        let bytes = jpeg_with_exif(32, 16, b"II*\0garbage");
        let buffer = SharedBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let output = tracing::subscriber::with_default(subscriber, || {
            process_fixed_quality(
                &NativeCodec,
                &bytes,
                "broken.jpg",
                &FixedQualityRequest::new(80).with_auto_rotate(true),
            )
        })
        .unwrap();

        assert_eq!((output.stats.width, output.stats.height), (32, 16));
        let logged = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert!(logged.contains("WARN"));
        assert!(logged.contains("orientation"));
    }

    #[test]
    fn test_search_outcome_logged_at_info() {
        let decoded = DecodedImage::from_rgb_image(noisy_image(64, 64));
        let buffer = SharedBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            compress_to_size(
                &NativeCodec,
                &decoded,
                SizeTarget::from_kb(5),
                &CompressionOptions::new(),
            )
        })
        .unwrap();

        let logged = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert!(logged.contains("Size search finished"));
        assert!(logged.contains("outcome="));
        // Per-probe events are debug only
        assert!(!logged.contains("Probe"));
    }
}
