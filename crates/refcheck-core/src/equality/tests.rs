//! Unit tests for equality strategies and perceptual metrics.

use super::perceptual::{rgb_to_lab, window_starts};
use super::*;
use crate::value::{Digest, DigestAlgorithm, Image};

fn gradient(width: u32, height: u32) -> Image {
    Image::from_fn(width, height, |x, y| {
        let v = ((x * 7 + y * 13) % 256) as u8;
        [v, v.wrapping_mul(3), 255 - v, 255]
    })
}

#[test]
fn test_ssim_identical_images() {
    let image = gradient(64, 64);
    assert_eq!(calculate_ssim(&image, &image), 1.0);
}

#[test]
fn test_ssim_black_vs_white_is_low() {
    let black = Image::filled(64, 64, [0, 0, 0, 255]);
    let white = Image::filled(64, 64, [255, 255, 255, 255]);
    let ssim = calculate_ssim(&black, &white);
    assert!(ssim < 0.1, "SSIM for black vs white should be low, got {}", ssim);
}

#[test]
fn test_ssim_small_image_uses_global_window() {
    let image = Image::filled(4, 4, [128, 128, 128, 255]);
    assert_eq!(calculate_ssim(&image, &image), 1.0);
}

#[test]
fn test_ssim_covers_ragged_edges() {
    // 10x10: the change sits outside the first 8x8 tile.
    let reference = Image::filled(10, 10, [200, 200, 200, 255]);
    let actual = Image::from_fn(10, 10, |x, y| {
        if x >= 8 && y >= 8 {
            [0, 0, 0, 255]
        } else {
            [200, 200, 200, 255]
        }
    });
    assert!(calculate_ssim(&reference, &actual) < DEFAULT_SSIM_THRESHOLD);
}

#[test]
fn test_window_starts() {
    assert_eq!(window_starts(16, 8), vec![0, 8]);
    assert_eq!(window_starts(10, 8), vec![0, 2]);
    assert_eq!(window_starts(8, 8), vec![0]);
}

#[test]
fn test_ssim_dimension_mismatch() {
    assert_eq!(calculate_ssim(&gradient(8, 8), &gradient(8, 9)), 0.0);
}

#[test]
fn test_psnr_identical_is_infinite() {
    let image = gradient(16, 16);
    assert!(calculate_psnr(&image, &image).is_infinite());
}

#[test]
fn test_psnr_small_noise_is_high() {
    let reference = gradient(16, 16);
    let actual = Image::from_fn(16, 16, |x, y| {
        let mut p = reference.pixel(x, y).unwrap();
        p[0] = p[0].saturating_add(1);
        p
    });
    assert!(calculate_psnr(&reference, &actual) > 40.0);
}

#[test]
fn test_delta_e_identical_and_different() {
    let red = Image::filled(1, 1, [255, 0, 0, 255]);
    let green = Image::filled(1, 1, [0, 255, 0, 255]);
    assert_eq!(calculate_delta_e(&red, &red), (0.0, 0.0));
    let (mean, max) = calculate_delta_e(&red, &green);
    assert!(mean > 50.0);
    assert!(max > 50.0);
}

#[test]
fn test_rgb_to_lab_white() {
    let (l, a, b) = rgb_to_lab((255.0, 255.0, 255.0));
    assert!((l - 100.0).abs() < 0.01);
    assert!(a.abs() < 0.01);
    assert!(b.abs() < 0.01);
}

#[test]
fn test_transparent_pixels_compare_equal() {
    let a = Image::filled(8, 8, [255, 0, 0, 0]);
    let b = Image::filled(8, 8, [0, 0, 255, 0]);
    assert_eq!(calculate_ssim(&a, &b), 1.0);
}

#[test]
fn test_default_equality_hash_is_exact() {
    let eq = default_equality(ContentKind::Hash, ImageMetric::default());
    let a = Comparable::Digest(Digest::new(DigestAlgorithm::Sha256, vec![1; 32]));
    let b = Comparable::Digest(Digest::new(DigestAlgorithm::Sha256, vec![2; 32]));
    let c = Comparable::Digest(Digest::new(DigestAlgorithm::Blake3, vec![1; 32]));
    assert!(eq.matches(&a, &a.clone()));
    assert!(!eq.matches(&a, &b));
    assert!(!eq.matches(&a, &c));
    assert_eq!(eq.label(), "exact");
}

#[test]
fn test_default_equality_text_is_exact() {
    let eq = default_equality(ContentKind::Text, ImageMetric::default());
    let hello = Comparable::Text("hello".into());
    assert!(eq.matches(&hello, &Comparable::Text("hello".into())));
    assert!(!eq.matches(&hello, &Comparable::Text("Hello".into())));
}

#[test]
fn test_default_equality_image_tolerates_small_noise() {
    let eq = default_equality(ContentKind::Image, ImageMetric::default());
    let reference = gradient(32, 32);
    let actual = Image::from_fn(32, 32, |x, y| {
        let mut p = reference.pixel(x, y).unwrap();
        if (x + y) % 5 == 0 {
            p[1] = p[1].saturating_sub(1);
        }
        p
    });
    assert_ne!(reference, actual);
    assert!(eq.matches(
        &Comparable::Image(reference.clone()),
        &Comparable::Image(actual)
    ));
    assert!(!eq.matches(
        &Comparable::Image(reference),
        &Comparable::Image(Image::filled(32, 32, [0, 0, 0, 255]))
    ));
}

#[test]
fn test_default_image_equality_sees_hue() {
    // Red and this gray have almost the same BT.601 luminance.
    let red = Comparable::Image(Image::filled(16, 16, [255, 0, 0, 255]));
    let gray = Comparable::Image(Image::filled(16, 16, [76, 76, 76, 255]));
    assert!(!default_equality(ContentKind::Image, ImageMetric::default()).matches(&red, &gray));
    assert!(!Equality::perceptual(ImageMetric::ssim()).matches(&red, &gray));
}

#[test]
fn test_default_image_equality_rejects_flat_shift() {
    let eq = default_equality(ContentKind::Image, ImageMetric::default());
    let base = Comparable::Image(Image::filled(16, 16, [100, 100, 100, 255]));
    let shifted = Comparable::Image(Image::filled(16, 16, [120, 120, 120, 255]));
    let nudged = Comparable::Image(Image::filled(16, 16, [102, 101, 100, 255]));
    assert!(!eq.matches(&base, &shifted));
    assert!(eq.matches(&base, &nudged));
    assert_eq!(eq.label(), "psnr");
}

#[test]
fn test_ssim_scores_worst_channel() {
    let reference = gradient(16, 16);
    let blue_dropped = Image::from_fn(16, 16, |x, y| {
        let mut p = reference.pixel(x, y).unwrap();
        p[2] = 0;
        p
    });
    assert!(calculate_ssim(&reference, &blue_dropped) < DEFAULT_SSIM_THRESHOLD);
}

#[test]
fn test_psnr_ignores_transparent_payload() {
    let a = Image::filled(8, 8, [255, 0, 0, 0]);
    let b = Image::filled(8, 8, [0, 0, 255, 0]);
    assert!(calculate_psnr(&a, &b).is_infinite());
}

#[test]
fn test_image_metric_rejects_dimension_change() {
    let metric = ImageMetric::psnr();
    assert!(!metric.accepts(&gradient(8, 8), &gradient(9, 8)));
}

#[test]
fn test_override_takes_precedence() {
    let custom = Equality::text(|r, a| r.eq_ignore_ascii_case(a));
    let resolved = resolve_equality(ContentKind::Text, Some(&custom), ImageMetric::default());
    assert!(resolved.matches(
        &Comparable::Text("hello".into()),
        &Comparable::Text("Hello".into())
    ));
    assert_eq!(resolved.label(), "custom");

    let default = resolve_equality(ContentKind::Text, None, ImageMetric::default());
    assert!(!default.matches(
        &Comparable::Text("hello".into()),
        &Comparable::Text("Hello".into())
    ));
}

#[test]
fn test_override_argument_order_is_reference_then_actual() {
    let eq = Equality::text(|reference, actual| actual.starts_with(reference));
    assert!(eq.matches(
        &Comparable::Text("abc".into()),
        &Comparable::Text("abcdef".into())
    ));
    assert!(!eq.matches(
        &Comparable::Text("abcdef".into()),
        &Comparable::Text("abc".into())
    ));
}
