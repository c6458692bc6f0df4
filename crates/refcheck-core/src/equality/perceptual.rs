//! Perceptual image metrics: SSIM, PSNR and DeltaE (CIE76).
//!
//! All metrics are deterministic and operate on RGBA8 grids of equal size.
//! Color is composited over black before comparison, so fully transparent
//! pixels compare equal regardless of their RGB payload.

use crate::value::Image;

/// Default SSIM for [`ImageMetric::Ssim`](super::ImageMetric::Ssim).
pub const DEFAULT_SSIM_THRESHOLD: f64 = 0.98;

/// Default PSNR, in dB, an actual image must reach to match its reference.
///
/// Lossless round trips and a few levels of quantization noise pass; a flat
/// shift of 10 levels on every channel (about 29 dB) does not.
pub const DEFAULT_PSNR_DB: f64 = 30.0;

/// Precision for reported metric values.
const FLOAT_PRECISION: i32 = 6;

/// c1 = (K1 * L)^2 with K1 = 0.01, L = 255.
const SSIM_C1: f64 = 6.5025;
/// c2 = (K2 * L)^2 with K2 = 0.03, L = 255.
const SSIM_C2: f64 = 58.5225;

const SSIM_WINDOW_SIZE: usize = 8;

fn round_f64(value: f64, decimals: i32) -> f64 {
    let multiplier = 10_f64.powi(decimals);
    (value * multiplier).round() / multiplier
}

/// Mean SSIM over 8x8 windows of the worst color channel, in `[0, 1]` for
/// natural images.
///
/// Each of R, G and B (composited over black) is scored separately and the
/// lowest score wins, so a hue change is never hidden by equal luminance.
/// Windows tile the image; when a dimension is not a multiple of 8 a last
/// window is aligned to the far edge so every pixel is covered. Images
/// smaller than a window are compared globally. Returns 0.0 for mismatched
/// dimensions.
pub fn calculate_ssim(a: &Image, b: &Image) -> f64 {
    if a.dimensions() != b.dimensions() {
        return 0.0;
    }
    if a.is_empty() {
        return 1.0;
    }

    let w = a.width() as usize;
    let h = a.height() as usize;
    let worst = (0..3)
        .map(|channel| plane_ssim(&channel_plane(a, channel), &channel_plane(b, channel), w, h))
        .fold(f64::INFINITY, f64::min);
    round_f64(worst, FLOAT_PRECISION)
}

fn plane_ssim(plane_a: &[f64], plane_b: &[f64], w: usize, h: usize) -> f64 {
    let win = SSIM_WINDOW_SIZE;
    if w < win || h < win {
        return compute_ssim_window(plane_a, plane_b);
    }

    let xs = window_starts(w, win);
    let ys = window_starts(h, win);

    let mut ssim_sum = 0.0;
    let mut window_count = 0usize;
    let mut win_a = Vec::with_capacity(win * win);
    let mut win_b = Vec::with_capacity(win * win);

    for &y_start in &ys {
        for &x_start in &xs {
            win_a.clear();
            win_b.clear();
            for dy in 0..win {
                let row = (y_start + dy) * w;
                for dx in 0..win {
                    let idx = row + x_start + dx;
                    win_a.push(plane_a[idx]);
                    win_b.push(plane_b[idx]);
                }
            }
            ssim_sum += compute_ssim_window(&win_a, &win_b);
            window_count += 1;
        }
    }

    ssim_sum / window_count as f64
}

/// Window origins along one axis of length `len` (`len >= win`).
pub(super) fn window_starts(len: usize, win: usize) -> Vec<usize> {
    let mut starts: Vec<usize> = (0..=len - win).step_by(win).collect();
    if len % win != 0 {
        starts.push(len - win);
    }
    starts
}

/// One color channel of each pixel composited over black.
fn channel_plane(image: &Image, channel: usize) -> Vec<f64> {
    image
        .as_rgba()
        .chunks_exact(4)
        .map(|p| p[channel] as f64 * p[3] as f64 / 255.0)
        .collect()
}

/// RGB composited over black, plus alpha.
fn premultiplied(p: &[u8]) -> [f64; 4] {
    let alpha = p[3] as f64 / 255.0;
    [
        p[0] as f64 * alpha,
        p[1] as f64 * alpha,
        p[2] as f64 * alpha,
        p[3] as f64,
    ]
}

fn compute_ssim_window(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len() as f64;
    if n == 0.0 {
        return 0.0;
    }

    let mean_a: f64 = a.iter().sum::<f64>() / n;
    let mean_b: f64 = b.iter().sum::<f64>() / n;

    let mut var_a = 0.0;
    let mut var_b = 0.0;
    let mut cov_ab = 0.0;
    for (&x, &y) in a.iter().zip(b) {
        let diff_a = x - mean_a;
        let diff_b = y - mean_b;
        var_a += diff_a * diff_a;
        var_b += diff_b * diff_b;
        cov_ab += diff_a * diff_b;
    }
    var_a /= n;
    var_b /= n;
    cov_ab /= n;

    let numerator = (2.0 * mean_a * mean_b + SSIM_C1) * (2.0 * cov_ab + SSIM_C2);
    let denominator = (mean_a * mean_a + mean_b * mean_b + SSIM_C1) * (var_a + var_b + SSIM_C2);

    if denominator > 0.0 {
        numerator / denominator
    } else {
        1.0
    }
}

/// PSNR in dB over all four channels, with color composited over black.
/// Identical images yield `f64::INFINITY`; mismatched dimensions yield 0.0.
pub fn calculate_psnr(a: &Image, b: &Image) -> f64 {
    if a.dimensions() != b.dimensions() {
        return 0.0;
    }
    let samples = a.as_rgba().len();
    if samples == 0 {
        return f64::INFINITY;
    }
    let squared: f64 = a
        .as_rgba()
        .chunks_exact(4)
        .zip(b.as_rgba().chunks_exact(4))
        .flat_map(|(pa, pb)| {
            let (pa, pb) = (premultiplied(pa), premultiplied(pb));
            (0..4).map(move |i| (pa[i] - pb[i]) * (pa[i] - pb[i]))
        })
        .sum();
    let mse = squared / samples as f64;
    if mse == 0.0 {
        return f64::INFINITY;
    }
    round_f64(10.0 * (255.0 * 255.0 / mse).log10(), FLOAT_PRECISION)
}

/// Mean and max DeltaE (CIE76) between corresponding pixels.
///
/// Returns `(f64::MAX, f64::MAX)` for mismatched dimensions.
pub fn calculate_delta_e(a: &Image, b: &Image) -> (f64, f64) {
    if a.dimensions() != b.dimensions() {
        return (f64::MAX, f64::MAX);
    }

    let mut sum_delta_e = 0.0;
    let mut max_delta_e: f64 = 0.0;
    let mut count = 0usize;

    for (pa, pb) in a.as_rgba().chunks_exact(4).zip(b.as_rgba().chunks_exact(4)) {
        let lab_a = rgb_to_lab(composite(pa));
        let lab_b = rgb_to_lab(composite(pb));
        let delta_e = ((lab_a.0 - lab_b.0).powi(2)
            + (lab_a.1 - lab_b.1).powi(2)
            + (lab_a.2 - lab_b.2).powi(2))
        .sqrt();
        sum_delta_e += delta_e;
        max_delta_e = max_delta_e.max(delta_e);
        count += 1;
    }

    let mean_delta_e = if count > 0 {
        sum_delta_e / count as f64
    } else {
        0.0
    };

    (
        round_f64(mean_delta_e, FLOAT_PRECISION),
        round_f64(max_delta_e, FLOAT_PRECISION),
    )
}

/// RGB composited over black.
fn composite(p: &[u8]) -> (f64, f64, f64) {
    let alpha = p[3] as f64 / 255.0;
    (
        p[0] as f64 * alpha,
        p[1] as f64 * alpha,
        p[2] as f64 * alpha,
    )
}

/// sRGB (0-255 components) to CIE Lab, D65.
pub(super) fn rgb_to_lab((r, g, b): (f64, f64, f64)) -> (f64, f64, f64) {
    let r_lin = srgb_to_linear(r / 255.0);
    let g_lin = srgb_to_linear(g / 255.0);
    let b_lin = srgb_to_linear(b / 255.0);

    let x = r_lin * 0.4124564 + g_lin * 0.3575761 + b_lin * 0.1804375;
    let y = r_lin * 0.2126729 + g_lin * 0.7151522 + b_lin * 0.0721750;
    let z = r_lin * 0.0193339 + g_lin * 0.1191920 + b_lin * 0.9503041;

    const REF_X: f64 = 0.95047;
    const REF_Y: f64 = 1.00000;
    const REF_Z: f64 = 1.08883;

    let fx = lab_f(x / REF_X);
    let fy = lab_f(y / REF_Y);
    let fz = lab_f(z / REF_Z);

    (116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz))
}

fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn lab_f(t: f64) -> f64 {
    const DELTA: f64 = 6.0 / 29.0;
    const DELTA_CUBED: f64 = DELTA * DELTA * DELTA;

    if t > DELTA_CUBED {
        t.cbrt()
    } else {
        t / (3.0 * DELTA * DELTA) + 4.0 / 29.0
    }
}
