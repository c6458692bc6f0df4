//! Equality strategies.
//!
//! Each content kind has a default predicate:
//! - Hash: exact digest equality, no tolerance
//! - Image: perceptual similarity ([`ImageMetric`], PSNR over RGBA by default)
//! - Text: exact equality of the decoded forms
//!
//! A caller-supplied [`Equality`] always takes precedence. Predicates receive
//! `(reference, actual)` in that order.

mod perceptual;

#[cfg(test)]
mod tests;

use std::fmt;
use std::sync::Arc;

use crate::kind::ContentKind;
use crate::value::Comparable;

pub use perceptual::{
    calculate_delta_e, calculate_psnr, calculate_ssim, DEFAULT_PSNR_DB, DEFAULT_SSIM_THRESHOLD,
};

type Predicate = dyn Fn(&Comparable, &Comparable) -> bool + Send + Sync;

/// A binary predicate over `(reference, actual)`.
#[derive(Clone)]
pub struct Equality {
    label: &'static str,
    predicate: Arc<Predicate>,
}

impl fmt::Debug for Equality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Equality").field(&self.label).finish()
    }
}

impl Equality {
    /// Wraps a custom predicate.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Comparable, &Comparable) -> bool + Send + Sync + 'static,
    {
        Self {
            label: "custom",
            predicate: Arc::new(predicate),
        }
    }

    /// A predicate over the text forms. Non-text operands never match.
    pub fn text<F>(predicate: F) -> Self
    where
        F: Fn(&str, &str) -> bool + Send + Sync + 'static,
    {
        Self::new(move |reference, actual| match (reference.as_text(), actual.as_text()) {
            (Some(r), Some(a)) => predicate(r, a),
            _ => false,
        })
    }

    /// Exact structural equality.
    pub fn exact() -> Self {
        Self {
            label: "exact",
            predicate: Arc::new(|reference, actual| reference == actual),
        }
    }

    /// Perceptual image similarity under `metric`. Non-image operands fall
    /// back to exact equality.
    pub fn perceptual(metric: ImageMetric) -> Self {
        Self {
            label: metric.label(),
            predicate: Arc::new(move |reference, actual| {
                match (reference.as_image(), actual.as_image()) {
                    (Some(r), Some(a)) => metric.accepts(r, a),
                    _ => reference == actual,
                }
            }),
        }
    }

    /// Evaluates the predicate.
    pub fn matches(&self, reference: &Comparable, actual: &Comparable) -> bool {
        (self.predicate)(reference, actual)
    }

    /// Short description, e.g. `"exact"` or `"ssim"`.
    pub fn label(&self) -> &'static str {
        self.label
    }
}

/// Perceptual metric used for image references.
///
/// Both metrics see every color channel. The default is PSNR, which also
/// catches flat brightness shifts that SSIM scores leniently.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImageMetric {
    /// Structural similarity of the worst RGB channel must reach `threshold`
    /// (1.0 means identical).
    Ssim { threshold: f64 },
    /// Peak signal-to-noise ratio over RGBA must reach `min_db`.
    Psnr { min_db: f64 },
}

impl Default for ImageMetric {
    fn default() -> Self {
        Self::psnr()
    }
}

impl ImageMetric {
    /// PSNR with the default threshold.
    pub fn psnr() -> Self {
        ImageMetric::Psnr {
            min_db: DEFAULT_PSNR_DB,
        }
    }

    /// SSIM with the default threshold.
    pub fn ssim() -> Self {
        ImageMetric::Ssim {
            threshold: DEFAULT_SSIM_THRESHOLD,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ImageMetric::Ssim { .. } => "ssim",
            ImageMetric::Psnr { .. } => "psnr",
        }
    }

    /// Whether `actual` is close enough to `reference`. Images of different
    /// dimensions never are.
    pub fn accepts(&self, reference: &crate::value::Image, actual: &crate::value::Image) -> bool {
        if reference.dimensions() != actual.dimensions() {
            return false;
        }
        match *self {
            ImageMetric::Ssim { threshold } => calculate_ssim(reference, actual) >= threshold,
            ImageMetric::Psnr { min_db } => calculate_psnr(reference, actual) >= min_db,
        }
    }
}

/// The default predicate for `kind`.
pub fn default_equality(kind: ContentKind, metric: ImageMetric) -> Equality {
    match kind {
        ContentKind::Hash | ContentKind::Text => Equality::exact(),
        ContentKind::Image => Equality::perceptual(metric),
    }
}

/// The caller's predicate when given, otherwise the kind's default.
pub fn resolve_equality(kind: ContentKind, by: Option<&Equality>, metric: ImageMetric) -> Equality {
    match by {
        Some(custom) => custom.clone(),
        None => default_equality(kind, metric),
    }
}
