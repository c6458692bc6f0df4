//! Per-check options.

use crate::codec::EncodeOptions;
use crate::equality::{Equality, ImageMetric};
use crate::render::RenderMode;

/// Options for a single [`Checker::check`](super::Checker::check) call.
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Equality override; takes precedence over the kind's default.
    pub by: Option<Equality>,
    /// Render mode override for this check.
    pub render: Option<RenderMode>,
    /// Codec options, e.g. the text-image column budget.
    pub encode: EncodeOptions,
    /// Metric used by the default image predicate.
    pub image_metric: ImageMetric,
}

impl CheckOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compares with `equality` instead of the kind's default.
    pub fn by(mut self, equality: Equality) -> Self {
        self.by = Some(equality);
        self
    }

    /// Shorthand for `by(Equality::text(predicate))`.
    pub fn by_text<F>(self, predicate: F) -> Self
    where
        F: Fn(&str, &str) -> bool + Send + Sync + 'static,
    {
        self.by(Equality::text(predicate))
    }

    pub fn render(mut self, mode: RenderMode) -> Self {
        self.render = Some(mode);
        self
    }

    /// Column budget for text-rendered images; `None` keeps native width.
    pub fn text_columns(mut self, columns: Option<u32>) -> Self {
        self.encode.text_columns = columns;
        self
    }

    pub fn image_metric(mut self, metric: ImageMetric) -> Self {
        self.image_metric = metric;
        self
    }
}
