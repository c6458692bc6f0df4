//! Colored terminal renderer.

use colored::Colorize;

use refcheck_codecs::text_image::render_grid;
use refcheck_core::equality::{calculate_psnr, calculate_ssim};
use refcheck_core::render::{summarize, LIMITED_LINES};
use refcheck_core::{
    Comparable, Digest, Image, Notice, ReferenceFile, RenderMode, Renderer,
    DEFAULT_TEXT_IMAGE_COLUMNS,
};

use crate::diff::{diff_lines, hunks, DiffLine};

/// Prints notices and previews to stderr with colors.
#[derive(Debug, Clone)]
pub struct TerminalRenderer {
    columns: u32,
    context: usize,
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self {
            columns: DEFAULT_TEXT_IMAGE_COLUMNS,
            context: 3,
        }
    }
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Width, in characters, of image previews.
    pub fn with_columns(mut self, columns: u32) -> Self {
        self.columns = columns.max(1);
        self
    }

    /// Unchanged lines shown around each text change.
    pub fn with_context(mut self, context: usize) -> Self {
        self.context = context;
        self
    }

    pub fn format_notice(&self, notice: &Notice) -> String {
        match notice {
            Notice::ReferenceCreated { reference } => {
                format!("{} {}", "Created reference".green().bold(), reference.display())
            }
            Notice::Mismatch { reference, staged } => format!(
                "{} {}\n  {} {}\n  {} {}",
                "Reference mismatch".red().bold(),
                reference.display(),
                "reference:".dimmed(),
                reference.display(),
                "actual:   ".dimmed(),
                staged.display()
            ),
            Notice::Accepted { reference } => format!(
                "{} {} {}",
                "Accepted".green().bold(),
                reference.display(),
                "(re-run to verify)".dimmed()
            ),
            Notice::Rejected { reference, staged } => format!(
                "{} {}; actual output kept at {}",
                "Rejected".yellow().bold(),
                reference.display(),
                staged.display()
            ),
        }
    }

    /// Preview of a new reference, or `None` when nothing is shown.
    pub fn format_new(
        &self,
        mode: RenderMode,
        reference: &ReferenceFile,
        content: &Comparable,
    ) -> Option<String> {
        if mode == RenderMode::Off {
            return None;
        }
        let body = match content {
            Comparable::Text(_) if mode == RenderMode::Limited => summarize(content, mode),
            Comparable::Text(text) => text.clone(),
            Comparable::Digest(digest) => digest.to_string(),
            Comparable::Image(image) if mode == RenderMode::Limited => image_label(image),
            Comparable::Image(image) => render_grid(image, Some(self.columns)).join("\n"),
        };
        Some(format!(
            "{} {}\n{}",
            format!("[{}]", reference.kind()).cyan(),
            reference.path().display(),
            indent(&body)
        ))
    }

    /// Reference vs actual, or `None` when nothing is shown.
    pub fn format_mismatch(
        &self,
        mode: RenderMode,
        reference: &ReferenceFile,
        expected: &Comparable,
        actual: &Comparable,
    ) -> Option<String> {
        if mode == RenderMode::Off {
            return None;
        }
        let body = match (expected, actual) {
            (Comparable::Text(old), Comparable::Text(new)) => self.text_mismatch(mode, old, new),
            (Comparable::Digest(old), Comparable::Digest(new)) => digest_mismatch(old, new),
            (Comparable::Image(old), Comparable::Image(new)) => {
                self.image_mismatch(mode, old, new)
            }
            _ => format!(
                "{}\n{}",
                summarize(expected, mode).red(),
                summarize(actual, mode).green()
            ),
        };
        Some(format!(
            "{} {}\n{}",
            format!("[{}]", reference.kind()).cyan(),
            reference.path().display(),
            body
        ))
    }

    fn text_mismatch(&self, mode: RenderMode, old: &str, new: &str) -> String {
        if mode == RenderMode::Full {
            return format!(
                "{}\n{}\n{}\n{}",
                "--- reference".red(),
                indent(old),
                "+++ actual".green(),
                indent(new)
            );
        }

        let diff = diff_lines(old, new);
        let mut out: Vec<String> = vec![
            "--- reference".red().to_string(),
            "+++ actual".green().to_string(),
        ];
        let mut shown = 0usize;
        'hunks: for range in hunks(&diff, self.context) {
            out.push(format!("@@ line {} @@", range.start + 1).cyan().to_string());
            for line in &diff[range] {
                if mode == RenderMode::Limited && shown == LIMITED_LINES {
                    out.push("...".dimmed().to_string());
                    break 'hunks;
                }
                out.push(match line {
                    DiffLine::Same(l) => format!(" {}", l),
                    DiffLine::Removed(l) => format!("-{}", l).red().to_string(),
                    DiffLine::Added(l) => format!("+{}", l).green().to_string(),
                });
                shown += 1;
            }
        }
        if shown == 0 {
            // Only trailing newlines or line endings differ.
            out.push(
                "(contents differ only in line endings or trailing newlines)"
                    .dimmed()
                    .to_string(),
            );
        }
        out.join("\n")
    }

    fn image_mismatch(&self, mode: RenderMode, old: &Image, new: &Image) -> String {
        let metrics = if old.dimensions() == new.dimensions() {
            format!(
                "SSIM {:.6}  PSNR {:.2} dB",
                calculate_ssim(old, new),
                calculate_psnr(old, new)
            )
        } else {
            format!(
                "dimensions differ: {}x{} vs {}x{}",
                old.width(),
                old.height(),
                new.width(),
                new.height()
            )
        };
        if mode == RenderMode::Limited {
            return format!("{} -> {}\n{}", image_label(old), image_label(new), metrics);
        }

        // Two previews side by side at half width each.
        let half = (self.columns / 2).max(1);
        let left = render_grid(old, Some(half));
        let right = render_grid(new, Some(half));
        let width = left.iter().map(|l| l.chars().count()).max().unwrap_or(0).max(9);

        let mut out = vec![format!(
            "{:<width$} │ {}",
            "reference",
            "actual",
            width = width
        )];
        for i in 0..left.len().max(right.len()) {
            let l = left.get(i).map(String::as_str).unwrap_or("");
            let r = right.get(i).map(String::as_str).unwrap_or("");
            out.push(format!("{:<width$} │ {}", l, r, width = width));
        }
        out.push(metrics.yellow().to_string());
        out.join("\n")
    }
}

impl Renderer for TerminalRenderer {
    fn announce(&self, notice: &Notice) {
        eprintln!("{}", self.format_notice(notice));
    }

    fn render_new(&self, mode: RenderMode, reference: &ReferenceFile, content: &Comparable) {
        if let Some(text) = self.format_new(mode, reference, content) {
            eprintln!("{}", text);
        }
    }

    fn render_mismatch(
        &self,
        mode: RenderMode,
        reference: &ReferenceFile,
        expected: &Comparable,
        actual: &Comparable,
    ) {
        if let Some(text) = self.format_mismatch(mode, reference, expected, actual) {
            eprintln!("{}", text);
        }
    }
}

fn digest_mismatch(old: &Digest, new: &Digest) -> String {
    format!(
        "{}\n{}",
        format!("-{}", old).red(),
        format!("+{}", new).green()
    )
}

fn image_label(image: &Image) -> String {
    format!("image {}x{}", image.width(), image.height())
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|l| format!("  {}", l))
        .collect::<Vec<_>>()
        .join("\n")
}
