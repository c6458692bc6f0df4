//! Renderer capability and user notices.
//!
//! The engine decides *what* to tell the user; a [`Renderer`] decides how it
//! looks. Every notice is announced before any prompt or error.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::kind::{ContentKind, ReferenceFile};
use crate::value::Comparable;

/// How much of a reference to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Nothing.
    Off,
    /// A compact preview.
    Limited,
    /// The whole content.
    Full,
    /// A diff of reference against actual; same as `Full` for new references.
    Diff,
}

impl RenderMode {
    /// Default mode for a content kind.
    pub fn default_for(kind: ContentKind) -> Self {
        match kind {
            ContentKind::Text => RenderMode::Diff,
            ContentKind::Image => RenderMode::Full,
            ContentKind::Hash => RenderMode::Limited,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RenderMode::Off => "off",
            RenderMode::Limited => "limited",
            RenderMode::Full => "full",
            RenderMode::Diff => "diff",
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "none" => Ok(RenderMode::Off),
            "limited" => Ok(RenderMode::Limited),
            "full" => Ok(RenderMode::Full),
            "diff" => Ok(RenderMode::Diff),
            other => Err(format!(
                "unknown render mode '{}' (expected off, limited, full or diff)",
                other
            )),
        }
    }
}

/// A user-facing event of the reference lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A missing reference was written.
    ReferenceCreated { reference: PathBuf },
    /// The actual output differs and was staged.
    Mismatch { reference: PathBuf, staged: PathBuf },
    /// The staged output replaced the reference.
    Accepted { reference: PathBuf },
    /// The operator kept the reference; the staged output stays for inspection.
    Rejected { reference: PathBuf, staged: PathBuf },
}

impl Notice {
    /// The reference the notice is about.
    pub fn reference(&self) -> &Path {
        match self {
            Notice::ReferenceCreated { reference }
            | Notice::Mismatch { reference, .. }
            | Notice::Accepted { reference }
            | Notice::Rejected { reference, .. } => reference,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::ReferenceCreated { reference } => {
                write!(f, "created new reference {}", reference.display())
            }
            Notice::Mismatch { reference, staged } => write!(
                f,
                "reference {} does not match\n  reference: {}\n  actual:    {}",
                reference.display(),
                reference.display(),
                staged.display()
            ),
            Notice::Accepted { reference } => write!(
                f,
                "replaced reference {}; re-run to verify",
                reference.display()
            ),
            Notice::Rejected { reference, staged } => write!(
                f,
                "kept reference {}; actual output left at {}",
                reference.display(),
                staged.display()
            ),
        }
    }
}

/// Presents references to a human.
pub trait Renderer: Send + Sync {
    /// Reports a lifecycle event. Prints the plain message to stderr by
    /// default.
    fn announce(&self, notice: &Notice) {
        eprintln!("refcheck: {}", notice);
    }

    /// Shows a freshly created reference.
    fn render_new(&self, mode: RenderMode, reference: &ReferenceFile, content: &Comparable);

    /// Shows a reference next to the mismatching actual output.
    fn render_mismatch(
        &self,
        mode: RenderMode,
        reference: &ReferenceFile,
        expected: &Comparable,
        actual: &Comparable,
    );
}

/// Announces notices and renders nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentRenderer;

impl Renderer for SilentRenderer {
    fn announce(&self, _notice: &Notice) {}

    fn render_new(&self, _: RenderMode, _: &ReferenceFile, _: &Comparable) {}

    fn render_mismatch(&self, _: RenderMode, _: &ReferenceFile, _: &Comparable, _: &Comparable) {}
}

/// Uncolored stderr output.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainRenderer;

impl Renderer for PlainRenderer {
    fn render_new(&self, mode: RenderMode, reference: &ReferenceFile, content: &Comparable) {
        if mode == RenderMode::Off {
            return;
        }
        eprintln!("--- {} ({}) ---", reference.path().display(), reference.kind());
        eprintln!("{}", summarize(content, mode));
    }

    fn render_mismatch(
        &self,
        mode: RenderMode,
        reference: &ReferenceFile,
        expected: &Comparable,
        actual: &Comparable,
    ) {
        if mode == RenderMode::Off {
            return;
        }
        eprintln!("--- reference {} ---", reference.path().display());
        eprintln!("{}", summarize(expected, mode));
        eprintln!("--- actual ---");
        eprintln!("{}", summarize(actual, mode));
    }
}

/// Number of lines shown in [`RenderMode::Limited`].
pub const LIMITED_LINES: usize = 20;

/// A plain-text description of `content`.
pub fn summarize(content: &Comparable, mode: RenderMode) -> String {
    match content {
        Comparable::Text(text) if mode == RenderMode::Limited => {
            let lines: Vec<&str> = text.lines().collect();
            if lines.len() <= LIMITED_LINES {
                return text.clone();
            }
            format!(
                "{}\n... {} more lines",
                lines[..LIMITED_LINES].join("\n"),
                lines.len() - LIMITED_LINES
            )
        }
        Comparable::Text(text) => text.clone(),
        Comparable::Digest(digest) => digest.to_string(),
        Comparable::Image(image) => format!("image {}x{}", image.width(), image.height()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Digest, DigestAlgorithm, Image};

    #[test]
    fn test_render_mode_parse() {
        assert_eq!("Diff".parse::<RenderMode>().unwrap(), RenderMode::Diff);
        assert_eq!("none".parse::<RenderMode>().unwrap(), RenderMode::Off);
        assert!("loud".parse::<RenderMode>().is_err());
    }

    #[test]
    fn test_default_modes() {
        assert_eq!(RenderMode::default_for(ContentKind::Text), RenderMode::Diff);
        assert_eq!(RenderMode::default_for(ContentKind::Image), RenderMode::Full);
        assert_eq!(RenderMode::default_for(ContentKind::Hash), RenderMode::Limited);
    }

    #[test]
    fn test_mismatch_notice_names_both_paths() {
        let notice = Notice::Mismatch {
            reference: PathBuf::from("/refs/out.sha256"),
            staged: PathBuf::from("/stage/out.sha256"),
        };
        let text = notice.to_string();
        assert!(text.contains("/refs/out.sha256"));
        assert!(text.contains("/stage/out.sha256"));
        assert_eq!(notice.reference(), Path::new("/refs/out.sha256"));
    }

    #[test]
    fn test_summarize_limited_text() {
        let text: String = (0..25).map(|i| format!("line {}\n", i)).collect();
        let summary = summarize(&Comparable::Text(text), RenderMode::Limited);
        assert!(summary.starts_with("line 0\n"));
        assert!(summary.contains("line 19"));
        assert!(!summary.contains("line 20\n"));
        assert!(summary.ends_with("... 5 more lines"));
    }

    #[test]
    fn test_summarize_other_forms() {
        let digest = Digest::new(DigestAlgorithm::Blake3, vec![0xab; 32]);
        assert!(summarize(&Comparable::Digest(digest), RenderMode::Full).starts_with("blake3:abab"));
        let image = Image::filled(3, 2, [0, 0, 0, 255]);
        assert_eq!(
            summarize(&Comparable::Image(image), RenderMode::Full),
            "image 3x2"
        );
    }
}
