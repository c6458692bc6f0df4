//! Golden-file reference testing.
//!
//! Checks a value produced by code under test against a reference file on
//! disk. Missing references are created; mismatches are never written over
//! the reference but staged for review, and in an interactive session the
//! operator can accept or reject them on the spot.
//!
//! ```rust,no_run
//! use refcheck::{assert_reference, check_reference, CheckOptions};
//!
//! // Hash reference: only the digest of the canonical JSON is stored.
//! assert_reference("tests/refs/answer.sha256", 1338);
//!
//! // Text reference with a custom predicate.
//! let options = CheckOptions::new().by_text(|reference, actual| reference.eq_ignore_ascii_case(actual));
//! check_reference("tests/refs/greeting.txt", "Hello", &options).unwrap();
//! ```
//!
//! # Configuration
//!
//! | Variable               | Effect                                                  |
//! |------------------------|---------------------------------------------------------|
//! | `REFCHECK_STAGING_DIR` | Where mismatches are staged (default: a kept temp dir)  |
//! | `REFCHECK_INTERACTIVE` | `1` forces the prompt, `0` disables it                  |
//! | `REFCHECK_RENDER`      | `off`, `limited`, `full` or `diff` for every kind       |

pub mod console;
pub mod diff;
pub mod terminal;

use std::path::Path;
use std::sync::OnceLock;

pub use console::ConsolePrompt;
pub use terminal::TerminalRenderer;

pub use refcheck_codecs::{default_registry, HashCodec, PngCodec, TextCodec, TextImageCodec};
pub use refcheck_core::{
    ActualValue, CheckError, CheckOptions, CheckOutcome, Checker, Codec, CodecRegistry,
    Comparable, ContentKind, Decision, Equality, Image, ImageLike, ImageMetric, Prompt,
    RenderMode, Renderer, Resolution, Settings, StagingDir, Verdict,
};

/// A checker configured from the environment: default codecs, colored
/// output, and the console prompt when the session is interactive.
pub fn checker_from_env() -> Checker {
    checker_from_settings(Settings::from_env())
}

/// Like [`checker_from_env`] with explicit settings.
pub fn checker_from_settings(settings: Settings) -> Checker {
    Checker::from_settings(default_registry(), settings, Some(Box::new(ConsolePrompt)))
        .with_renderer(TerminalRenderer::new())
}

/// The process-wide checker, built from the environment on first use.
pub fn global_checker() -> &'static Checker {
    static CHECKER: OnceLock<Checker> = OnceLock::new();
    CHECKER.get_or_init(checker_from_env)
}

/// Checks `actual` against the reference at `path` with the process-wide
/// checker.
pub fn check_reference(
    path: impl AsRef<Path>,
    actual: impl Into<ActualValue>,
    options: &CheckOptions,
) -> Result<CheckOutcome, CheckError> {
    global_checker().check(path, &actual.into(), options)
}

/// [`check_reference`] with default options, panicking on failure.
///
/// # Panics
///
/// When the check errors or a mismatch is rejected.
#[track_caller]
pub fn assert_reference(path: impl AsRef<Path>, actual: impl Into<ActualValue>) {
    assert_reference_with(path, actual, &CheckOptions::default())
}

/// [`assert_reference`] with options.
#[track_caller]
pub fn assert_reference_with(
    path: impl AsRef<Path>,
    actual: impl Into<ActualValue>,
    options: &CheckOptions,
) {
    let path = path.as_ref();
    if let Err(message) = verdict_message(path, check_reference(path, actual, options)) {
        panic!("{}", message);
    }
}

/// Turns a check result into `Ok(())` or an assertion message.
pub fn verdict_message(
    path: &Path,
    result: Result<CheckOutcome, CheckError>,
) -> Result<(), String> {
    match result {
        Ok(outcome) if !outcome.verdict().is_failure() => Ok(()),
        Ok(outcome) => Err(match outcome.staged() {
            Some(staged) => format!(
                "reference {} does not match; rejected output kept at {}",
                path.display(),
                staged.display()
            ),
            None => format!("reference {} does not match", path.display()),
        }),
        Err(e) => Err(format!("reference check failed: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_verdict_message() {
        let path = Path::new("/refs/a.txt");
        assert!(verdict_message(path, Ok(CheckOutcome::Match)).is_ok());
        assert!(verdict_message(
            path,
            Ok(CheckOutcome::ReferenceCreated {
                reference: path.to_path_buf()
            })
        )
        .is_ok());

        let rejected = CheckOutcome::Mismatch {
            staged: PathBuf::from("/stage/a.txt"),
            resolution: Resolution::Rejected,
        };
        let message = verdict_message(path, Ok(rejected)).unwrap_err();
        assert!(message.contains("/refs/a.txt"));
        assert!(message.contains("/stage/a.txt"));

        let err = CheckError::NonInteractiveMismatch {
            reference: path.to_path_buf(),
            staged: PathBuf::from("/stage/a.txt"),
        };
        let message = verdict_message(path, Err(err)).unwrap_err();
        assert!(message.contains("REFCHECK_INTERACTIVE=1"));
    }

    #[test]
    fn test_checker_from_settings_non_interactive() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            staging: StagingDir::at(dir.path().join("stage")),
            interactive: false,
            render: Some(RenderMode::Off),
        };
        let checker = checker_from_settings(settings);
        assert!(!checker.is_interactive());

        let path = dir.path().join("refs").join("n.sha256");
        let outcome = checker
            .check(&path, &ActualValue::from(1338), &CheckOptions::default())
            .unwrap();
        assert_eq!(outcome.verdict(), Verdict::Established);
        assert_eq!(fs_len(&path), 65);
    }

    #[test]
    fn test_global_checker_stages_into_process_staging_dir() {
        let staged_into = global_checker().staging().path().unwrap().to_path_buf();
        assert_eq!(refcheck_core::staging_dir().unwrap(), staged_into);
        assert_eq!(
            checker_from_env().staging().path().unwrap(),
            staged_into.as_path()
        );
    }

    fn fs_len(path: &Path) -> u64 {
        std::fs::metadata(path).unwrap().len()
    }
}
