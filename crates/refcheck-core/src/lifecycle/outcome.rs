//! Check outcomes and verdicts.

use std::path::{Path, PathBuf};

/// How a staged mismatch was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The staged output replaced the reference.
    Accepted,
    /// The reference was kept.
    Rejected,
}

/// What a check reports to the caller's test framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The actual value matched the reference.
    Pass,
    /// A reference was established (created or accepted); nothing was compared.
    Established,
    /// The actual value did not match.
    Fail,
}

impl Verdict {
    pub fn is_failure(&self) -> bool {
        matches!(self, Verdict::Fail)
    }
}

/// Result of a completed check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The reference did not exist and was written.
    ReferenceCreated { reference: PathBuf },
    /// The actual value matched the reference.
    Match,
    /// The actual value was staged and the operator resolved the mismatch.
    ///
    /// After an accept the staged file has been moved onto the reference and
    /// `staged` no longer exists.
    Mismatch {
        staged: PathBuf,
        resolution: Resolution,
    },
}

impl CheckOutcome {
    pub fn verdict(&self) -> Verdict {
        match self {
            CheckOutcome::Match => Verdict::Pass,
            CheckOutcome::ReferenceCreated { .. } => Verdict::Established,
            CheckOutcome::Mismatch {
                resolution: Resolution::Accepted,
                ..
            } => Verdict::Established,
            CheckOutcome::Mismatch {
                resolution: Resolution::Rejected,
                ..
            } => Verdict::Fail,
        }
    }

    /// Where the actual output was staged, for mismatches.
    pub fn staged(&self) -> Option<&Path> {
        match self {
            CheckOutcome::Mismatch { staged, .. } => Some(staged),
            _ => None,
        }
    }
}
