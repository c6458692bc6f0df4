//! Error types for reference checks.
//!
//! Every variant aborts only the check that raised it. None of them is ever
//! produced after a partial write to a reference file.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::kind::ContentKind;

/// Top-level error type for a reference check.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The value cannot be represented in the resolved content kind.
    #[error("unsupported value{}: {reason}", location(.path.as_deref()))]
    UnsupportedValue {
        /// Reference the value was being encoded for, if already resolved.
        path: Option<PathBuf>,
        /// Why the value could not be encoded.
        reason: String,
    },

    /// An existing reference file cannot be decoded for its kind.
    #[error("corrupt reference {}: {reason}", path.display())]
    CorruptReference {
        /// Path of the unreadable reference.
        path: PathBuf,
        /// Decoder message.
        reason: String,
    },

    /// A mismatch was staged but nobody is available to accept or reject it.
    #[error(
        "reference {} does not match; actual output staged at {}. \
         Re-run interactively (REFCHECK_INTERACTIVE=1) to accept or reject it",
        reference.display(),
        staged.display()
    )]
    NonInteractiveMismatch {
        /// Reference that failed the comparison.
        reference: PathBuf,
        /// Where the actual output was staged.
        staged: PathBuf,
    },

    /// No codec is registered for the resolved kind and extension.
    #[error("no {kind} codec registered for {}", path.display())]
    NoCodec {
        /// Resolved content kind.
        kind: ContentKind,
        /// Reference path whose extension was looked up.
        path: PathBuf,
    },

    /// Filesystem failure while creating, reading, staging or replacing a file.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path the operation was acting on.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}

fn location(path: Option<&Path>) -> String {
    match path {
        Some(p) => format!(" for {}", p.display()),
        None => String::new(),
    }
}

impl CheckError {
    /// Creates an [`CheckError::UnsupportedValue`] not yet tied to a reference.
    pub fn unsupported(reason: impl Into<String>) -> Self {
        Self::UnsupportedValue {
            path: None,
            reason: reason.into(),
        }
    }

    /// Returns true if this error came from a staged mismatch.
    pub fn is_mismatch(&self) -> bool {
        matches!(self, Self::NonInteractiveMismatch { .. })
    }
}

/// Errors reported by a [`Codec`](crate::codec::Codec).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    /// The value has no representation in this codec.
    #[error("{0}")]
    Unsupported(String),

    /// The bytes are not valid for this codec.
    #[error("{0}")]
    Corrupt(String),
}

/// Attaches the offending path to an [`io::Error`].
pub trait IoContext<T> {
    /// Maps the error into [`CheckError::Io`] at `path`.
    fn at(self, path: &Path) -> Result<T, CheckError>;
}

impl<T> IoContext<T> for io::Result<T> {
    fn at(self, path: &Path) -> Result<T, CheckError> {
        self.map_err(|source| CheckError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
