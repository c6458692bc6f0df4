//! Staging directory provider.
//!
//! Mismatched actual outputs are written here instead of over the reference.
//! The directory is resolved once per provider and created on first use.
//! Clones share that resolution, and [`StagingDir::process`] hands out the
//! one provider every environment-configured checker in a process uses:
//!
//! 1. `REFCHECK_STAGING_DIR`, with `~` expanded and made absolute
//! 2. otherwise a fresh temporary directory that is kept after the process
//!    exits, so a failed run can still be inspected

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use crate::error::{CheckError, IoContext};
use crate::kind::absolutize;

/// Environment variable overriding the staging directory.
pub const STAGING_DIR_ENV: &str = "REFCHECK_STAGING_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    Fixed(PathBuf),
    Ephemeral,
}

#[derive(Debug, Default)]
struct Resolved {
    path: OnceLock<PathBuf>,
    /// Held while resolving, so racing threads create one directory.
    init: Mutex<()>,
}

/// Lazily resolved, memoized staging directory.
#[derive(Debug, Clone)]
pub struct StagingDir {
    source: Source,
    resolved: Arc<Resolved>,
}

impl StagingDir {
    /// The process-wide provider, configured from [`STAGING_DIR_ENV`] on
    /// first use. Every call returns a clone sharing one directory.
    pub fn process() -> Self {
        static PROCESS: OnceLock<StagingDir> = OnceLock::new();
        PROCESS.get_or_init(Self::from_env).clone()
    }

    /// Reads [`STAGING_DIR_ENV`] into a new, independent provider.
    pub fn from_env() -> Self {
        Self::from_override(std::env::var(STAGING_DIR_ENV).ok().as_deref())
    }

    /// Uses `value` as the override; `None` or blank falls back to a
    /// temporary directory.
    pub fn from_override(value: Option<&str>) -> Self {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(raw) => Self::at(expand_home(raw)),
            None => Self::ephemeral(),
        }
    }

    /// A fixed directory.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            source: Source::Fixed(path.into()),
            resolved: Arc::default(),
        }
    }

    /// A temporary directory created on first use and never removed.
    pub fn ephemeral() -> Self {
        Self {
            source: Source::Ephemeral,
            resolved: Arc::default(),
        }
    }

    /// Whether the directory comes from an explicit override.
    pub fn is_override(&self) -> bool {
        matches!(self.source, Source::Fixed(_))
    }

    /// Resolves the directory, creating it if it does not exist.
    pub fn path(&self) -> Result<&Path, CheckError> {
        let path = match self.resolved.path.get() {
            Some(path) => path,
            None => {
                let _guard = self
                    .resolved
                    .init
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                match self.resolved.path.get() {
                    Some(path) => path,
                    None => {
                        let path = self.resolve()?;
                        self.resolved.path.get_or_init(|| path)
                    }
                }
            }
        };
        fs::create_dir_all(path).at(path)?;
        Ok(path)
    }

    fn resolve(&self) -> Result<PathBuf, CheckError> {
        match &self.source {
            Source::Fixed(path) => absolutize(path),
            Source::Ephemeral => {
                let temp = tempfile::Builder::new()
                    .prefix("refcheck-")
                    .tempdir()
                    .at(&std::env::temp_dir())?;
                Ok(temp.keep())
            }
        }
    }
}

/// Expands a leading `~` to the home directory.
fn expand_home(raw: &str) -> PathBuf {
    let rest = match raw.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') || rest.starts_with('\\') => rest,
        _ => return PathBuf::from(raw),
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest.trim_start_matches(['/', '\\'])),
        None => PathBuf::from(raw),
    }
}

/// The process-wide staging directory; see [`StagingDir::process`].
pub fn staging_dir() -> Result<PathBuf, CheckError> {
    StagingDir::process().path().map(Path::to_path_buf)
}
