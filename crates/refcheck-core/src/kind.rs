//! Content kinds, reference files and the format resolver.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{CheckError, IoContext};
use crate::value::ActualValue;

/// The closed set of content kinds a reference can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContentKind {
    /// Digest of the canonical serialization of the value.
    Hash,
    /// Pixel grid, compared perceptually.
    Image,
    /// Text, compared exactly. The fallback kind.
    Text,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Hash => "hash",
            ContentKind::Image => "image",
            ContentKind::Text => "text",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reference file and the kind resolved for it.
///
/// The kind is fixed for the lifetime of one check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceFile {
    path: PathBuf,
    kind: ContentKind,
}

impl ReferenceFile {
    /// Creates a reference file. `path` should already be absolute.
    pub fn new(path: PathBuf, kind: ContentKind) -> Self {
        Self { path, kind }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    /// Lowercased extension, if any.
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.path)
    }
}

/// Lowercased extension of `path`.
pub(crate) fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Selects the content kind for a reference path and an actual value.
///
/// Rules, in priority order:
/// 1. the extension is a hash suffix: [`ContentKind::Hash`]
/// 2. the value is image-like: [`ContentKind::Image`]
/// 3. otherwise: [`ContentKind::Text`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatResolver {
    hash_suffixes: BTreeSet<String>,
}

impl Default for FormatResolver {
    fn default() -> Self {
        Self::new(["sha256", "blake3", "hash"])
    }
}

impl FormatResolver {
    /// Creates a resolver that treats `hash_suffixes` as hash references.
    pub fn new<I, S>(hash_suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            hash_suffixes: hash_suffixes
                .into_iter()
                .map(|s| s.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    /// Whether `path` ends in one of the hash suffixes.
    pub fn is_hash_path(&self, path: &Path) -> bool {
        extension_of(path).is_some_and(|ext| self.hash_suffixes.contains(&ext))
    }

    /// The hash suffixes this resolver recognizes, sorted.
    pub fn hash_suffixes(&self) -> impl Iterator<Item = &str> {
        self.hash_suffixes.iter().map(String::as_str)
    }

    /// Resolves the content kind. Deterministic and side-effect free.
    pub fn kind_for(&self, path: &Path, value: &ActualValue) -> ContentKind {
        if self.is_hash_path(path) {
            ContentKind::Hash
        } else if value.is_image_like() {
            ContentKind::Image
        } else {
            ContentKind::Text
        }
    }

    /// Resolves `path` against the current directory and determines its kind.
    pub fn resolve(&self, path: &Path, value: &ActualValue) -> Result<ReferenceFile, CheckError> {
        let absolute = absolutize(path)?;
        let kind = self.kind_for(&absolute, value);
        Ok(ReferenceFile::new(absolute, kind))
    }
}

/// Makes `path` absolute without touching the filesystem beyond the cwd lookup.
pub(crate) fn absolutize(path: &Path) -> Result<PathBuf, CheckError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().at(path)?;
    Ok(cwd.join(path))
}
