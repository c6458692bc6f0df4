//! Codec capability, codec registry and atomic file writes.
//!
//! The engine never encodes anything itself: it asks the registry for the
//! codec matching a reference's kind and extension, and uses it for both the
//! reference and the actual value so the two always decode into the same
//! comparable form.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use tempfile::NamedTempFile;

use crate::error::{CheckError, CodecError};
use crate::kind::{ContentKind, ReferenceFile};
use crate::value::{ActualValue, Comparable};

/// Default column budget of text-rendered image references.
pub const DEFAULT_TEXT_IMAGE_COLUMNS: u32 = 64;

/// Per-check encoding options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Maximum width, in characters, of text-rendered images. `None` keeps
    /// the native width.
    pub text_columns: Option<u32>,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            text_columns: Some(DEFAULT_TEXT_IMAGE_COLUMNS),
        }
    }
}

/// How [`Codec::save`] treats an existing file at the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// Atomically replace whatever is there.
    Replace,
    /// Atomically create; leave an existing file untouched.
    CreateNew,
}

/// Result of [`Codec::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Saved {
    Written,
    /// Only for [`SaveMode::CreateNew`]: another writer got there first.
    AlreadyExists,
}

/// Encode/decode/save capability for one content kind.
pub trait Codec: Send + Sync {
    /// Short identifier used in notices and errors.
    fn name(&self) -> &'static str;

    /// Encodes `value` into the bytes stored on disk.
    fn encode(&self, value: &ActualValue, options: &EncodeOptions) -> Result<Vec<u8>, CodecError>;

    /// Decodes stored bytes into their comparable form.
    fn decode(&self, bytes: &[u8]) -> Result<Comparable, CodecError>;

    /// Writes encoded bytes to `path` without ever exposing a partial file.
    fn save(&self, path: &Path, encoded: &[u8], mode: SaveMode) -> io::Result<Saved> {
        match mode {
            SaveMode::Replace => write_atomic(path, encoded).map(|()| Saved::Written),
            SaveMode::CreateNew => write_new_atomic(path, encoded).map(|created| {
                if created {
                    Saved::Written
                } else {
                    Saved::AlreadyExists
                }
            }),
        }
    }
}

struct CodecEntry {
    kind: ContentKind,
    /// Lowercased extensions; empty means fallback for the kind.
    extensions: Vec<String>,
    codec: Arc<dyn Codec>,
}

/// Maps (content kind, extension) to a codec.
///
/// Lookup prefers an entry listing the reference's extension, then the
/// kind's fallback entry. Later registrations shadow earlier ones.
#[derive(Default, Clone)]
pub struct CodecRegistry {
    entries: Vec<Arc<CodecEntry>>,
}

impl std::fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut list = f.debug_list();
        for entry in &self.entries {
            list.entry(&(entry.kind, &entry.extensions, entry.codec.name()));
        }
        list.finish()
    }
}

impl CodecRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `codec` for `kind` and the given extensions.
    ///
    /// An empty extension list makes the codec the kind's fallback.
    pub fn register<C>(&mut self, kind: ContentKind, extensions: &[&str], codec: C) -> &mut Self
    where
        C: Codec + 'static,
    {
        self.entries.push(Arc::new(CodecEntry {
            kind,
            extensions: extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            codec: Arc::new(codec),
        }));
        self
    }

    /// Builder form of [`CodecRegistry::register`].
    pub fn with<C>(mut self, kind: ContentKind, extensions: &[&str], codec: C) -> Self
    where
        C: Codec + 'static,
    {
        self.register(kind, extensions, codec);
        self
    }

    /// Extensions explicitly registered for `kind`.
    pub fn extensions(&self, kind: ContentKind) -> Vec<String> {
        let mut out: Vec<String> = self
            .entries
            .iter()
            .filter(|e| e.kind == kind)
            .flat_map(|e| e.extensions.iter().cloned())
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// Looks up a codec by kind and optional extension.
    pub fn lookup(&self, kind: ContentKind, extension: Option<&str>) -> Option<&dyn Codec> {
        let same_kind = || self.entries.iter().rev().filter(move |e| e.kind == kind);
        if let Some(ext) = extension {
            let ext = ext.to_ascii_lowercase();
            if let Some(entry) = same_kind().find(|e| e.extensions.contains(&ext)) {
                return Some(entry.codec.as_ref());
            }
        }
        same_kind()
            .find(|e| e.extensions.is_empty())
            .map(|e| e.codec.as_ref())
    }

    /// The codec for a resolved reference.
    pub fn codec_for(&self, reference: &ReferenceFile) -> Result<&dyn Codec, CheckError> {
        self.lookup(reference.kind(), reference.extension().as_deref())
            .ok_or_else(|| CheckError::NoCodec {
                kind: reference.kind(),
                path: reference.path().to_path_buf(),
            })
    }
}

/// Writes `data` to a temp file next to `path`, then renames it into place.
pub fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let temp = staged_temp(path, data)?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Like [`write_atomic`], but never replaces an existing file.
///
/// Returns `Ok(false)` when `path` already exists; the existing file is left
/// untouched.
pub fn write_new_atomic(path: &Path, data: &[u8]) -> io::Result<bool> {
    let temp = staged_temp(path, data)?;
    match temp.persist_noclobber(path) {
        Ok(_) => Ok(true),
        Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e.error),
    }
}

/// Atomically replaces `dest` with the contents of `src`, then removes `src`.
///
/// Works across filesystems: the bytes are copied into a temp file in
/// `dest`'s directory and renamed from there.
pub fn replace_atomic(src: &Path, dest: &Path) -> io::Result<()> {
    let data = fs::read(src)?;
    write_atomic(dest, &data)?;
    fs::remove_file(src)
}

fn staged_temp(path: &Path, data: &[u8]) -> io::Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut temp = tempfile::Builder::new()
        .prefix(".refcheck-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    temp.write_all(data)?;
    temp.as_file().sync_all()?;
    Ok(temp)
}
