//! Test fixtures: a scratch workspace, a scripted prompt and a renderer that
//! records what it was asked to show.

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use refcheck_core::{
    Checker, Comparable, ContentKind, Decision, Notice, Prompt, ReferenceFile, RenderMode,
    Renderer, StagingDir,
};

/// Something a [`RecordingRenderer`] saw.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Notice(Notice),
    RenderNew(RenderMode, ContentKind),
    RenderMismatch(RenderMode, ContentKind),
}

/// Renderer that keeps every call for later assertions.
///
/// Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Only the notices, in order.
    pub fn notices(&self) -> Vec<Notice> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Notice(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }

    fn push(&self, event: Event) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl Renderer for RecordingRenderer {
    fn announce(&self, notice: &Notice) {
        self.push(Event::Notice(notice.clone()));
    }

    fn render_new(&self, mode: RenderMode, reference: &ReferenceFile, _content: &Comparable) {
        self.push(Event::RenderNew(mode, reference.kind()));
    }

    fn render_mismatch(
        &self,
        mode: RenderMode,
        reference: &ReferenceFile,
        _expected: &Comparable,
        _actual: &Comparable,
    ) {
        self.push(Event::RenderMismatch(mode, reference.kind()));
    }
}

/// Prompt that answers from a script and records what it was asked.
///
/// Answers `Reject` once the script runs out. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompt {
    answers: Arc<Mutex<VecDeque<Decision>>>,
    asked: Arc<Mutex<Vec<(PathBuf, PathBuf)>>>,
}

impl ScriptedPrompt {
    pub fn new(answers: impl IntoIterator<Item = Decision>) -> Self {
        Self {
            answers: Arc::new(Mutex::new(answers.into_iter().collect())),
            asked: Arc::default(),
        }
    }

    /// `(reference, staged)` pairs, in the order they were asked about.
    pub fn asked(&self) -> Vec<(PathBuf, PathBuf)> {
        self.asked.lock().map(|a| a.clone()).unwrap_or_default()
    }
}

impl Prompt for ScriptedPrompt {
    fn decide(&self, reference: &Path, staged: &Path) -> io::Result<Decision> {
        self.asked
            .lock()
            .map_err(|_| io::Error::other("prompt log poisoned"))?
            .push((reference.to_path_buf(), staged.to_path_buf()));
        let next = self
            .answers
            .lock()
            .map_err(|_| io::Error::other("prompt script poisoned"))?
            .pop_front();
        Ok(next.unwrap_or(Decision::Reject))
    }
}

/// A scratch directory holding references and a staging area.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create workspace dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of a reference, relative to the workspace root.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn staging_path(&self) -> PathBuf {
        self.dir.path().join("staging")
    }

    /// Path a mismatch for `reference` is staged at.
    pub fn staged(&self, reference: &str) -> PathBuf {
        let name = Path::new(reference)
            .file_name()
            .expect("reference has a file name");
        self.staging_path().join(name)
    }

    pub fn write(&self, relative: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(&path, contents).expect("Failed to write fixture");
        path
    }

    pub fn read(&self, relative: &str) -> Vec<u8> {
        fs::read(self.path(relative)).expect("Failed to read reference")
    }

    pub fn read_to_string(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).expect("Failed to read reference")
    }

    /// Non-interactive checker with the default codecs, staging inside the
    /// workspace.
    pub fn checker(&self, renderer: &RecordingRenderer) -> Checker {
        Checker::new(
            refcheck_codecs::default_registry(),
            StagingDir::at(self.staging_path()),
        )
        .with_renderer(renderer.clone())
    }

    /// Like [`Workspace::checker`] with a prompt installed.
    pub fn interactive_checker(&self, renderer: &RecordingRenderer, prompt: &ScriptedPrompt) -> Checker {
        self.checker(renderer).with_prompt(prompt.clone())
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}
