//! Lifecycle tests against stub codecs.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;

use super::*;
use crate::codec::{Codec, CodecRegistry, EncodeOptions};
use crate::equality::Equality;
use crate::error::{CheckError, CodecError};
use crate::kind::{ContentKind, ReferenceFile};
use crate::prompt::Decision;
use crate::render::{Notice, RenderMode, Renderer};
use crate::staging::StagingDir;
use crate::value::{ActualValue, Comparable, Image};

/// Stores the natural text; rejects images.
struct StubText;

impl Codec for StubText {
    fn name(&self) -> &'static str {
        "stub-text"
    }

    fn encode(&self, value: &ActualValue, _: &EncodeOptions) -> Result<Vec<u8>, CodecError> {
        value
            .natural_text()
            .map(String::into_bytes)
            .ok_or_else(|| CodecError::Unsupported("no text form".into()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Comparable, CodecError> {
        String::from_utf8(bytes.to_vec())
            .map(Comparable::Text)
            .map_err(|e| CodecError::Corrupt(e.to_string()))
    }
}

#[derive(Clone, Default)]
struct Recorder {
    events: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl Renderer for Recorder {
    fn announce(&self, notice: &Notice) {
        let tag = match notice {
            Notice::ReferenceCreated { .. } => "created",
            Notice::Mismatch { .. } => "mismatch",
            Notice::Accepted { .. } => "accepted",
            Notice::Rejected { .. } => "rejected",
        };
        self.push(format!("notice:{}", tag));
    }

    fn render_new(&self, mode: RenderMode, _: &ReferenceFile, _: &Comparable) {
        self.push(format!("render_new:{}", mode));
    }

    fn render_mismatch(&self, mode: RenderMode, _: &ReferenceFile, _: &Comparable, _: &Comparable) {
        self.push(format!("render_mismatch:{}", mode));
    }
}

struct Fixture {
    _root: tempfile::TempDir,
    refs: std::path::PathBuf,
    stage: std::path::PathBuf,
    recorder: Recorder,
}

impl Fixture {
    fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let refs = root.path().join("refs");
        let stage = root.path().join("stage");
        Self {
            _root: root,
            refs,
            stage,
            recorder: Recorder::default(),
        }
    }

    fn checker(&self) -> Checker {
        let registry = CodecRegistry::new().with(ContentKind::Text, &[], StubText);
        Checker::new(registry, StagingDir::at(&self.stage)).with_renderer(self.recorder.clone())
    }

    fn reference(&self, name: &str) -> std::path::PathBuf {
        self.refs.join(name)
    }
}

fn always(decision: Decision) -> impl Fn(&Path, &Path) -> io::Result<Decision> + Send + Sync {
    move |_: &Path, _: &Path| Ok(decision)
}

#[test]
fn test_absent_reference_is_created() {
    let fx = Fixture::new();
    let path = fx.reference("nested/dir/text.txt");

    let outcome = fx
        .checker()
        .check(&path, &ActualValue::from("hello"), &CheckOptions::default())
        .unwrap();

    assert_eq!(
        outcome,
        CheckOutcome::ReferenceCreated {
            reference: path.clone()
        }
    );
    assert_eq!(outcome.verdict(), Verdict::Established);
    assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
    assert_eq!(fx.recorder.events(), vec!["notice:created", "render_new:diff"]);
}

#[test]
fn test_second_check_matches_without_side_effects() {
    let fx = Fixture::new();
    let path = fx.reference("text.txt");
    let checker = fx.checker();
    let value = ActualValue::from("hello");

    checker.check(&path, &value, &CheckOptions::default()).unwrap();
    let before = fs::metadata(&path).unwrap().modified().unwrap();
    let outcome = checker.check(&path, &value, &CheckOptions::default()).unwrap();

    assert_eq!(outcome, CheckOutcome::Match);
    assert_eq!(outcome.verdict(), Verdict::Pass);
    assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), before);
    assert!(!fx.stage.exists());
    assert_eq!(fx.recorder.events().len(), 2);
}

#[test]
fn test_mismatch_without_prompt_stages_and_errors() {
    let fx = Fixture::new();
    let path = fx.reference("text.txt");
    fs::create_dir_all(&fx.refs).unwrap();
    fs::write(&path, "hello").unwrap();

    let err = fx
        .checker()
        .check(&path, &ActualValue::from("Hello"), &CheckOptions::default())
        .unwrap_err();

    let staged = fx.stage.join("text.txt");
    match err {
        CheckError::NonInteractiveMismatch {
            reference,
            staged: s,
        } => {
            assert_eq!(reference, path);
            assert_eq!(s, staged);
        }
        other => panic!("expected NonInteractiveMismatch, got {:?}", other),
    }
    assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
    assert_eq!(fs::read_to_string(&staged).unwrap(), "Hello");
    // notice comes before the error
    assert_eq!(
        fx.recorder.events(),
        vec!["notice:mismatch", "render_mismatch:diff"]
    );
}

#[test]
fn test_reject_keeps_reference_and_staged_file() {
    let fx = Fixture::new();
    let path = fx.reference("text.txt");
    fs::create_dir_all(&fx.refs).unwrap();
    fs::write(&path, "hello").unwrap();

    let outcome = fx
        .checker()
        .with_prompt(always(Decision::Reject))
        .check(&path, &ActualValue::from("Hello"), &CheckOptions::default())
        .unwrap();

    let staged = fx.stage.join("text.txt");
    assert_eq!(
        outcome,
        CheckOutcome::Mismatch {
            staged: staged.clone(),
            resolution: Resolution::Rejected
        }
    );
    assert!(outcome.verdict().is_failure());
    assert_eq!(fs::read(&path).unwrap(), b"hello");
    assert!(staged.exists());
    assert_eq!(
        fx.recorder.events(),
        vec!["notice:mismatch", "render_mismatch:diff", "notice:rejected"]
    );
}

#[test]
fn test_accept_replaces_reference() {
    let fx = Fixture::new();
    let path = fx.reference("text.txt");
    fs::create_dir_all(&fx.refs).unwrap();
    fs::write(&path, "hello").unwrap();
    let checker = fx.checker().with_prompt(always(Decision::Accept));

    let outcome = checker
        .check(&path, &ActualValue::from("Hello"), &CheckOptions::default())
        .unwrap();

    assert_eq!(outcome.verdict(), Verdict::Established);
    assert_eq!(fs::read_to_string(&path).unwrap(), "Hello");
    assert!(!outcome.staged().unwrap().exists());
    assert_eq!(
        fx.recorder.events().last().map(String::as_str),
        Some("notice:accepted")
    );

    let again = checker
        .check(&path, &ActualValue::from("Hello"), &CheckOptions::default())
        .unwrap();
    assert_eq!(again, CheckOutcome::Match);
}

#[test]
fn test_prompt_receives_reference_and_staged_paths() {
    let fx = Fixture::new();
    let path = fx.reference("text.txt");
    fs::create_dir_all(&fx.refs).unwrap();
    fs::write(&path, "hello").unwrap();
    let seen = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&seen);

    fx.checker()
        .with_prompt(move |reference: &Path, staged: &Path| -> io::Result<Decision> {
            *sink.lock().unwrap() = Some((reference.to_path_buf(), staged.to_path_buf()));
            Ok(Decision::Reject)
        })
        .check(&path, &ActualValue::from("Hello"), &CheckOptions::default())
        .unwrap();

    let (reference, staged) = seen.lock().unwrap().clone().unwrap();
    assert_eq!(reference, path);
    assert_eq!(staged, fx.stage.join("text.txt"));
}

#[test]
fn test_prompt_failure_is_io_error() {
    let fx = Fixture::new();
    let path = fx.reference("text.txt");
    fs::create_dir_all(&fx.refs).unwrap();
    fs::write(&path, "hello").unwrap();

    let err = fx
        .checker()
        .with_prompt(|_: &Path, _: &Path| -> io::Result<Decision> {
            Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed"))
        })
        .check(&path, &ActualValue::from("Hello"), &CheckOptions::default())
        .unwrap_err();

    assert!(matches!(err, CheckError::Io { .. }));
    assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
}

#[test]
fn test_override_equality_wins() {
    let fx = Fixture::new();
    let path = fx.reference("text.txt");
    fs::create_dir_all(&fx.refs).unwrap();
    fs::write(&path, "hello").unwrap();

    let options = CheckOptions::new().by_text(|r, a| r.eq_ignore_ascii_case(a));
    let outcome = fx
        .checker()
        .check(&path, &ActualValue::from("Hello"), &options)
        .unwrap();

    assert_eq!(outcome, CheckOutcome::Match);
    assert!(!fx.stage.exists());
}

#[test]
fn test_corrupt_reference_is_not_staged() {
    let fx = Fixture::new();
    let path = fx.reference("text.txt");
    fs::create_dir_all(&fx.refs).unwrap();
    fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

    let err = fx
        .checker()
        .with_prompt(always(Decision::Accept))
        .check(&path, &ActualValue::from("hello"), &CheckOptions::default())
        .unwrap_err();

    assert!(matches!(err, CheckError::CorruptReference { .. }));
    assert_eq!(fs::read(&path).unwrap(), vec![0xff, 0xfe, 0x00]);
    assert!(!fx.stage.exists());
    assert!(fx.recorder.events().is_empty());
}

#[test]
fn test_unsupported_value_writes_nothing() {
    let fx = Fixture::new();
    let path = fx.reference("picture.bin");
    let registry = CodecRegistry::new()
        .with(ContentKind::Text, &[], StubText)
        .with(ContentKind::Image, &[], StubText);
    let checker = Checker::new(registry, StagingDir::at(&fx.stage));

    let err = checker
        .check(
            &path,
            &ActualValue::from(Image::filled(2, 2, [0, 0, 0, 255])),
            &CheckOptions::default(),
        )
        .unwrap_err();

    match err {
        CheckError::UnsupportedValue { path: p, .. } => assert_eq!(p, Some(path.clone())),
        other => panic!("expected UnsupportedValue, got {:?}", other),
    }
    assert!(!path.exists());
}

#[test]
fn test_missing_codec() {
    let fx = Fixture::new();
    let err = fx
        .checker()
        .check(
            fx.reference("picture.png"),
            &ActualValue::from(Image::filled(1, 1, [0, 0, 0, 255])),
            &CheckOptions::default(),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        CheckError::NoCodec {
            kind: ContentKind::Image,
            ..
        }
    ));
}

#[test]
fn test_render_mode_precedence() {
    let fx = Fixture::new();
    let checker = fx.checker().with_render_mode(Some(RenderMode::Full));

    checker
        .check(fx.reference("a.txt"), &ActualValue::from("a"), &CheckOptions::default())
        .unwrap();
    checker
        .check(
            fx.reference("b.txt"),
            &ActualValue::from("b"),
            &CheckOptions::new().render(RenderMode::Off),
        )
        .unwrap();

    assert_eq!(
        fx.recorder.events(),
        vec![
            "notice:created",
            "render_new:full",
            "notice:created",
            "render_new:off"
        ]
    );
}

#[test]
fn test_resolver_follows_registered_hash_extensions() {
    let registry = CodecRegistry::new()
        .with(ContentKind::Hash, &["digest"], StubText)
        .with(ContentKind::Text, &[], StubText);
    let checker = Checker::new(registry, StagingDir::ephemeral());
    assert!(checker.resolver().is_hash_path(Path::new("a.digest")));
    assert!(!checker.resolver().is_hash_path(Path::new("a.sha256")));
    assert!(!checker.is_interactive());
}

#[test]
fn test_from_settings_respects_interactivity() {
    let settings = |interactive| crate::settings::Settings {
        staging: StagingDir::ephemeral(),
        interactive,
        render: Some(RenderMode::Off),
    };
    let registry = CodecRegistry::new().with(ContentKind::Text, &[], StubText);

    let checker = Checker::from_settings(
        registry.clone(),
        settings(false),
        Some(Box::new(always(Decision::Accept))),
    );
    assert!(!checker.is_interactive());

    let checker = Checker::from_settings(
        registry,
        settings(true),
        Some(Box::new(always(Decision::Accept))),
    );
    assert!(checker.is_interactive());
}

#[test]
fn test_custom_predicate_receives_reference_first() {
    let equality = Equality::new(|reference, actual| {
        reference.as_text() == Some("old") && actual.as_text() == Some("new")
    });
    let fx = Fixture::new();
    let path = fx.reference("order.txt");
    fs::create_dir_all(&fx.refs).unwrap();
    fs::write(&path, "old").unwrap();

    let outcome = fx
        .checker()
        .check(&path, &ActualValue::from("new"), &CheckOptions::new().by(equality))
        .unwrap();
    assert_eq!(outcome, CheckOutcome::Match);
}
