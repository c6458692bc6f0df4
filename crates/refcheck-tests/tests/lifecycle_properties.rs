//! Lifecycle properties: creation is idempotent, references only change
//! through an explicit accept, and every transition is announced.

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use refcheck_core::{
    ActualValue, CheckError, CheckOptions, CheckOutcome, ContentKind, Decision, Notice,
    RenderMode, Resolution, Verdict,
};
use refcheck_tests::{Event, RecordingRenderer, ScriptedPrompt, Workspace};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_creation_is_idempotent(text in "[a-zA-Z0-9 \n]{0,64}") {
        let ws = Workspace::new();
        let renderer = RecordingRenderer::new();
        let checker = ws.checker(&renderer);
        let reference = ws.path("refs/value.txt");
        let actual = ActualValue::from(text.as_str());

        let first = checker.check(&reference, &actual, &CheckOptions::default()).unwrap();
        prop_assert_eq!(first.verdict(), Verdict::Established);
        let written = ws.read("refs/value.txt");

        let second = checker.check(&reference, &actual, &CheckOptions::default()).unwrap();
        prop_assert_eq!(second, CheckOutcome::Match);
        prop_assert_eq!(ws.read("refs/value.txt"), written);
        prop_assert!(!ws.staging_path().exists());
    }

    #[test]
    fn prop_rejected_mismatch_keeps_reference(
        old in "[a-z]{1,16}",
        new in "[A-Z]{1,16}",
    ) {
        let ws = Workspace::new();
        let renderer = RecordingRenderer::new();
        let prompt = ScriptedPrompt::new([Decision::Reject]);
        let checker = ws.interactive_checker(&renderer, &prompt);
        let reference = ws.write("refs/value.txt", &old);

        let outcome = checker
            .check(&reference, &ActualValue::from(new.as_str()), &CheckOptions::default())
            .unwrap();
        prop_assert_eq!(outcome.verdict(), Verdict::Fail);
        prop_assert_eq!(ws.read_to_string("refs/value.txt"), old);
        prop_assert_eq!(
            std::fs::read_to_string(ws.staged("refs/value.txt")).unwrap(),
            new
        );
    }
}

#[test]
fn test_accept_replaces_reference_without_recomparing() {
    let ws = Workspace::new();
    let renderer = RecordingRenderer::new();
    let prompt = ScriptedPrompt::new([Decision::Accept]);
    let checker = ws.interactive_checker(&renderer, &prompt);
    let reference = ws.write("refs/greeting.txt", "hello\n");

    let outcome = checker
        .check(&reference, &ActualValue::from("goodbye\n"), &CheckOptions::default())
        .unwrap();

    let staged = ws.staged("refs/greeting.txt");
    assert_eq!(
        outcome,
        CheckOutcome::Mismatch {
            staged: staged.clone(),
            resolution: Resolution::Accepted,
        }
    );
    assert_eq!(outcome.verdict(), Verdict::Established);
    assert_eq!(ws.read_to_string("refs/greeting.txt"), "goodbye\n");
    assert_eq!(prompt.asked(), vec![(reference.clone(), staged.clone())]);
    assert_eq!(
        renderer.events(),
        vec![
            Event::Notice(Notice::Mismatch {
                reference: reference.clone(),
                staged,
            }),
            Event::RenderMismatch(RenderMode::Diff, ContentKind::Text),
            Event::Notice(Notice::Accepted { reference }),
        ]
    );
}

#[test]
fn test_rejected_mismatch_is_announced_with_staged_path() {
    let ws = Workspace::new();
    let renderer = RecordingRenderer::new();
    let prompt = ScriptedPrompt::new([Decision::Reject]);
    let reference = ws.write("refs/greeting.txt", "hello\n");

    let outcome = ws
        .interactive_checker(&renderer, &prompt)
        .check(&reference, &ActualValue::from("hi\n"), &CheckOptions::default())
        .unwrap();

    let staged = ws.staged("refs/greeting.txt");
    assert_eq!(outcome.staged(), Some(staged.as_path()));
    assert_eq!(
        renderer.notices().last(),
        Some(&Notice::Rejected { reference, staged })
    );
}

#[test]
fn test_new_reference_is_rendered_once() {
    let ws = Workspace::new();
    let renderer = RecordingRenderer::new();

    ws.checker(&renderer)
        .check(
            ws.path("refs/out.blake3"),
            &ActualValue::from(serde_json::json!({"answer": 42})),
            &CheckOptions::default(),
        )
        .unwrap();

    assert_eq!(
        renderer.events(),
        vec![
            Event::Notice(Notice::ReferenceCreated {
                reference: ws.path("refs/out.blake3")
            }),
            Event::RenderNew(RenderMode::Limited, ContentKind::Hash),
        ]
    );
}

#[test]
fn test_render_mode_option_wins() {
    let ws = Workspace::new();
    let renderer = RecordingRenderer::new();

    ws.checker(&renderer)
        .with_render_mode(Some(RenderMode::Full))
        .check(
            ws.path("refs/a.txt"),
            &ActualValue::from("a"),
            &CheckOptions::new().render(RenderMode::Off),
        )
        .unwrap();

    assert!(renderer
        .events()
        .contains(&Event::RenderNew(RenderMode::Off, ContentKind::Text)));
}

#[test]
fn test_corrupt_reference_aborts_without_staging() {
    let ws = Workspace::new();
    let renderer = RecordingRenderer::new();
    ws.write("refs/out.sha256", "not a digest\n");

    let err = ws
        .checker(&renderer)
        .check(ws.path("refs/out.sha256"), &ActualValue::from(1), &CheckOptions::default())
        .unwrap_err();

    assert!(matches!(err, CheckError::CorruptReference { .. }));
    assert!(!ws.staged("refs/out.sha256").exists());
    assert!(renderer.events().is_empty());
    assert_eq!(ws.read_to_string("refs/out.sha256"), "not a digest\n");
}

#[test]
fn test_unsupported_value_names_reference() {
    let ws = Workspace::new();
    let renderer = RecordingRenderer::new();
    let empty = refcheck_core::Image::filled(0, 0, [0, 0, 0, 0]);

    let err = ws
        .checker(&renderer)
        .check(ws.path("refs/photo.png"), &ActualValue::from(empty), &CheckOptions::default())
        .unwrap_err();

    match err {
        CheckError::UnsupportedValue { path, .. } => {
            assert_eq!(path, Some(ws.path("refs/photo.png")));
        }
        other => panic!("expected UnsupportedValue, got {:?}", other),
    }
    assert!(!ws.path("refs/photo.png").exists());
}
