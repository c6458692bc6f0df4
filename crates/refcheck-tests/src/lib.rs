//! refcheck End-to-End Test Infrastructure
//!
//! Integration tests for the reference lifecycle, run against real files in
//! temporary directories:
//!
//! - **Scenarios**: create, match, mismatch, override
//! - **Properties**: idempotent creation, no silent overwrite, hash exactness
//! - **Formats**: kind priority, PNG and text-rendered images
//! - **Concurrency**: racing creators of the same reference
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p refcheck-tests
//! ```
//!
//! Checkers built by [`fixtures::Workspace`] never read the environment, so
//! the tests run the same in CI and in a terminal.

pub mod fixtures;

pub use fixtures::{Event, RecordingRenderer, ScriptedPrompt, Workspace};
