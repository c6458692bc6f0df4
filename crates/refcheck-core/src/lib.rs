//! refcheck reference-testing engine.
//!
//! This crate decides how a value produced by code under test is checked
//! against a stored reference ("golden") file:
//!
//! - **Format resolution**: hash suffix, image-like value, or text fallback
//! - **Codecs**: per content kind encode/decode/save, looked up in a [`CodecRegistry`]
//! - **Equality**: exact, digest, or perceptual comparison, overridable per check
//! - **Lifecycle**: create missing references, compare present ones, stage
//!   mismatches and let an operator accept or reject them
//!
//! Concrete codecs live in `refcheck-codecs`; terminal rendering and the
//! console prompt live in the `refcheck` facade crate.
//!
//! # Example
//!
//! ```rust,ignore
//! use refcheck_core::{ActualValue, CheckOptions, Checker, StagingDir};
//!
//! let checker = Checker::new(refcheck_codecs::default_registry(), StagingDir::ephemeral());
//! let outcome = checker.check("refs/answer.sha256", &ActualValue::from(1338), &CheckOptions::default())?;
//! assert!(!outcome.verdict().is_failure());
//! ```
//!
//! # Modules
//!
//! - [`error`]: Error taxonomy for a single check
//! - [`value`]: Actual values, images, digests and comparable forms
//! - [`kind`]: Content kinds, reference files and the format resolver
//! - [`codec`]: Codec capability, registry and atomic file writes
//! - [`equality`]: Default and caller-supplied equality strategies
//! - [`staging`]: Staging directory provider
//! - [`settings`]: Environment-derived configuration
//! - [`render`]: Renderer capability and user notices
//! - [`prompt`]: Accept/reject prompt capability
//! - [`lifecycle`]: The reference lifecycle manager

pub mod codec;
pub mod equality;
pub mod error;
pub mod kind;
pub mod lifecycle;
pub mod prompt;
pub mod render;
pub mod settings;
pub mod staging;
pub mod value;

// Re-export commonly used types at the crate root
pub use codec::{
    replace_atomic, write_atomic, write_new_atomic, Codec, CodecRegistry, EncodeOptions, SaveMode,
    Saved, DEFAULT_TEXT_IMAGE_COLUMNS,
};
pub use equality::{default_equality, resolve_equality, Equality, ImageMetric};
pub use error::{CheckError, CodecError, IoContext};
pub use kind::{ContentKind, FormatResolver, ReferenceFile};
pub use lifecycle::{CheckOptions, CheckOutcome, Checker, Resolution, Verdict};
pub use prompt::{Decision, Prompt};
pub use render::{Notice, PlainRenderer, RenderMode, Renderer, SilentRenderer};
pub use settings::Settings;
pub use staging::{staging_dir, StagingDir, STAGING_DIR_ENV};
pub use value::{ActualValue, Comparable, Digest, DigestAlgorithm, Image, ImageLike};
