//! The lifecycle manager.

use std::fs;
use std::path::{Path, PathBuf};

use crate::codec::{replace_atomic, Codec, CodecRegistry, SaveMode, Saved};
use crate::equality::resolve_equality;
use crate::error::{CheckError, CodecError, IoContext};
use crate::kind::{ContentKind, FormatResolver, ReferenceFile};
use crate::prompt::{Decision, Prompt};
use crate::render::{Notice, PlainRenderer, RenderMode, Renderer};
use crate::settings::Settings;
use crate::staging::StagingDir;
use crate::value::{ActualValue, Comparable};

use super::options::CheckOptions;
use super::outcome::{CheckOutcome, Resolution};

/// Checks actual values against reference files.
///
/// A checker is immutable once built and may be shared between threads.
pub struct Checker {
    registry: CodecRegistry,
    resolver: FormatResolver,
    staging: StagingDir,
    renderer: Box<dyn Renderer>,
    prompt: Option<Box<dyn Prompt>>,
    default_render: Option<RenderMode>,
}

impl std::fmt::Debug for Checker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Checker")
            .field("registry", &self.registry)
            .field("resolver", &self.resolver)
            .field("staging", &self.staging)
            .field("interactive", &self.prompt.is_some())
            .field("default_render", &self.default_render)
            .finish()
    }
}

impl Checker {
    /// Creates a non-interactive checker with plain stderr output.
    ///
    /// The hash suffixes recognized by the format resolver are the extensions
    /// registered for [`ContentKind::Hash`].
    pub fn new(registry: CodecRegistry, staging: StagingDir) -> Self {
        let resolver = FormatResolver::new(registry.extensions(ContentKind::Hash));
        Self {
            registry,
            resolver,
            staging,
            renderer: Box::new(PlainRenderer),
            prompt: None,
            default_render: None,
        }
    }

    /// Creates a checker from [`Settings`]. `prompt` is only installed when
    /// the settings allow interaction.
    pub fn from_settings(
        registry: CodecRegistry,
        settings: Settings,
        prompt: Option<Box<dyn Prompt>>,
    ) -> Self {
        let mut checker = Self::new(registry, settings.staging);
        checker.default_render = settings.render;
        if settings.interactive {
            checker.prompt = prompt;
        }
        checker
    }

    pub fn with_resolver(mut self, resolver: FormatResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_renderer<R: Renderer + 'static>(mut self, renderer: R) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    /// Installs a prompt, making mismatches interactive.
    pub fn with_prompt<P: Prompt + 'static>(mut self, prompt: P) -> Self {
        self.prompt = Some(Box::new(prompt));
        self
    }

    /// Removes the prompt; mismatches fail with
    /// [`CheckError::NonInteractiveMismatch`].
    pub fn non_interactive(mut self) -> Self {
        self.prompt = None;
        self
    }

    /// Render mode for every kind, unless a check overrides it.
    pub fn with_render_mode(mut self, mode: Option<RenderMode>) -> Self {
        self.default_render = mode;
        self
    }

    pub fn registry(&self) -> &CodecRegistry {
        &self.registry
    }

    pub fn resolver(&self) -> &FormatResolver {
        &self.resolver
    }

    pub fn staging(&self) -> &StagingDir {
        &self.staging
    }

    pub fn is_interactive(&self) -> bool {
        self.prompt.is_some()
    }

    /// Checks `actual` against the reference at `path`.
    ///
    /// Relative paths are resolved against the current directory.
    pub fn check(
        &self,
        path: impl AsRef<Path>,
        actual: &ActualValue,
        options: &CheckOptions,
    ) -> Result<CheckOutcome, CheckError> {
        let reference = self.resolver.resolve(path.as_ref(), actual)?;
        let codec = self.registry.codec_for(&reference)?;

        let encoded = codec
            .encode(actual, &options.encode)
            .map_err(|e| unsupported(&reference, e))?;
        // Compare like with like: lossy codecs see the same loss on both sides.
        let actual_form = codec
            .decode(&encoded)
            .map_err(|e| unsupported(&reference, e))?;

        let mode = options
            .render
            .or(self.default_render)
            .unwrap_or_else(|| RenderMode::default_for(reference.kind()));

        if !reference.path().try_exists().at(reference.path())? {
            if let Some(outcome) = self.create(&reference, codec, &encoded, &actual_form, mode)? {
                return Ok(outcome);
            }
        }

        self.compare(&reference, codec, &encoded, &actual_form, mode, options)
    }

    /// Writes a missing reference. Returns `None` when another writer created
    /// it first.
    fn create(
        &self,
        reference: &ReferenceFile,
        codec: &dyn Codec,
        encoded: &[u8],
        content: &Comparable,
        mode: RenderMode,
    ) -> Result<Option<CheckOutcome>, CheckError> {
        let path = reference.path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).at(parent)?;
        }

        match codec.save(path, encoded, SaveMode::CreateNew).at(path)? {
            Saved::AlreadyExists => return Ok(None),
            Saved::Written => {}
        }

        self.renderer.announce(&Notice::ReferenceCreated {
            reference: path.to_path_buf(),
        });
        self.renderer.render_new(mode, reference, content);

        Ok(Some(CheckOutcome::ReferenceCreated {
            reference: path.to_path_buf(),
        }))
    }

    fn compare(
        &self,
        reference: &ReferenceFile,
        codec: &dyn Codec,
        encoded: &[u8],
        actual: &Comparable,
        mode: RenderMode,
        options: &CheckOptions,
    ) -> Result<CheckOutcome, CheckError> {
        let path = reference.path();
        let bytes = fs::read(path).at(path)?;
        let expected = codec.decode(&bytes).map_err(|e| CheckError::CorruptReference {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let equality = resolve_equality(reference.kind(), options.by.as_ref(), options.image_metric);
        if equality.matches(&expected, actual) {
            return Ok(CheckOutcome::Match);
        }

        let staged = self.stage(reference, codec, encoded)?;
        self.renderer.announce(&Notice::Mismatch {
            reference: path.to_path_buf(),
            staged: staged.clone(),
        });
        self.renderer.render_mismatch(mode, reference, &expected, actual);

        let Some(prompt) = &self.prompt else {
            return Err(CheckError::NonInteractiveMismatch {
                reference: path.to_path_buf(),
                staged,
            });
        };

        match prompt.decide(path, &staged).at(&staged)? {
            Decision::Accept => {
                replace_atomic(&staged, path).at(path)?;
                self.renderer.announce(&Notice::Accepted {
                    reference: path.to_path_buf(),
                });
                Ok(CheckOutcome::Mismatch {
                    staged,
                    resolution: Resolution::Accepted,
                })
            }
            Decision::Reject => {
                self.renderer.announce(&Notice::Rejected {
                    reference: path.to_path_buf(),
                    staged: staged.clone(),
                });
                Ok(CheckOutcome::Mismatch {
                    staged,
                    resolution: Resolution::Rejected,
                })
            }
        }
    }

    /// Saves the encoded actual as `<staging>/<reference basename>`.
    fn stage(
        &self,
        reference: &ReferenceFile,
        codec: &dyn Codec,
        encoded: &[u8],
    ) -> Result<PathBuf, CheckError> {
        let dir = self.staging.path()?;
        let name = reference
            .path()
            .file_name()
            .ok_or_else(|| CheckError::Io {
                path: reference.path().to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "reference path has no file name",
                ),
            })?;
        let staged = dir.join(name);
        codec.save(&staged, encoded, SaveMode::Replace).at(&staged)?;
        Ok(staged)
    }
}

fn unsupported(reference: &ReferenceFile, error: CodecError) -> CheckError {
    CheckError::UnsupportedValue {
        path: Some(reference.path().to_path_buf()),
        reason: error.to_string(),
    }
}
