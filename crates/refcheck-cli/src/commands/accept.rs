//! Accept command implementation
//!
//! Promotes a staged output to its reference after a non-interactive run.

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use refcheck_core::{replace_atomic, StagingDir, STAGING_DIR_ENV};

/// Run the accept command
///
/// # Arguments
/// * `reference` - Reference file to replace
/// * `staged` - Staged output; defaults to the reference's name in the
///   configured staging directory
pub fn run(reference: &str, staged: Option<&str>) -> Result<ExitCode> {
    let reference = Path::new(reference);
    let staged = staged_path(reference, staged, &StagingDir::from_env())?;

    accept(reference, &staged)?;
    println!(
        "{} {} {} {}",
        "Accepted".green().bold(),
        staged.display(),
        "->".dimmed(),
        reference.display()
    );
    Ok(ExitCode::SUCCESS)
}

/// Where the staged output for `reference` lives.
///
/// Ephemeral staging directories differ per process, so without an explicit
/// `staged` path the staging directory must be configured.
pub fn staged_path(reference: &Path, staged: Option<&str>, staging: &StagingDir) -> Result<PathBuf> {
    if let Some(staged) = staged {
        return Ok(PathBuf::from(staged));
    }
    if !staging.is_override() {
        anyhow::bail!(
            "No staged file given and {} is not set; pass --staged",
            STAGING_DIR_ENV
        );
    }
    let name = reference
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Reference path has no file name: {}", reference.display()))?;
    Ok(staging.path()?.join(name))
}

/// Atomically replaces `reference` with `staged`.
pub fn accept(reference: &Path, staged: &Path) -> Result<()> {
    if !staged.is_file() {
        anyhow::bail!("Staged file not found: {}", staged.display());
    }
    if let Some(parent) = reference.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    replace_atomic(staged, reference).with_context(|| {
        format!(
            "Failed to replace {} with {}",
            reference.display(),
            staged.display()
        )
    })
}
