//! Staging-dir command implementation
//!
//! Reports where `check` runs stage mismatches. Without an override each
//! process gets its own temporary directory, so there is nothing to print
//! and none is created.

use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;

use refcheck_core::{StagingDir, STAGING_DIR_ENV};

/// Run the staging-dir command
///
/// # Returns
/// Exit code: 0 when a staging directory is configured, 1 otherwise
pub fn run() -> Result<ExitCode> {
    match configured_dir(&StagingDir::from_env())? {
        Some(dir) => {
            println!("{}", dir.display());
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!(
                "{} {} is not set; each run stages into a new {} directory under {}",
                "Ephemeral:".yellow().bold(),
                STAGING_DIR_ENV,
                "refcheck-*".dimmed(),
                std::env::temp_dir().display()
            );
            Ok(ExitCode::from(1))
        }
    }
}

/// The configured staging directory, or `None` when it is ephemeral.
///
/// Ephemeral providers are left unresolved so no directory is created.
pub fn configured_dir(staging: &StagingDir) -> Result<Option<PathBuf>> {
    if !staging.is_override() {
        return Ok(None);
    }
    Ok(Some(staging.path()?.to_path_buf()))
}
