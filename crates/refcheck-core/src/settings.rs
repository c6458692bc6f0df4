//! Environment-derived configuration.
//!
//! Read once per process and injected into the checker; nothing else in the
//! engine looks at the environment.

use std::io::IsTerminal;

use crate::render::RenderMode;
use crate::staging::{StagingDir, STAGING_DIR_ENV};

/// Forces (`1`/`true`/`yes`) or forbids (`0`/`false`/`no`) prompting.
pub const INTERACTIVE_ENV: &str = "REFCHECK_INTERACTIVE";

/// Overrides the per-kind default render mode.
pub const RENDER_ENV: &str = "REFCHECK_RENDER";

/// Engine configuration.
#[derive(Debug)]
pub struct Settings {
    /// Where mismatches are staged.
    pub staging: StagingDir,
    /// Whether an operator may be prompted to accept or reject.
    pub interactive: bool,
    /// Render mode for every kind; `None` keeps the per-kind defaults.
    pub render: Option<RenderMode>,
}

impl Settings {
    /// Reads `REFCHECK_STAGING_DIR`, `REFCHECK_INTERACTIVE` and
    /// `REFCHECK_RENDER`.
    ///
    /// The staging provider is the process-wide [`StagingDir::process`], so
    /// every checker built this way stages into the same directory.
    pub fn from_env() -> Self {
        Self {
            staging: StagingDir::process(),
            ..Self::from_vars(|name| std::env::var(name).ok())
        }
    }

    /// Builds settings from an arbitrary variable lookup, with a staging
    /// provider of their own.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let staging = StagingDir::from_override(lookup(STAGING_DIR_ENV).as_deref());
        let interactive = match lookup(INTERACTIVE_ENV).as_deref().and_then(parse_flag) {
            Some(flag) => flag,
            None => detect_interactive(lookup("CI").is_some()),
        };
        let render = lookup(RENDER_ENV).and_then(|v| v.parse().ok());
        Self {
            staging,
            interactive,
            render,
        }
    }
}

/// Parses a boolean flag value. Unrecognized values yield `None`.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn detect_interactive(in_ci: bool) -> bool {
    !in_ci && std::io::stdin().is_terminal()
}
