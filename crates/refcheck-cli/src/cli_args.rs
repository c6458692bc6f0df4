//! CLI argument definitions for the refcheck command-line interface.

use clap::{Parser, Subcommand};

/// refcheck - golden-file reference testing
#[derive(Parser)]
#[command(name = "refcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Check a value against a reference file, creating it if missing
    Check {
        /// Reference file path (extension selects the format)
        #[arg(short, long)]
        reference: String,

        /// Input file with the actual value (default: stdin). PNG inputs are images.
        #[arg(short, long)]
        input: Option<String>,

        /// Parse the input as JSON data instead of plain text
        #[arg(long)]
        data: bool,

        /// Render mode (off, limited, full, diff)
        #[arg(long, value_parser = ["off", "limited", "full", "diff"])]
        render: Option<String>,

        /// Staging directory for mismatches (overrides REFCHECK_STAGING_DIR)
        #[arg(long)]
        staging_dir: Option<String>,

        /// Never prompt; mismatches fail
        #[arg(long)]
        no_interactive: bool,
    },

    /// Compare two reference files of the same kind
    Compare {
        /// Path to the first file (reference)
        #[arg(short, long)]
        a: String,

        /// Path to the second file (actual)
        #[arg(short, long)]
        b: String,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Replace a reference with a staged output
    Accept {
        /// Reference file to replace
        #[arg(short, long)]
        reference: String,

        /// Staged file (default: <staging dir>/<reference file name>)
        #[arg(short, long)]
        staged: Option<String>,
    },

    /// Print the configured staging directory (REFCHECK_STAGING_DIR)
    StagingDir,

    /// Print the canonical digest of a JSON document
    Digest {
        /// Input file (default: stdin)
        #[arg(short, long)]
        input: Option<String>,

        /// Digest algorithm
        #[arg(long, default_value = "blake3", value_parser = ["blake3", "sha256"])]
        algorithm: String,

        /// Hash the input as plain text instead of JSON
        #[arg(long)]
        text: bool,
    },
}
