//! Check command implementation
//!
//! Checks a value read from a file or stdin against a reference, with the
//! same lifecycle as the library: create, compare, stage, prompt.

use anyhow::{Context, Result};
use colored::Colorize;
use std::process::ExitCode;

use refcheck::{CheckOptions, CheckOutcome, RenderMode, Settings, StagingDir, Verdict};

use super::{actual_from_bytes, read_input};

/// Arguments of the check command.
#[derive(Debug, Clone, Default)]
pub struct CheckArgs {
    pub reference: String,
    pub input: Option<String>,
    pub data: bool,
    pub render: Option<String>,
    pub staging_dir: Option<String>,
    pub no_interactive: bool,
}

/// Run the check command
///
/// # Returns
/// Exit code: 0 when the reference matches or was established, 1 otherwise
pub fn run(args: &CheckArgs) -> Result<ExitCode> {
    let settings = settings_for(args, Settings::from_env())?;
    let bytes = read_input(args.input.as_deref())?;
    let actual = actual_from_bytes(&bytes, args.input.as_deref(), args.data)?;

    let checker = refcheck::checker_from_settings(settings);
    let outcome = checker
        .check(&args.reference, &actual, &CheckOptions::default())
        .with_context(|| format!("Failed to check reference {}", args.reference))?;

    print_outcome(&outcome);
    Ok(if outcome.verdict().is_failure() {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}

/// Applies command-line overrides to environment settings.
pub fn settings_for(args: &CheckArgs, mut settings: Settings) -> Result<Settings> {
    if let Some(dir) = &args.staging_dir {
        settings.staging = StagingDir::from_override(Some(dir));
    }
    // stdin carries the value, so it cannot carry an answer too
    if args.no_interactive || args.input.as_deref().map_or(true, |p| p == "-") {
        settings.interactive = false;
    }
    if let Some(mode) = &args.render {
        settings.render = Some(mode.parse::<RenderMode>().map_err(anyhow::Error::msg)?);
    }
    Ok(settings)
}

fn print_outcome(outcome: &CheckOutcome) {
    let verdict = match outcome.verdict() {
        Verdict::Pass => "pass".green().bold(),
        Verdict::Established => "established".cyan().bold(),
        Verdict::Fail => "fail".red().bold(),
    };
    println!("{} {}", "Verdict:".dimmed(), verdict);
}
