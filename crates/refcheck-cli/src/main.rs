//! refcheck CLI - command-line interface for golden-file references
//!
//! This binary checks values against reference files, compares references,
//! and accepts staged outputs.

mod cli_args;

use clap::Parser;
use std::process::ExitCode;

use cli_args::{Cli, Commands};
use refcheck_cli::commands;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            reference,
            input,
            data,
            render,
            staging_dir,
            no_interactive,
        } => commands::check::run(&commands::check::CheckArgs {
            reference,
            input,
            data,
            render,
            staging_dir,
            no_interactive,
        }),
        Commands::Compare { a, b, json } => commands::compare::run(&a, &b, json),
        Commands::Accept { reference, staged } => {
            commands::accept::run(&reference, staged.as_deref())
        }
        Commands::StagingDir => commands::staging_dir::run(),
        Commands::Digest {
            input,
            algorithm,
            text,
        } => commands::digest::run(input.as_deref(), &algorithm, text),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
