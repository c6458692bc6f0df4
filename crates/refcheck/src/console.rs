//! Console accept/reject prompt.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Mutex;

use colored::Colorize;

use refcheck_core::{Decision, Prompt};

/// One prompt at a time, even when tests run in parallel.
static PROMPT_LOCK: Mutex<()> = Mutex::new(());

/// Asks on stderr and reads the answer from stdin.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsolePrompt;

impl Prompt for ConsolePrompt {
    fn decide(&self, reference: &Path, staged: &Path) -> io::Result<Decision> {
        let _guard = PROMPT_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let stdin = io::stdin();
        let mut input = stdin.lock();
        ask(&mut input, &mut io::stderr(), reference, staged)
    }
}

/// Asks until the answer is recognized. An empty answer rejects; end of
/// input is an error.
pub fn ask<R, W>(input: &mut R, output: &mut W, reference: &Path, staged: &Path) -> io::Result<Decision>
where
    R: BufRead,
    W: Write,
{
    loop {
        write!(
            output,
            "Replace {} with {}? {} ",
            reference.display(),
            staged.display(),
            "[a]ccept / [R]eject:".bold()
        )?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no answer to the accept/reject prompt",
            ));
        }
        match line.trim().to_ascii_lowercase().as_str() {
            "a" | "accept" | "y" | "yes" => return Ok(Decision::Accept),
            "" | "r" | "reject" | "n" | "no" => return Ok(Decision::Reject),
            other => writeln!(output, "{} '{}'", "Unrecognized answer".yellow(), other)?,
        }
    }
}
