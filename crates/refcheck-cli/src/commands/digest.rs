//! Digest command implementation
//!
//! Prints the digest a hash reference would store for a value.

use anyhow::{Context, Result};
use std::process::ExitCode;

use refcheck_codecs::hash::canonical_digest;
use refcheck_core::{ActualValue, Digest, DigestAlgorithm};

use super::read_input;

/// Run the digest command
///
/// # Arguments
/// * `input` - File to read, or stdin
/// * `algorithm` - `blake3` or `sha256`
/// * `text` - Treat the input as a string instead of JSON
pub fn run(input: Option<&str>, algorithm: &str, text: bool) -> Result<ExitCode> {
    let bytes = read_input(input)?;
    let digest = digest_input(&bytes, algorithm, text)?;
    println!("{}", digest.to_hex());
    Ok(ExitCode::SUCCESS)
}

/// Digest of the canonical serialization of `bytes` read as JSON or text.
pub fn digest_input(bytes: &[u8], algorithm: &str, text: bool) -> Result<Digest> {
    let algorithm = match algorithm {
        "blake3" => DigestAlgorithm::Blake3,
        "sha256" => DigestAlgorithm::Sha256,
        other => anyhow::bail!("Unknown digest algorithm: {}", other),
    };
    let value = if text {
        ActualValue::Text(String::from_utf8(bytes.to_vec()).context("Input is not valid UTF-8")?)
    } else {
        ActualValue::Data(serde_json::from_slice(bytes).context("Input is not valid JSON")?)
    };
    Ok(canonical_digest(&value, algorithm))
}
