//! CLI command implementations

pub mod accept;
pub mod check;
pub mod compare;
pub mod digest;
pub mod staging_dir;

use anyhow::{Context, Result};
use std::fs;
use std::io::Read;
use std::path::Path;

use refcheck::ActualValue;

/// Reads a file, or stdin when `path` is `None` or `-`.
pub(crate) fn read_input(path: Option<&str>) -> Result<Vec<u8>> {
    match path {
        Some(p) if p != "-" => fs::read(p).with_context(|| format!("Failed to read input: {}", p)),
        _ => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

/// Interprets input bytes as an actual value.
///
/// `.png` inputs become images, `data` parses JSON, everything else is text.
pub(crate) fn actual_from_bytes(bytes: &[u8], path: Option<&str>, data: bool) -> Result<ActualValue> {
    let is_png = path
        .and_then(|p| Path::new(p).extension())
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"));

    if is_png {
        let image = refcheck_codecs::png::decode_rgba(bytes)
            .map_err(|e| anyhow::anyhow!("Failed to decode PNG input: {}", e))?;
        return Ok(ActualValue::Image(image));
    }
    if data {
        let value: serde_json::Value =
            serde_json::from_slice(bytes).context("Input is not valid JSON")?;
        return Ok(ActualValue::Data(value));
    }
    let text = String::from_utf8(bytes.to_vec()).context("Input is not valid UTF-8")?;
    Ok(ActualValue::Text(text))
}
