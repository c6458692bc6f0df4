//! Plain text references.

use refcheck_core::{ActualValue, Codec, CodecError, Comparable, EncodeOptions};

/// Stores a value's natural text; decodes with CRLF normalized to LF.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextCodec;

impl Codec for TextCodec {
    fn name(&self) -> &'static str {
        "text"
    }

    fn encode(&self, value: &ActualValue, _options: &EncodeOptions) -> Result<Vec<u8>, CodecError> {
        value.natural_text().map(String::into_bytes).ok_or_else(|| {
            CodecError::Unsupported("value has no textual representation".to_string())
        })
    }

    fn decode(&self, bytes: &[u8]) -> Result<Comparable, CodecError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| CodecError::Corrupt(format!("reference is not valid UTF-8: {}", e)))?;
        Ok(Comparable::Text(text.replace("\r\n", "\n")))
    }
}
