//! Canonical serialization.
//!
//! Data and text values are canonicalized with RFC 8785 (JCS):
//! - Object keys are sorted by their UTF-16 code units
//! - No whitespace between tokens
//! - Numbers are formatted like ECMAScript `Number.prototype.toString`
//! - Strings use minimal escaping
//!
//! Images use a fixed binary layout:
//!
//! ```text
//! b"refcheck-image\0" || u32le(width) || u32le(height) || rgba8 pixels
//! ```

use refcheck_core::{ActualValue, Image};

/// Magic prefix of the canonical image layout.
pub const IMAGE_MAGIC: &[u8] = b"refcheck-image\0";

/// Canonical bytes of any actual value.
pub fn canonical_bytes(value: &ActualValue) -> Vec<u8> {
    match value {
        ActualValue::Text(s) => format_jcs_string(s).into_bytes(),
        ActualValue::Data(v) => canonicalize_json(v).into_bytes(),
        ActualValue::Image(image) => canonical_image_bytes(image),
    }
}

/// Canonicalizes a JSON value according to RFC 8785 (JCS).
///
/// # Example
/// ```
/// use refcheck_codecs::canonical::canonicalize_json;
///
/// let value = serde_json::json!({"b": 1, "a": [true, null, 1.5]});
/// assert_eq!(canonicalize_json(&value), r#"{"a":[true,null,1.5],"b":1}"#);
/// ```
pub fn canonicalize_json(value: &serde_json::Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

fn write_value(out: &mut String, value: &serde_json::Value) {
    match value {
        serde_json::Value::Null => out.push_str("null"),
        serde_json::Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        serde_json::Value::Number(n) => out.push_str(&format_jcs_number(n)),
        serde_json::Value::String(s) => out.push_str(&format_jcs_string(s)),
        serde_json::Value::Array(arr) => {
            out.push('[');
            for (i, item) in arr.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item);
            }
            out.push(']');
        }
        serde_json::Value::Object(obj) => {
            let mut entries: Vec<(&String, &serde_json::Value)> = obj.iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.encode_utf16().cmp(b.encode_utf16()));

            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&format_jcs_string(key));
                out.push(':');
                write_value(out, item);
            }
            out.push('}');
        }
    }
}

/// Formats a number according to JCS rules.
///
/// Integers that fit `i64`/`u64` are written exactly; everything else goes
/// through the ECMAScript double formatting.
fn format_jcs_number(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) => format_es_double(f),
        None => "null".to_string(),
    }
}

/// ECMAScript `Number::toString` for finite doubles.
fn format_es_double(f: f64) -> String {
    if f == 0.0 {
        return "0".to_string();
    }
    if !f.is_finite() {
        // serde_json never holds these
        return "null".to_string();
    }

    // Shortest round-trip digits and decimal exponent, e.g. "1.2345e-7".
    let sci = format!("{:e}", f.abs());
    let (mantissa, exp) = match sci.split_once('e') {
        Some(parts) => parts,
        None => return f.to_string(),
    };
    let exp: i32 = match exp.parse() {
        Ok(e) => e,
        Err(_) => return f.to_string(),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    let n = exp + 1;

    let body = if k <= n && n <= 21 {
        format!("{}{}", digits, "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        format!("{}.{}", &digits[..n as usize], &digits[n as usize..])
    } else if -6 < n && n <= 0 {
        format!("0.{}{}", "0".repeat((-n) as usize), digits)
    } else {
        let sign = if n - 1 < 0 { '-' } else { '+' };
        if k == 1 {
            format!("{}e{}{}", digits, sign, (n - 1).abs())
        } else {
            format!("{}.{}e{}{}", &digits[..1], &digits[1..], sign, (n - 1).abs())
        }
    };

    if f < 0.0 {
        format!("-{}", body)
    } else {
        body
    }
}

/// Formats a string according to JCS rules.
pub fn format_jcs_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 2);
    result.push('"');
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\u{8}' => result.push_str("\\b"),
            '\u{c}' => result.push_str("\\f"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c < '\x20' => {
                result.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => result.push(c),
        }
    }
    result.push('"');
    result
}

/// The fixed binary layout of an image.
pub fn canonical_image_bytes(image: &Image) -> Vec<u8> {
    let mut out = Vec::with_capacity(IMAGE_MAGIC.len() + 8 + image.as_rgba().len());
    out.extend_from_slice(IMAGE_MAGIC);
    out.extend_from_slice(&image.width().to_le_bytes());
    out.extend_from_slice(&image.height().to_le_bytes());
    out.extend_from_slice(image.as_rgba());
    out
}
