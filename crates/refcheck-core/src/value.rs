//! Actual values, images, digests and the comparable forms codecs decode into.

use std::fmt;

use serde::Serialize;

use crate::error::CheckError;
use crate::kind::ContentKind;

/// An 8-bit RGBA pixel grid.
///
/// This is the in-memory form every image codec normalizes to, whether the
/// reference is stored as PNG or as a text rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Image {
    /// Wraps a row-major RGBA8 buffer.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, CheckError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(CheckError::unsupported(format!(
                "RGBA buffer has {} bytes, expected {} for a {}x{} image",
                rgba.len(),
                expected,
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// Builds an opaque image from 8-bit grayscale samples.
    pub fn from_gray(width: u32, height: u32, gray: &[u8]) -> Result<Self, CheckError> {
        let rgba = gray.iter().flat_map(|&v| [v, v, v, 255]).collect();
        Self::from_rgba(width, height, rgba)
    }

    /// Builds an image by evaluating `f` at every `(x, y)`.
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> [u8; 4],
    {
        let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                rgba.extend_from_slice(&f(x, y));
            }
        }
        Self {
            width,
            height,
            rgba,
        }
    }

    /// An image with every pixel set to `pixel`.
    pub fn filled(width: u32, height: u32, pixel: [u8; 4]) -> Self {
        Self::from_fn(width, height, |_, _| pixel)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Raw row-major RGBA8 bytes.
    pub fn as_rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// Pixel at `(x, y)`, or `None` outside the grid.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let p = &self.rgba[offset..offset + 4];
        Some([p[0], p[1], p[2], p[3]])
    }

    /// True if the image has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// The image-like capability: a structured grid of color-like elements.
///
/// Values implementing this resolve to the Image content kind unless the
/// reference path carries a hash suffix.
pub trait ImageLike {
    /// Converts the value into an RGBA8 grid.
    fn to_image(&self) -> Image;
}

impl ImageLike for Image {
    fn to_image(&self) -> Image {
        self.clone()
    }
}

/// The value produced by code under test.
///
/// The set of variants is closed; format resolution inspects the variant
/// rather than reflecting over arbitrary types.
#[derive(Debug, Clone, PartialEq)]
pub enum ActualValue {
    /// Plain text, compared verbatim.
    Text(String),
    /// Any serializable value, captured as JSON.
    Data(serde_json::Value),
    /// An image-like value.
    Image(Image),
}

impl ActualValue {
    /// Captures any serializable value.
    ///
    /// Fails with [`CheckError::UnsupportedValue`] when the value has no JSON
    /// representation (for example a map with non-string keys).
    pub fn serialize<T>(value: &T) -> Result<Self, CheckError>
    where
        T: Serialize + ?Sized,
    {
        serde_json::to_value(value)
            .map(Self::Data)
            .map_err(|e| CheckError::unsupported(format!("value is not serializable: {}", e)))
    }

    /// Captures a floating point number. Non-finite numbers have no canonical
    /// serialization and are rejected.
    pub fn float(value: f64) -> Result<Self, CheckError> {
        serde_json::Number::from_f64(value)
            .map(|n| Self::Data(serde_json::Value::Number(n)))
            .ok_or_else(|| CheckError::unsupported(format!("{} has no canonical form", value)))
    }

    /// Captures an image-like value.
    pub fn image<I>(value: &I) -> Self
    where
        I: ImageLike + ?Sized,
    {
        Self::Image(value.to_image())
    }

    /// The image-like capability check.
    pub fn as_image(&self) -> Option<&Image> {
        match self {
            Self::Image(image) => Some(image),
            _ => None,
        }
    }

    pub fn is_image_like(&self) -> bool {
        self.as_image().is_some()
    }

    /// The value's natural textual representation.
    ///
    /// Strings are verbatim, scalars use their display form and structured
    /// data is pretty-printed JSON. Images have no textual form here; image
    /// text rendering belongs to the image codecs.
    pub fn natural_text(&self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s.clone()),
            Self::Data(serde_json::Value::String(s)) => Some(s.clone()),
            Self::Data(serde_json::Value::Null) => Some("null".to_string()),
            Self::Data(serde_json::Value::Bool(b)) => Some(b.to_string()),
            Self::Data(serde_json::Value::Number(n)) => Some(n.to_string()),
            Self::Data(value) => serde_json::to_string_pretty(value).ok(),
            Self::Image(_) => None,
        }
    }
}

impl From<&str> for ActualValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ActualValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for ActualValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<serde_json::Value> for ActualValue {
    fn from(value: serde_json::Value) -> Self {
        Self::Data(value)
    }
}

impl From<Image> for ActualValue {
    fn from(value: Image) -> Self {
        Self::Image(value)
    }
}

macro_rules! impl_from_scalar {
    ($($t:ty),*) => {
        $(
            impl From<$t> for ActualValue {
                fn from(value: $t) -> Self {
                    Self::Data(serde_json::Value::from(value))
                }
            }
        )*
    };
}

impl_from_scalar!(bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

/// Digest algorithms a hash reference can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    /// SHA-256, 32 bytes.
    Sha256,
    /// BLAKE3, 32 bytes.
    Blake3,
}

impl DigestAlgorithm {
    /// Lowercase algorithm name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Blake3 => "blake3",
        }
    }

    /// Digest size in bytes.
    pub fn digest_len(&self) -> usize {
        32
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fixed-size content digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Digest {
    algorithm: DigestAlgorithm,
    bytes: Vec<u8>,
}

impl Digest {
    pub fn new(algorithm: DigestAlgorithm, bytes: Vec<u8>) -> Self {
        Self { algorithm, bytes }
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lowercase hexadecimal form.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.to_hex())
    }
}

/// A decoded, comparable form of a reference or of an encoded actual value.
#[derive(Debug, Clone, PartialEq)]
pub enum Comparable {
    Text(String),
    Digest(Digest),
    Image(Image),
}

impl Comparable {
    /// The content kind this form belongs to.
    pub fn kind(&self) -> ContentKind {
        match self {
            Self::Text(_) => ContentKind::Text,
            Self::Digest(_) => ContentKind::Hash,
            Self::Image(_) => ContentKind::Image,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_digest(&self) -> Option<&Digest> {
        match self {
            Self::Digest(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&Image> {
        match self {
            Self::Image(i) => Some(i),
            _ => None,
        }
    }
}
