//! Deterministic PNG references.
//!
//! Images are written as 8-bit RGBA with fixed compression settings, so the
//! same pixels always produce byte-identical files. Any PNG color type is
//! accepted on decode and expanded to RGBA8.

use std::io::Cursor;

use png::{BitDepth, ColorType, Compression, Encoder, FilterType, Transformations};

use refcheck_core::{ActualValue, Codec, CodecError, Comparable, EncodeOptions, Image};

/// PNG export configuration.
#[derive(Debug, Clone)]
pub struct PngConfig {
    /// Compression level. Use a fixed value for determinism.
    pub compression: Compression,
    /// Filter type. Use a fixed value for determinism.
    pub filter: FilterType,
}

impl Default for PngConfig {
    fn default() -> Self {
        Self {
            compression: Compression::Default,
            filter: FilterType::NoFilter,
        }
    }
}

impl PngConfig {
    /// Smallest files, slower.
    pub fn best_compression() -> Self {
        Self {
            compression: Compression::Best,
            filter: FilterType::Paeth,
        }
    }

    /// Fastest, larger files.
    pub fn fast() -> Self {
        Self {
            compression: Compression::Fast,
            filter: FilterType::NoFilter,
        }
    }
}

/// Encodes an image as RGBA8 PNG bytes.
pub fn encode_rgba(image: &Image, config: &PngConfig) -> Result<Vec<u8>, png::EncodingError> {
    let mut data = Vec::new();
    {
        let mut encoder = Encoder::new(&mut data, image.width(), image.height());
        encoder.set_color(ColorType::Rgba);
        encoder.set_depth(BitDepth::Eight);
        encoder.set_compression(config.compression);
        encoder.set_filter(config.filter);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(image.as_rgba())?;
    }
    Ok(data)
}

/// Decodes PNG bytes of any color type into an RGBA8 image.
pub fn decode_rgba(bytes: &[u8]) -> Result<Image, CodecError> {
    let corrupt = |e: png::DecodingError| CodecError::Corrupt(format!("invalid PNG: {}", e));

    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    decoder.set_transformations(Transformations::EXPAND | Transformations::STRIP_16);
    let mut reader = decoder.read_info().map_err(corrupt)?;

    let mut pixels = vec![0u8; reader.output_buffer_size()];
    let info = reader.next_frame(&mut pixels).map_err(corrupt)?;
    pixels.truncate(info.buffer_size());

    let rgba: Vec<u8> = match info.color_type {
        ColorType::Rgba => pixels,
        ColorType::Rgb => pixels
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        ColorType::GrayscaleAlpha => pixels
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        // Indexed is expanded to RGB(A) by EXPAND.
        ColorType::Grayscale | ColorType::Indexed => {
            pixels.iter().flat_map(|&g| [g, g, g, 255]).collect()
        }
    };

    Image::from_rgba(info.width, info.height, rgba)
        .map_err(|e| CodecError::Corrupt(format!("invalid PNG: {}", e)))
}

/// Lossless PNG codec for image references.
#[derive(Debug, Clone, Default)]
pub struct PngCodec {
    config: PngConfig,
}

impl PngCodec {
    pub fn new(config: PngConfig) -> Self {
        Self { config }
    }
}

impl Codec for PngCodec {
    fn name(&self) -> &'static str {
        "png"
    }

    fn encode(&self, value: &ActualValue, _options: &EncodeOptions) -> Result<Vec<u8>, CodecError> {
        let image = value
            .as_image()
            .ok_or_else(|| CodecError::Unsupported("value is not image-like".to_string()))?;
        if image.is_empty() {
            return Err(CodecError::Unsupported(format!(
                "a PNG cannot hold a {}x{} image",
                image.width(),
                image.height()
            )));
        }
        encode_rgba(image, &self.config)
            .map_err(|e| CodecError::Unsupported(format!("PNG encoding failed: {}", e)))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Comparable, CodecError> {
        decode_rgba(bytes).map(Comparable::Image)
    }
}
