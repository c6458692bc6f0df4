//! Text-rendered image references.
//!
//! A lossy, human-readable format for image references that are reviewed in
//! diffs rather than image viewers:
//!
//! ```text
//! refcheck-image 4x2
//!  .:@
//! @@:.
//! ```
//!
//! Each character is one cell of the (optionally downscaled) image, mapped
//! through a 10-level luminance ramp. Decoding yields a grayscale image of the
//! grid size; because the actual value is normalized through the same codec,
//! both sides of a comparison carry the same loss.

use refcheck_core::{ActualValue, Codec, CodecError, Comparable, EncodeOptions, Image};

/// Luminance ramp, darkest first.
pub const RAMP: &[u8; 10] = b" .:-=+*#%@";

const HEADER_PREFIX: &str = "refcheck-image ";

/// Cells in a decoded grid above this are treated as corrupt.
const MAX_CELLS: usize = 1 << 24;

/// Character grid of `image`, one string per row.
///
/// With `columns` set, images wider than the budget are box-filtered down to
/// that many columns, keeping the aspect ratio.
pub fn render_grid(image: &Image, columns: Option<u32>) -> Vec<String> {
    let (cols, rows) = grid_size(image.width(), image.height(), columns);
    let levels = cell_levels(image, cols, rows);
    levels
        .chunks(cols.max(1) as usize)
        .take(rows as usize)
        .map(|row| row.iter().map(|&l| RAMP[l as usize] as char).collect())
        .collect()
}

fn grid_size(width: u32, height: u32, columns: Option<u32>) -> (u32, u32) {
    match columns {
        Some(budget) if budget > 0 && width > budget => {
            let scaled = (height as u64 * budget as u64 + width as u64 / 2) / width as u64;
            (budget, scaled.max(1) as u32)
        }
        _ => (width, height),
    }
}

/// Ramp level (0..=9) of every cell, row-major.
fn cell_levels(image: &Image, cols: u32, rows: u32) -> Vec<u8> {
    let (w, h) = (image.width() as u64, image.height() as u64);
    let mut levels = Vec::with_capacity(cols as usize * rows as usize);
    for cy in 0..rows as u64 {
        let y0 = cy * h / rows as u64;
        let y1 = ((cy + 1) * h / rows as u64).max(y0 + 1);
        for cx in 0..cols as u64 {
            let x0 = cx * w / cols as u64;
            let x1 = ((cx + 1) * w / cols as u64).max(x0 + 1);

            let mut sum = 0.0;
            let mut count = 0u64;
            for y in y0..y1 {
                for x in x0..x1 {
                    if let Some(p) = image.pixel(x as u32, y as u32) {
                        sum += luminance(p);
                        count += 1;
                    }
                }
            }
            let mean = if count > 0 { sum / count as f64 } else { 0.0 };
            levels.push(((mean / 255.0) * 9.0).round().clamp(0.0, 9.0) as u8);
        }
    }
    levels
}

/// BT.601 luminance composited over black.
fn luminance(p: [u8; 4]) -> f64 {
    let alpha = p[3] as f64 / 255.0;
    (0.299 * p[0] as f64 + 0.587 * p[1] as f64 + 0.114 * p[2] as f64) * alpha
}

fn level_to_gray(level: u8) -> u8 {
    ((level as u32 * 255 + 4) / 9) as u8
}

fn parse_header(line: &str) -> Result<(u32, u32), CodecError> {
    let corrupt = || CodecError::Corrupt(format!("invalid text image header '{}'", line));
    let dims = line.strip_prefix(HEADER_PREFIX).ok_or_else(corrupt)?;
    let (w, h) = dims.trim_end().split_once('x').ok_or_else(corrupt)?;
    let w: u32 = w.parse().map_err(|_| corrupt())?;
    let h: u32 = h.parse().map_err(|_| corrupt())?;
    match (w as usize).checked_mul(h as usize) {
        Some(cells) if cells <= MAX_CELLS => Ok((w, h)),
        _ => Err(CodecError::Corrupt(format!("text image {}x{} is too large", w, h))),
    }
}

/// Parses the text format back into a grayscale image.
pub fn parse_grid(text: &str) -> Result<Image, CodecError> {
    let mut lines = text.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l));
    let header = lines
        .next()
        .filter(|l| !l.is_empty())
        .ok_or_else(|| CodecError::Corrupt("empty text image".to_string()))?;
    let (width, height) = parse_header(header)?;

    let mut gray = vec![0u8; width as usize * height as usize];
    for (row, line) in lines.enumerate() {
        if row >= height as usize {
            if line.trim_end().is_empty() {
                continue;
            }
            return Err(CodecError::Corrupt(format!(
                "text image has more than {} rows",
                height
            )));
        }
        // Short rows were trimmed by an editor; the rest is blank.
        for (col, ch) in line.chars().enumerate() {
            if col >= width as usize {
                return Err(CodecError::Corrupt(format!(
                    "row {} is wider than {} columns",
                    row + 1,
                    width
                )));
            }
            let level = u8::try_from(ch)
                .ok()
                .and_then(|b| RAMP.iter().position(|&r| r == b))
                .ok_or_else(|| {
                    CodecError::Corrupt(format!("unexpected character {:?} in row {}", ch, row + 1))
                })?;
            gray[row * width as usize + col] = level_to_gray(level as u8);
        }
    }

    Image::from_gray(width, height, &gray).map_err(|e| CodecError::Corrupt(e.to_string()))
}

/// Lossy text rendering codec for image references without a binary
/// extension.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextImageCodec;

impl TextImageCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Codec for TextImageCodec {
    fn name(&self) -> &'static str {
        "text-image"
    }

    fn encode(&self, value: &ActualValue, options: &EncodeOptions) -> Result<Vec<u8>, CodecError> {
        let image = value
            .as_image()
            .ok_or_else(|| CodecError::Unsupported("value is not image-like".to_string()))?;
        let grid = render_grid(image, options.text_columns);
        let (cols, rows) = grid_size(image.width(), image.height(), options.text_columns);

        let mut out = format!("{}{}x{}\n", HEADER_PREFIX, cols, rows);
        for line in grid {
            out.push_str(&line);
            out.push('\n');
        }
        Ok(out.into_bytes())
    }

    fn decode(&self, bytes: &[u8]) -> Result<Comparable, CodecError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| CodecError::Corrupt(format!("text image is not UTF-8: {}", e)))?;
        parse_grid(text).map(Comparable::Image)
    }
}
