//! Compare command implementation
//!
//! Compares two reference files of the same kind with the default equality
//! for that kind and reports image metrics where they apply.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::process::ExitCode;

use refcheck::diff::diff_lines;
use refcheck_core::equality::{calculate_delta_e, calculate_psnr, calculate_ssim};
use refcheck_core::{
    default_equality, Comparable, ContentKind, FormatResolver, ImageMetric, ReferenceFile,
};

/// Header line that marks a text-image reference.
const TEXT_IMAGE_HEADER: &[u8] = b"refcheck-image ";

/// Machine-readable compare result.
#[derive(Debug, Serialize)]
pub struct CompareReport {
    pub a: String,
    pub b: String,
    pub kind: String,
    pub equal: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageMetrics>,
}

#[derive(Debug, Serialize)]
pub struct TextMetrics {
    pub lines_removed: usize,
    pub lines_added: usize,
}

#[derive(Debug, Serialize)]
pub struct ImageMetrics {
    pub width_a: u32,
    pub height_a: u32,
    pub width_b: u32,
    pub height_b: u32,
    /// `None` when dimensions differ.
    pub ssim: Option<f64>,
    /// `None` when dimensions differ or the images are identical.
    pub psnr_db: Option<f64>,
    pub delta_e_avg: Option<f64>,
    pub delta_e_max: Option<f64>,
}

/// Run the compare command
///
/// # Arguments
/// * `path_a` - Path to the first reference
/// * `path_b` - Path to the second reference
/// * `json_output` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: 0 when the references are equal, 1 when they differ
pub fn run(path_a: &str, path_b: &str, json_output: bool) -> Result<ExitCode> {
    let report = compare_files(Path::new(path_a), Path::new(path_b))?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(if report.equal {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

/// Decodes both files and compares them.
pub fn compare_files(file_a: &Path, file_b: &Path) -> Result<CompareReport> {
    let registry = refcheck_codecs::default_registry();
    let resolver = FormatResolver::new(registry.extensions(ContentKind::Hash));

    let (kind_a, form_a) = load(file_a, &registry, &resolver)?;
    let (kind_b, form_b) = load(file_b, &registry, &resolver)?;
    if kind_a != kind_b {
        anyhow::bail!("Cannot compare different kinds: {} vs {}", kind_a, kind_b);
    }

    let equal = default_equality(kind_a, ImageMetric::default()).matches(&form_a, &form_b);
    let mut report = CompareReport {
        a: file_a.display().to_string(),
        b: file_b.display().to_string(),
        kind: kind_a.to_string(),
        equal,
        text: None,
        image: None,
    };

    match (&form_a, &form_b) {
        (Comparable::Text(old), Comparable::Text(new)) => {
            let diff = diff_lines(old, new);
            report.text = Some(TextMetrics {
                lines_removed: diff
                    .iter()
                    .filter(|l| matches!(l, refcheck::diff::DiffLine::Removed(_)))
                    .count(),
                lines_added: diff
                    .iter()
                    .filter(|l| matches!(l, refcheck::diff::DiffLine::Added(_)))
                    .count(),
            });
        }
        (Comparable::Image(a), Comparable::Image(b)) => {
            let same_size = a.dimensions() == b.dimensions();
            let psnr = same_size.then(|| calculate_psnr(a, b));
            let delta_e = same_size.then(|| calculate_delta_e(a, b));
            report.image = Some(ImageMetrics {
                width_a: a.width(),
                height_a: a.height(),
                width_b: b.width(),
                height_b: b.height(),
                ssim: same_size.then(|| calculate_ssim(a, b)),
                psnr_db: psnr.filter(|p| p.is_finite()),
                delta_e_avg: delta_e.map(|(avg, _)| avg),
                delta_e_max: delta_e.map(|(_, max)| max),
            });
        }
        _ => {}
    }

    Ok(report)
}

/// Detects the kind of a reference file and decodes it.
fn load(
    path: &Path,
    registry: &refcheck_core::CodecRegistry,
    resolver: &FormatResolver,
) -> Result<(ContentKind, Comparable)> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let is_png = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"));
    let kind = if resolver.is_hash_path(path) {
        ContentKind::Hash
    } else if is_png || bytes.starts_with(TEXT_IMAGE_HEADER) {
        ContentKind::Image
    } else {
        ContentKind::Text
    };

    let reference = ReferenceFile::new(path.to_path_buf(), kind);
    let codec = registry.codec_for(&reference)?;
    let form = codec
        .decode(&bytes)
        .map_err(|e| anyhow::anyhow!("Failed to decode {}: {}", path.display(), e))?;
    Ok((kind, form))
}

fn print_report(report: &CompareReport) {
    println!("{}", "Comparing references:".cyan().bold());
    println!("  {} {}", "A:".dimmed(), report.a);
    println!("  {} {}", "B:".dimmed(), report.b);
    println!("{} {}", "Kind:".dimmed(), report.kind);

    if let Some(text) = &report.text {
        println!(
            "{} {} removed, {} added",
            "Lines:".dimmed(),
            text.lines_removed.to_string().red(),
            text.lines_added.to_string().green()
        );
    }

    if let Some(image) = &report.image {
        println!(
            "{} {}x{} vs {}x{}",
            "Size:".dimmed(),
            image.width_a,
            image.height_a,
            image.width_b,
            image.height_b
        );
        match (image.ssim, image.delta_e_avg, image.delta_e_max) {
            (Some(ssim), Some(avg), Some(max)) => {
                println!("  {} {:.6}", "SSIM:".dimmed(), ssim);
                match image.psnr_db {
                    Some(psnr) => println!("  {} {:.2} dB", "PSNR:".dimmed(), psnr),
                    None => println!("  {} inf", "PSNR:".dimmed()),
                }
                println!("  {} avg {:.4}, max {:.4}", "DeltaE:".dimmed(), avg, max);
            }
            _ => println!("  {}", "dimensions differ".yellow()),
        }
    }

    if report.equal {
        println!("\n{}", "References are equal".green().bold());
    } else {
        println!("\n{}", "References differ".red().bold());
    }
}
