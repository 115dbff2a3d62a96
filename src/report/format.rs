//! Terminal output for the `reframe` binary.
//!
//! All formatting lives here so the engine never prints and output changes
//! stay in one place. Coordinates are always shown with three decimals.

use nalgebra::Vector2;

use crate::app::pipeline::BatchSummary;
use crate::dataset::{Dataset, DatasetSource, describe_geometry};
use crate::domain::{Point3D, TransformResult};

/// Shown for every failure that is not a range error.
pub const INTERNAL_ERROR_MESSAGE: &str = "REFRAME internal error, please reinstall application.";

pub fn format_input(point: &Point3D) -> String {
    format!("REFRAME input: {}", format_point(point))
}

pub fn format_result(result: &TransformResult) -> String {
    format!("REFRAME transformation terminated: {}", format_point(&result.point))
}

/// Notice printed when a point outside the perimeter was only translated.
/// `applied` is signed as it was applied to the input.
pub fn format_fallback_notice(applied: Vector2<f64>) -> String {
    format!(
        "This point is outside the official perimeter. A translation {}/{} was applied.",
        format_signed_thousands(applied.x),
        format_signed_thousands(applied.y)
    )
}

pub fn format_point(point: &Point3D) -> String {
    format!(
        "E: {:.3} m / N: {:.3} m / H: {:.3} m",
        point.easting, point.northing, point.height
    )
}

/// Dataset overview for `reframe info`.
pub fn format_dataset_info(dataset: &Dataset, source: &DatasetSource, tolerance: f64) -> String {
    let meta = &dataset.metadata;
    let (min, max) = dataset.perimeter.bounding_box();
    let mut out = String::new();

    out.push_str("=== reframe - correction dataset ===\n");
    out.push_str(&format!("Source: {}\n", source.describe()));
    out.push_str(&format!("Format version: {}\n", meta.version));
    out.push_str(&format!("Published: {}\n", meta.published.format("%Y-%m-%d")));
    out.push_str(&format!(
        "Checksum (SHA-256): {}\n",
        dataset.checksum.as_deref().unwrap_or("n/a")
    ));
    out.push_str(&format!(
        "Translation: E {} / N {} m\n",
        format_signed_thousands(meta.translation.x),
        format_signed_thousands(meta.translation.y)
    ));
    out.push_str(&format!("Fallback tolerance: {tolerance:.0} m\n"));
    out.push_str(&format!(
        "Perimeter: {} vertices, E {:.0}..{:.0}, N {:.0}..{:.0}\n",
        dataset.perimeter.vertices().len(),
        min.x,
        max.x,
        min.y,
        max.y
    ));
    out.push_str(&format!(
        "Planimetric grid: {}\n",
        describe_geometry(dataset.planimetric.geometry())
    ));
    out.push_str(&format!(
        "Altimetric grid: {}",
        describe_geometry(dataset.altimetric.geometry())
    ));

    out
}

pub fn format_batch_summary(summary: &BatchSummary) -> String {
    format!(
        "Rows: {} | transformed: {} (outside perimeter: {}) | out of range: {} | invalid: {}",
        summary.rows.len(),
        summary.transformed,
        summary.fallback,
        summary.out_of_range,
        summary.invalid
    )
}

/// `+2'000'000.0` style, as used in Swiss survey documents.
fn format_signed_thousands(v: f64) -> String {
    let sign = if v < 0.0 { '-' } else { '+' };
    let tenths = (v.abs() * 10.0).round() as u64;
    let digits = (tenths / 10).to_string();

    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('\'');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}.{}", tenths % 10)
}
