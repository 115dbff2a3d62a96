//! Generator for the packaged correction dataset.
//!
//! The packaged asset (`data/swiss-reframe.rfg`) is a smooth synthetic model of
//! the LV03 -> LV95 residual distortions (metre level) and of the LN02 -> LHN95
//! height offsets (decimetre level) over a simplified national perimeter. It
//! exercises the engine end to end with realistic magnitudes; a surveyed
//! dataset in the same format can be supplied with `REFRAME_DATASET`.
//!
//! `reframe dataset build --out <PATH>` regenerates the asset.

use chrono::NaiveDate;
use nalgebra::{Point2, Vector2};

use crate::dataset::{Dataset, DatasetMetadata, FORMAT_VERSION};
use crate::error::DatasetError;
use crate::grid::{CorrectionGrid, GridGeometry};
use crate::perimeter::Perimeter;

/// South-west node of both grids (legacy military frame).
pub const GRID_ORIGIN: (f64, f64) = (470_000.0, 60_000.0);
pub const GRID_CELL: f64 = 5_000.0;
pub const GRID_COLS: usize = 77;
pub const GRID_ROWS: usize = 51;

/// LV03 military -> LV95 false-origin change.
pub const TRANSLATION: (f64, f64) = (2_000_000.0, 1_000_000.0);

/// Fallback band around the perimeter, metres.
pub const FALLBACK_TOLERANCE: f64 = 50_000.0;

/// Simplified national outline, counter-clockwise from the south-west.
pub const PERIMETER: [(f64, f64); 13] = [
    (485_000.0, 112_000.0),
    (555_000.0, 75_000.0),
    (635_000.0, 80_000.0),
    (690_000.0, 70_000.0),
    (725_000.0, 75_000.0),
    (760_000.0, 115_000.0),
    (835_000.0, 125_000.0),
    (835_000.0, 210_000.0),
    (765_000.0, 265_000.0),
    (685_000.0, 300_000.0),
    (610_000.0, 275_000.0),
    (565_000.0, 265_000.0),
    (500_000.0, 190_000.0),
];

pub fn published() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Planimetric residual shift (modern - legacy - translation) in metres.
pub fn planimetric_shift(p: Point2<f64>) -> Vector2<f64> {
    let (u, v) = normalized(p);
    Vector2::new(
        0.45 * (1.3 * u + 0.4).sin() + 0.25 * (0.9 * v - 0.2).cos() + 0.12 * u * v,
        0.38 * (1.1 * u - 0.3).cos() - 0.21 * (1.7 * v + 0.5).sin() + 0.08 * u * u,
    )
}

/// Height offset (LHN95 - LN02) in metres.
pub fn height_offset(p: Point2<f64>) -> f64 {
    let (u, v) = normalized(p);
    -0.12 + 0.22 * (0.8 * u + 1.1 * v).sin() + 0.05 * v * v
}

/// Build the dataset in memory. Values are rounded to `f32` like the stored form.
pub fn build() -> Result<Dataset, DatasetError> {
    let geometry = GridGeometry::new(
        Point2::new(GRID_ORIGIN.0, GRID_ORIGIN.1),
        Vector2::new(GRID_CELL, GRID_CELL),
        GRID_COLS,
        GRID_ROWS,
    )?;
    let planimetric = CorrectionGrid::from_fn(geometry, |p| planimetric_shift(p).map(round_f32));
    let altimetric = CorrectionGrid::from_fn(geometry, |p| round_f32(height_offset(p)));

    let metadata = DatasetMetadata {
        version: FORMAT_VERSION,
        published: published(),
        translation: Vector2::new(TRANSLATION.0, TRANSLATION.1),
        fallback_tolerance: FALLBACK_TOLERANCE,
    };

    Dataset::new(metadata, planimetric, altimetric, perimeter()?)
}

/// The outline as a `Perimeter`.
pub fn perimeter() -> Result<Perimeter, DatasetError> {
    Perimeter::new(PERIMETER.iter().map(|&(e, n)| Point2::new(e, n)).collect())
}

fn normalized(p: Point2<f64>) -> (f64, f64) {
    ((p.x - 600_000.0) / 100_000.0, (p.y - 200_000.0) / 100_000.0)
}

fn round_f32(v: f64) -> f64 {
    v as f32 as f64
}
