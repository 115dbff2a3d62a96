//! Correction dataset: the planimetric shift grid, the altimetric offset
//! grid, the supported perimeter and the metadata that goes with them.
//!
//! - in-memory model and validation (this module)
//! - versioned binary codec (`format`)
//! - process-wide lazy loading (`loader`)
//! - generator for the packaged asset (`synthetic`)

use chrono::NaiveDate;
use nalgebra::Vector2;

use crate::error::DatasetError;
use crate::grid::{CorrectionGrid, GridGeometry};
use crate::perimeter::Perimeter;

pub mod format;
pub mod loader;
pub mod synthetic;

pub use format::{FORMAT_VERSION, decode, encode};
pub use loader::{DatasetCache, DatasetSource, EMBEDDED_DATASET};

/// Descriptive and policy values carried by the dataset header.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetMetadata {
    pub version: u16,
    pub published: NaiveDate,
    /// Frame-origin translation from the legacy military frame to the modern frame.
    pub translation: Vector2<f64>,
    /// Maximum distance (metres) from the perimeter for the fallback translation.
    pub fallback_tolerance: f64,
}

/// A fully validated correction dataset. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub metadata: DatasetMetadata,
    pub planimetric: CorrectionGrid<Vector2<f64>>,
    pub altimetric: CorrectionGrid<f64>,
    pub perimeter: Perimeter,
    /// Hex SHA-256 of the encoded body, when loaded from bytes.
    pub checksum: Option<String>,
}

impl Dataset {
    pub fn new(
        metadata: DatasetMetadata,
        planimetric: CorrectionGrid<Vector2<f64>>,
        altimetric: CorrectionGrid<f64>,
        perimeter: Perimeter,
    ) -> Result<Self, DatasetError> {
        let t = metadata.translation;
        if !(t.x.is_finite() && t.y.is_finite()) {
            return Err(DatasetError::Invalid("translation is not finite".into()));
        }
        if !(metadata.fallback_tolerance.is_finite() && metadata.fallback_tolerance >= 0.0) {
            return Err(DatasetError::Invalid(format!(
                "fallback tolerance must be >= 0, got {}",
                metadata.fallback_tolerance
            )));
        }
        if planimetric.values().iter().any(|v| !(v.x.is_finite() && v.y.is_finite())) {
            return Err(DatasetError::Invalid("planimetric grid holds non-finite values".into()));
        }
        if altimetric.values().iter().any(|v| !v.is_finite()) {
            return Err(DatasetError::Invalid("altimetric grid holds non-finite values".into()));
        }

        // Every position inside the perimeter must be interpolable on both grids.
        let (min, max) = perimeter.bounding_box();
        for (name, geometry) in [
            ("planimetric", planimetric.geometry()),
            ("altimetric", altimetric.geometry()),
        ] {
            if !(geometry.contains(min) && geometry.contains(max)) {
                return Err(DatasetError::Invalid(format!(
                    "perimeter extends beyond the {name} grid extent"
                )));
            }
        }

        Ok(Self {
            metadata,
            planimetric,
            altimetric,
            perimeter,
            checksum: None,
        })
    }

    pub fn with_checksum(mut self, checksum: String) -> Self {
        self.checksum = Some(checksum);
        self
    }
}

/// Short description of a grid for logs and `reframe info`.
pub fn describe_geometry(geometry: &GridGeometry) -> String {
    let max = geometry.max();
    format!(
        "{}x{} nodes, E {:.0}..{:.0}, N {:.0}..{:.0}, cell {:.0} x {:.0} m",
        geometry.cols,
        geometry.rows,
        geometry.origin.x,
        max.x,
        geometry.origin.y,
        max.y,
        geometry.cell.x,
        geometry.cell.y
    )
}
