//! Height frame conversion.
//!
//! `LHN95 = LN02 + offset(position)`, where the offset is interpolated on the
//! altimetric grid at the legacy military horizontal position. Heights have
//! no fallback: outside the perimeter the offset is not defined, so any actual
//! conversion there is a range error on the height.

use nalgebra::Point2;

use crate::domain::{AltimetricFrame, Field, PerimeterZone};
use crate::error::TransformError;
use crate::grid::{CorrectionGrid, interpolate};
use crate::perimeter::PerimeterPolicy;

/// Convert `height` at legacy military `position` from `source` to `target`.
///
/// Same-frame calls return the height unchanged without consulting the
/// perimeter.
pub fn transform_altimetric(
    grid: &CorrectionGrid<f64>,
    policy: &PerimeterPolicy<'_>,
    height: f64,
    position: Point2<f64>,
    source: AltimetricFrame,
    target: AltimetricFrame,
) -> Result<f64, TransformError> {
    if !height.is_finite() {
        return Err(TransformError::out_of_range(Field::Height, height, PerimeterZone::Rejected));
    }
    if source == target {
        return Ok(height);
    }

    let zone = policy.classify(position);
    if zone != PerimeterZone::Inside {
        return Err(TransformError::out_of_range(Field::Height, height, zone));
    }

    let offset = interpolate(grid, position)?;
    Ok(match target {
        AltimetricFrame::ModernLeveling => height + offset,
        AltimetricFrame::LegacyLeveling => height - offset,
    })
}
