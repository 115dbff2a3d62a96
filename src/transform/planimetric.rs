//! Horizontal frame conversion.
//!
//! ```text
//! military = civil + (600000, 200000)
//! modern   = military + translation + shift(military)
//! ```
//!
//! `shift` is the bilinear lookup on the planimetric grid. The modern ->
//! legacy direction has no closed form because the shift is evaluated at the
//! unknown legacy position; it is solved by fixed-point iteration, which
//! converges in a few steps since the shift varies by micrometres per metre.

use nalgebra::{Point2, Vector2};

use crate::dataset::Dataset;
use crate::domain::{Field, PerimeterZone, PlanimetricFrame, Point3D};
use crate::error::TransformError;
use crate::grid::{CorrectionGrid, interpolate, interpolate_clamped};
use crate::perimeter::PerimeterPolicy;

/// Legacy military coordinates of the legacy civil origin (Bern).
pub const LEGACY_CIVIL_ORIGIN: (f64, f64) = (600_000.0, 200_000.0);

fn civil_origin() -> Vector2<f64> {
    Vector2::new(LEGACY_CIVIL_ORIGIN.0, LEGACY_CIVIL_ORIGIN.1)
}

pub fn civil_to_military(position: Point2<f64>) -> Point2<f64> {
    position + civil_origin()
}

pub fn military_to_civil(position: Point2<f64>) -> Point2<f64> {
    position - civil_origin()
}

/// Frame-origin translation a conversion applies: added towards the modern
/// frame, subtracted away from it, none between the legacy variants.
pub fn applied_translation(
    translation: Vector2<f64>,
    source: PlanimetricFrame,
    target: PlanimetricFrame,
) -> Option<Vector2<f64>> {
    match (source.is_legacy(), target.is_legacy()) {
        (true, false) => Some(translation),
        (false, true) => Some(-translation),
        _ => None,
    }
}

/// How the shift grid is consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftLookup {
    /// Position must lie inside the grid extent.
    Strict,
    /// Position is moved to the nearest grid edge first (fallback zone).
    NearestEdge,
}

impl ShiftLookup {
    pub fn for_zone(zone: PerimeterZone) -> Self {
        match zone {
            PerimeterZone::Inside => ShiftLookup::Strict,
            PerimeterZone::Fallback | PerimeterZone::Rejected => ShiftLookup::NearestEdge,
        }
    }
}

/// Stopping rule for the modern -> legacy iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InverseSettings {
    /// Update size (metres) below which the iteration stops.
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for InverseSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-9,
            max_iterations: 50,
        }
    }
}

/// Legacy <-> modern mapping backed by the planimetric grid.
#[derive(Debug, Clone, Copy)]
pub struct ShiftModel<'a> {
    grid: &'a CorrectionGrid<Vector2<f64>>,
    translation: Vector2<f64>,
}

impl<'a> ShiftModel<'a> {
    pub fn new(grid: &'a CorrectionGrid<Vector2<f64>>, translation: Vector2<f64>) -> Self {
        Self { grid, translation }
    }

    pub fn from_dataset(dataset: &'a Dataset) -> Self {
        Self::new(&dataset.planimetric, dataset.metadata.translation)
    }

    pub fn translation(&self) -> Vector2<f64> {
        self.translation
    }

    /// Grid shift at a legacy military position.
    pub fn shift(&self, legacy: Point2<f64>, lookup: ShiftLookup) -> Result<Vector2<f64>, TransformError> {
        let shift = match lookup {
            ShiftLookup::Strict => interpolate(self.grid, legacy)?,
            ShiftLookup::NearestEdge => interpolate_clamped(self.grid, legacy)?,
        };
        Ok(shift)
    }

    pub fn to_modern(&self, legacy: Point2<f64>, lookup: ShiftLookup) -> Result<Point2<f64>, TransformError> {
        Ok(legacy + self.translation + self.shift(legacy, lookup)?)
    }

    /// Invert `to_modern` by fixed-point iteration.
    pub fn to_legacy(
        &self,
        modern: Point2<f64>,
        lookup: ShiftLookup,
        settings: InverseSettings,
    ) -> Result<Point2<f64>, TransformError> {
        let base = modern - self.translation;
        // Far from the origin the float spacing can exceed the absolute tolerance.
        let tolerance = settings.tolerance.max(4.0 * f64::EPSILON * base.coords.norm());

        let mut legacy = base;
        for _ in 0..settings.max_iterations {
            let next = base - self.shift(legacy, lookup)?;
            let step = (next - legacy).norm();
            legacy = next;
            if step <= tolerance {
                return Ok(legacy);
            }
        }
        Err(TransformError::Internal(format!(
            "modern -> legacy iteration did not converge after {} steps at E {:.3} / N {:.3}",
            settings.max_iterations, modern.x, modern.y
        )))
    }
}

/// Result of a horizontal conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanimetricOutcome {
    /// Converted position in the target frame.
    pub position: Point2<f64>,
    /// The same location in the legacy military frame.
    pub anchor: Point2<f64>,
    /// `Inside` or `Fallback`.
    pub zone: PerimeterZone,
}

impl PlanimetricOutcome {
    pub fn inside_perimeter(&self) -> bool {
        self.zone == PerimeterZone::Inside
    }
}

/// Convert the horizontal part of `input` from `source` to `target`.
///
/// The perimeter policy is applied to the legacy military position: rejected
/// positions fail with a range error, fallback positions use the nearest grid
/// edge and are reported with `zone = Fallback`.
pub fn transform_planimetric(
    model: &ShiftModel<'_>,
    policy: &PerimeterPolicy<'_>,
    input: &Point3D,
    source: PlanimetricFrame,
    target: PlanimetricFrame,
    settings: InverseSettings,
) -> Result<PlanimetricOutcome, TransformError> {
    if !input.easting.is_finite() {
        return Err(TransformError::out_of_range(Field::Easting, input.easting, PerimeterZone::Rejected));
    }
    if !input.northing.is_finite() {
        return Err(TransformError::out_of_range(Field::Northing, input.northing, PerimeterZone::Rejected));
    }

    let position = input.planar();
    let anchor = match source {
        PlanimetricFrame::LegacyMilitary => position,
        PlanimetricFrame::LegacyCivilian => civil_to_military(position),
        PlanimetricFrame::Modern => model.to_legacy(position, ShiftLookup::NearestEdge, settings)?,
    };

    let zone = policy.classify(anchor);
    if zone == PerimeterZone::Rejected {
        return Err(policy.reject(anchor, input));
    }

    let converted = if source == target {
        position
    } else {
        match target {
            PlanimetricFrame::LegacyMilitary => anchor,
            PlanimetricFrame::LegacyCivilian => military_to_civil(anchor),
            PlanimetricFrame::Modern => model.to_modern(anchor, ShiftLookup::for_zone(zone))?,
        }
    };

    Ok(PlanimetricOutcome {
        position: converted,
        anchor,
        zone,
    })
}
