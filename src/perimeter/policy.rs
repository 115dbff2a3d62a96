//! Per-call perimeter policy.
//!
//! Every transformation classifies its legacy position once:
//!
//! ```text
//! Start -> BoundsChecked -> Inside | Fallback | Rejected
//! ```
//!
//! `Fallback` covers positions outside the perimeter but no further than
//! `tolerance` metres from it. The tolerance comes from the dataset metadata
//! unless the engine configuration overrides it.

use nalgebra::Point2;

use crate::domain::{Field, PerimeterZone, Point3D};
use crate::error::TransformError;
use crate::perimeter::Perimeter;

#[derive(Debug, Clone, Copy)]
pub struct PerimeterPolicy<'a> {
    perimeter: &'a Perimeter,
    tolerance: f64,
}

impl<'a> PerimeterPolicy<'a> {
    pub fn new(perimeter: &'a Perimeter, tolerance: f64) -> Self {
        Self { perimeter, tolerance }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn classify(&self, position: Point2<f64>) -> PerimeterZone {
        if !(position.x.is_finite() && position.y.is_finite()) {
            return PerimeterZone::Rejected;
        }
        let distance = self.perimeter.distance(position);
        if distance == 0.0 {
            PerimeterZone::Inside
        } else if distance <= self.tolerance {
            PerimeterZone::Fallback
        } else {
            PerimeterZone::Rejected
        }
    }

    /// Range error for a rejected position.
    ///
    /// The field is the axis along which `position` is furthest from the
    /// perimeter (easting on ties); the reported value is the caller's input
    /// for that field.
    pub fn reject(&self, position: Point2<f64>, input: &Point3D) -> TransformError {
        let field = if !position.x.is_finite() {
            Field::Easting
        } else if !position.y.is_finite() {
            Field::Northing
        } else {
            let nearest = self.perimeter.nearest_boundary_point(position);
            let delta = position - nearest;
            if delta.x.abs() >= delta.y.abs() {
                Field::Easting
            } else {
                Field::Northing
            }
        };
        let value = match field {
            Field::Easting => input.easting,
            Field::Northing => input.northing,
            Field::Height => input.height,
        };
        TransformError::out_of_range(field, value, PerimeterZone::Rejected)
    }
}
