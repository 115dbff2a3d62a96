//! Correction grid storage.
//!
//! A grid is a regular lattice of `cols x rows` nodes starting at `origin`
//! (south-west node) with a constant spacing per axis. Each node carries a
//! correction value: a 2-D shift vector for the planimetric grid, a scalar
//! height offset for the altimetric grid.

use std::ops::{Add, Mul};

use nalgebra::{Point2, Vector2};

use crate::error::DatasetError;

/// Values that can be bilinearly blended.
pub trait Correction: Copy + Add<Output = Self> + Mul<f64, Output = Self> {}

impl<T> Correction for T where T: Copy + Add<Output = T> + Mul<f64, Output = T> {}

/// Fractional offsets closer than this to a node index are snapped onto it,
/// so node positions reproduce node values exactly.
const SNAP_EPS: f64 = 1e-9;

/// Placement of a grid in the legacy coordinate space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    pub origin: Point2<f64>,
    pub cell: Vector2<f64>,
    pub cols: usize,
    pub rows: usize,
}

impl GridGeometry {
    pub fn new(origin: Point2<f64>, cell: Vector2<f64>, cols: usize, rows: usize) -> Result<Self, DatasetError> {
        if !(origin.x.is_finite() && origin.y.is_finite()) {
            return Err(DatasetError::Invalid("grid origin is not finite".into()));
        }
        if !(cell.x.is_finite() && cell.y.is_finite() && cell.x > 0.0 && cell.y > 0.0) {
            return Err(DatasetError::Invalid(format!(
                "grid cell size must be positive, got {} x {}",
                cell.x, cell.y
            )));
        }
        if cols < 2 || rows < 2 {
            return Err(DatasetError::Invalid(format!(
                "grid needs at least 2x2 nodes, got {cols}x{rows}"
            )));
        }
        Ok(Self {
            origin,
            cell,
            cols,
            rows,
        })
    }

    /// North-east corner node.
    pub fn max(&self) -> Point2<f64> {
        Point2::new(
            self.origin.x + (self.cols - 1) as f64 * self.cell.x,
            self.origin.y + (self.rows - 1) as f64 * self.cell.y,
        )
    }

    /// Position of node `(col, row)`.
    pub fn node_position(&self, col: usize, row: usize) -> Point2<f64> {
        Point2::new(
            self.origin.x + col as f64 * self.cell.x,
            self.origin.y + row as f64 * self.cell.y,
        )
    }

    pub fn node_count(&self) -> usize {
        self.cols * self.rows
    }

    /// Boundary-inclusive containment test.
    pub fn contains(&self, position: Point2<f64>) -> bool {
        self.fractional_index(position).is_some()
    }

    /// Nearest position on or inside the grid extent.
    pub fn clamp(&self, position: Point2<f64>) -> Point2<f64> {
        let max = self.max();
        Point2::new(
            position.x.clamp(self.origin.x, max.x),
            position.y.clamp(self.origin.y, max.y),
        )
    }

    /// Position expressed in (fractional) node units, or `None` outside the extent.
    pub fn fractional_index(&self, position: Point2<f64>) -> Option<(f64, f64)> {
        let fx = snap((position.x - self.origin.x) / self.cell.x);
        let fy = snap((position.y - self.origin.y) / self.cell.y);
        let max_x = (self.cols - 1) as f64;
        let max_y = (self.rows - 1) as f64;
        // NaN fails every comparison and lands here too.
        if !(fx >= 0.0 && fx <= max_x && fy >= 0.0 && fy <= max_y) {
            return None;
        }
        Some((fx, fy))
    }
}

fn snap(value: f64) -> f64 {
    let nearest = value.round();
    if (value - nearest).abs() < SNAP_EPS {
        nearest
    } else {
        value
    }
}

/// Immutable grid of correction values, row-major from the south-west node.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionGrid<V> {
    geometry: GridGeometry,
    values: Vec<V>,
}

impl<V: Correction> CorrectionGrid<V> {
    pub fn new(geometry: GridGeometry, values: Vec<V>) -> Result<Self, DatasetError> {
        if values.len() != geometry.node_count() {
            return Err(DatasetError::Invalid(format!(
                "grid holds {} values, geometry needs {}",
                values.len(),
                geometry.node_count()
            )));
        }
        Ok(Self { geometry, values })
    }

    /// Build a grid by evaluating `f` at every node position.
    pub fn from_fn(geometry: GridGeometry, mut f: impl FnMut(Point2<f64>) -> V) -> Self {
        let mut values = Vec::with_capacity(geometry.node_count());
        for row in 0..geometry.rows {
            for col in 0..geometry.cols {
                values.push(f(geometry.node_position(col, row)));
            }
        }
        Self { geometry, values }
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Stored value at node `(col, row)`.
    ///
    /// # Panics
    /// Panics if the indices are outside the grid. Callers index from a
    /// validated `fractional_index`.
    pub fn node(&self, col: usize, row: usize) -> V {
        self.values[row * self.geometry.cols + col]
    }

    pub fn values(&self) -> &[V] {
        &self.values
    }
}
