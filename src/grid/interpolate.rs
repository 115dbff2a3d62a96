//! Bilinear interpolation over a `CorrectionGrid`.
//!
//! The enclosing cell is found from the offset to the grid origin divided by
//! the cell size; the four corner values are then weighted by the fractional
//! position inside the cell:
//!
//! ```text
//! v = v00 (1-tx)(1-ty) + v10 tx (1-ty) + v01 (1-tx) ty + v11 tx ty
//! ```
//!
//! On the last row/column the cell before it is used with `t = 1`, so the
//! extent is boundary-inclusive and node positions return stored values
//! exactly.

use nalgebra::Point2;

use crate::error::GridError;
use crate::grid::{Correction, CorrectionGrid};

/// Interpolate the correction at `position`.
///
/// Fails with `GridError::OutOfGridBounds` outside the grid extent.
pub fn interpolate<V: Correction>(grid: &CorrectionGrid<V>, position: Point2<f64>) -> Result<V, GridError> {
    let geometry = grid.geometry();
    let (fx, fy) = geometry
        .fractional_index(position)
        .ok_or(GridError::OutOfGridBounds {
            easting: position.x,
            northing: position.y,
        })?;

    let (col, tx) = split_index(fx, geometry.cols);
    let (row, ty) = split_index(fy, geometry.rows);

    let v00 = grid.node(col, row);
    let v10 = grid.node(col + 1, row);
    let v01 = grid.node(col, row + 1);
    let v11 = grid.node(col + 1, row + 1);

    Ok(v00 * ((1.0 - tx) * (1.0 - ty)) + v10 * (tx * (1.0 - ty)) + v01 * ((1.0 - tx) * ty) + v11 * (tx * ty))
}

/// Interpolate at the nearest position inside the grid extent.
///
/// Used for the fallback path, where the position is known to be outside the
/// perimeter and the closest edge correction is applied.
pub fn interpolate_clamped<V: Correction>(grid: &CorrectionGrid<V>, position: Point2<f64>) -> Result<V, GridError> {
    interpolate(grid, grid.geometry().clamp(position))
}

/// Split a fractional node index into a cell index and the offset inside it.
fn split_index(f: f64, nodes: usize) -> (usize, f64) {
    let cell = (f.floor() as usize).min(nodes - 2);
    (cell, f - cell as f64)
}

#[cfg(test)]
mod tests {
    use nalgebra::Vector2;

    use super::*;
    use crate::grid::GridGeometry;

    fn plane_grid() -> CorrectionGrid<f64> {
        // v = 2x + 3y + 1 is reproduced exactly by bilinear interpolation.
        let geometry = GridGeometry::new(Point2::new(0.0, 0.0), Vector2::new(10.0, 10.0), 5, 4).unwrap();
        CorrectionGrid::from_fn(geometry, |p| 2.0 * p.x + 3.0 * p.y + 1.0)
    }

    fn odd_grid() -> CorrectionGrid<Vector2<f64>> {
        let geometry =
            GridGeometry::new(Point2::new(480_000.0, 70_000.0), Vector2::new(1000.0, 1000.0), 6, 5).unwrap();
        CorrectionGrid::from_fn(geometry, |p| {
            Vector2::new((p.x * 0.000_37).sin() * 0.731, (p.y * 0.000_91).cos() * 0.417)
        })
    }

    #[test]
    fn linear_field_is_reproduced() {
        let grid = plane_grid();
        for &(x, y) in &[(3.3, 7.1), (12.5, 29.9), (40.0, 0.0), (0.0, 30.0), (25.0, 15.0)] {
            let v = interpolate(&grid, Point2::new(x, y)).unwrap();
            let expected = 2.0 * x + 3.0 * y + 1.0;
            assert!((v - expected).abs() < 1e-12, "({x},{y}) -> {v}, expected {expected}");
        }
    }

    #[test]
    fn nodes_are_exact() {
        let grid = odd_grid();
        let geometry = *grid.geometry();
        for row in 0..geometry.rows {
            for col in 0..geometry.cols {
                let v = interpolate(&grid, geometry.node_position(col, row)).unwrap();
                assert_eq!(v, grid.node(col, row), "node ({col},{row})");
            }
        }
    }

    #[test]
    fn max_boundary_is_inclusive_and_one_cell_beyond_fails() {
        let grid = odd_grid();
        let max = grid.geometry().max();
        assert!(interpolate(&grid, max).is_ok());

        let beyond_col = Point2::new(max.x + 1000.0, max.y);
        let beyond_row = Point2::new(max.x, max.y + 1000.0);
        assert!(matches!(
            interpolate(&grid, beyond_col),
            Err(GridError::OutOfGridBounds { .. })
        ));
        assert!(interpolate(&grid, beyond_row).is_err());
    }

    #[test]
    fn midpoint_is_corner_average() {
        let grid = odd_grid();
        let p = Point2::new(481_500.0, 71_500.0);
        let expected = (grid.node(1, 1) + grid.node(2, 1) + grid.node(1, 2) + grid.node(2, 2)) * 0.25;
        let v = interpolate(&grid, p).unwrap();
        assert!((v - expected).norm() < 1e-12);
    }

    #[test]
    fn clamped_lookup_uses_nearest_edge() {
        let grid = plane_grid();
        let outside = interpolate_clamped(&grid, Point2::new(-50.0, 12.0)).unwrap();
        let edge = interpolate(&grid, Point2::new(0.0, 12.0)).unwrap();
        assert_eq!(outside, edge);
        assert!(interpolate_clamped(&grid, Point2::new(f64::NAN, 0.0)).is_err());
    }
}
