//! Perimeter polygon in the legacy (military) coordinate space.
//!
//! The polygon is stored open: the last vertex connects back to the first.
//! Points on an edge count as inside.

use nalgebra::Point2;

use crate::error::DatasetError;

/// Distance (metres) under which a point is considered on the boundary.
const BOUNDARY_EPS: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct Perimeter {
    vertices: Vec<Point2<f64>>,
}

impl Perimeter {
    pub fn new(mut vertices: Vec<Point2<f64>>) -> Result<Self, DatasetError> {
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        if vertices.len() < 3 {
            return Err(DatasetError::Invalid(format!(
                "perimeter needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }
        if vertices.iter().any(|v| !(v.x.is_finite() && v.y.is_finite())) {
            return Err(DatasetError::Invalid("perimeter vertex is not finite".into()));
        }
        let perimeter = Self { vertices };
        if perimeter.signed_area().abs() <= f64::EPSILON {
            return Err(DatasetError::Invalid("perimeter has zero area".into()));
        }
        Ok(perimeter)
    }

    /// Axis-aligned rectangle, mostly useful for tests and simple datasets.
    pub fn rectangle(min: Point2<f64>, max: Point2<f64>) -> Result<Self, DatasetError> {
        Self::new(vec![
            min,
            Point2::new(max.x, min.y),
            max,
            Point2::new(min.x, max.y),
        ])
    }

    pub fn vertices(&self) -> &[Point2<f64>] {
        &self.vertices
    }

    /// `(min, max)` corners of the bounding box.
    pub fn bounding_box(&self) -> (Point2<f64>, Point2<f64>) {
        let mut min = self.vertices[0];
        let mut max = self.vertices[0];
        for v in &self.vertices[1..] {
            min.x = min.x.min(v.x);
            min.y = min.y.min(v.y);
            max.x = max.x.max(v.x);
            max.y = max.y.max(v.y);
        }
        (min, max)
    }

    /// Boundary-inclusive point-in-polygon test (even-odd ray casting).
    pub fn contains(&self, p: Point2<f64>) -> bool {
        if !(p.x.is_finite() && p.y.is_finite()) {
            return false;
        }
        if (self.nearest_boundary_point(p) - p).norm() <= BOUNDARY_EPS {
            return true;
        }

        let mut inside = false;
        for (a, b) in self.edges() {
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if p.x < x_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Closest point on the polygon outline.
    pub fn nearest_boundary_point(&self, p: Point2<f64>) -> Point2<f64> {
        let mut best = self.vertices[0];
        let mut best_dist = f64::INFINITY;
        for (a, b) in self.edges() {
            let q = nearest_on_segment(p, a, b);
            let d = (q - p).norm_squared();
            if d < best_dist {
                best_dist = d;
                best = q;
            }
        }
        best
    }

    /// Distance from `p` to the perimeter; zero inside.
    pub fn distance(&self, p: Point2<f64>) -> f64 {
        if self.contains(p) {
            0.0
        } else {
            (self.nearest_boundary_point(p) - p).norm()
        }
    }

    fn edges(&self) -> impl Iterator<Item = (Point2<f64>, Point2<f64>)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    fn signed_area(&self) -> f64 {
        self.edges().map(|(a, b)| a.x * b.y - b.x * a.y).sum::<f64>() * 0.5
    }
}

fn nearest_on_segment(p: Point2<f64>, a: Point2<f64>, b: Point2<f64>) -> Point2<f64> {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 == 0.0 {
        return a;
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    a + ab * t
}
