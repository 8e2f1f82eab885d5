//! Concave hull (alpha-shape) simplification of closed 2D curves (§4.3).
//!
//! Triangulates the vertex set with `delaunator`, keeps triangles whose
//! circumradius is at most `1 / alpha`, and takes the boundary edges of
//! the surviving triangles (edges owned by exactly one kept triangle) as
//! the hull's unordered vertex set.

use std::collections::BTreeMap;

use nalgebra::Point3;

use crate::sequence::sequence_points;
use crate::types::Curve3;

/// Circumradius of the triangle `(a, b, c)` in the xy-plane.
fn circumradius(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> f64 {
    let ab = (a - b).norm();
    let bc = (b - c).norm();
    let ca = (c - a).norm();
    let area2 = ((b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)).abs();
    if area2 < f64::EPSILON {
        return f64::INFINITY;
    }
    (ab * bc * ca) / (2.0 * area2)
}

/// Compute the alpha-shape boundary vertex set of `points` (a closed
/// curve's interior points, first/last duplicate already stripped by
/// the caller). Falls back to returning `points` unchanged when there
/// are too few points to triangulate or no triangle survives filtering.
#[must_use]
pub fn alpha_shape_boundary(points: &[Point3<f64>], alpha: f64) -> Vec<Point3<f64>> {
    if points.len() < 3 || alpha <= 0.0 {
        return points.to_vec();
    }

    let coords: Vec<delaunator::Point> = points.iter().map(|p| delaunator::Point { x: p.x, y: p.y }).collect();
    let triangulation = delaunator::triangulate(&coords);
    let max_circumradius = 1.0 / alpha;

    let mut edge_counts: BTreeMap<(usize, usize), u32> = BTreeMap::new();
    for tri in triangulation.triangles.chunks(3) {
        let [i0, i1, i2] = [tri[0], tri[1], tri[2]];
        if circumradius(points[i0], points[i1], points[i2]) <= max_circumradius {
            for &(u, v) in &[(i0, i1), (i1, i2), (i2, i0)] {
                let key = if u < v { (u, v) } else { (v, u) };
                *edge_counts.entry(key).or_insert(0) += 1;
            }
        }
    }

    let mut vertex_idx: Vec<usize> = edge_counts
        .into_iter()
        .filter(|&(_, count)| count == 1)
        .flat_map(|((u, v), _)| [u, v])
        .collect();
    vertex_idx.sort_unstable();
    vertex_idx.dedup();

    if vertex_idx.is_empty() {
        return points.to_vec();
    }
    vertex_idx.into_iter().map(|i| points[i]).collect()
}

/// Simplify a closed curve by replacing its interior with the alpha-shape
/// boundary, re-sequenced and re-closed (§4.3 last paragraph).
#[must_use]
pub fn simplify_closed_curve(curve: &Curve3, alpha: f64) -> Curve3 {
    debug_assert!(curve.closed);
    let interior = &curve.points[..curve.points.len() - 1];
    let hull = alpha_shape_boundary(interior, alpha);
    let mut resequenced = sequence_points(&hull);
    if let Some(&first) = resequenced.first() {
        resequenced.push(first);
    }
    Curve3 { points: resequenced, closed: true }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::TAU;

    fn noisy_circle(n: usize, radius: f64) -> Vec<Point3<f64>> {
        (0..n)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let t = TAU * (i as f64) / (n as f64);
                // deterministic pseudo-noise, no RNG dependency
                let wobble = 1.0 + 0.01 * ((i * 37) % 7) as f64;
                Point3::new(radius * wobble * t.cos(), radius * wobble * t.sin(), 0.0)
            })
            .collect()
    }

    #[test]
    fn too_few_points_returns_unchanged() {
        let points = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        assert_eq!(alpha_shape_boundary(&points, 5.0), points);
    }

    #[test]
    fn non_positive_alpha_returns_unchanged() {
        let points = noisy_circle(20, 10.0);
        assert_eq!(alpha_shape_boundary(&points, 0.0), points);
    }

    #[test]
    fn circle_boundary_has_fewer_points_than_a_dense_ring() {
        let points = noisy_circle(500, 50.0);
        let boundary = alpha_shape_boundary(&points, 5.0);
        assert!(boundary.len() <= points.len());
        assert!(!boundary.is_empty());
    }

    #[test]
    fn simplify_closed_curve_reseals_first_and_last() {
        let mut points = noisy_circle(500, 50.0);
        let first = points[0];
        points.push(first);
        let curve = Curve3 { points, closed: true };
        let simplified = simplify_closed_curve(&curve, 5.0);
        assert!(simplified.closed);
        assert_eq!(simplified.points.first(), simplified.points.last());
        assert!(simplified.points.len() <= curve.points.len());
    }

    #[test]
    fn circumradius_of_right_triangle() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(2.0, 0.0, 0.0);
        let c = Point3::new(0.0, 2.0, 0.0);
        // hypotenuse of a right triangle is a diameter of the circumcircle
        let r = circumradius(a, b, c);
        assert!((r - 2.0_f64.sqrt()).abs() < 1e-9);
    }
}
