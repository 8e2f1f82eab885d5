//! Simplify a (possibly merged) 3D curve by minimum inter-vertex distance (§4.6).

use crate::normals::CurveNormals;

/// Keep the first vertex; walk interior vertices keeping only those more
/// than `min_dist` from the last kept vertex; always keep the last vertex.
#[must_use]
pub fn simplify_by_min_dist(curve: CurveNormals, min_dist: f64) -> CurveNormals {
    let n = curve.points.len();
    if n <= 2 {
        return curve;
    }
    let CurveNormals { points, normals, closed } = curve;

    let mut kept_points = Vec::with_capacity(points.len());
    let mut kept_normals = Vec::with_capacity(normals.len());
    kept_points.push(points[0]);
    kept_normals.push(normals[0]);
    let mut last_kept = points[0];

    for i in 1..n - 1 {
        if (points[i] - last_kept).norm() > min_dist {
            kept_points.push(points[i]);
            kept_normals.push(normals[i]);
            last_kept = points[i];
        }
    }

    kept_points.push(points[n - 1]);
    kept_normals.push(normals[n - 1]);
    CurveNormals { points: kept_points, normals: kept_normals, closed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Point3, Vector3};

    fn curve(points: Vec<Point3<f64>>) -> CurveNormals {
        let n = points.len();
        CurveNormals { points, normals: vec![Vector3::z(); n], closed: false }
    }

    #[test]
    fn two_or_fewer_points_is_unchanged() {
        let c = curve(vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)]);
        let simplified = simplify_by_min_dist(c.clone(), 0.5);
        assert_eq!(simplified.points, c.points);
    }

    #[test]
    fn close_interior_points_are_dropped() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.01, 0.0, 0.0),
            Point3::new(0.02, 0.0, 0.0),
            Point3::new(5.0, 0.0, 0.0),
        ];
        let simplified = simplify_by_min_dist(curve(points), 1.0);
        assert_eq!(simplified.points.len(), 2);
        assert_eq!(simplified.points[0], Point3::new(0.0, 0.0, 0.0));
        assert_eq!(simplified.points[1], Point3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn last_vertex_is_always_kept() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.001, 0.0, 0.0),
            Point3::new(0.002, 0.0, 0.0),
        ];
        let simplified = simplify_by_min_dist(curve(points.clone()), 10.0);
        assert_eq!(simplified.points.last(), points.last());
    }

    #[test]
    fn normals_stay_aligned_with_surviving_points() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.01, 0.0, 0.0),
            Point3::new(5.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 0.0),
        ];
        let simplified = simplify_by_min_dist(curve(points), 1.0);
        assert_eq!(simplified.points.len(), simplified.normals.len());
    }
}
