//! Oriented pose frame construction along a curve (§4.6, final stage).

use nalgebra::{Point3, Vector3};

use crate::error::PipelineError;
use crate::normals::CurveNormals;
use crate::types::Pose;

/// Build one right-handed orthonormal pose per vertex of `curve`.
///
/// The forward tangent `x` points to the next vertex; at the last vertex
/// it points back at the previous one with the tangent sign flipped so it
/// still reads as "forward" along the curve. `z` is the vertex's surface
/// normal; `y = z x x`; `z` is then re-derived as `x x y` so the frame
/// stays orthonormal even when the stored normal wasn't exactly
/// perpendicular to the tangent.
///
/// # Errors
/// Returns [`PipelineError::NoPointsNearCurve`] if `curve` has fewer than
/// two vertices (no tangent can be formed).
pub fn build_poses(curve: &CurveNormals) -> Result<Vec<Pose>, PipelineError> {
    let n = curve.points.len();
    if n < 2 {
        return Err(PipelineError::NoPointsNearCurve);
    }

    let mut poses = Vec::with_capacity(n);
    for i in 0..n {
        let (current, next, sign) = if i < n - 1 { (i, i + 1, 1.0) } else { (i, i - 1, -1.0) };

        let tangent = curve.points[next] - curve.points[current];
        let x_axis = (sign * tangent).normalize();

        let z_raw = curve.normals[current].normalize();
        let mut y_axis = z_raw.cross(&x_axis);
        if y_axis.norm() < f64::EPSILON {
            y_axis = fallback_perpendicular(&x_axis);
        } else {
            y_axis.normalize_mut();
        }
        let z_axis = x_axis.cross(&y_axis).normalize();

        poses.push(Pose {
            translation: Point3::from(curve.points[current].coords),
            x_axis,
            y_axis,
            z_axis,
        });
    }
    Ok(poses)
}

/// Any unit vector perpendicular to `x_axis`, used only when the stored
/// normal is exactly parallel to the tangent (degenerate input).
fn fallback_perpendicular(x_axis: &Vector3<f64>) -> Vector3<f64> {
    let candidate = x_axis.cross(&Vector3::z());
    if candidate.norm() > f64::EPSILON {
        candidate.normalize()
    } else {
        x_axis.cross(&Vector3::y()).normalize()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn straight_line(n: usize) -> CurveNormals {
        let points = (0..n).map(|i| Point3::new(f64::from(i as i32), 0.0, 0.0)).collect();
        let normals = vec![Vector3::z(); n];
        CurveNormals { points, normals, closed: false }
    }

    #[test]
    fn too_few_points_is_an_error() {
        let curve = CurveNormals { points: vec![Point3::new(0.0, 0.0, 0.0)], normals: vec![Vector3::z()], closed: false };
        assert!(matches!(build_poses(&curve), Err(PipelineError::NoPointsNearCurve)));
    }

    #[test]
    fn poses_are_orthonormal_right_handed() {
        let curve = straight_line(5);
        let poses = build_poses(&curve).expect("poses");
        assert_eq!(poses.len(), 5);
        for p in &poses {
            assert!((p.x_axis.norm() - 1.0).abs() < 1e-9);
            assert!((p.y_axis.norm() - 1.0).abs() < 1e-9);
            assert!((p.z_axis.norm() - 1.0).abs() < 1e-9);
            assert!(p.x_axis.dot(&p.y_axis).abs() < 1e-9);
            assert!(p.y_axis.dot(&p.z_axis).abs() < 1e-9);
            let det = p.x_axis.cross(&p.y_axis).dot(&p.z_axis);
            assert!((det - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn z_axis_matches_interpolated_normal() {
        let curve = straight_line(3);
        let poses = build_poses(&curve).expect("poses");
        for p in &poses {
            assert!((p.z_axis - Vector3::z()).norm() < 1e-6);
        }
    }

    #[test]
    fn forward_tangent_points_along_the_curve() {
        let curve = straight_line(3);
        let poses = build_poses(&curve).expect("poses");
        assert!((poses[0].x_axis - Vector3::x()).norm() < 1e-9);
        // last vertex: backward difference with sign flip still points +x
        assert!((poses[2].x_axis - Vector3::x()).norm() < 1e-9);
    }
}
