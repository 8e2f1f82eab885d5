//! 2D-to-3D lift: index the organized cloud, apply the rigid transform, clean (§4.4).

use nalgebra::Point3;

use crate::error::PipelineError;
use crate::types::{OrganizedCloud, PixelContour, Transform};

/// Apply `transform` to every valid sample in `cloud`, leaving `NaN`
/// sentinels untouched. Performed once per bundle, before extraction.
#[must_use]
pub fn transform_cloud(cloud: &OrganizedCloud, transform: &Transform) -> OrganizedCloud {
    let points = cloud
        .points
        .iter()
        .map(|p| {
            if p.iter().any(|v| v.is_nan()) {
                *p
            } else {
                let transformed = transform * Point3::new(p[0], p[1], p[2]);
                [transformed.x, transformed.y, transformed.z]
            }
        })
        .collect();
    OrganizedCloud { width: cloud.width, height: cloud.height, points }
}

/// Index `cloud` at every vertex of `contour`, collecting the 3D points
/// in contour order.
///
/// # Errors
/// Returns [`PipelineError::CloudNotOrganized`] if the cloud's point
/// count does not match its declared dimensions, [`PipelineError::EmptyIndices`]
/// if `contour` has no vertices, and [`PipelineError::IndexOutOfBounds`]
/// if any vertex falls outside the cloud's bounds.
pub fn lift_contour(contour: &PixelContour, cloud: &OrganizedCloud) -> Result<Vec<Point3<f64>>, PipelineError> {
    if !cloud.is_organized() {
        return Err(PipelineError::CloudNotOrganized);
    }
    if contour.is_empty() {
        return Err(PipelineError::EmptyIndices);
    }

    let mut out = Vec::with_capacity(contour.len());
    for p in contour {
        if p.x < 0 || p.y < 0 {
            return Err(PipelineError::IndexOutOfBounds);
        }
        let (x, y) = (p.x as u32, p.y as u32);
        let Some(sample) = cloud.get(x, y) else {
            return Err(PipelineError::IndexOutOfBounds);
        };
        out.push(Point3::new(f64::from(sample[0]), f64::from(sample[1]), f64::from(sample[2])));
    }
    Ok(out)
}

/// Remove `NaN` points in place, compacting order-preservingly.
#[must_use]
pub fn remove_nan(points: Vec<Point3<f64>>) -> Vec<Point3<f64>> {
    points.into_iter().filter(|p| !p.x.is_nan() && !p.y.is_nan() && !p.z.is_nan()).collect()
}
