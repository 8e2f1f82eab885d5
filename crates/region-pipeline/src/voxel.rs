//! Voxel-grid downsampling: replace points sharing a cubic leaf with their centroid.
//!
//! Shared by 2D curve conditioning's `downsampling_radius` (§4.3, points
//! lie at z=0) and normal estimation's `downsampling_radius` (§4.5).

use std::collections::BTreeMap;

use nalgebra::Point3;

/// Downsample `points` with cubic leaf size `leaf`. Points whose
/// coordinates fall in the same voxel are replaced by their centroid.
/// A non-positive `leaf` is a no-op (returns `points` unchanged).
///
/// Buckets are kept in a `BTreeMap` rather than a `HashMap` so the
/// output order is deterministic given the same input, matching the
/// bit-exact-modulo-floating-point-associativity contract.
#[must_use]
pub fn downsample(points: &[Point3<f64>], leaf: f64) -> Vec<Point3<f64>> {
    if leaf <= 0.0 {
        return points.to_vec();
    }

    let mut buckets: BTreeMap<(i64, i64, i64), (Point3<f64>, usize)> = BTreeMap::new();
    for p in points {
        let key = ((p.x / leaf).floor() as i64, (p.y / leaf).floor() as i64, (p.z / leaf).floor() as i64);
        let entry = buckets.entry(key).or_insert((Point3::origin(), 0));
        entry.0 = Point3::from(entry.0.coords + p.coords);
        entry.1 += 1;
    }

    buckets
        .into_values()
        .map(|(sum, count)| Point3::from(sum.coords / count as f64))
        .collect()
}
