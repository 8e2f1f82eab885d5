//! Statistical outlier removal (§4.4): drop points whose mean distance to
//! their k nearest neighbors is an outlier relative to the whole curve.

use average::Variance;
use nalgebra::Point3;
use rstar::primitives::GeomWithData;
use rstar::RTree;

type IndexedPoint = GeomWithData<[f64; 3], usize>;

/// Drop points whose mean distance to their `k` nearest neighbors exceeds
/// `mu + stddev_mult * sigma`, where `mu`/`sigma` are the mean and
/// standard deviation of every point's mean-k-distance. Returns `points`
/// unchanged when there are not enough points to form a `k`-neighborhood.
#[must_use]
pub fn remove_statistical_outliers(points: &[Point3<f64>], k: usize, stddev_mult: f64) -> Vec<Point3<f64>> {
    if k == 0 || points.len() <= k {
        return points.to_vec();
    }

    let nodes: Vec<IndexedPoint> =
        points.iter().enumerate().map(|(i, p)| IndexedPoint::new([p.x, p.y, p.z], i)).collect();
    let tree = RTree::bulk_load(nodes);

    let mean_k_dist: Vec<f64> = points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let query = [p.x, p.y, p.z];
            let mut acc = 0.0;
            let mut count = 0usize;
            for neighbor in tree.nearest_neighbor_iter(&query) {
                if neighbor.data == i {
                    continue;
                }
                acc += (points[neighbor.data] - p).norm();
                count += 1;
                if count == k {
                    break;
                }
            }
            if count == 0 {
                0.0
            } else {
                acc / count as f64
            }
        })
        .collect();

    let mut stats = Variance::new();
    for d in &mean_k_dist {
        stats.add(*d);
    }
    let threshold = stats.mean() + stddev_mult * stats.population_variance().sqrt();

    points.iter().zip(mean_k_dist).filter(|&(_, d)| d <= threshold).map(|(p, _)| *p).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_few_points_returns_unchanged() {
        let points = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        assert_eq!(remove_statistical_outliers(&points, 4, 1.0), points);
    }

    #[test]
    fn far_outlier_is_removed() {
        let mut points: Vec<Point3<f64>> = (0..20).map(|i| Point3::new(f64::from(i) * 0.1, 0.0, 0.0)).collect();
        points.push(Point3::new(500.0, 500.0, 500.0));
        let cleaned = remove_statistical_outliers(&points, 4, 1.0);
        assert!(cleaned.len() < points.len());
        assert!(!cleaned.iter().any(|p| p.x > 100.0));
    }

    #[test]
    fn uniform_grid_keeps_everything() {
        let points: Vec<Point3<f64>> =
            (0..5).flat_map(|y| (0..5).map(move |x| Point3::new(f64::from(x), f64::from(y), 0.0))).collect();
        let cleaned = remove_statistical_outliers(&points, 4, 3.0);
        assert_eq!(cleaned.len(), points.len());
    }
}
