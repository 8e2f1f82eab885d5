//! Greedy nearest-neighbor re-sequencing of an unordered point set (§4.3).

use nalgebra::Point3;
use rstar::primitives::GeomWithData;
use rstar::RTree;

type IndexedPoint = GeomWithData<[f64; 3], usize>;

/// Re-sequence an unordered point set into a single ordered path.
///
/// Starting from `points[0]`, repeatedly walks to the nearest remaining
/// point. If the far end of the sequence built so far (`start`) is
/// closer to the candidate than the current tail is, the sequence is
/// reversed first so the walk always extends from whichever end is
/// actually nearest. Deterministic given a fixed input order.
#[must_use]
pub fn sequence_points(points: &[Point3<f64>]) -> Vec<Point3<f64>> {
    if points.len() <= 1 {
        return points.to_vec();
    }

    let nodes: Vec<IndexedPoint> =
        points.iter().enumerate().map(|(i, p)| IndexedPoint::new([p.x, p.y, p.z], i)).collect();
    let mut tree = RTree::bulk_load(nodes);

    let start_idx = 0usize;
    if let Some(node) = tree.iter().find(|n| n.data == start_idx).cloned() {
        tree.remove(&node);
    }

    let mut sequenced: Vec<usize> = vec![start_idx];
    let mut start = start_idx;
    let mut current = start_idx;

    loop {
        let query = [points[current].x, points[current].y, points[current].z];
        let Some(nearest) = tree.nearest_neighbor(&query).cloned() else {
            break;
        };
        let q = nearest.data;

        if sequenced.contains(&q) {
            log::warn!("sequencing encountered an already-placed point; stopping early");
            break;
        }

        let d_start = (points[start] - points[q]).norm();
        let d_current = (points[current] - points[q]).norm();
        if d_start < d_current {
            sequenced.reverse();
            if let Some(&new_start) = sequenced.first() {
                start = new_start;
            }
        }

        tree.remove(&nearest);
        sequenced.push(q);
        current = q;
    }

    sequenced.into_iter().map(|i| points[i]).collect()
}
