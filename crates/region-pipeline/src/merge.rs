//! Cross-bundle assembly: merge open curves whose endpoints are mutually
//! close into longer (possibly closed) loops, then reclassify (§4.6).

use crate::normals::CurveNormals;

/// Merge `curves` wherever two curves' endpoints fall strictly within
/// `max_merge_dist` of one another, repeatedly extending each curve until
/// no further merge is possible. Concatenation reverses whichever side is
/// needed to preserve directional continuity:
/// front-front and back-back merges reverse the second curve; front-back
/// prepends; back-front appends. A curve that is never chosen as the
/// growing curve but also never consumed by another is returned unchanged
/// (§4.6: "carried through to open").
#[must_use]
pub fn merge_open_curves(curves: Vec<CurveNormals>, max_merge_dist: f64) -> Vec<CurveNormals> {
    let mut pool: Vec<Option<CurveNormals>> = curves.into_iter().map(Some).collect();
    let mut merged = Vec::with_capacity(pool.len());

    for i in 0..pool.len() {
        let Some(mut current) = pool[i].take() else { continue };
        loop {
            let mut best: Option<(usize, f64, MergeKind)> = None;
            for (j, slot) in pool.iter().enumerate() {
                let Some(other) = slot else { continue };
                if let Some((dist, kind)) = closest_endpoint_pairing(&current, other) {
                    if best.as_ref().is_none_or(|&(_, best_dist, _)| dist < best_dist) {
                        best = Some((j, dist, kind));
                    }
                }
            }
            match best {
                Some((j, dist, kind)) if dist < max_merge_dist => {
                    let Some(other) = pool[j].take() else { break };
                    current = concatenate(current, other, kind);
                }
                _ => break,
            }
        }
        merged.push(current);
    }
    merged
}

/// Classify a post-merge curve as closed (front within `closed_curve_max_dist`
/// of back) or open, duplicating the front vertex onto the end when closed.
#[must_use]
pub fn classify_merged(curve: CurveNormals, closed_curve_max_dist: f64) -> CurveNormals {
    let CurveNormals { mut points, mut normals, .. } = curve;
    let (front, back, front_normal) = match (points.first(), points.last(), normals.first()) {
        (Some(&front), Some(&back), Some(&front_normal)) => (front, back, front_normal),
        _ => return CurveNormals { points, normals, closed: false },
    };
    if (front - back).norm() < closed_curve_max_dist {
        points.push(front);
        normals.push(front_normal);
        CurveNormals { points, normals, closed: true }
    } else {
        CurveNormals { points, normals, closed: false }
    }
}

#[derive(Debug, Clone, Copy)]
enum MergeKind {
    FrontFront,
    FrontBack,
    BackFront,
    BackBack,
}

/// The closest of the four endpoint-endpoint pairings between `a` and `b`,
/// or `None` if either curve is empty.
fn closest_endpoint_pairing(a: &CurveNormals, b: &CurveNormals) -> Option<(f64, MergeKind)> {
    let (a_front, a_back) = (a.points.first()?, a.points.last()?);
    let (b_front, b_back) = (b.points.first()?, b.points.last()?);
    let candidates = [
        ((a_front - b_front).norm(), MergeKind::FrontFront),
        ((a_front - b_back).norm(), MergeKind::FrontBack),
        ((a_back - b_front).norm(), MergeKind::BackFront),
        ((a_back - b_back).norm(), MergeKind::BackBack),
    ];
    candidates.into_iter().min_by(|x, y| x.0.partial_cmp(&y.0).unwrap_or(std::cmp::Ordering::Equal))
}

/// Concatenate `i` and `j` according to `kind`, reversing whichever curve
/// is needed so the result reads front-to-back without a direction flip.
fn concatenate(i: CurveNormals, j: CurveNormals, kind: MergeKind) -> CurveNormals {
    let CurveNormals { points: i_points, normals: i_normals, closed } = i;
    let CurveNormals { points: mut j_points, normals: mut j_normals, .. } = j;

    match kind {
        MergeKind::FrontFront => {
            j_points.reverse();
            j_normals.reverse();
            j_points.extend(i_points);
            j_normals.extend(i_normals);
            CurveNormals { points: j_points, normals: j_normals, closed }
        }
        MergeKind::FrontBack => {
            j_points.extend(i_points);
            j_normals.extend(i_normals);
            CurveNormals { points: j_points, normals: j_normals, closed }
        }
        MergeKind::BackFront => {
            let mut points = i_points;
            let mut normals = i_normals;
            points.extend(j_points);
            normals.extend(j_normals);
            CurveNormals { points, normals, closed }
        }
        MergeKind::BackBack => {
            j_points.reverse();
            j_normals.reverse();
            let mut points = i_points;
            let mut normals = i_normals;
            points.extend(j_points);
            normals.extend(j_normals);
            CurveNormals { points, normals, closed }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use nalgebra::{Point3, Vector3};

    fn curve(points: Vec<Point3<f64>>) -> CurveNormals {
        let n = points.len();
        CurveNormals { points, normals: vec![Vector3::z(); n], closed: false }
    }

    #[test]
    fn back_front_merge_concatenates_in_order() {
        let a = curve(vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)]);
        let b = curve(vec![Point3::new(1.001, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)]);
        let merged = merge_open_curves(vec![a, b], 0.01);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].points.len(), 4);
        assert_eq!(merged[0].points[0], Point3::new(0.0, 0.0, 0.0));
        assert_eq!(merged[0].points[3], Point3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn front_front_merge_reverses_the_second_curve() {
        let a = curve(vec![Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)]);
        let b = curve(vec![Point3::new(1.001, 0.0, 0.0), Point3::new(3.0, 0.0, 0.0)]);
        let merged = merge_open_curves(vec![a, b], 0.01);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].points[0], Point3::new(3.0, 0.0, 0.0));
        assert_eq!(merged[0].points[3], Point3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn distance_at_exactly_max_merge_dist_does_not_merge() {
        let a = curve(vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)]);
        let b = curve(vec![Point3::new(1.5, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)]);
        let merged = merge_open_curves(vec![a, b], 0.5);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn three_curves_chain_into_one() {
        let a = curve(vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)]);
        let b = curve(vec![Point3::new(1.001, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)]);
        let c = curve(vec![Point3::new(2.001, 0.0, 0.0), Point3::new(3.0, 0.0, 0.0)]);
        let merged = merge_open_curves(vec![a, b, c], 0.01);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].points.len(), 6);
    }

    #[test]
    fn merging_into_a_loop_then_classifying_closes_it() {
        let a = curve(vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)]);
        let b = curve(vec![Point3::new(1.001, 0.0, 0.0), Point3::new(0.001, 0.0, 0.0)]);
        let merged = merge_open_curves(vec![a, b], 0.01);
        assert_eq!(merged.len(), 1);
        let classified = classify_merged(merged.into_iter().next().expect("one curve"), 0.01);
        assert!(classified.closed);
        assert_eq!(classified.points.first(), classified.points.last());
        assert_eq!(classified.normals.len(), classified.points.len());
    }

    #[test]
    fn unmergeable_curve_passes_through_unchanged() {
        let a = curve(vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)]);
        let merged = merge_open_curves(vec![a], 0.5);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].points.len(), 2);
    }
}
