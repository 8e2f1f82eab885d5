//! Discontinuity splitting and closed/open classification (§4.3).

use nalgebra::Point3;

use crate::types::{Curve3, MIN_POINT_DIST};

/// Split a sequenced path wherever consecutive points exceed `split_dist`.
/// Within each emitted segment, points within [`MIN_POINT_DIST`] of their
/// predecessor are dropped; segments left with fewer than two points are
/// discarded entirely.
#[must_use]
pub fn split_by_discontinuity(path: &[Point3<f64>], split_dist: f64) -> Vec<Vec<Point3<f64>>> {
    if path.is_empty() {
        return Vec::new();
    }

    let mut raw_segments = Vec::new();
    let mut current = vec![path[0]];
    for window in path.windows(2) {
        let (a, b) = (window[0], window[1]);
        if (a - b).norm() > split_dist {
            raw_segments.push(std::mem::take(&mut current));
            current = vec![b];
        } else {
            current.push(b);
        }
    }
    raw_segments.push(current);

    raw_segments
        .into_iter()
        .filter_map(|segment| {
            let mut cleaned: Vec<Point3<f64>> = Vec::with_capacity(segment.len());
            for p in segment {
                let keep = cleaned.last().is_none_or(|&last| (p - last).norm() >= MIN_POINT_DIST);
                if keep {
                    cleaned.push(p);
                }
            }
            if cleaned.len() < 2 {
                None
            } else {
                Some(cleaned)
            }
        })
        .collect()
}

/// Classify a segment as closed (first and last within `closed_curve_max_dist`)
/// or open, duplicating the first vertex onto the end when closed.
#[must_use]
pub fn classify_closed(mut segment: Vec<Point3<f64>>, closed_curve_max_dist: f64) -> Curve3 {
    let first = segment[0];
    let last = segment[segment.len() - 1];
    if (first - last).norm() < closed_curve_max_dist {
        segment.push(first);
        Curve3 { points: segment, closed: true }
    } else {
        Curve3 { points: segment, closed: false }
    }
}
