//! Contour densification: close 8-connected gaps between pixel vertices (§4.2).

use crate::types::{PixelContour, PixelPoint, MIN_PIXEL_DISTANCE};

/// Walk consecutive vertices of `contour`; whenever a step spans more
/// than [`MIN_PIXEL_DISTANCE`] in either axis, linearly interpolate the
/// missing integer points so the result is 8-connected with no gaps.
#[must_use]
pub fn densify_contour(contour: &PixelContour) -> PixelContour {
    let Some(&first) = contour.first() else {
        return Vec::new();
    };
    let mut out = Vec::with_capacity(contour.len());
    out.push(first);

    for window in contour.windows(2) {
        let (p1, p2) = (window[0], window[1]);
        let d = (p1.x - p2.x).abs().max((p1.y - p2.y).abs());
        if d <= MIN_PIXEL_DISTANCE {
            out.push(p2);
            continue;
        }
        #[allow(clippy::cast_precision_loss)]
        let d_f = d as f64;
        for step in 1..=d {
            #[allow(clippy::cast_precision_loss)]
            let t = step as f64 / d_f;
            let x = (p1.x as f64 + t * (p2.x - p1.x) as f64).round() as i64;
            let y = (p1.y as f64 + t * (p2.y - p1.y) as f64).round() as i64;
            out.push(PixelPoint::new(x, y));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_contour_densifies_to_empty() {
        assert!(densify_contour(&Vec::new()).is_empty());
    }

    #[test]
    fn single_point_unchanged() {
        let contour = vec![PixelPoint::new(3, 4)];
        assert_eq!(densify_contour(&contour), contour);
    }

    #[test]
    fn adjacent_points_pass_through_unchanged() {
        let contour = vec![PixelPoint::new(0, 0), PixelPoint::new(1, 1), PixelPoint::new(2, 1)];
        assert_eq!(densify_contour(&contour), contour);
    }

    #[test]
    fn vertical_gap_interpolates_inclusive_endpoints() {
        let contour = vec![PixelPoint::new(0, 0), PixelPoint::new(0, 10)];
        let out = densify_contour(&contour);
        assert_eq!(out.len(), 11);
        assert_eq!(out[0], PixelPoint::new(0, 0));
        assert_eq!(out[10], PixelPoint::new(0, 10));
        for (i, p) in out.iter().enumerate() {
            assert_eq!(*p, PixelPoint::new(0, i as i64));
        }
    }

    #[test]
    fn diagonal_gap_interpolates_both_axes() {
        let contour = vec![PixelPoint::new(0, 0), PixelPoint::new(4, 4)];
        let out = densify_contour(&contour);
        assert_eq!(out.len(), 5);
        assert_eq!(out[2], PixelPoint::new(2, 2));
    }

    #[test]
    fn output_is_8_connected() {
        let contour = vec![PixelPoint::new(0, 0), PixelPoint::new(5, 2)];
        let out = densify_contour(&contour);
        for w in out.windows(2) {
            let dx = (w[0].x - w[1].x).abs();
            let dy = (w[0].y - w[1].y).abs();
            assert!(dx <= 1 && dy <= 1);
        }
    }
}
