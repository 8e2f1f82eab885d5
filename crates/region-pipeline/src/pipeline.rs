//! Public entry point (§4.7): turn an ordered list of bundles into
//! sequenced, merged 3D curves with oriented poses.
//!
//! Stages run in the order laid out in §2: image pipeline -> densify ->
//! 2D curve conditioning -> 2D->3D lift & clean -> normal estimation,
//! all per bundle; then cross-bundle assembly combines every bundle's
//! curves into the final result.

use nalgebra::Point3;

use crate::concave_hull::simplify_closed_curve;
use crate::config::PipelineConfig;
use crate::densify::densify_contour;
use crate::error::PipelineError;
use crate::image_pipeline;
use crate::lift::{lift_contour, remove_nan, transform_cloud};
use crate::merge::{classify_merged, merge_open_curves};
use crate::normals::{assign_curve_normals, CurveNormals, NormalField};
use crate::outlier::remove_statistical_outliers;
use crate::pose::build_poses;
use crate::sequence::sequence_points;
use crate::simplify3d::simplify_by_min_dist;
use crate::split::{classify_closed, split_by_discontinuity};
use crate::types::{Bundle, Curve3, OrganizedCloud, PixelPoint, PoseSequence, RegionResult};
use crate::voxel::downsample;

/// Run the full boundary-curve extraction pipeline over `bundles`.
///
/// # Errors
/// Propagates the first fatal error raised by any stage (§7): invalid
/// configuration, an unorganized cloud, an out-of-range pixel index, or a
/// curve vertex with no neighbor in the normals field. Also returns
/// [`PipelineError::NoClosedRegions`] if no closed region survives to the
/// end of cross-bundle assembly, per §4.7's success criterion.
pub fn compute(bundles: &[Bundle], config: &PipelineConfig) -> Result<RegionResult, PipelineError> {
    config.validate()?;

    let mut curves: Vec<CurveNormals> = Vec::new();
    let mut diagnostic_images = Vec::with_capacity(bundles.len());

    for bundle in bundles {
        let (pixel_contours, diagnostic) = image_pipeline::run(&bundle.image, &config.image)?;
        diagnostic_images.push(diagnostic);

        let transformed_cloud = transform_cloud(&bundle.cloud, &bundle.transform);
        let normal_field = NormalField::estimate(&source_points(&transformed_cloud), &config.pcl.normal_est);

        for pixel_contour in &pixel_contours {
            let densified = densify_contour(pixel_contour);
            curves.extend(condition_and_lift(&densified, &transformed_cloud, &normal_field, config)?);
        }
    }

    let (initial_closed, initial_open): (Vec<_>, Vec<_>) = curves.into_iter().partition(|c| c.closed);

    let merged_open = merge_open_curves(initial_open, config.pcl.max_merge_dist);
    let reclassified_open =
        merged_open.into_iter().map(|c| classify_merged(c, config.pcl.closed_curve_max_dist));

    let mut assembled: Vec<CurveNormals> = initial_closed;
    assembled.extend(reclassified_open);

    let simplified = assembled.into_iter().map(|c| simplify_by_min_dist(c, config.pcl.simplification_min_dist));
    let filtered: Vec<CurveNormals> =
        simplified.filter(|c| c.points.len() >= config.pcl.min_num_points).collect();

    let mut closed = Vec::new();
    let mut open = Vec::new();
    for curve in &filtered {
        let poses: PoseSequence = build_poses(curve)?;
        if curve.closed {
            closed.push(poses);
        } else {
            open.push(poses);
        }
    }

    if closed.is_empty() {
        return Err(PipelineError::NoClosedRegions);
    }

    Ok(RegionResult { closed, open, diagnostic_images })
}

/// Stages 2D curve conditioning (§4.3) through normal assignment (§4.5)
/// for one densified pixel contour, producing zero or more curves (one
/// pixel contour may split into several discontinuity segments).
fn condition_and_lift(
    densified: &[PixelPoint],
    transformed_cloud: &OrganizedCloud,
    normal_field: &NormalField,
    config: &PipelineConfig,
) -> Result<Vec<CurveNormals>, PipelineError> {
    #[allow(clippy::cast_precision_loss)]
    let points_2d: Vec<Point3<f64>> =
        densified.iter().map(|p| Point3::new(p.x as f64, p.y as f64, 0.0)).collect();

    let downsampled_2d = downsample(&points_2d, config.pcl_2d.downsampling_radius);
    let sequenced_2d = sequence_points(&downsampled_2d);
    let segments_2d = split_by_discontinuity(&sequenced_2d, config.pcl_2d.split_dist);

    let mut out = Vec::new();
    for segment in segments_2d {
        let curve_2d = classify_closed(segment, config.pcl_2d.closed_curve_max_dist);
        let curve_2d = if curve_2d.closed && curve_2d.points.len() >= config.pcl_2d.simplification_min_points {
            simplify_closed_curve(&curve_2d, config.pcl_2d.simplification_alpha)
        } else {
            curve_2d
        };

        #[allow(clippy::cast_possible_truncation)]
        let pixel_contour: Vec<PixelPoint> =
            curve_2d.points.iter().map(|p| PixelPoint::new(p.x.round() as i64, p.y.round() as i64)).collect();

        let lifted = remove_nan(lift_contour(&pixel_contour, transformed_cloud)?);
        let lifted = if config.pcl.stat_removal.enable {
            remove_statistical_outliers(&lifted, config.pcl.stat_removal.kmeans, config.pcl.stat_removal.stddev)
        } else {
            lifted
        };
        if lifted.len() < 2 {
            continue;
        }

        let curve_3d = Curve3 { points: lifted, closed: curve_2d.closed };
        out.push(assign_curve_normals(&curve_3d, normal_field)?);
    }
    Ok(out)
}

/// Extract every non-NaN sample of `cloud` as an `f64` point, for use as
/// the normal-estimation stage's source cloud (§4.5).
fn source_points(cloud: &OrganizedCloud) -> Vec<Point3<f64>> {
    cloud
        .points
        .iter()
        .filter(|p| p.iter().all(|v| !v.is_nan()))
        .map(|p| Point3::new(f64::from(p[0]), f64::from(p[1]), f64::from(p[2])))
        .collect()
}
