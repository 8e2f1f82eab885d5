//! Normal estimation (§4.5): downsample the source cloud, estimate per-point
//! normals via local-neighborhood PCA oriented toward a fixed viewpoint,
//! then assign each curve vertex the normal of its nearest downsampled
//! source point.

use nalgebra::{Matrix3, Point3, SymmetricEigen, Vector3};
use rstar::primitives::GeomWithData;
use rstar::RTree;

use crate::config::NormalEstCfg;
use crate::error::PipelineError;
use crate::types::Curve3;
use crate::voxel::downsample;

type IndexedPoint = GeomWithData<[f64; 3], usize>;

/// A curve carrying one outward-oriented unit normal per vertex, aligned
/// index-for-index with `points`. Downstream stages (merge, simplify,
/// pose construction) carry `points` and `normals` in lockstep rather than
/// re-deriving the correspondence by nearest-neighbor search a second time
/// (see DESIGN.md on the pose-construction open question).
#[derive(Debug, Clone)]
pub struct CurveNormals {
    pub points: Vec<Point3<f64>>,
    pub normals: Vec<Vector3<f64>>,
    pub closed: bool,
}

/// Downsampled source points together with their estimated, viewpoint-
/// oriented normals: the "source-with-normals cloud" of §4.5/§4.6.
/// Positions live only in `tree`'s nodes; `normals` is indexed by each
/// node's `data` (its position in the downsampled source).
pub struct NormalField {
    normals: Vec<Vector3<f64>>,
    tree: RTree<IndexedPoint>,
}

impl NormalField {
    /// Downsample `source` by `cfg.downsampling_radius` and estimate a PCA
    /// normal for every surviving point within `cfg.search_radius`,
    /// flipped to face `cfg.viewpoint_xyz`.
    #[must_use]
    pub fn estimate(source: &[Point3<f64>], cfg: &NormalEstCfg) -> Self {
        let downsampled = downsample(source, f64::from(cfg.downsampling_radius));
        let nodes: Vec<IndexedPoint> =
            downsampled.iter().enumerate().map(|(i, p)| IndexedPoint::new([p.x, p.y, p.z], i)).collect();
        let tree = RTree::bulk_load(nodes);
        let viewpoint = Point3::new(
            f64::from(cfg.viewpoint_xyz[0]),
            f64::from(cfg.viewpoint_xyz[1]),
            f64::from(cfg.viewpoint_xyz[2]),
        );
        let radius = f64::from(cfg.search_radius);
        let radius_sq = radius * radius;

        let normals = downsampled
            .iter()
            .map(|p| {
                let neighborhood: Vec<Point3<f64>> = tree
                    .locate_within_distance([p.x, p.y, p.z], radius_sq)
                    .map(|n| downsampled[n.data])
                    .collect();
                estimate_normal(p, &neighborhood, &viewpoint)
            })
            .collect();

        Self { normals, tree }
    }

    /// The normal of the nearest downsampled point to `query`, or `None`
    /// if the field has no points (kept empty, e.g. an all-NaN bundle).
    #[must_use]
    pub fn nearest_normal(&self, query: Point3<f64>) -> Option<Vector3<f64>> {
        self.tree.nearest_neighbor(&[query.x, query.y, query.z]).map(|n| self.normals[n.data])
    }

    #[cfg(test)]
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.normals.len()
    }
}

/// Local-neighborhood PCA normal at `center` (the eigenvector of the
/// smallest eigenvalue of the neighborhood's covariance matrix), flipped
/// toward `viewpoint`. Falls back to the +z axis when the neighborhood is
/// too small or too degenerate (collinear/coincident) to define a plane.
fn estimate_normal(center: &Point3<f64>, neighborhood: &[Point3<f64>], viewpoint: &Point3<f64>) -> Vector3<f64> {
    if neighborhood.len() < 3 {
        return Vector3::z();
    }

    #[allow(clippy::cast_precision_loss)]
    let count = neighborhood.len() as f64;
    let centroid = neighborhood.iter().map(|p| p.coords).sum::<Vector3<f64>>() / count;

    let mut covariance = Matrix3::zeros();
    for p in neighborhood {
        let d = p.coords - centroid;
        covariance += d * d.transpose();
    }

    let eigen = SymmetricEigen::new(covariance);
    let min_idx = eigen
        .eigenvalues
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map_or(2, |(idx, _)| idx);

    let mut normal = eigen.eigenvectors.column(min_idx).into_owned();
    if normal.norm() < f64::EPSILON {
        return Vector3::z();
    }
    normal.normalize_mut();
    if normal.dot(&(viewpoint - center)) < 0.0 {
        normal = -normal;
    }
    normal
}

/// Assign each vertex of `curve` the normal of its nearest point in `field`.
///
/// # Errors
/// Returns [`PipelineError::NoPointsNearCurve`] if any vertex has no
/// neighbor in `field` (empty field).
pub fn assign_curve_normals(curve: &Curve3, field: &NormalField) -> Result<CurveNormals, PipelineError> {
    let mut normals = Vec::with_capacity(curve.points.len());
    for p in &curve.points {
        let normal = field.nearest_normal(*p).ok_or(PipelineError::NoPointsNearCurve)?;
        normals.push(normal);
    }
    Ok(CurveNormals { points: curve.points.clone(), normals, closed: curve.closed })
}
