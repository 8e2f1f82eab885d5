//! Configuration record for the boundary curve extraction pipeline.
//!
//! Mirrors the three flat groups from the external interface: image
//! pipeline options, 2D curve conditioning, and 3D assembly. Every type
//! here derives `serde::{Serialize, Deserialize}` so an embedding
//! application can (de)serialize a config however it likes; no file or
//! wire-format loading lives in this crate.

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::types::MAX_BINARY_VALUE;

/// Structuring element shape for morphological dilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DilationElem {
    #[default]
    Rect,
    Cross,
    Ellipse,
}

/// Threshold transfer function applied to the grayscale image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ThresholdType {
    #[default]
    Binary,
    BinaryInverted,
    Trunc,
    ToZero,
    ToZeroInverted,
}

/// Contour retrieval policy, mirrored from OpenCV's `RetrievalModes`.
///
/// `imageproc::contours::find_contours` does not expose a multi-level
/// hierarchy the way OpenCV's `CCOMP`/`TREE` modes do, so those two
/// variants are best-effort aliases of `List` here: they keep every
/// traced contour and preserve `imageproc`'s own parent links rather
/// than reconstructing a full nesting hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContourMode {
    #[default]
    External,
    List,
    CComp,
    Tree,
}

/// Contour point approximation, mirrored from OpenCV's `ContourApproximationModes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContourApprox {
    None,
    #[default]
    Simple,
    Tc89L1,
    Tc89Kcos,
}

/// Morphological dilation options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DilationCfg {
    pub enable: bool,
    /// `k` in the `(2k+1) x (2k+1)` structuring element; must be > 0 when enabled.
    pub kernel_size: u32,
    pub elem: DilationElem,
}

impl Default for DilationCfg {
    fn default() -> Self {
        Self { enable: false, kernel_size: 1, elem: DilationElem::default() }
    }
}

/// Threshold options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdCfg {
    pub enable: bool,
    pub value: u8,
    pub kind: ThresholdType,
    pub max_binary_value: u8,
}

impl Default for ThresholdCfg {
    fn default() -> Self {
        Self { enable: false, value: 128, kind: ThresholdType::default(), max_binary_value: MAX_BINARY_VALUE }
    }
}

/// Canny edge detector options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CannyCfg {
    pub enable: bool,
    pub lower_threshold: f32,
    pub upper_threshold: f32,
    /// Stored as `k`; effective Sobel aperture is `max(3, 2k + 1)`.
    pub aperture_size: u32,
}

impl Default for CannyCfg {
    fn default() -> Self {
        Self { enable: true, lower_threshold: 50.0, upper_threshold: 150.0, aperture_size: 1 }
    }
}

/// Contour extraction options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContourCfg {
    pub mode: ContourMode,
    pub method: ContourApprox,
}

/// Image pipeline configuration (§4.1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageCfg {
    pub invert_image: bool,
    pub dilation: DilationCfg,
    pub threshold: ThresholdCfg,
    pub canny: CannyCfg,
    pub contour: ContourCfg,

    /// Retained only so the flat config record round-trips; the core
    /// never opens a window (§5 explicitly disallows interactive
    /// diagnostic display in this crate).
    pub debug_mode_enable: bool,
    pub debug_window_name: String,
    pub debug_wait_key: i32,
}

impl Default for ImageCfg {
    fn default() -> Self {
        Self {
            invert_image: false,
            dilation: DilationCfg::default(),
            threshold: ThresholdCfg::default(),
            canny: CannyCfg::default(),
            contour: ContourCfg::default(),
            debug_mode_enable: false,
            debug_window_name: String::from("diagnostic"),
            debug_wait_key: 0,
        }
    }
}

/// 2D curve conditioning configuration (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pcl2dCfg {
    pub downsampling_radius: f64,
    pub split_dist: f64,
    pub closed_curve_max_dist: f64,
    pub simplification_min_points: usize,
    pub simplification_alpha: f64,
}

impl Default for Pcl2dCfg {
    fn default() -> Self {
        Self {
            downsampling_radius: 0.0,
            split_dist: 10.0,
            closed_curve_max_dist: 5.0,
            simplification_min_points: 10,
            simplification_alpha: 5.0,
        }
    }
}

/// Statistical outlier removal options (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatRemovalCfg {
    pub enable: bool,
    pub kmeans: usize,
    pub stddev: f64,
}

impl Default for StatRemovalCfg {
    fn default() -> Self {
        Self { enable: false, kmeans: 8, stddev: 1.0 }
    }
}

/// Normal estimation options (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalEstCfg {
    pub downsampling_radius: f32,
    pub search_radius: f32,
    pub viewpoint_xyz: [f32; 3],
    pub kdtree_epsilon: f64,
}

impl Default for NormalEstCfg {
    fn default() -> Self {
        Self {
            downsampling_radius: 0.01,
            search_radius: 0.02,
            viewpoint_xyz: [0.0, 0.0, 0.0],
            kdtree_epsilon: 0.0,
        }
    }
}

/// 3D cross-bundle assembly configuration (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PclCfg {
    pub max_merge_dist: f64,
    pub closed_curve_max_dist: f64,
    pub simplification_min_dist: f64,
    pub min_num_points: usize,
    pub stat_removal: StatRemovalCfg,
    pub normal_est: NormalEstCfg,
}

impl Default for PclCfg {
    fn default() -> Self {
        Self {
            max_merge_dist: 0.01,
            closed_curve_max_dist: 0.01,
            simplification_min_dist: 0.001,
            min_num_points: 3,
            stat_removal: StatRemovalCfg::default(),
            normal_est: NormalEstCfg::default(),
        }
    }
}

/// Top-level configuration for one [`crate::compute`] call.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub image: ImageCfg,
    pub pcl_2d: Pcl2dCfg,
    pub pcl: PclCfg,
}

impl PipelineConfig {
    /// Validate the record, reporting the same error kind a later
    /// pipeline stage would if passed this configuration directly.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.image.dilation.enable && self.image.dilation.kernel_size == 0 {
            return Err(PipelineError::InvalidConfig(
                "dilation.kernel_size must be > 0 when dilation is enabled".to_string(),
            ));
        }
        if self.image.canny.enable && self.image.canny.lower_threshold > self.image.canny.upper_threshold {
            return Err(PipelineError::InvalidConfig(
                "canny.lower_threshold must not exceed canny.upper_threshold".to_string(),
            ));
        }
        if self.pcl_2d.simplification_alpha <= 0.0 {
            return Err(PipelineError::InvalidConfig(
                "pcl_2d.simplification_alpha must be positive".to_string(),
            ));
        }
        if self.pcl.stat_removal.enable && self.pcl.stat_removal.kmeans == 0 {
            return Err(PipelineError::InvalidConfig(
                "stat_removal.kmeans must be > 0 when enabled".to_string(),
            ));
        }
        Ok(())
    }
}
