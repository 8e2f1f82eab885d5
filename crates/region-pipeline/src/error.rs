//! Errors produced by the boundary curve extraction pipeline.

/// Errors that can occur while computing a [`crate::RegionResult`].
///
/// Every fatal error carries enough context for the caller to distinguish
/// a configuration mistake from a runtime/geometric failure. `compute`
/// never returns a partially populated result on error.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Pipeline configuration is invalid (unknown enum value, non-positive
    /// kernel size, or an inverted threshold range).
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    /// The organized cloud's point count does not match width * height.
    #[error("Point Cloud not organized")]
    CloudNotOrganized,

    /// A contour had no vertices to index the cloud with.
    #[error("Empty indices vector")]
    EmptyIndices,

    /// A pixel index fell outside the organized cloud's bounds.
    #[error("2D indices exceed point cloud size")]
    IndexOutOfBounds,

    /// A curve vertex had no neighbor in the normal-estimation cloud.
    #[error("Found no points near curve")]
    NoPointsNearCurve,

    /// Every candidate curve failed to close; `compute` reports failure.
    #[error("no closed regions were produced")]
    NoClosedRegions,
}
