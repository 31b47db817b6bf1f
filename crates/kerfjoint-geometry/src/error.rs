//! Error types for the geometry crate.
//!
//! Every failure here is a geometric precondition violation: the input solid or
//! face does not have the shape the caller assumed.

use thiserror::Error;

/// Errors raised while querying or constructing geometry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// The boundary edges of a face could not be chained into a closed loop,
    /// or the loop does not have the expected number of corners.
    #[error("vertex sort error: {0}")]
    VertexSort(String),

    /// No corner of the face produced a width/thickness pair whose cross
    /// product matches the face normal.
    #[error("axis not found: no corner matches the face normal")]
    AxisNotFound,

    /// Zero-length, zero-area or otherwise degenerate input.
    #[error("Degenerate geometry: {0}")]
    Degenerate(String),

    /// Two segments expected to lie in a common plane do not.
    #[error("Not coplanar (seg1: {seg1}, seg2: {seg2}) => res: {value}")]
    NotCoplanar {
        seg1: String,
        seg2: String,
        value: f64,
    },

    /// The segment intersection lies behind the first segment's start point.
    #[error("Wrong scale: {0}")]
    WrongScale(f64),

    /// No face of a solid matches a reference normal and area.
    #[error("Unable to find face with same normal")]
    FaceNotFound,

    /// A face index does not exist on the solid.
    #[error("Face index {index} out of range ({count} faces)")]
    FaceIndex { index: usize, count: usize },
}

/// Result type alias for geometry operations.
pub type GeometryResult<T> = Result<T, GeometryError>;
