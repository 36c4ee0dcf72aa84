//! Error types for core geometry construction.

use thiserror::Error;

/// Errors raised while constructing or validating geometry primitives.
#[derive(Error, Debug)]
pub enum GeometryError {
    /// An arc segment was given identical start and end points.
    #[error("degenerate arc: non-zero bulge with coincident endpoints at ({x}, {y})")]
    DegenerateArc { x: f64, y: f64 },

    /// A coordinate was NaN or infinite.
    #[error("non-finite coordinate in input geometry")]
    NonFiniteCoordinate,
}

/// Result type alias for geometry construction.
pub type GeometryResult<T> = Result<T, GeometryError>;
