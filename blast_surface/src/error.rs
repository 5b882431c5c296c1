//! Fatal errors raised while building a surface.

use thiserror::Error;

/// Conditions that abort a surface build.
///
/// Locally degenerate geometry (collapsed breakline segments, crossing
/// breaklines, filtered triangles) never ends up here; it is accumulated in
/// [`crate::Diagnostics`] instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SurfaceError {
    #[error("at least 3 distinct vertices are required, found {found}")]
    InsufficientVertices { found: usize },

    #[error("raw point {index} has a non-finite coordinate")]
    NonFiniteCoordinate { index: usize },

    #[error("breakline {index} has {vertices} vertices, at least 2 are required")]
    BreaklineTooShort { index: usize, vertices: usize },

    #[error("all vertices are collinear, no triangle can be formed")]
    DegenerateVertexSet,

    #[error("invalid option `{name}`: {reason}")]
    InvalidOption { name: &'static str, reason: String },

    #[error("surface build was cancelled")]
    Cancelled,
}
