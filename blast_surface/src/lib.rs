//! Constrained Delaunay surfaces for blast design.
//!
//! Hole collars, survey points and breaklines go in; a triangulated surface
//! honouring the breaklines comes out, together with a report of every
//! recoverable problem met on the way.

pub mod collect;
pub mod constraints;
pub mod enforce;
pub mod error;
pub mod filter;
pub mod geometry;
pub mod input;
pub mod mesh;
pub mod options;
pub mod surface;
pub mod triangulation;

pub use collect::{collect_vertices, Vertex, VertexSet};
pub use constraints::{extract_constraints, ConstraintEdge, ConstraintSet};
pub use enforce::{enforce_constraints, ConstraintConflict, ConstraintSplit, EnforceReport};
pub use error::SurfaceError;
pub use filter::{filter_triangles, FilterOutcome, RemovalReason, RemovedTriangle};
pub use geometry::{Point, Point3};
pub use input::{
    Breakline, BreaklineKind, BreaklineShape, RawPoint, SourceEntity, SourceTag, SurfaceInput,
};
pub use mesh::{emit_mesh, Diagnostics, Mesh, Triangle};
pub use options::{CancelToken, SurfaceContext, SurfaceOptions, DEFAULT_DEDUP_TOLERANCE};
pub use surface::{build_surface, build_surface_with, Surface};
pub use triangulation::{DelaunatorBuilder, DelaunayBuilder, Triangulation};
