//! End-to-end surface build.

use serde::{Deserialize, Serialize};

use crate::collect::collect_vertices;
use crate::constraints::extract_constraints;
use crate::enforce::enforce_constraints;
use crate::error::SurfaceError;
use crate::filter::{filter_triangles, RemovalReason};
use crate::input::SurfaceInput;
use crate::mesh::{emit_mesh, Diagnostics, Mesh};
use crate::options::{SurfaceContext, SurfaceOptions};
use crate::triangulation::{DelaunatorBuilder, DelaunayBuilder};

/// Mesh plus the report of everything that happened while building it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    pub mesh: Mesh,
    pub diagnostics: Diagnostics,
}

/// Builds a constrained Delaunay surface with the default Delaunay builder
/// and a fresh, never-cancelled context.
///
/// ```
/// use blast_surface::{build_surface, Point3, SurfaceInput, SurfaceOptions};
///
/// let input = SurfaceInput::from_points([
///     Point3::new(0.0, 0.0, 10.0),
///     Point3::new(1.0, 0.0, 10.5),
///     Point3::new(1.0, 1.0, 11.0),
///     Point3::new(0.0, 1.0, 10.5),
/// ]);
/// let surface = build_surface(&input, &SurfaceOptions::default()).unwrap();
/// assert_eq!(surface.mesh.triangle_count(), 2);
/// ```
pub fn build_surface(
    input: &SurfaceInput,
    options: &SurfaceOptions,
) -> Result<Surface, SurfaceError> {
    build_surface_with(input, options, &SurfaceContext::default(), &DelaunatorBuilder)
}

/// Builds a surface with a caller-owned context and Delaunay backend.
///
/// Cancellation is observed between stages, once per constraint edge and
/// once per filtered triangle. A cancelled build fails with
/// [`SurfaceError::Cancelled`] unless the context asks for a best-effort
/// result, in which case whatever mesh exists at that point is returned
/// with `diagnostics.cancelled` set.
pub fn build_surface_with<B: DelaunayBuilder + ?Sized>(
    input: &SurfaceInput,
    options: &SurfaceOptions,
    ctx: &SurfaceContext,
    builder: &B,
) -> Result<Surface, SurfaceError> {
    options.validate()?;
    let cancel = &ctx.cancel;
    if cancel.is_cancelled() {
        return Err(SurfaceError::Cancelled);
    }

    let (raw_points, raw_lines) = input.flatten();
    let vertex_set = collect_vertices(&raw_points, options.dedup_tolerance)?;
    let constraints = extract_constraints(&vertex_set, &raw_lines)?;

    let mut diagnostics = Diagnostics {
        raw_vertex_count: vertex_set.raw_count(),
        canonical_vertex_count: vertex_set.len(),
        constraint_edge_count: constraints.len(),
        degenerate_constraints_dropped: constraints.degenerate_dropped(),
        ..Diagnostics::default()
    };

    if cancel.is_cancelled() {
        return Err(SurfaceError::Cancelled);
    }
    let mut tri = builder.build(&vertex_set.positions())?;

    let report = enforce_constraints(&mut tri, &constraints, cancel);
    for conflict in &report.conflicts {
        log::warn!(
            "breakline edge {} conflicts with {}, left out of the surface",
            conflict.edge,
            conflict.blocked_by
        );
    }
    diagnostics.conflicting_constraints = report.conflicts;
    diagnostics.split_constraints = report.splits;
    diagnostics.unplaced_constraints = report.unplaced;

    let triangles = tri.triangle_list();
    diagnostics.triangles_before_filter = triangles.len();

    let positions: Vec<_> = vertex_set.vertices.iter().map(|v| v.position()).collect();
    let filtered = if report.cancelled {
        None
    } else {
        Some(filter_triangles(triangles.clone(), &positions, options, cancel))
    };
    let cancelled = report.cancelled || filtered.as_ref().map_or(false, |f| f.cancelled);
    if cancelled && !ctx.best_effort_on_cancel {
        log::debug!("surface build cancelled");
        return Err(SurfaceError::Cancelled);
    }

    let kept = match filtered {
        Some(outcome) => {
            diagnostics.triangles_removed_by_clip = outcome.removed_by(RemovalReason::Clip);
            diagnostics.triangles_removed_by_angle =
                outcome.removed_by(RemovalReason::MinimumAngle);
            diagnostics.triangles_removed_by_length =
                outcome.removed_by(RemovalReason::MaximumEdgeLength);
            diagnostics.removed_triangles = outcome.removed;
            outcome.kept
        }
        None => triangles,
    };

    let mesh = emit_mesh(vertex_set.vertices, &kept, report.placed);
    diagnostics.constraints_removed_by_filter = mesh.orphaned_constraints();
    diagnostics.triangles_final = mesh.triangle_count();
    diagnostics.cancelled = cancelled;

    log::info!(
        "surface: {} vertices, {} triangles, {} constraint edges, {} conflicts",
        diagnostics.canonical_vertex_count,
        diagnostics.triangles_final,
        mesh.constraints.len(),
        diagnostics.conflicting_constraints.len()
    );
    Ok(Surface { mesh, diagnostics })
}
