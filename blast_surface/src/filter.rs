//! Triangle removal stages applied after constraint enforcement.

use serde::{Deserialize, Serialize};

use crate::geometry::{centroid, point_in_polygon, Point, Point3, TriangleShape};
use crate::options::{CancelToken, SurfaceOptions};

/// First filter stage that rejected a triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemovalReason {
    /// Centroid outside the clip polygon or inside an exclusion polygon.
    Clip,
    MinimumAngle,
    MaximumEdgeLength,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovedTriangle {
    pub vertices: [usize; 3],
    pub reason: RemovalReason,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOutcome {
    pub kept: Vec<[usize; 3]>,
    pub removed: Vec<RemovedTriangle>,
    /// Set when the token fired mid-way. Triangles not yet examined are kept.
    pub cancelled: bool,
}

impl FilterOutcome {
    pub fn removed_by(&self, reason: RemovalReason) -> usize {
        self.removed.iter().filter(|r| r.reason == reason).count()
    }
}

/// Runs the clip, minimum-angle and maximum-edge stages in that order.
///
/// Each stage only sees the survivors of the previous one, so a triangle is
/// reported once under the first reason that matched. Stages whose option
/// is unset are skipped.
pub fn filter_triangles(
    triangles: Vec<[usize; 3]>,
    positions: &[Point3],
    options: &SurfaceOptions,
    cancel: &CancelToken,
) -> FilterOutcome {
    let mut outcome = FilterOutcome {
        kept: triangles,
        ..FilterOutcome::default()
    };

    let clipping = options.clip_polygon.is_some() || !options.exclusion_polygons.is_empty();
    if clipping {
        run_stage(&mut outcome, RemovalReason::Clip, cancel, |tri| {
            let c = centroid(positions[tri[0]], positions[tri[1]], positions[tri[2]]).xy();
            let outside = options
                .clip_polygon
                .as_deref()
                .map_or(false, |poly| !point_in_polygon(c, poly));
            outside
                || options
                    .exclusion_polygons
                    .iter()
                    .any(|hole| point_in_polygon(c, hole))
        });
    }
    if let Some(min_angle) = options.min_angle_deg {
        run_stage(&mut outcome, RemovalReason::MinimumAngle, cancel, |tri| {
            shape(positions, tri).min_angle_deg < min_angle
        });
    }
    if let Some(max_edge) = options.max_edge_length {
        run_stage(&mut outcome, RemovalReason::MaximumEdgeLength, cancel, |tri| {
            shape(positions, tri).longest_edge > max_edge
        });
    }

    log::debug!(
        "filter kept {} triangles (clip {}, angle {}, length {})",
        outcome.kept.len(),
        outcome.removed_by(RemovalReason::Clip),
        outcome.removed_by(RemovalReason::MinimumAngle),
        outcome.removed_by(RemovalReason::MaximumEdgeLength)
    );
    outcome
}

fn shape(positions: &[Point3], tri: &[usize; 3]) -> TriangleShape {
    let [a, b, c]: [Point; 3] = tri.map(|v| positions[v].xy());
    TriangleShape::measure(a, b, c)
}

fn run_stage<F>(outcome: &mut FilterOutcome, reason: RemovalReason, cancel: &CancelToken, reject: F)
where
    F: Fn(&[usize; 3]) -> bool,
{
    if outcome.cancelled {
        return;
    }
    let input = std::mem::take(&mut outcome.kept);
    let mut kept = Vec::with_capacity(input.len());
    let mut rest = input.into_iter();
    for tri in rest.by_ref() {
        if cancel.is_cancelled() {
            outcome.cancelled = true;
            kept.push(tri);
            break;
        }
        if reject(&tri) {
            log::trace!("triangle {tri:?} removed: {reason:?}");
            outcome.removed.push(RemovedTriangle {
                vertices: tri,
                reason,
            });
        } else {
            kept.push(tri);
        }
    }
    kept.extend(rest);
    outcome.kept = kept;
}
