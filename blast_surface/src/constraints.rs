//! Breakline segments resolved to canonical constraint edges.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::collect::VertexSet;
use crate::error::SurfaceError;
use crate::input::{BreaklineKind, BreaklineShape, RawBreakline};

/// Unordered pair of canonical vertex ids, stored smallest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConstraintEdge {
    pub a: usize,
    pub b: usize,
}

impl ConstraintEdge {
    /// Normalized edge between `u` and `v`, `None` when both are the same
    /// vertex.
    pub fn new(u: usize, v: usize) -> Option<Self> {
        match u.cmp(&v) {
            std::cmp::Ordering::Less => Some(Self { a: u, b: v }),
            std::cmp::Ordering::Greater => Some(Self { a: v, b: u }),
            std::cmp::Ordering::Equal => None,
        }
    }
}

impl std::fmt::Display for ConstraintEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.a, self.b)
    }
}

/// Constraint edges in extraction order without duplicates.
///
/// Insertion into the triangulation follows this order, so it is part of the
/// contract: an edge extracted later can be blocked by an earlier one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintSet {
    edges: Vec<ConstraintEdge>,
    members: HashSet<ConstraintEdge>,
    degenerate_dropped: usize,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the segment `u-v`. Zero-length segments are counted and dropped,
    /// repeats are ignored. Returns `true` if a new edge was stored.
    pub fn push_segment(&mut self, u: usize, v: usize) -> bool {
        match ConstraintEdge::new(u, v) {
            Some(edge) => {
                if self.members.insert(edge) {
                    self.edges.push(edge);
                    true
                } else {
                    false
                }
            }
            None => {
                self.degenerate_dropped += 1;
                false
            }
        }
    }

    pub fn contains(&self, edge: &ConstraintEdge) -> bool {
        self.members.contains(edge)
    }

    pub fn edges(&self) -> &[ConstraintEdge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Segments that collapsed to a single canonical vertex.
    pub fn degenerate_dropped(&self) -> usize {
        self.degenerate_dropped
    }
}

/// Turns hard breaklines into constraint edges through the dedup map.
///
/// Open polylines contribute `n - 1` segments, closed polygons `n` segments
/// wrapping last to first. A polygon whose last vertex snaps onto its first
/// is taken as explicitly closed and does not produce an extra edge. Soft
/// breaklines produce no constraints.
pub fn extract_constraints(
    vertices: &VertexSet,
    breaklines: &[RawBreakline],
) -> Result<ConstraintSet, SurfaceError> {
    let mut set = ConstraintSet::new();
    for line in breaklines {
        if line.raw.len() < 2 {
            return Err(SurfaceError::BreaklineTooShort {
                index: line.index,
                vertices: line.raw.len(),
            });
        }
        if line.kind == BreaklineKind::Soft {
            continue;
        }
        let mut ids: Vec<usize> = line
            .raw
            .clone()
            .filter_map(|raw| vertices.canonical(raw))
            .collect();
        let closed = line.shape == BreaklineShape::Closed;
        if closed && ids.len() > 2 && ids.first() == ids.last() {
            ids.pop();
        }
        for pair in ids.windows(2) {
            set.push_segment(pair[0], pair[1]);
        }
        if closed && ids.len() > 2 {
            set.push_segment(ids[ids.len() - 1], ids[0]);
        }
    }
    log::debug!(
        "extracted {} constraint edges, dropped {} degenerate segments",
        set.len(),
        set.degenerate_dropped()
    );
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::collect_vertices;
    use crate::geometry::Point3;
    use crate::input::{Breakline, SurfaceInput};

    fn square_points() -> Vec<Point3> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }

    fn extract(input: &SurfaceInput) -> ConstraintSet {
        let (raw, lines) = input.flatten();
        let set = collect_vertices(&raw, 1e-6).unwrap();
        extract_constraints(&set, &lines).unwrap()
    }

    #[test]
    fn edge_is_normalized() {
        assert_eq!(ConstraintEdge::new(5, 2), Some(ConstraintEdge { a: 2, b: 5 }));
        assert_eq!(ConstraintEdge::new(3, 3), None);
        assert_eq!(ConstraintEdge::new(2, 5), ConstraintEdge::new(5, 2));
    }

    #[test]
    fn open_polyline_yields_n_minus_one_edges() {
        let input = SurfaceInput::from_points(square_points())
            .with_breakline(Breakline::open(square_points()));
        let set = extract(&input);
        assert_eq!(
            set.edges(),
            &[
                ConstraintEdge { a: 0, b: 1 },
                ConstraintEdge { a: 1, b: 2 },
                ConstraintEdge { a: 2, b: 3 },
            ]
        );
    }

    #[test]
    fn closed_polygon_wraps() {
        let input = SurfaceInput::from_points(square_points())
            .with_breakline(Breakline::closed(square_points()));
        let set = extract(&input);
        assert_eq!(set.len(), 4);
        assert!(set.contains(&ConstraintEdge { a: 0, b: 3 }));
        assert_eq!(set.degenerate_dropped(), 0);
    }

    #[test]
    fn explicit_closing_vertex_is_not_degenerate() {
        let mut ring = square_points();
        ring.push(ring[0]);
        let input =
            SurfaceInput::from_points(square_points()).with_breakline(Breakline::closed(ring));
        let set = extract(&input);
        assert_eq!(set.len(), 4);
        assert_eq!(set.degenerate_dropped(), 0);
    }

    #[test]
    fn collapsed_segments_are_counted() {
        let line = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0 + 1e-8, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ];
        let input =
            SurfaceInput::from_points(square_points()).with_breakline(Breakline::open(line));
        let set = extract(&input);
        assert_eq!(set.edges(), &[ConstraintEdge { a: 0, b: 2 }]);
        assert_eq!(set.degenerate_dropped(), 1);
    }

    #[test]
    fn duplicates_keep_first_position() {
        let input = SurfaceInput::from_points(square_points())
            .with_breakline(Breakline::open(vec![square_points()[2], square_points()[0]]))
            .with_breakline(Breakline::open(vec![square_points()[1], square_points()[3]]))
            .with_breakline(Breakline::open(vec![square_points()[0], square_points()[2]]));
        let set = extract(&input);
        assert_eq!(
            set.edges(),
            &[ConstraintEdge { a: 0, b: 2 }, ConstraintEdge { a: 1, b: 3 }]
        );
    }

    #[test]
    fn soft_breaklines_are_skipped() {
        let input = SurfaceInput::from_points(square_points()).with_breakline(
            Breakline::open(vec![square_points()[0], square_points()[2]])
                .with_kind(BreaklineKind::Soft),
        );
        assert!(extract(&input).is_empty());
    }

    #[test]
    fn short_breakline_is_rejected() {
        let input = SurfaceInput::from_points(square_points())
            .with_breakline(Breakline::open(vec![Point3::new(0.5, 0.5, 0.0)]));
        let (raw, lines) = input.flatten();
        let set = collect_vertices(&raw, 1e-6).unwrap();
        assert_eq!(
            extract_constraints(&set, &lines),
            Err(SurfaceError::BreaklineTooShort {
                index: 0,
                vertices: 1
            })
        );
    }
}
