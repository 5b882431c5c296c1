//! Forces constraint edges into a Delaunay triangulation.
//!
//! Each edge is inserted by walking from one endpoint to the other, flipping
//! the crossed edges out of the way (Sloan's queue) and then restoring the
//! Delaunay property around the new edges with Lawson flips. Placed
//! constraints are never flipped afterwards.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::constraints::{ConstraintEdge, ConstraintSet};
use crate::geometry::predicates::{orientation, segments_cross, strictly_between, Orientation};
use crate::options::CancelToken;
use crate::triangulation::{next_halfedge, prev_halfedge, Triangulation, EMPTY};

/// A constraint that crosses one placed earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintConflict {
    pub edge: ConstraintEdge,
    /// The earlier constraint as extracted from the breaklines.
    pub blocked_by: ConstraintEdge,
    /// The locked edge actually crossed. Differs from `blocked_by` when the
    /// earlier constraint was split through intermediate vertices.
    pub blocked_segment: ConstraintEdge,
}

/// A constraint that passes through other vertices and was inserted as a
/// chain of sub-segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintSplit {
    pub edge: ConstraintEdge,
    /// Intermediate vertices, ordered from `edge.a` towards `edge.b`.
    pub through: Vec<usize>,
}

/// Outcome of constraint enforcement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnforceReport {
    /// Edges now present in the triangulation and locked against flips,
    /// including the sub-segments of split constraints.
    pub placed: Vec<ConstraintEdge>,
    pub conflicts: Vec<ConstraintConflict>,
    pub splits: Vec<ConstraintSplit>,
    pub unplaced: Vec<ConstraintEdge>,
    /// Set when the token fired before every constraint was processed.
    pub cancelled: bool,
}

enum Insertion {
    Placed,
    SplitAt(usize),
    Blocked { segment: ConstraintEdge, parent: ConstraintEdge },
    Stuck,
}

struct Enforcer<'a> {
    tri: &'a mut Triangulation,
    /// Locked edges mapped to the constraint they were placed for.
    fixed: HashMap<ConstraintEdge, ConstraintEdge>,
    report: EnforceReport,
}

/// Inserts every constraint edge in order, recording conflicts, splits and
/// failures in the returned report. The triangulation stays valid whatever
/// happens to individual edges.
pub fn enforce_constraints(
    tri: &mut Triangulation,
    constraints: &ConstraintSet,
    cancel: &CancelToken,
) -> EnforceReport {
    let mut enforcer = Enforcer {
        tri,
        fixed: HashMap::new(),
        report: EnforceReport::default(),
    };
    for &edge in constraints.edges() {
        if cancel.is_cancelled() {
            log::debug!("constraint enforcement cancelled before {edge}");
            enforcer.report.cancelled = true;
            break;
        }
        enforcer.insert_constraint(edge);
    }
    let report = enforcer.report;
    log::debug!(
        "enforced {} constraint edges: {} conflicts, {} split, {} unplaced",
        report.placed.len(),
        report.conflicts.len(),
        report.splits.len(),
        report.unplaced.len()
    );
    report
}

impl Enforcer<'_> {
    fn insert_constraint(&mut self, edge: ConstraintEdge) {
        if !(self.tri.is_connected(edge.a) && self.tri.is_connected(edge.b)) {
            log::warn!("constraint {edge} has an endpoint outside the triangulation");
            self.report.unplaced.push(edge);
            return;
        }
        let mut pending = VecDeque::from([(edge.a, edge.b)]);
        let mut through = Vec::new();
        while let Some((a, b)) = pending.pop_front() {
            match self.insert_segment(edge, a, b) {
                Insertion::Placed => {}
                Insertion::SplitAt(v) => {
                    through.push(v);
                    pending.push_front((v, b));
                    pending.push_front((a, v));
                }
                Insertion::Blocked { segment, parent } => {
                    log::warn!("constraint {edge} crosses placed constraint {parent} at {segment}");
                    self.report.conflicts.push(ConstraintConflict {
                        edge,
                        blocked_by: parent,
                        blocked_segment: segment,
                    });
                    break;
                }
                Insertion::Stuck => {
                    log::warn!("constraint {edge} could not be placed between {a} and {b}");
                    self.report.unplaced.push(edge);
                    break;
                }
            }
        }
        if !through.is_empty() {
            sort_along(self.tri, edge.a, edge.b, &mut through);
            self.report.splits.push(ConstraintSplit { edge, through });
        }
    }

    fn lock(&mut self, parent: ConstraintEdge, a: usize, b: usize) {
        if let Some(edge) = ConstraintEdge::new(a, b) {
            if let Entry::Vacant(slot) = self.fixed.entry(edge) {
                slot.insert(parent);
                self.report.placed.push(edge);
            }
        }
    }

    fn insert_segment(&mut self, parent: ConstraintEdge, a: usize, b: usize) -> Insertion {
        if self.tri.contains_edge(a, b) {
            self.lock(parent, a, b);
            return Insertion::Placed;
        }
        let crossed = match self.trace(a, b) {
            Ok(crossed) => crossed,
            Err(stop) => return stop,
        };
        let (created, finished) = self.flip_out(a, b, crossed);
        if !(finished && self.tri.contains_edge(a, b)) {
            self.legalize(created);
            return Insertion::Stuck;
        }
        self.lock(parent, a, b);
        self.legalize(created);
        Insertion::Placed
    }

    /// Edges crossed by the open segment `a-b`, in walk order. Stops early
    /// on a vertex lying on the segment or on a locked edge; nothing is
    /// modified here.
    fn trace(&self, a: usize, b: usize) -> Result<Vec<(usize, usize)>, Insertion> {
        let tri = &*self.tri;
        let (pa, pb) = (tri.point(a), tri.point(b));
        let side = |v: usize| orientation(pa, pb, tri.point(v));
        let on_segment = |v: usize| {
            side(v) == Orientation::Collinear && strictly_between(pa, pb, tri.point(v))
        };

        let mut start = None;
        for e in tri.outgoing(a) {
            let (u, w) = (tri.dest(e), tri.apex(e));
            if on_segment(u) {
                return Err(Insertion::SplitAt(u));
            }
            if on_segment(w) {
                return Err(Insertion::SplitAt(w));
            }
            if side(u) == Orientation::Clockwise && side(w) == Orientation::CounterClockwise {
                start = Some(next_halfedge(e));
                break;
            }
        }
        let Some(mut e) = start else {
            return Err(Insertion::Stuck);
        };

        // `e` always runs from the right side of a -> b to the left side
        let mut crossed = Vec::new();
        loop {
            let (u, w) = (tri.origin(e), tri.dest(e));
            if let Some(segment) = ConstraintEdge::new(u, w) {
                if let Some(&parent) = self.fixed.get(&segment) {
                    return Err(Insertion::Blocked { segment, parent });
                }
            }
            crossed.push((u, w));
            if crossed.len() > tri.triangle_count() {
                return Err(Insertion::Stuck);
            }
            let t = tri.twin(e);
            if t == EMPTY {
                return Err(Insertion::Stuck);
            }
            let v = tri.apex(t);
            if v == b {
                return Ok(crossed);
            }
            e = match side(v) {
                Orientation::CounterClockwise => next_halfedge(t),
                Orientation::Clockwise => prev_halfedge(t),
                Orientation::Collinear if strictly_between(pa, pb, tri.point(v)) => {
                    return Err(Insertion::SplitAt(v));
                }
                Orientation::Collinear => return Err(Insertion::Stuck),
            };
        }
    }

    /// Flips crossed edges until none remains. Returns the new edges that do
    /// not cross `a-b` together with the rims of every flipped quad, and
    /// whether the queue was emptied within the flip budget.
    fn flip_out(
        &mut self,
        a: usize,
        b: usize,
        crossed: Vec<(usize, usize)>,
    ) -> (Vec<(usize, usize)>, bool) {
        let (pa, pb) = (self.tri.point(a), self.tri.point(b));
        let mut budget = 16 * (crossed.len() + 1) * (crossed.len() + 1);
        let mut queue = VecDeque::from(crossed);
        let mut created = Vec::new();
        while let Some((p, q)) = queue.pop_front() {
            if budget == 0 {
                return (created, false);
            }
            budget -= 1;
            let Some(e) = self.tri.find_edge(p, q) else {
                return (created, false);
            };
            if !self.tri.is_flippable(e) {
                queue.push_back((p, q));
                continue;
            }
            if let (c, Some(d)) = self.tri.opposite_apexes(e) {
                created.extend_from_slice(&[(q, c), (c, p), (p, d), (d, q)]);
            }
            let Some(ne) = self.tri.flip(e) else {
                return (created, false);
            };
            let (c, d) = (self.tri.origin(ne), self.tri.dest(ne));
            if segments_cross(pa, pb, self.tri.point(c), self.tri.point(d)) {
                queue.push_back((c, d));
            } else {
                created.push((c, d));
            }
        }
        (created, true)
    }

    /// Lawson flips seeded with `edges`, skipping locked constraints.
    fn legalize(&mut self, edges: Vec<(usize, usize)>) {
        let mut budget = 64 * self.tri.triangle_count() + 64;
        let mut stack = edges;
        while let Some((p, q)) = stack.pop() {
            if budget == 0 {
                log::warn!(
                    "legalization budget exhausted, {} edges left unchecked",
                    stack.len() + 1
                );
                return;
            }
            budget -= 1;
            if ConstraintEdge::new(p, q).map_or(true, |edge| self.fixed.contains_key(&edge)) {
                continue;
            }
            let Some(e) = self.tri.find_edge(p, q) else {
                continue;
            };
            if self.tri.is_locally_delaunay(e) || !self.tri.is_flippable(e) {
                continue;
            }
            let (c, d) = match self.tri.opposite_apexes(e) {
                (c, Some(d)) => (c, d),
                _ => continue,
            };
            let (p, q) = (self.tri.origin(e), self.tri.dest(e));
            if self.tri.flip(e).is_some() {
                stack.extend_from_slice(&[(q, c), (c, p), (p, d), (d, q)]);
            }
        }
    }
}

/// Orders `vertices` by their projection on `a -> b`.
fn sort_along(tri: &Triangulation, a: usize, b: usize, vertices: &mut [usize]) {
    let (pa, pb) = (tri.point(a), tri.point(b));
    let (dx, dy) = (pb.x - pa.x, pb.y - pa.y);
    let param = |v: usize| {
        let p = tri.point(v);
        (p.x - pa.x) * dx + (p.y - pa.y) * dy
    };
    vertices.sort_by(|&u, &v| param(u).total_cmp(&param(v)));
}
