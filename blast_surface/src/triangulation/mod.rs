//! Half-edge triangulation with edge flipping.
//!
//! Storage follows the delaunator layout: triangle `t` owns half-edges
//! `3t`, `3t + 1` and `3t + 2`, `triangles[e]` is the origin vertex of
//! half-edge `e` and `halfedges[e]` its twin in the neighbouring triangle
//! (or [`EMPTY`] on the hull). Every triangle is counter-clockwise.

pub mod builder;

use std::collections::HashMap;

use crate::geometry::predicates::{in_circle, orientation, Orientation};
use crate::geometry::Point;

pub use builder::{DelaunatorBuilder, DelaunayBuilder};

/// Marker for a missing twin or vertex link.
pub const EMPTY: usize = usize::MAX;

/// Next half-edge inside the same triangle.
#[inline]
pub fn next_halfedge(e: usize) -> usize {
    if e % 3 == 2 {
        e - 2
    } else {
        e + 1
    }
}

/// Previous half-edge inside the same triangle.
#[inline]
pub fn prev_halfedge(e: usize) -> usize {
    if e % 3 == 0 {
        e + 2
    } else {
        e - 1
    }
}

#[derive(Debug, Clone)]
pub struct Triangulation {
    points: Vec<Point>,
    triangles: Vec<usize>,
    halfedges: Vec<usize>,
    /// One outgoing half-edge per vertex, `EMPTY` for isolated vertices.
    vertex_edge: Vec<usize>,
}

impl Triangulation {
    /// Assembles a triangulation from vertex triples.
    ///
    /// Clockwise triples are reoriented, triples with exactly zero signed
    /// area are dropped, and twins are linked by matching opposite directed
    /// edges.
    pub fn from_triangles(points: Vec<Point>, triples: &[[usize; 3]]) -> Self {
        let mut triangles = Vec::with_capacity(triples.len() * 3);
        for &[a, b, c] in triples {
            let (pa, pb, pc) = (points[a], points[b], points[c]);
            let signed = (pb.x - pa.x) * (pc.y - pa.y) - (pb.y - pa.y) * (pc.x - pa.x);
            if signed > 0.0 {
                triangles.extend_from_slice(&[a, b, c]);
            } else if signed < 0.0 {
                triangles.extend_from_slice(&[a, c, b]);
            }
        }

        let mut halfedges = vec![EMPTY; triangles.len()];
        let mut directed: HashMap<(usize, usize), usize> = HashMap::with_capacity(triangles.len());
        for e in 0..triangles.len() {
            let from = triangles[e];
            let to = triangles[next_halfedge(e)];
            if let Some(&twin) = directed.get(&(to, from)) {
                halfedges[e] = twin;
                halfedges[twin] = e;
            }
            directed.insert((from, to), e);
        }

        let mut vertex_edge = vec![EMPTY; points.len()];
        for (e, &v) in triangles.iter().enumerate() {
            vertex_edge[v] = e;
        }

        Self {
            points,
            triangles,
            halfedges,
            vertex_edge,
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn point(&self, v: usize) -> Point {
        self.points[v]
    }

    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    /// Vertex triple of triangle `t`, counter-clockwise.
    pub fn triangle(&self, t: usize) -> [usize; 3] {
        [
            self.triangles[3 * t],
            self.triangles[3 * t + 1],
            self.triangles[3 * t + 2],
        ]
    }

    /// All triangles as counter-clockwise vertex triples.
    pub fn triangle_list(&self) -> Vec<[usize; 3]> {
        (0..self.triangle_count()).map(|t| self.triangle(t)).collect()
    }

    pub fn origin(&self, e: usize) -> usize {
        self.triangles[e]
    }

    pub fn dest(&self, e: usize) -> usize {
        self.triangles[next_halfedge(e)]
    }

    /// Vertex of the triangle of `e` that is not on `e`.
    pub fn apex(&self, e: usize) -> usize {
        self.triangles[prev_halfedge(e)]
    }

    pub fn twin(&self, e: usize) -> usize {
        self.halfedges[e]
    }

    /// Whether vertex `v` belongs to at least one triangle.
    pub fn is_connected(&self, v: usize) -> bool {
        self.vertex_edge.get(v).map_or(false, |&e| e != EMPTY)
    }

    /// Calls `visit` on every half-edge leaving `v`, walking the star in both
    /// directions so hull vertices are covered. Stops as soon as `visit`
    /// returns `true` and reports whether it did.
    fn walk_star(&self, v: usize, mut visit: impl FnMut(usize) -> bool) -> bool {
        let start = match self.vertex_edge.get(v) {
            Some(&e) if e != EMPTY => e,
            _ => return false,
        };
        if visit(start) {
            return true;
        }
        let mut e = start;
        loop {
            let t = self.halfedges[prev_halfedge(e)];
            if t == EMPTY {
                break;
            }
            if t == start {
                return false;
            }
            if visit(t) {
                return true;
            }
            e = t;
        }
        e = start;
        loop {
            let t = self.halfedges[e];
            if t == EMPTY {
                return false;
            }
            e = next_halfedge(t);
            if visit(e) {
                return true;
            }
        }
    }

    /// Every half-edge leaving `v`.
    pub fn outgoing(&self, v: usize) -> Vec<usize> {
        let mut out = Vec::new();
        self.walk_star(v, |e| {
            out.push(e);
            false
        });
        out
    }

    /// Half-edge lying on the undirected edge `a-b`, preferring `a -> b`.
    pub fn find_edge(&self, a: usize, b: usize) -> Option<usize> {
        let mut forward = None;
        let mut reverse = None;
        self.walk_star(a, |e| {
            if self.dest(e) == b {
                forward = Some(e);
                return true;
            }
            let incoming = prev_halfedge(e);
            if self.origin(incoming) == b {
                reverse = Some(incoming);
            }
            false
        });
        forward.or(reverse)
    }

    pub fn contains_edge(&self, a: usize, b: usize) -> bool {
        self.find_edge(a, b).is_some()
    }

    /// The one or two triangles sharing edge `a-b`.
    pub fn adjacent_triangles(&self, a: usize, b: usize) -> Option<(usize, Option<usize>)> {
        let e = self.find_edge(a, b)?;
        let twin = self.halfedges[e];
        Some((e / 3, (twin != EMPTY).then_some(twin / 3)))
    }

    /// Apexes on both sides of `e`: the apex of its own triangle and, for
    /// interior edges, the apex across.
    pub fn opposite_apexes(&self, e: usize) -> (usize, Option<usize>) {
        let twin = self.halfedges[e];
        (
            self.apex(e),
            (twin != EMPTY).then(|| self.apex(twin)),
        )
    }

    /// Whether the quadrilateral around interior edge `e` is strictly convex,
    /// i.e. the edge can be flipped.
    pub fn is_flippable(&self, e: usize) -> bool {
        let (c, d) = match self.opposite_apexes(e) {
            (c, Some(d)) => (c, d),
            _ => return false,
        };
        let (pc, pd) = (self.points[c], self.points[d]);
        matches!(
            (
                orientation(pc, pd, self.points[self.origin(e)]),
                orientation(pc, pd, self.points[self.dest(e)]),
            ),
            (Orientation::Clockwise, Orientation::CounterClockwise)
                | (Orientation::CounterClockwise, Orientation::Clockwise)
        )
    }

    /// Empty-circumcircle test for the two triangles around `e`. Hull edges
    /// are always locally Delaunay.
    pub fn is_locally_delaunay(&self, e: usize) -> bool {
        let twin = self.halfedges[e];
        if twin == EMPTY {
            return true;
        }
        !in_circle(
            self.points[self.origin(e)],
            self.points[self.dest(e)],
            self.points[self.apex(e)],
            self.points[self.apex(twin)],
        )
    }

    /// Replaces interior edge `e = p -> q` by the diagonal joining the two
    /// opposite apexes, reusing both triangle slots. Returns the half-edge of
    /// the new diagonal, or `None` for hull edges. Convexity is the caller's
    /// responsibility.
    pub fn flip(&mut self, e: usize) -> Option<usize> {
        let f = self.halfedges[e];
        if f == EMPTY {
            return None;
        }
        let (e1, e2) = (next_halfedge(e), prev_halfedge(e));
        let (f1, f2) = (next_halfedge(f), prev_halfedge(f));
        let p = self.triangles[e];
        let q = self.triangles[f];
        let c = self.triangles[e2];
        let d = self.triangles[f2];
        let (out_e1, out_e2) = (self.halfedges[e1], self.halfedges[e2]);
        let (out_f1, out_f2) = (self.halfedges[f1], self.halfedges[f2]);

        // (p, q, c) + (q, p, d) become (c, d, q) + (d, c, p)
        self.triangles[e] = c;
        self.triangles[e1] = d;
        self.triangles[e2] = q;
        self.triangles[f] = d;
        self.triangles[f1] = c;
        self.triangles[f2] = p;

        self.link(e, f);
        self.link(e1, out_f2);
        self.link(e2, out_e1);
        self.link(f1, out_e2);
        self.link(f2, out_f1);

        self.vertex_edge[p] = f2;
        self.vertex_edge[q] = e2;
        self.vertex_edge[c] = e;
        self.vertex_edge[d] = f;
        Some(e)
    }

    fn link(&mut self, a: usize, b: usize) {
        self.halfedges[a] = b;
        if b != EMPTY {
            self.halfedges[b] = a;
        }
    }

    /// One half-edge per undirected edge.
    pub fn edges(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.halfedges.len()).filter(move |&e| {
            let twin = self.halfedges[e];
            twin == EMPTY || e < twin
        })
    }

    /// Number of hull edges.
    pub fn hull_edge_count(&self) -> usize {
        self.halfedges.iter().filter(|&&t| t == EMPTY).count()
    }
}
