//! Final triangle mesh and the per-call diagnostic report.

use std::collections::HashSet;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::collect::Vertex;
use crate::constraints::ConstraintEdge;
use crate::enforce::{ConstraintConflict, ConstraintSplit};
use crate::filter::RemovedTriangle;
use crate::geometry::{centroid, Point3, TriangleShape};

/// Surviving triangle with its derived attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    /// Canonical vertex ids, counter-clockwise in XY.
    pub vertices: [usize; 3],
    pub centroid: Point3,
    /// Unit normal with a non-negative Z component.
    pub normal: Point3,
    pub circumradius: f64,
    pub min_angle_deg: f64,
    pub longest_edge: f64,
}

impl Triangle {
    fn from_corners(vertices: [usize; 3], a: Point3, b: Point3, c: Point3) -> Self {
        let shape = TriangleShape::measure(a.xy(), b.xy(), c.xy());
        Self {
            vertices,
            centroid: centroid(a, b, c),
            normal: upward_normal(a, b, c),
            circumradius: shape.circumradius,
            min_angle_deg: shape.min_angle_deg,
            longest_edge: shape.longest_edge,
        }
    }

    /// The three undirected edges of the triangle.
    pub fn edges(&self) -> [ConstraintEdge; 3] {
        let [a, b, c] = self.vertices;
        // corners are distinct, so every pair is a valid edge
        [(a, b), (b, c), (c, a)].map(|(u, v)| ConstraintEdge {
            a: u.min(v),
            b: u.max(v),
        })
    }
}

fn upward_normal(a: Point3, b: Point3, c: Point3) -> Point3 {
    let pa = Vector3::new(a.x, a.y, a.z);
    let ab = Vector3::new(b.x, b.y, b.z) - pa;
    let ac = Vector3::new(c.x, c.y, c.z) - pa;
    let n = ab.cross(&ac);
    let n = match n.try_normalize(f64::EPSILON) {
        Some(unit) if unit.z < 0.0 => -unit,
        Some(unit) => unit,
        None => Vector3::z(),
    };
    Point3::new(n.x, n.y, n.z)
}

/// Immutable result of a surface build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    /// Canonical vertex array, indexed by vertex id.
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<Triangle>,
    /// Constraint edges that were placed in the triangulation.
    pub constraints: Vec<ConstraintEdge>,
}

impl Mesh {
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Triangle index triples.
    pub fn indices(&self) -> Vec<[usize; 3]> {
        self.triangles.iter().map(|t| t.vertices).collect()
    }

    /// Returns `true` if `a-b` is an edge of a surviving triangle.
    pub fn contains_edge(&self, a: usize, b: usize) -> bool {
        let Some(edge) = ConstraintEdge::new(a, b) else {
            return false;
        };
        self.triangles.iter().any(|t| t.edges().contains(&edge))
    }

    /// Placed constraints no surviving triangle touches any more.
    pub fn orphaned_constraints(&self) -> Vec<ConstraintEdge> {
        let present: HashSet<ConstraintEdge> =
            self.triangles.iter().flat_map(Triangle::edges).collect();
        self.constraints
            .iter()
            .filter(|edge| !present.contains(edge))
            .copied()
            .collect()
    }

    /// Sum of planar triangle areas.
    pub fn planar_area(&self) -> f64 {
        self.triangles
            .iter()
            .map(|t| {
                let [a, b, c] = t.vertices.map(|v| self.vertices[v].xy());
                ((b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)).abs() * 0.5
            })
            .sum()
    }
}

/// Builds the final mesh from surviving triangles.
pub fn emit_mesh(
    vertices: Vec<Vertex>,
    triangles: &[[usize; 3]],
    constraints: Vec<ConstraintEdge>,
) -> Mesh {
    let corners = |v: usize| vertices[v].position();
    let triangles = triangles
        .iter()
        .map(|&tri| Triangle::from_corners(tri, corners(tri[0]), corners(tri[1]), corners(tri[2])))
        .collect();
    Mesh {
        vertices,
        triangles,
        constraints,
    }
}

/// Counters and recoverable conditions gathered during one build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub raw_vertex_count: usize,
    pub canonical_vertex_count: usize,
    pub constraint_edge_count: usize,
    pub degenerate_constraints_dropped: usize,
    pub conflicting_constraints: Vec<ConstraintConflict>,
    pub split_constraints: Vec<ConstraintSplit>,
    pub unplaced_constraints: Vec<ConstraintEdge>,
    /// Placed constraints whose every adjacent triangle was filtered out.
    pub constraints_removed_by_filter: Vec<ConstraintEdge>,
    pub triangles_before_filter: usize,
    pub triangles_removed_by_clip: usize,
    pub triangles_removed_by_angle: usize,
    pub triangles_removed_by_length: usize,
    pub triangles_final: usize,
    pub removed_triangles: Vec<RemovedTriangle>,
    /// Only set on best-effort results of a cancelled build.
    pub cancelled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::SourceTag;
    use approx::assert_relative_eq;

    fn vertex(id: usize, x: f64, y: f64, z: f64) -> Vertex {
        Vertex {
            id,
            x,
            y,
            z,
            source_tag: SourceTag::RawPoint,
            source_ref: String::new(),
        }
    }

    fn sloped_square() -> Vec<Vertex> {
        vec![
            vertex(0, 0.0, 0.0, 0.0),
            vertex(1, 1.0, 0.0, 1.0),
            vertex(2, 1.0, 1.0, 1.0),
            vertex(3, 0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn normals_point_up_and_are_unit() {
        // second triple is clockwise on purpose
        let mesh = emit_mesh(sloped_square(), &[[0, 1, 2], [0, 3, 2]], Vec::new());
        for t in &mesh.triangles {
            let n = t.normal;
            assert_relative_eq!((n.x * n.x + n.y * n.y + n.z * n.z).sqrt(), 1.0, epsilon = 1e-12);
            assert!(n.z >= 0.0);
            assert_relative_eq!(n.x, -(0.5f64).sqrt(), epsilon = 1e-12);
        }
    }

    #[test]
    fn centroid_includes_z() {
        let mesh = emit_mesh(sloped_square(), &[[0, 1, 2]], Vec::new());
        let c = mesh.triangles[0].centroid;
        assert_relative_eq!(c.x, 2.0 / 3.0);
        assert_relative_eq!(c.y, 1.0 / 3.0);
        assert_relative_eq!(c.z, 2.0 / 3.0);
    }

    #[test]
    fn orphaned_constraints_are_reported() {
        let constraints = vec![ConstraintEdge { a: 0, b: 2 }, ConstraintEdge { a: 1, b: 2 }];
        let mesh = emit_mesh(sloped_square(), &[[0, 2, 3]], constraints);
        assert!(mesh.contains_edge(2, 0));
        assert!(!mesh.contains_edge(1, 2));
        assert_eq!(mesh.orphaned_constraints(), vec![ConstraintEdge { a: 1, b: 2 }]);
        assert_relative_eq!(mesh.planar_area(), 0.5);
    }
}
