//! Vertex collection and near-duplicate snapping.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::SurfaceError;
use crate::geometry::{Point, Point3};
use crate::input::{RawPoint, SourceTag};

/// Canonical vertex of a surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    /// Dense index into the canonical vertex array.
    pub id: usize,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub source_tag: SourceTag,
    /// Diagnostic reference to the originating entity.
    pub source_ref: String,
}

impl Vertex {
    pub fn position(&self) -> Point3 {
        Point3::new(self.x, self.y, self.z)
    }

    pub fn xy(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

impl From<&Vertex> for RawPoint {
    fn from(v: &Vertex) -> Self {
        RawPoint::new(v.position(), v.source_tag, v.source_ref.clone())
    }
}

/// Canonical vertices together with the map from every raw point to its
/// canonical representative.
///
/// The representative of a cluster is the first raw point encountered, so
/// the result depends on input order: feed points in a stable order when
/// reproducible output matters. When a raw point is within tolerance of
/// several canonical vertices it snaps to the one registered first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexSet {
    pub vertices: Vec<Vertex>,
    pub raw_to_canonical: Vec<usize>,
}

impl VertexSet {
    /// Canonical id for the raw point at `raw`.
    pub fn canonical(&self, raw: usize) -> Option<usize> {
        self.raw_to_canonical.get(raw).copied()
    }

    pub fn raw_count(&self) -> usize {
        self.raw_to_canonical.len()
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// XY positions indexed by canonical id.
    pub fn positions(&self) -> Vec<Point> {
        self.vertices.iter().map(Vertex::xy).collect()
    }
}

/// Uniform grid bucketing canonical ids by cell.
struct SnapGrid {
    cell_size: f64,
    cells: HashMap<(i64, i64), Vec<usize>>,
}

impl SnapGrid {
    fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    fn key(&self, p: Point) -> (i64, i64) {
        // `as` saturates for huge values; distinct far points may then share
        // a bucket, which only costs extra distance checks.
        (
            (p.x / self.cell_size).floor() as i64,
            (p.y / self.cell_size).floor() as i64,
        )
    }

    /// Lowest canonical id within `tolerance` of `p`, probing the 3x3 block
    /// of cells around it.
    fn find(&self, p: Point, vertices: &[Vertex], tolerance: f64) -> Option<usize> {
        let (cx, cy) = self.key(p);
        let mut best: Option<usize> = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(bucket) = self
                    .cells
                    .get(&(cx.saturating_add(dx), cy.saturating_add(dy)))
                else {
                    continue;
                };
                for &id in bucket {
                    let v = &vertices[id];
                    if (v.x - p.x).hypot(v.y - p.y) <= tolerance
                        && best.map_or(true, |b| id < b)
                    {
                        best = Some(id);
                    }
                }
            }
        }
        best
    }

    fn insert(&mut self, p: Point, id: usize) {
        let key = self.key(p);
        self.cells.entry(key).or_default().push(id);
    }
}

/// Snaps raw points closer than `tolerance` (planar distance) onto a single
/// canonical vertex.
///
/// Fails with [`SurfaceError::NonFiniteCoordinate`] on NaN/infinite input and
/// with [`SurfaceError::InsufficientVertices`] when fewer than three
/// canonical vertices remain.
pub fn collect_vertices(points: &[RawPoint], tolerance: f64) -> Result<VertexSet, SurfaceError> {
    if !(tolerance.is_finite() && tolerance > 0.0) {
        return Err(SurfaceError::InvalidOption {
            name: "dedup_tolerance",
            reason: format!("{tolerance} is not a positive finite distance"),
        });
    }
    let mut grid = SnapGrid::new(tolerance);
    let mut vertices: Vec<Vertex> = Vec::new();
    let mut raw_to_canonical = Vec::with_capacity(points.len());

    for (index, raw) in points.iter().enumerate() {
        if !raw.position.is_finite() {
            return Err(SurfaceError::NonFiniteCoordinate { index });
        }
        let p = raw.position.xy();
        let id = match grid.find(p, &vertices, tolerance) {
            Some(id) => id,
            None => {
                let id = vertices.len();
                vertices.push(Vertex {
                    id,
                    x: raw.position.x,
                    y: raw.position.y,
                    z: raw.position.z,
                    source_tag: raw.tag,
                    source_ref: raw.source_ref.clone(),
                });
                grid.insert(p, id);
                id
            }
        };
        raw_to_canonical.push(id);
    }

    log::debug!(
        "collected {} raw points into {} canonical vertices",
        points.len(),
        vertices.len()
    );

    if vertices.len() < 3 {
        return Err(SurfaceError::InsufficientVertices {
            found: vertices.len(),
        });
    }
    Ok(VertexSet {
        vertices,
        raw_to_canonical,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(x: f64, y: f64, z: f64) -> RawPoint {
        RawPoint::new(Point3::new(x, y, z), SourceTag::RawPoint, "")
    }

    #[test]
    fn snaps_near_duplicates_to_first() {
        let pts = vec![
            raw(0.0, 0.0, 1.0),
            raw(1.0, 0.0, 0.0),
            raw(0.0, 0.0 + 5e-7, 2.0),
            raw(0.0, 1.0, 0.0),
        ];
        let set = collect_vertices(&pts, 1e-6).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.raw_to_canonical, vec![0, 1, 0, 2]);
        // first-encountered keeps its elevation
        assert_eq!(set.vertices[0].z, 1.0);
    }

    #[test]
    fn neighbour_cells_are_probed() {
        // straddles a cell boundary at x = 1.0 with cell size 0.1
        let pts = vec![
            raw(0.9999, 0.0, 0.0),
            raw(1.0001, 0.0, 0.0),
            raw(5.0, 0.0, 0.0),
            raw(0.0, 5.0, 0.0),
        ];
        let set = collect_vertices(&pts, 0.1).unwrap();
        assert_eq!(set.raw_to_canonical, vec![0, 0, 1, 2]);
    }

    #[test]
    fn ambiguous_point_snaps_to_earliest_canonical() {
        let pts = vec![
            raw(0.0, 0.0, 0.0),
            raw(1.5, 0.0, 0.0),
            raw(0.75, 0.0, 0.0),
            raw(0.0, 9.0, 0.0),
        ];
        let set = collect_vertices(&pts, 1.0).unwrap();
        // 0.75 is within tolerance of both the first and second vertex
        assert_eq!(set.raw_to_canonical, vec![0, 1, 0, 2]);
    }

    #[test]
    fn too_few_vertices() {
        let pts = vec![raw(0.0, 0.0, 0.0), raw(0.0, 0.0, 0.0), raw(1.0, 1.0, 0.0)];
        assert_eq!(
            collect_vertices(&pts, 1e-6),
            Err(SurfaceError::InsufficientVertices { found: 2 })
        );
    }

    #[test]
    fn rejects_non_finite() {
        let pts = vec![raw(0.0, 0.0, 0.0), raw(f64::NAN, 1.0, 0.0), raw(1.0, 1.0, 0.0)];
        assert_eq!(
            collect_vertices(&pts, 1e-6),
            Err(SurfaceError::NonFiniteCoordinate { index: 1 })
        );
    }

    #[test]
    fn rejects_bad_tolerance() {
        let pts = vec![raw(0.0, 0.0, 0.0), raw(1.0, 0.0, 0.0), raw(1.0, 1.0, 0.0)];
        assert!(matches!(
            collect_vertices(&pts, 0.0),
            Err(SurfaceError::InvalidOption { .. })
        ));
    }

    #[test]
    fn collecting_canonical_output_is_idempotent() {
        let pts = vec![
            raw(0.0, 0.0, 0.0),
            raw(0.3, 0.0, 0.0),
            raw(1.0, 0.0, 0.0),
            raw(1.2, 0.1, 0.0),
            raw(0.0, 1.0, 0.0),
        ];
        let first = collect_vertices(&pts, 0.5).unwrap();
        let again: Vec<RawPoint> = first.vertices.iter().map(RawPoint::from).collect();
        let second = collect_vertices(&again, 0.5).unwrap();
        assert_eq!(first.vertices, second.vertices);
    }
}
