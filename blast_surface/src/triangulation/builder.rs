//! Unconstrained Delaunay construction.

use crate::error::SurfaceError;
use crate::geometry::Point;

use super::Triangulation;

/// Builds an unconstrained Delaunay triangulation of planar points.
///
/// Any implementation with robust predicates can be plugged into
/// [`crate::build_surface_with`]; the engine only relies on the empty
/// circumcircle property and the half-edge queries of [`Triangulation`].
pub trait DelaunayBuilder {
    fn build(&self, points: &[Point]) -> Result<Triangulation, SurfaceError>;
}

/// Delaunay construction backed by the `delaunator` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct DelaunatorBuilder;

impl DelaunayBuilder for DelaunatorBuilder {
    fn build(&self, points: &[Point]) -> Result<Triangulation, SurfaceError> {
        if points.len() < 3 {
            return Err(SurfaceError::InsufficientVertices {
                found: points.len(),
            });
        }
        let coords: Vec<delaunator::Point> = points
            .iter()
            .map(|p| delaunator::Point { x: p.x, y: p.y })
            .collect();
        let triangulation = delaunator::triangulate(&coords);
        let triples: Vec<[usize; 3]> = triangulation
            .triangles
            .chunks(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();
        let result = Triangulation::from_triangles(points.to_vec(), &triples);
        if result.triangle_count() == 0 {
            return Err(SurfaceError::DegenerateVertexSet);
        }
        log::debug!(
            "delaunay: {} triangles over {} vertices, {} hull edges",
            result.triangle_count(),
            points.len(),
            result.hull_edge_count()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangulates_square() {
        let pts = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ];
        let tri = DelaunatorBuilder.build(&pts).unwrap();
        assert_eq!(tri.triangle_count(), 2);
        assert_eq!(tri.hull_edge_count(), 4);
    }

    #[test]
    fn collinear_points_are_rejected() {
        let pts = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 2.0),
            Point::new(3.0, 3.0),
        ];
        assert_eq!(
            DelaunatorBuilder.build(&pts).unwrap_err(),
            SurfaceError::DegenerateVertexSet
        );
    }

    #[test]
    fn too_few_points() {
        let pts = vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)];
        assert_eq!(
            DelaunatorBuilder.build(&pts).unwrap_err(),
            SurfaceError::InsufficientVertices { found: 2 }
        );
    }
}
