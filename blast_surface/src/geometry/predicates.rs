//! Orientation and in-circle predicates.
//!
//! Both predicates evaluate the usual determinants in `f64` and compare the
//! result against a tolerance scaled by the magnitude of the products that
//! formed it, so nearly-degenerate configurations coming from survey data
//! resolve to a stable "degenerate" answer instead of a noisy sign.

use super::Point;

/// Relative tolerance for the orientation determinant.
const ORIENTATION_TOLERANCE: f64 = 1e-12;

/// Relative tolerance for the in-circle determinant.
const IN_CIRCLE_TOLERANCE: f64 = 1e-10;

/// Turn direction of an ordered point triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    CounterClockwise,
    Clockwise,
    Collinear,
}

/// Classifies `c` against the directed line `a -> b`.
///
/// `CounterClockwise` means `c` lies to the left of the line.
pub fn orientation(a: Point, b: Point, c: Point) -> Orientation {
    let left = (b.x - a.x) * (c.y - a.y);
    let right = (b.y - a.y) * (c.x - a.x);
    let det = left - right;
    let bound = ORIENTATION_TOLERANCE * (left.abs() + right.abs());
    if det > bound {
        Orientation::CounterClockwise
    } else if det < -bound {
        Orientation::Clockwise
    } else {
        Orientation::Collinear
    }
}

/// Returns `true` if `d` lies strictly inside the circumcircle of the
/// counter-clockwise triangle `a`, `b`, `c`. Points on the circle (within
/// tolerance) are reported as outside.
pub fn in_circle(a: Point, b: Point, c: Point, d: Point) -> bool {
    let adx = a.x - d.x;
    let ady = a.y - d.y;
    let bdx = b.x - d.x;
    let bdy = b.y - d.y;
    let cdx = c.x - d.x;
    let cdy = c.y - d.y;

    let alift = adx * adx + ady * ady;
    let blift = bdx * bdx + bdy * bdy;
    let clift = cdx * cdx + cdy * cdy;

    let bc = bdx * cdy - cdx * bdy;
    let ca = cdx * ady - adx * cdy;
    let ab = adx * bdy - bdx * ady;
    let det = alift * bc + blift * ca + clift * ab;

    let permanent = alift * ((bdx * cdy).abs() + (cdx * bdy).abs())
        + blift * ((cdx * ady).abs() + (adx * cdy).abs())
        + clift * ((adx * bdy).abs() + (bdx * ady).abs());
    det > IN_CIRCLE_TOLERANCE * permanent
}

/// Returns `true` if `p` lies strictly between `a` and `b` along the segment
/// direction. Only meaningful when the three points are collinear.
pub fn strictly_between(a: Point, b: Point, p: Point) -> bool {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let t = (p.x - a.x) * dx + (p.y - a.y) * dy;
    t > 0.0 && t < dx * dx + dy * dy
}

/// Returns `true` when segments `a-b` and `c-d` cross at a single interior
/// point. Touching at an endpoint or overlapping collinearly is not a
/// crossing.
pub fn segments_cross(a: Point, b: Point, c: Point, d: Point) -> bool {
    opposite_sides(a, b, c, d) && opposite_sides(c, d, a, b)
}

fn opposite_sides(a: Point, b: Point, p: Point, q: Point) -> bool {
    matches!(
        (orientation(a, b, p), orientation(a, b, q)),
        (Orientation::CounterClockwise, Orientation::Clockwise)
            | (Orientation::Clockwise, Orientation::CounterClockwise)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientation_signs() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(1.0, 0.0);
        assert_eq!(
            orientation(a, b, Point::new(0.5, 1.0)),
            Orientation::CounterClockwise
        );
        assert_eq!(
            orientation(a, b, Point::new(0.5, -1.0)),
            Orientation::Clockwise
        );
        assert_eq!(
            orientation(a, b, Point::new(2.0, 0.0)),
            Orientation::Collinear
        );
    }

    #[test]
    fn near_collinear_resolves_to_collinear() {
        let a = Point::new(1000.0, 1000.0);
        let b = Point::new(2000.0, 2000.0);
        let c = Point::new(1500.0, 1500.0 + 1e-10);
        assert_eq!(orientation(a, b, c), Orientation::Collinear);
    }

    #[test]
    fn in_circle_unit_triangle() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(1.0, 0.0);
        let c = Point::new(0.0, 1.0);
        assert!(in_circle(a, b, c, Point::new(0.5, 0.5 - 0.1)));
        assert!(!in_circle(a, b, c, Point::new(2.0, 2.0)));
        // cocircular corner of the unit square
        assert!(!in_circle(a, b, c, Point::new(1.0, 1.0)));
    }

    #[test]
    fn between_and_crossing() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(2.0, 2.0);
        assert!(strictly_between(a, b, Point::new(1.0, 1.0)));
        assert!(!strictly_between(a, b, Point::new(3.0, 3.0)));
        assert!(!strictly_between(a, b, a));
        assert!(segments_cross(
            a,
            b,
            Point::new(0.0, 2.0),
            Point::new(2.0, 0.0)
        ));
        assert!(!segments_cross(
            a,
            b,
            Point::new(2.0, 2.0),
            Point::new(3.0, 0.0)
        ));
    }
}
