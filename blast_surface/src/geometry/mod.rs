//! Basic geometry primitives for surface triangulation.

pub mod predicates;

/// Representation of a 2D point in the working plane.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Representation of a 3D point. Z is carried as an attribute and never
/// takes part in planar predicates.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Projection onto the XY plane.
    pub fn xy(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Returns `true` when every coordinate is finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Calculates the Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
}

/// Returns `true` if point `p` is inside the polygon defined by `poly` using
/// the ray casting algorithm. The polygon is implicitly closed.
pub fn point_in_polygon(p: Point, poly: &[Point]) -> bool {
    let mut inside = false;
    if poly.is_empty() {
        return inside;
    }
    let mut j = poly.len() - 1;
    for i in 0..poly.len() {
        let pi = poly[i];
        let pj = poly[j];
        if ((pi.y > p.y) != (pj.y > p.y))
            && (p.x < (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Mean of three points, Z included.
pub fn centroid(a: Point3, b: Point3, c: Point3) -> Point3 {
    Point3::new(
        (a.x + b.x + c.x) / 3.0,
        (a.y + b.y + c.y) / 3.0,
        (a.z + b.z + c.z) / 3.0,
    )
}

/// Planar shape measures of a triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleShape {
    /// Circumradius in the XY plane. Infinite for collinear corners.
    pub circumradius: f64,
    /// Smallest internal angle in degrees.
    pub min_angle_deg: f64,
    /// Longest edge measured in the XY plane.
    pub longest_edge: f64,
}

impl TriangleShape {
    /// Measures the triangle `a`, `b`, `c` projected on the XY plane.
    pub fn measure(a: Point, b: Point, c: Point) -> Self {
        let ab = distance(a, b);
        let bc = distance(b, c);
        let ca = distance(c, a);
        let longest_edge = ab.max(bc).max(ca);
        let twice_area = ((b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)).abs();
        let circumradius = if twice_area <= f64::EPSILON * longest_edge * longest_edge {
            f64::INFINITY
        } else {
            ab * bc * ca / (2.0 * twice_area)
        };
        let min_angle_deg = [
            corner_angle(ab, ca, bc),
            corner_angle(ab, bc, ca),
            corner_angle(bc, ca, ab),
        ]
        .into_iter()
        .fold(f64::INFINITY, f64::min);
        Self {
            circumradius,
            min_angle_deg,
            longest_edge,
        }
    }
}

// Angle between sides `s1` and `s2` opposite to side `opposite`, law of cosines.
fn corner_angle(s1: f64, s2: f64, opposite: f64) -> f64 {
    if s1 <= 0.0 || s2 <= 0.0 {
        return 0.0;
    }
    let cos = ((s1 * s1 + s2 * s2 - opposite * opposite) / (2.0 * s1 * s2)).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}
