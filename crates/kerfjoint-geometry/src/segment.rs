//! Directed 3D segments and line intersection.

use crate::error::{GeometryError, GeometryResult};
use nalgebra::{Point3, Rotation3, Vector3};
use std::fmt;

/// Coplanarity tolerance on the scalar triple product.
pub const COPLANAR_EPSILON: f64 = 1e-5;

/// Segment from `a` to `b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub a: Point3<f64>,
    pub b: Point3<f64>,
}

impl Segment {
    pub fn new(a: Point3<f64>, b: Point3<f64>) -> Self {
        Self { a, b }
    }

    pub fn vector(&self) -> Vector3<f64> {
        self.b - self.a
    }

    pub fn length(&self) -> f64 {
        self.vector().norm()
    }

    pub fn mid_point(&self) -> Point3<f64> {
        Point3::from((self.a.coords + self.b.coords) * 0.5)
    }

    /// Unsigned angle to another segment, in radians.
    pub fn angle(&self, other: &Segment) -> f64 {
        self.vector().angle(&other.vector())
    }

    /// Rotates both end points about the Z axis through the origin.
    pub fn rotate_z(&self, degrees: f64) -> Segment {
        let rotation = Rotation3::from_axis_angle(&Vector3::z_axis(), degrees.to_radians());
        Segment::new(rotation * self.a, rotation * self.b)
    }

    pub fn translated(&self, offset: Vector3<f64>) -> Segment {
        Segment::new(self.a + offset, self.b + offset)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.3}, {:.3}, {:.3}) -> ({:.3}, {:.3}, {:.3})",
            self.a.x, self.a.y, self.a.z, self.b.x, self.b.y, self.b.z
        )
    }
}

/// Intersection of the two infinite lines carried by the segments.
///
/// The point must lie ahead of `seg1.a` along `seg1`, otherwise the result is
/// [`GeometryError::WrongScale`].
pub fn do_intersection(seg1: &Segment, seg2: &Segment) -> GeometryResult<Point3<f64>> {
    let da = seg1.vector();
    let db = seg2.vector();
    let dc = seg2.a - seg1.a;

    let coplanar = dc.dot(&da.cross(&db));
    if coplanar.abs() >= COPLANAR_EPSILON {
        return Err(GeometryError::NotCoplanar {
            seg1: seg1.to_string(),
            seg2: seg2.to_string(),
            value: coplanar,
        });
    }

    let cross = da.cross(&db);
    let denominator = cross.norm_squared();
    if denominator <= f64::EPSILON {
        return Err(GeometryError::Degenerate("parallel segments".to_string()));
    }
    let scale = dc.cross(&db).dot(&cross) / denominator;
    if scale >= 1e-5 {
        Ok(seg1.a + da * scale)
    } else {
        Err(GeometryError::WrongScale(scale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perpendicular_intersection() {
        let seg1 = Segment::new(Point3::new(50.0, 0.0, 0.0), Point3::new(50.0, 0.0, 3.0));
        let seg2 = Segment::new(Point3::new(63.0, 0.0, 13.0), Point3::new(60.0, 0.0, 13.0));
        let point = do_intersection(&seg1, &seg2).unwrap();
        assert!((point - Point3::new(50.0, 0.0, 13.0)).norm() < 1e-9);
        assert!((seg1.angle(&seg2) - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_not_coplanar() {
        let seg1 = Segment::new(Point3::origin(), Point3::new(1.0, 0.0, 0.0));
        let seg2 = Segment::new(Point3::new(0.0, 1.0, 1.0), Point3::new(0.0, 2.0, 1.0));
        let err = do_intersection(&seg1, &seg2).unwrap_err();
        assert!(matches!(err, GeometryError::NotCoplanar { .. }));
    }

    #[test]
    fn test_intersection_behind_start() {
        let seg1 = Segment::new(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0));
        let seg2 = Segment::new(Point3::new(0.0, 1.0, 0.0), Point3::new(0.0, 2.0, 0.0));
        let err = do_intersection(&seg1, &seg2).unwrap_err();
        assert!(matches!(err, GeometryError::WrongScale(_)));
    }

    #[test]
    fn test_rotate_and_translate() {
        let seg = Segment::new(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0));
        let rotated = seg.rotate_z(90.0).translated(Vector3::new(0.0, 0.0, 1.0));
        assert!((rotated.a - Point3::new(0.0, 1.0, 1.0)).norm() < 1e-12);
        assert!((rotated.length() - 1.0).abs() < 1e-12);
    }
}
