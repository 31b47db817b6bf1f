//! Local frame resolution for planar panel faces.
//!
//! A panel face is a thin rectangle: one long edge (the face width) and one
//! short edge (the panel thickness). The resolved frame maps feature-local
//! coordinates onto the face:
//!
//! - X points into the panel (opposite the outward normal)
//! - Y runs along the long edge
//! - Z runs along the short edge
//!
//! Features are modelled around the local origin and placed with
//! [`placement`], which puts that origin on the face centroid.

use crate::error::{GeometryError, GeometryResult};
use crate::face::Face;
use crate::solid::Solid;
use nalgebra::{Matrix3, Matrix4, Rotation3, Translation3, Vector3};

/// Match tolerance between the computed corner cross product and the normal.
pub const FRAME_EPSILON: f64 = 1e-6;

/// Orthonormal frame attached to a face. The raw axes keep the edge lengths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalFrame {
    pub x_axis: Vector3<f64>,
    pub y_axis_raw: Vector3<f64>,
    pub z_axis_raw: Vector3<f64>,
}

impl LocalFrame {
    pub fn y_axis(&self) -> Vector3<f64> {
        self.y_axis_raw.normalize()
    }

    pub fn z_axis(&self) -> Vector3<f64> {
        self.z_axis_raw.normalize()
    }

    /// Length of the long edge.
    pub fn width(&self) -> f64 {
        self.y_axis_raw.norm()
    }

    /// Length of the short edge.
    pub fn thickness(&self) -> f64 {
        self.z_axis_raw.norm()
    }

    /// Rotation whose columns are the local axes in world coordinates.
    pub fn rotation(&self) -> Matrix3<f64> {
        axes_rotation(&self.x_axis, &self.y_axis(), &self.z_axis())
    }

    pub fn to_homogeneous(&self) -> Matrix4<f64> {
        self.rotation().to_homogeneous()
    }
}

/// Rotation matrix with the given (normalized) vectors as columns.
pub fn axes_rotation(x: &Vector3<f64>, y: &Vector3<f64>, z: &Vector3<f64>) -> Matrix3<f64> {
    Matrix3::from_columns(&[x.normalize(), y.normalize(), z.normalize()])
}

pub fn resolve_frame(face: &Face) -> GeometryResult<LocalFrame> {
    resolve_frame_with_tolerance(face, FRAME_EPSILON)
}

/// Finds the corner whose (long edge × short edge) equals the inward normal.
pub fn resolve_frame_with_tolerance(face: &Face, epsilon: f64) -> GeometryResult<LocalFrame> {
    let points = face.outer_loop()?;
    let count = points.len();
    if count < 3 {
        return Err(GeometryError::VertexSort(format!(
            "expected a closed loop, got {count} points"
        )));
    }

    let x_axis = -face.normal();
    for i in 0..count {
        let current = points[i];
        let forward = points[(i + 1) % count] - current;
        let backward = points[(i + count - 1) % count] - current;
        let (y_raw, z_raw) = if forward.norm() >= backward.norm() {
            (forward, backward)
        } else {
            (backward, forward)
        };
        if y_raw.norm() <= f64::EPSILON || z_raw.norm() <= f64::EPSILON {
            continue;
        }
        let computed = y_raw.normalize().cross(&z_raw.normalize());
        let delta = computed - x_axis;
        if delta.iter().all(|c| c.abs() < epsilon) {
            return Ok(LocalFrame {
                x_axis,
                y_axis_raw: y_raw,
                z_axis_raw: z_raw,
            });
        }
    }
    Err(GeometryError::AxisNotFound)
}

/// Local-to-world placement: rotate into the frame, then move the origin to
/// the face centroid shifted by `x_origin` along the outward normal.
pub fn placement(face: &Face, frame: &LocalFrame, x_origin: f64) -> Matrix4<f64> {
    let center = face.center_of_mass() + face.normal() * x_origin;
    Translation3::from(center.coords).to_homogeneous() * frame.to_homogeneous()
}

/// Same as [`placement`] with a half turn about the local X axis first, which
/// mirrors the Y layout of a feature onto the other end of the face.
pub fn spun_placement(face: &Face, frame: &LocalFrame, x_origin: f64) -> Matrix4<f64> {
    let spin = Rotation3::from_axis_angle(&Vector3::x_axis(), std::f64::consts::PI);
    placement(face, frame, x_origin) * spin.to_homogeneous()
}

/// Places a feature modelled in the local frame onto the face.
pub fn place_on_face(feature: &Solid, face: &Face, frame: &LocalFrame, x_origin: f64) -> Solid {
    feature.transformed(&placement(face, frame, x_origin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn test_frame_on_panel_side() {
        // 90 x 3 x 50 wall, side face at x = 90 is 3 wide and 50 high
        let solid = Solid::cuboid(Point3::origin(), Vector3::new(90.0, 3.0, 50.0));
        let face = solid
            .faces()
            .into_iter()
            .find(|f| (f.normal() - Vector3::z()).norm() < 1e-9)
            .unwrap();
        let frame = resolve_frame(&face).unwrap();
        assert!((frame.x_axis + Vector3::z()).norm() < 1e-12);
        assert!((frame.width() - 90.0).abs() < 1e-9);
        assert!((frame.thickness() - 3.0).abs() < 1e-9);
        let cross = frame.y_axis().cross(&frame.z_axis());
        assert!((cross - frame.x_axis).norm() < 1e-6);
    }

    #[test]
    fn test_placement_moves_origin_to_centroid() {
        let solid = Solid::cuboid(Point3::origin(), Vector3::new(90.0, 3.0, 50.0));
        let face = solid
            .faces()
            .into_iter()
            .find(|f| (f.normal() - Vector3::z()).norm() < 1e-9)
            .unwrap();
        let frame = resolve_frame(&face).unwrap();
        let matrix = placement(&face, &frame, 1.5);
        let origin = matrix.transform_point(&Point3::origin());
        assert!((origin - Point3::new(45.0, 1.5, 51.5)).norm() < 1e-9);
        // local +X goes down into the panel
        let inward = matrix.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert!((inward - Point3::new(45.0, 1.5, 50.5)).norm() < 1e-9);
    }

    #[test]
    fn test_spun_placement_mirrors_y() {
        let solid = Solid::cuboid(Point3::origin(), Vector3::new(90.0, 3.0, 50.0));
        let face = solid.faces().into_iter().next().unwrap();
        let frame = resolve_frame(&face).unwrap();
        let straight = placement(&face, &frame, 0.0).transform_point(&Point3::new(0.0, 10.0, 0.0));
        let spun = spun_placement(&face, &frame, 0.0).transform_point(&Point3::new(0.0, -10.0, 0.0));
        assert!((straight - spun).norm() < 1e-9);
    }
}
