//! Curve sampling into polylines.

use crate::error::{GeometryError, GeometryResult};
use nalgebra::{Point3, Rotation3, Unit};
use std::f64::consts::PI;

/// Samples a Bézier curve of any degree with de Casteljau's algorithm.
/// Both end points are included.
pub fn bezier(control: &[Point3<f64>], samples: usize) -> Vec<Point3<f64>> {
    if control.len() < 2 {
        return control.to_vec();
    }
    let samples = samples.max(1);
    (0..=samples)
        .map(|i| {
            let t = i as f64 / samples as f64;
            let mut points: Vec<Point3<f64>> = control.to_vec();
            for level in (1..points.len()).rev() {
                for k in 0..level {
                    points[k] = Point3::from(points[k].coords * (1.0 - t) + points[k + 1].coords * t);
                }
            }
            points[0]
        })
        .collect()
}

/// Samples the circular arc that starts at `start`, passes through `mid` and
/// ends at `end`. Returns `segments + 1` points.
pub fn arc_through_points(
    start: Point3<f64>,
    mid: Point3<f64>,
    end: Point3<f64>,
    segments: usize,
) -> GeometryResult<Vec<Point3<f64>>> {
    let ab = mid - start;
    let ac = end - start;
    let normal = ab.cross(&ac);
    let normal_sq = normal.norm_squared();
    if normal_sq <= 1e-18 {
        return Err(GeometryError::Degenerate(
            "arc points are colinear".to_string(),
        ));
    }

    let to_center = (normal.cross(&ab) * ac.norm_squared() + ac.cross(&normal) * ab.norm_squared())
        / (2.0 * normal_sq);
    let center = start + to_center;
    let axis = Unit::new_normalize(normal);

    let from_center = start - center;
    let to_end = end - center;
    let mut sweep = from_center.angle(&to_end);
    if from_center.cross(&to_end).dot(&axis) < 0.0 {
        sweep = 2.0 * PI - sweep;
    }
    if sweep <= 0.0 {
        sweep = 2.0 * PI;
    }

    let segments = segments.max(1);
    Ok((0..=segments)
        .map(|i| {
            let angle = sweep * i as f64 / segments as f64;
            center + Rotation3::from_axis_angle(&axis, angle) * from_center
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadratic_bezier_midpoint() {
        let points = bezier(
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 2.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
            ],
            4,
        );
        assert_eq!(points.len(), 5);
        assert!((points[2] - Point3::new(1.0, 1.0, 0.0)).norm() < 1e-12);
        assert!((points[4] - Point3::new(2.0, 0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_half_circle_arc() {
        let points = arc_through_points(
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
            8,
        )
        .unwrap();
        assert_eq!(points.len(), 9);
        for p in &points {
            assert!((p.coords.norm() - 1.0).abs() < 1e-9);
        }
        assert!((points[4] - Point3::new(0.0, 1.0, 0.0)).norm() < 1e-9);
        assert!((points[8] - Point3::new(-1.0, 0.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn test_colinear_arc_fails() {
        let result = arc_through_points(
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            4,
        );
        assert!(result.is_err());
    }
}
