//! Planar polygon helpers shared by the solid builder and the face analysis.
//!
//! Polygons are plain point loops without a closing duplicate. Orientation
//! follows the right-hand rule around the Newell normal.

use nalgebra::{Point3, Vector3};

/// Newell normal of a planar loop. Its length is twice the loop area.
pub fn newell_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    let mut normal = Vector3::zeros();
    let count = points.len();
    for i in 0..count {
        let current = points[i];
        let next = points[(i + 1) % count];
        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }
    normal
}

/// Unsigned area of a planar loop.
pub fn polygon_area(points: &[Point3<f64>]) -> f64 {
    newell_normal(points).norm() * 0.5
}

/// Area-weighted centroid of a planar loop.
pub fn polygon_centroid(points: &[Point3<f64>]) -> Point3<f64> {
    if points.is_empty() {
        return Point3::origin();
    }
    let normal = newell_normal(points);
    let unit = if normal.norm() > f64::EPSILON {
        normal.normalize()
    } else {
        return mean_point(points);
    };

    let origin = points[0];
    let mut weighted = Vector3::zeros();
    let mut total = 0.0;
    for i in 1..points.len().saturating_sub(1) {
        let a = points[i] - origin;
        let b = points[i + 1] - origin;
        let area = a.cross(&b).dot(&unit) * 0.5;
        weighted += (a + b) / 3.0 * area;
        total += area;
    }
    if total.abs() < f64::EPSILON {
        return mean_point(points);
    }
    origin + weighted / total
}

fn mean_point(points: &[Point3<f64>]) -> Point3<f64> {
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Point3::from(sum / points.len() as f64)
}

/// Two unit vectors spanning the plane orthogonal to `normal`, such that
/// `u × v` points along `normal`.
pub fn plane_basis(normal: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    let n = normal.normalize();
    let helper = if n.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let u = helper.cross(&n).normalize();
    let v = n.cross(&u);
    (u, v)
}

fn project(points: &[Point3<f64>], normal: &Vector3<f64>) -> Vec<(f64, f64)> {
    let (u, v) = plane_basis(normal);
    points
        .iter()
        .map(|p| (p.coords.dot(&u), p.coords.dot(&v)))
        .collect()
}

fn cross_2d(o: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
}

/// True when every corner turns the same way around the loop normal.
pub fn is_convex(points: &[Point3<f64>]) -> bool {
    let count = points.len();
    if count < 4 {
        return true;
    }
    let normal = newell_normal(points);
    if normal.norm() <= f64::EPSILON {
        return false;
    }
    let projected = project(points, &normal);
    (0..count).all(|i| {
        let prev = projected[(i + count - 1) % count];
        let current = projected[i];
        let next = projected[(i + 1) % count];
        cross_2d(prev, current, next) >= -1e-12
    })
}

fn point_in_triangle(p: (f64, f64), a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> bool {
    let d1 = cross_2d(a, b, p);
    let d2 = cross_2d(b, c, p);
    let d3 = cross_2d(c, a, p);
    d1 > 1e-12 && d2 > 1e-12 && d3 > 1e-12
}

/// Ear-clipping triangulation of a simple planar loop. Returns index triples
/// that keep the orientation of the input loop.
pub fn triangulate(points: &[Point3<f64>]) -> Vec<[usize; 3]> {
    let count = points.len();
    if count < 3 {
        return Vec::new();
    }
    let normal = newell_normal(points);
    if normal.norm() <= f64::EPSILON {
        return Vec::new();
    }
    let projected = project(points, &normal);

    let mut remaining: Vec<usize> = (0..count).collect();
    let mut triangles = Vec::with_capacity(count - 2);
    let mut guard = 0;
    while remaining.len() > 3 && guard < count * count {
        guard += 1;
        let n = remaining.len();
        let mut clipped = false;
        for i in 0..n {
            let ia = remaining[(i + n - 1) % n];
            let ib = remaining[i];
            let ic = remaining[(i + 1) % n];
            let (a, b, c) = (projected[ia], projected[ib], projected[ic]);
            if cross_2d(a, b, c) <= 1e-12 {
                continue;
            }
            let blocked = remaining
                .iter()
                .filter(|&&k| k != ia && k != ib && k != ic)
                .any(|&k| point_in_triangle(projected[k], a, b, c));
            if blocked {
                continue;
            }
            triangles.push([ia, ib, ic]);
            remaining.remove(i);
            clipped = true;
            break;
        }
        if !clipped {
            break;
        }
    }

    // Whatever is left (a final triangle, or a degenerate remainder) is fanned.
    for i in 1..remaining.len().saturating_sub(1) {
        triangles.push([remaining[0], remaining[i], remaining[i + 1]]);
    }
    triangles
}

/// Drops repeated points and corners whose adjacent edges are colinear.
///
/// Returns a new loop and leaves the input untouched.
pub fn merge_colinear(points: &[Point3<f64>], tolerance: f64) -> Vec<Point3<f64>> {
    let mut current: Vec<Point3<f64>> = Vec::with_capacity(points.len());
    for p in points {
        if current
            .last()
            .is_none_or(|last: &Point3<f64>| (p - last).norm() > tolerance)
        {
            current.push(*p);
        }
    }
    while current.len() > 1
        && current
            .first()
            .zip(current.last())
            .is_some_and(|(first, last)| (first - last).norm() <= tolerance)
    {
        current.pop();
    }

    loop {
        let count = current.len();
        if count < 3 {
            return current;
        }
        let removable = (0..count).find(|&i| {
            let prev = current[(i + count - 1) % count];
            let here = current[i];
            let next = current[(i + 1) % count];
            let incoming = here - prev;
            let outgoing = next - here;
            let scale = incoming.norm() * outgoing.norm();
            scale <= f64::EPSILON || incoming.cross(&outgoing).norm() <= tolerance * scale
        });
        match removable {
            Some(index) => {
                current.remove(index);
            }
            None => return current,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 2.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        ]
    }

    #[test]
    fn test_newell_normal_and_area() {
        let normal = newell_normal(&square());
        assert!((normal - Vector3::new(0.0, 0.0, 8.0)).norm() < 1e-12);
        assert!((polygon_area(&square()) - 4.0).abs() < 1e-12);
        let centroid = polygon_centroid(&square());
        assert!((centroid - Point3::new(1.0, 1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_merge_colinear_removes_midpoints() {
        let mut points = square();
        points.insert(1, Point3::new(1.0, 0.0, 0.0));
        points.insert(3, Point3::new(2.0, 1.0, 0.0));
        points.push(Point3::new(0.0, 0.0, 0.0));
        let merged = merge_colinear(&points, 1e-9);
        assert_eq!(merged.len(), 4);
        assert_eq!(points.len(), 7);
    }

    #[test]
    fn test_triangulate_concave_loop() {
        // L-shaped hexagon
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        ];
        assert!(!is_convex(&points));
        let triangles = triangulate(&points);
        assert_eq!(triangles.len(), 4);
        let area: f64 = triangles
            .iter()
            .map(|t| polygon_area(&[points[t[0]], points[t[1]], points[t[2]]]))
            .sum();
        assert!((area - 3.0).abs() < 1e-12);
    }
}
