//! Boundary-represented solids and the boolean kernel.
//!
//! A [`Solid`] wraps a `csgrs` polygon mesh. Primitives are built directly
//! from planar facets so every face stays exactly planar, which keeps face
//! extraction and frame resolution stable after boolean operations.

use crate::error::{GeometryError, GeometryResult};
use crate::face::{extract_faces, Face, FACE_TOLERANCE};
use crate::polygon::{is_convex, newell_normal, plane_basis, triangulate};
use csgrs::mesh::polygon::Polygon;
use csgrs::mesh::vertex::Vertex;
use csgrs::mesh::Mesh;
use csgrs::traits::CSG;
use nalgebra::{Matrix4, Point3, Rotation3, Translation3, Unit, Vector3};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Axis-aligned bounding box. An empty box has inverted bounds and zero lengths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x_min: f64,
    pub y_min: f64,
    pub z_min: f64,
    pub x_max: f64,
    pub y_max: f64,
    pub z_max: f64,
}

impl BoundingBox {
    pub fn empty() -> Self {
        Self {
            x_min: f64::INFINITY,
            y_min: f64::INFINITY,
            z_min: f64::INFINITY,
            x_max: f64::NEG_INFINITY,
            y_max: f64::NEG_INFINITY,
            z_max: f64::NEG_INFINITY,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x_min > self.x_max
    }

    pub fn include(&mut self, p: &Point3<f64>) {
        self.x_min = self.x_min.min(p.x);
        self.y_min = self.y_min.min(p.y);
        self.z_min = self.z_min.min(p.z);
        self.x_max = self.x_max.max(p.x);
        self.y_max = self.y_max.max(p.y);
        self.z_max = self.z_max.max(p.z);
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let mut merged = *self;
        merged.include(&other.min());
        merged.include(&other.max());
        merged
    }

    pub fn x_length(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.x_max - self.x_min
        }
    }

    pub fn y_length(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.y_max - self.y_min
        }
    }

    pub fn z_length(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.z_max - self.z_min
        }
    }

    pub fn min(&self) -> Point3<f64> {
        Point3::new(self.x_min, self.y_min, self.z_min)
    }

    pub fn max(&self) -> Point3<f64> {
        Point3::new(self.x_max, self.y_max, self.z_max)
    }

    pub fn center(&self) -> Point3<f64> {
        Point3::from((self.min().coords + self.max().coords) * 0.5)
    }

    /// True when the two boxes overlap, touching included.
    pub fn intersects(&self, other: &BoundingBox, tolerance: f64) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x_min <= other.x_max + tolerance
            && other.x_min <= self.x_max + tolerance
            && self.y_min <= other.y_max + tolerance
            && other.y_min <= self.y_max + tolerance
            && self.z_min <= other.z_max + tolerance
            && other.z_min <= self.z_max + tolerance
    }
}

/// Sphere probe used to ask whether material is present next to a point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Probe {
    /// Distance from the query point to the probe center along the direction.
    pub offset: f64,
    pub radius: f64,
    /// Minimum intersection volume counted as material.
    pub threshold: f64,
    pub slices: usize,
    pub stacks: usize,
}

impl Default for Probe {
    fn default() -> Self {
        Self {
            offset: 0.1,
            radius: 0.04,
            threshold: 1e-5,
            slices: 8,
            stacks: 4,
        }
    }
}

/// A closed polyhedral solid.
#[derive(Debug, Clone)]
pub struct Solid {
    mesh: Mesh<()>,
}

impl Default for Solid {
    fn default() -> Self {
        Self::empty()
    }
}

fn make_polygon(points: &[Point3<f64>]) -> Option<Polygon<()>> {
    if points.len() < 3 {
        return None;
    }
    let normal = newell_normal(points);
    if normal.norm() <= 1e-12 {
        return None;
    }
    let unit = normal.normalize();
    let vertices = points.iter().map(|p| Vertex::new(*p, unit)).collect();
    Some(Polygon::new(vertices, None))
}

fn push_cap(facets: &mut Vec<Vec<Point3<f64>>>, cap: Vec<Point3<f64>>) {
    if is_convex(&cap) {
        facets.push(cap);
    } else {
        for [a, b, c] in triangulate(&cap) {
            facets.push(vec![cap[a], cap[b], cap[c]]);
        }
    }
}

impl Solid {
    pub fn empty() -> Self {
        Self {
            mesh: Mesh::from_polygons(&[], None),
        }
    }

    /// Builds a solid from outward-oriented planar facets. Degenerate facets
    /// are skipped.
    pub fn from_facets(facets: &[Vec<Point3<f64>>]) -> Self {
        let polygons: Vec<Polygon<()>> = facets.iter().filter_map(|f| make_polygon(f)).collect();
        Self {
            mesh: Mesh::from_polygons(&polygons, None),
        }
    }

    /// Extrudes a planar profile along `direction`. The profile may be given in
    /// either winding and may be concave.
    pub fn prism(profile: &[Point3<f64>], direction: Vector3<f64>) -> Self {
        let mut base: Vec<Point3<f64>> = profile.to_vec();
        if base.len() > 1 && base.first().zip(base.last()).is_some_and(|(a, b)| (a - b).norm() < 1e-12) {
            base.pop();
        }
        if base.len() < 3 || direction.norm() <= 1e-12 {
            tracing::debug!("Skipping degenerate prism with {} points", base.len());
            return Self::empty();
        }
        let normal = newell_normal(&base);
        if normal.norm() <= 1e-12 {
            tracing::debug!("Skipping prism with zero-area profile");
            return Self::empty();
        }
        if normal.dot(&direction) < 0.0 {
            base.reverse();
        }

        let top: Vec<Point3<f64>> = base.iter().map(|p| p + direction).collect();
        let count = base.len();
        let mut facets = Vec::with_capacity(count + 2);
        push_cap(&mut facets, base.iter().rev().copied().collect());
        push_cap(&mut facets, top.clone());
        for i in 0..count {
            let j = (i + 1) % count;
            facets.push(vec![base[i], base[j], top[j], top[i]]);
        }
        Self::from_facets(&facets)
    }

    /// Axis-aligned box spanning `origin` to `origin + size`.
    pub fn cuboid(origin: Point3<f64>, size: Vector3<f64>) -> Self {
        let base = [
            origin,
            origin + Vector3::new(size.x, 0.0, 0.0),
            origin + Vector3::new(size.x, size.y, 0.0),
            origin + Vector3::new(0.0, size.y, 0.0),
        ];
        Self::prism(&base, Vector3::new(0.0, 0.0, size.z))
    }

    /// Polygonal cylinder whose base disc is centered on `base_center` and
    /// whose axis vector carries the height.
    pub fn cylinder(
        base_center: Point3<f64>,
        axis: Vector3<f64>,
        radius: f64,
        segments: usize,
    ) -> Self {
        if axis.norm() <= 1e-12 || radius <= 0.0 {
            return Self::empty();
        }
        let segments = segments.max(3);
        let (u, v) = plane_basis(&axis);
        let circle: Vec<Point3<f64>> = (0..segments)
            .map(|i| {
                let angle = 2.0 * PI * i as f64 / segments as f64;
                base_center + (u * angle.cos() + v * angle.sin()) * radius
            })
            .collect();
        Self::prism(&circle, axis)
    }

    pub fn sphere(center: Point3<f64>, radius: f64, slices: usize, stacks: usize) -> Self {
        if radius <= 0.0 {
            return Self::empty();
        }
        let slices = slices.max(3);
        let stacks = stacks.max(2);
        let vertex = |i: usize, j: usize| {
            let theta = 2.0 * PI * i as f64 / slices as f64;
            let phi = PI * j as f64 / stacks as f64;
            center
                + Vector3::new(
                    theta.cos() * phi.sin(),
                    theta.sin() * phi.sin(),
                    phi.cos(),
                ) * radius
        };

        let mut facets = Vec::with_capacity(slices * stacks);
        for i in 0..slices {
            for j in 0..stacks {
                let mut facet = vec![vertex(i, j)];
                if j > 0 {
                    facet.push(vertex(i + 1, j));
                }
                if j < stacks - 1 {
                    facet.push(vertex(i + 1, j + 1));
                }
                facet.push(vertex(i, j + 1));
                let centroid = facet.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords)
                    / facet.len() as f64;
                if newell_normal(&facet).dot(&(centroid - center.coords)) < 0.0 {
                    facet.reverse();
                }
                facets.push(facet);
            }
        }
        Self::from_facets(&facets)
    }

    pub fn is_empty(&self) -> bool {
        self.mesh.polygons.is_empty()
    }

    /// Planar facets of the boundary, outward oriented.
    pub fn facets(&self) -> Vec<Vec<Point3<f64>>> {
        self.mesh
            .polygons
            .iter()
            .map(|polygon| polygon.vertices.iter().map(|v| v.pos).collect())
            .collect()
    }

    pub fn fuse(&self, other: &Solid) -> Solid {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }
        Solid {
            mesh: self.mesh.union(&other.mesh),
        }
    }

    pub fn cut(&self, other: &Solid) -> Solid {
        if self.is_empty()
            || other.is_empty()
            || !self.bounding_box().intersects(&other.bounding_box(), 1e-9)
        {
            return self.clone();
        }
        Solid {
            mesh: self.mesh.difference(&other.mesh),
        }
    }

    pub fn common(&self, other: &Solid) -> Solid {
        if self.is_empty()
            || other.is_empty()
            || !self.bounding_box().intersects(&other.bounding_box(), 1e-9)
        {
            return Solid::empty();
        }
        Solid {
            mesh: self.mesh.intersection(&other.mesh),
        }
    }

    /// Groups several solids without any boolean evaluation.
    pub fn compound<'a>(solids: impl IntoIterator<Item = &'a Solid>) -> Solid {
        let polygons: Vec<Polygon<()>> = solids
            .into_iter()
            .flat_map(|s| s.mesh.polygons.iter().cloned())
            .collect();
        Solid {
            mesh: Mesh::from_polygons(&polygons, None),
        }
    }

    /// Fuses every solid of the iterator, left to right.
    pub fn fuse_all<'a>(solids: impl IntoIterator<Item = &'a Solid>) -> Solid {
        solids
            .into_iter()
            .fold(Solid::empty(), |acc, solid| acc.fuse(solid))
    }

    pub fn transformed(&self, matrix: &Matrix4<f64>) -> Solid {
        Solid {
            mesh: self.mesh.transform(matrix),
        }
    }

    pub fn translated(&self, offset: Vector3<f64>) -> Solid {
        self.transformed(&Translation3::from(offset).to_homogeneous())
    }

    /// Rotation about an axis through `center`, angle in degrees.
    pub fn rotated(&self, center: Point3<f64>, axis: Vector3<f64>, degrees: f64) -> Solid {
        if axis.norm() <= 1e-12 {
            return self.clone();
        }
        let rotation = Rotation3::from_axis_angle(&Unit::new_normalize(axis), degrees.to_radians());
        let matrix = Translation3::from(center.coords).to_homogeneous()
            * rotation.to_homogeneous()
            * Translation3::from(-center.coords).to_homogeneous();
        self.transformed(&matrix)
    }

    /// Enclosed volume from the divergence theorem over fan triangles.
    pub fn volume(&self) -> f64 {
        let mut volume = 0.0;
        for polygon in &self.mesh.polygons {
            let vertices = &polygon.vertices;
            if vertices.len() < 3 {
                continue;
            }
            let origin = vertices[0].pos.coords;
            for i in 1..vertices.len() - 1 {
                let b = vertices[i].pos.coords;
                let c = vertices[i + 1].pos.coords;
                volume += origin.dot(&b.cross(&c));
            }
        }
        volume / 6.0
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let mut bbox = BoundingBox::empty();
        for polygon in &self.mesh.polygons {
            for vertex in &polygon.vertices {
                bbox.include(&vertex.pos);
            }
        }
        bbox
    }

    /// Planar faces of the solid, coplanar facets merged.
    pub fn faces(&self) -> Vec<Face> {
        extract_faces(&self.facets(), FACE_TOLERANCE)
    }

    pub fn face(&self, index: usize) -> GeometryResult<Face> {
        let faces = self.faces();
        let count = faces.len();
        faces
            .into_iter()
            .nth(index)
            .ok_or(GeometryError::FaceIndex { index, count })
    }

    /// Face with the same normal and area as `reference`.
    pub fn find_same_normal_face(&self, reference: &Face, tolerance: f64) -> GeometryResult<Face> {
        self.faces()
            .into_iter()
            .find(|face| {
                (face.normal() - reference.normal()).norm() < tolerance
                    && (face.area() - reference.area()).abs() < tolerance.max(1e-6) * reference.area().max(1.0)
            })
            .ok_or(GeometryError::FaceNotFound)
    }

    /// Asks whether material exists just beyond `point` in `direction`.
    pub fn is_material_at(&self, point: Point3<f64>, direction: Vector3<f64>, probe: &Probe) -> bool {
        if direction.norm() <= 1e-12 {
            return false;
        }
        let center = point + direction.normalize() * probe.offset;
        let sphere = Solid::sphere(center, probe.radius, probe.slices, probe.stacks);
        self.common(&sphere).volume() > probe.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_cube() -> Solid {
        Solid::cuboid(Point3::origin(), Vector3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_cuboid_volume_and_bbox() {
        let solid = Solid::cuboid(Point3::new(1.0, 2.0, 3.0), Vector3::new(10.0, 20.0, 3.0));
        assert!((solid.volume() - 600.0).abs() < 1e-9);
        let bbox = solid.bounding_box();
        assert!((bbox.x_length() - 10.0).abs() < 1e-12);
        assert!((bbox.y_length() - 20.0).abs() < 1e-12);
        assert!((bbox.z_min - 3.0).abs() < 1e-12);
        assert_eq!(solid.faces().len(), 6);
    }

    #[test]
    fn test_prism_accepts_either_winding() {
        let profile = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
            Point3::new(2.0, 2.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        let solid = Solid::prism(&profile, Vector3::new(0.0, 0.0, 1.5));
        assert!((solid.volume() - 6.0).abs() < 1e-9);
        let down = Solid::prism(&profile, Vector3::new(0.0, 0.0, -1.5));
        assert!((down.volume() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_concave_prism_volume() {
        let profile = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        ];
        let solid = Solid::prism(&profile, Vector3::new(0.0, 0.0, 2.0));
        assert!((solid.volume() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_boolean_operations() {
        let a = unit_cube();
        let b = unit_cube().translated(Vector3::new(0.5, 0.0, 0.0));
        assert!((a.fuse(&b).volume() - 1.5).abs() < 1e-6);
        assert!((a.cut(&b).volume() - 0.5).abs() < 1e-6);
        assert!((a.common(&b).volume() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_disjoint_common_is_empty() {
        let a = unit_cube();
        let b = unit_cube().translated(Vector3::new(5.0, 0.0, 0.0));
        assert!(a.common(&b).is_empty());
        assert!((a.cut(&b).volume() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rotated_about_center() {
        let solid = Solid::cuboid(Point3::origin(), Vector3::new(4.0, 2.0, 1.0));
        let rotated = solid.rotated(Point3::origin(), Vector3::z(), 90.0);
        let bbox = rotated.bounding_box();
        assert!((bbox.x_length() - 2.0).abs() < 1e-9);
        assert!((bbox.y_length() - 4.0).abs() < 1e-9);
        assert!((rotated.volume() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_material_probe() {
        let solid = unit_cube();
        let probe = Probe::default();
        assert!(solid.is_material_at(Point3::new(0.5, 0.5, 1.0), -Vector3::z(), &probe));
        assert!(!solid.is_material_at(Point3::new(0.5, 0.5, 1.0), Vector3::z(), &probe));
    }

    #[test]
    fn test_face_index_out_of_range() {
        let err = unit_cube().face(12).unwrap_err();
        assert_eq!(err, GeometryError::FaceIndex { index: 12, count: 6 });
    }

    #[test]
    fn test_empty_bbox() {
        let bbox = Solid::empty().bounding_box();
        assert!(bbox.is_empty());
        assert_eq!(bbox.x_length(), 0.0);
    }
}
