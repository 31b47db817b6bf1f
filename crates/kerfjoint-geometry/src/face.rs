//! Planar faces recovered from a solid's facets.
//!
//! Boolean operations split faces into many convex facets. This module merges
//! coplanar facets back into faces and rebuilds their boundary loops so the
//! rest of the engine can reason about whole panel faces.

use crate::error::{GeometryError, GeometryResult};
use crate::polygon::{merge_colinear, newell_normal, polygon_area, polygon_centroid};
use nalgebra::{Point3, Vector3};
use std::collections::HashMap;

/// Tolerance used to merge coplanar facets and to match vertices.
pub const FACE_TOLERANCE: f64 = 1e-5;

/// A straight boundary edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub start: Point3<f64>,
    pub end: Point3<f64>,
}

impl Edge {
    pub fn new(start: Point3<f64>, end: Point3<f64>) -> Self {
        Self { start, end }
    }

    pub fn vector(&self) -> Vector3<f64> {
        self.end - self.start
    }

    pub fn length(&self) -> f64 {
        self.vector().norm()
    }

    pub fn mid_point(&self) -> Point3<f64> {
        Point3::from((self.start.coords + self.end.coords) * 0.5)
    }
}

/// A planar face: coplanar facets sharing an outward normal.
#[derive(Debug, Clone)]
pub struct Face {
    normal: Vector3<f64>,
    offset: f64,
    facets: Vec<Vec<Point3<f64>>>,
    area: f64,
    center: Point3<f64>,
}

impl Face {
    /// Builds a face from facets that are known to be coplanar.
    pub fn from_facets(normal: Vector3<f64>, facets: Vec<Vec<Point3<f64>>>) -> Self {
        let normal = normal.normalize();
        let mut area = 0.0;
        let mut weighted = Vector3::zeros();
        for facet in &facets {
            let facet_area = polygon_area(facet);
            area += facet_area;
            weighted += polygon_centroid(facet).coords * facet_area;
        }
        let center = if area > 0.0 {
            Point3::from(weighted / area)
        } else {
            Point3::origin()
        };
        let offset = facets
            .first()
            .and_then(|f| f.first())
            .map(|p| p.coords.dot(&normal))
            .unwrap_or(0.0);
        Self {
            normal,
            offset,
            facets,
            area,
            center,
        }
    }

    /// Unit outward normal.
    pub fn normal(&self) -> Vector3<f64> {
        self.normal
    }

    /// Signed distance of the face plane from the origin along the normal.
    pub fn plane_offset(&self) -> f64 {
        self.offset
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn center_of_mass(&self) -> Point3<f64> {
        self.center
    }

    pub fn facets(&self) -> &[Vec<Point3<f64>>] {
        &self.facets
    }

    /// Closed boundary loops of the merged face. Interior edges shared by two
    /// facets cancel out, T-junctions are split first.
    pub fn boundary_loops(&self) -> GeometryResult<Vec<Vec<Point3<f64>>>> {
        let tolerance = FACE_TOLERANCE;
        let mut vertices: Vec<Point3<f64>> = Vec::new();
        let mut index_of = |p: &Point3<f64>| -> usize {
            if let Some(index) = vertices.iter().position(|v| (v - p).norm() <= tolerance) {
                index
            } else {
                vertices.push(*p);
                vertices.len() - 1
            }
        };

        let mut loops_idx: Vec<Vec<usize>> = Vec::with_capacity(self.facets.len());
        for facet in &self.facets {
            let mut indices: Vec<usize> = Vec::with_capacity(facet.len());
            for p in facet {
                let index = index_of(p);
                if indices.last() != Some(&index) {
                    indices.push(index);
                }
            }
            if indices.len() > 1 && indices.first() == indices.last() {
                indices.pop();
            }
            if indices.len() >= 3 {
                loops_idx.push(indices);
            }
        }

        let mut directed: Vec<(usize, usize)> = Vec::new();
        for indices in &loops_idx {
            let count = indices.len();
            for i in 0..count {
                let a = indices[i];
                let b = indices[(i + 1) % count];
                let start = vertices[a];
                let span = vertices[b] - start;
                let length_sq = span.norm_squared();
                let mut inner: Vec<(f64, usize)> = vertices
                    .iter()
                    .enumerate()
                    .filter(|(k, _)| *k != a && *k != b)
                    .filter_map(|(k, p)| {
                        let t = (p - start).dot(&span) / length_sq;
                        let foot = start + span * t;
                        let inside = t > 0.0 && t < 1.0 && (p - foot).norm() <= tolerance;
                        inside.then_some((t, k))
                    })
                    .collect();
                inner.sort_by(|x, y| x.0.total_cmp(&y.0));
                let mut previous = a;
                for (_, k) in inner {
                    directed.push((previous, k));
                    previous = k;
                }
                directed.push((previous, b));
            }
        }

        let mut net: HashMap<(usize, usize), i32> = HashMap::new();
        for &(a, b) in &directed {
            let reverse = net.get(&(b, a)).copied().unwrap_or(0);
            if reverse > 0 {
                net.insert((b, a), reverse - 1);
            } else {
                *net.entry((a, b)).or_insert(0) += 1;
            }
        }
        let mut boundary: Vec<(usize, usize)> = Vec::new();
        for &(a, b) in &directed {
            if let Some(count) = net.get_mut(&(a, b)) {
                if *count > 0 {
                    *count -= 1;
                    boundary.push((a, b));
                }
            }
        }

        let mut used = vec![false; boundary.len()];
        let mut loops = Vec::new();
        for first in 0..boundary.len() {
            if used[first] {
                continue;
            }
            used[first] = true;
            let start = boundary[first].0;
            let mut current = boundary[first];
            let mut points = vec![vertices[start]];
            while current.1 != start {
                let next = (0..boundary.len()).find(|&k| !used[k] && boundary[k].0 == current.1);
                match next {
                    Some(k) => {
                        used[k] = true;
                        points.push(vertices[current.1]);
                        current = boundary[k];
                    }
                    None => {
                        return Err(GeometryError::VertexSort(format!(
                            "open boundary at ({:.4}, {:.4}, {:.4})",
                            vertices[current.1].x, vertices[current.1].y, vertices[current.1].z
                        )))
                    }
                }
            }
            loops.push(points);
        }

        if loops.is_empty() {
            return Err(GeometryError::VertexSort("face has no boundary".to_string()));
        }
        Ok(loops)
    }

    /// Outer boundary loop with colinear points merged.
    pub fn outer_loop(&self) -> GeometryResult<Vec<Point3<f64>>> {
        let loops = self.boundary_loops()?;
        let outer = loops
            .into_iter()
            .max_by(|a, b| {
                let area_a = newell_normal(a).dot(&self.normal);
                let area_b = newell_normal(b).dot(&self.normal);
                area_a.total_cmp(&area_b)
            })
            .ok_or_else(|| GeometryError::VertexSort("face has no boundary".to_string()))?;
        let merged = merge_colinear(&outer, 1e-9);
        if merged.len() < 3 {
            return Err(GeometryError::VertexSort(format!(
                "outer loop collapsed to {} points",
                merged.len()
            )));
        }
        Ok(merged)
    }

    /// Edges of the outer loop, in loop order.
    pub fn edges(&self) -> GeometryResult<Vec<Edge>> {
        let points = self.outer_loop()?;
        let count = points.len();
        Ok((0..count)
            .map(|i| Edge::new(points[i], points[(i + 1) % count]))
            .collect())
    }
}

/// Merges coplanar facets (same normal, same plane offset) into faces.
pub fn extract_faces(facets: &[Vec<Point3<f64>>], tolerance: f64) -> Vec<Face> {
    let mut groups: Vec<(Vector3<f64>, f64, Vec<Vec<Point3<f64>>>)> = Vec::new();
    for facet in facets {
        let normal = newell_normal(facet);
        if normal.norm() <= 1e-12 {
            continue;
        }
        let normal = normal.normalize();
        let offset = facet[0].coords.dot(&normal);
        match groups
            .iter_mut()
            .find(|(n, d, _)| (n - normal).norm() < tolerance && (d - offset).abs() < tolerance)
        {
            Some((_, _, members)) => members.push(facet.clone()),
            None => groups.push((normal, offset, vec![facet.clone()])),
        }
    }
    groups
        .into_iter()
        .map(|(normal, _, members)| Face::from_facets(normal, members))
        .collect()
}

/// Faces sharing a direction (either sign), biggest face first.
#[derive(Debug, Clone)]
pub struct FaceGroup {
    pub direction: Vector3<f64>,
    pub area: f64,
    pub faces: Vec<Face>,
}

/// Groups faces by parallel normal. Groups are sorted by ascending total area;
/// ties keep discovery order.
pub fn group_faces_by_direction(faces: &[Face], tolerance: f64) -> Vec<FaceGroup> {
    let mut groups: Vec<FaceGroup> = Vec::new();
    for face in faces {
        let normal = face.normal();
        match groups
            .iter_mut()
            .find(|g| g.direction.cross(&normal).norm() < tolerance)
        {
            Some(group) => {
                group.area += face.area();
                group.faces.push(face.clone());
            }
            None => groups.push(FaceGroup {
                direction: normal,
                area: face.area(),
                faces: vec![face.clone()],
            }),
        }
    }
    for group in &mut groups {
        group.faces.sort_by(|a, b| b.area().total_cmp(&a.area()));
    }
    groups.sort_by(|a, b| a.area.total_cmp(&b.area));
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solid::Solid;

    #[test]
    fn test_cube_faces_have_four_edges() {
        let solid = Solid::cuboid(Point3::origin(), Vector3::new(4.0, 2.0, 1.0));
        for face in solid.faces() {
            let edges = face.edges().unwrap();
            assert_eq!(edges.len(), 4);
        }
    }

    #[test]
    fn test_face_merges_split_facets() {
        let a = Solid::cuboid(Point3::origin(), Vector3::new(2.0, 1.0, 1.0));
        let b = Solid::cuboid(Point3::new(0.5, 0.25, 0.5), Vector3::new(1.0, 0.5, 1.0));
        let cut = a.cut(&b);
        let top = cut
            .faces()
            .into_iter()
            .find(|f| (f.normal() - Vector3::z()).norm() < 1e-9 && (f.plane_offset() - 1.0).abs() < 1e-9)
            .unwrap();
        assert!((top.area() - 1.5).abs() < 1e-6);
        let loops = top.boundary_loops().unwrap();
        assert_eq!(loops.len(), 2);
        assert_eq!(top.outer_loop().unwrap().len(), 4);
    }

    #[test]
    fn test_group_faces_by_direction() {
        let solid = Solid::cuboid(Point3::origin(), Vector3::new(10.0, 20.0, 3.0));
        let groups = group_faces_by_direction(&solid.faces(), 1e-6);
        assert_eq!(groups.len(), 3);
        // smallest pair first: the 10 x 3 ends
        assert!((groups[0].area - 60.0).abs() < 1e-9);
        assert!((groups[2].area - 400.0).abs() < 1e-9);
        assert_eq!(groups[2].faces.len(), 2);
    }

    #[test]
    fn test_edge_helpers() {
        let edge = Edge::new(Point3::origin(), Point3::new(2.0, 0.0, 0.0));
        assert_eq!(edge.length(), 2.0);
        assert_eq!(edge.mid_point(), Point3::new(1.0, 0.0, 0.0));
    }
}
