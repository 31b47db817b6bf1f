//! Regular polygon box with rounded corners.
//!
//! The walls are flat panels standing on the sides of a regular polygon. The
//! gaps between neighbouring walls are meant to be bridged by living hinges,
//! so the top and bottom plates follow the walls with an arc at every corner.

use crate::boxes::{BoxPart, PlatePosition};
use crate::error::{JoineryError, JoineryResult};
use kerfjoint_geometry::{arc_through_points, do_intersection, Point3, Segment, Solid, Vector3};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Polygon box dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundedBoxProperties {
    pub nb_face: u32,
    /// Distance from the center to the inner side of the walls.
    pub inradius: f64,
    pub height: f64,
    pub side_length: f64,
    pub max_side_length: f64,
    pub thickness: f64,
    /// Number of walls split in two halves.
    pub cut: u32,
}

impl Default for RoundedBoxProperties {
    fn default() -> Self {
        let mut properties = Self {
            nb_face: 5,
            inradius: 50.0,
            height: 30.0,
            side_length: 0.0,
            max_side_length: 0.0,
            thickness: 3.0,
            cut: 0,
        };
        properties.compute_information(true);
        properties
    }
}

impl RoundedBoxProperties {
    /// Derives the largest wall length that leaves room for a corner, and
    /// resets the wall length to three quarters of it when asked or when it
    /// no longer fits.
    pub fn compute_information(&mut self, update_side_length: bool) {
        let n = f64::from(self.nb_face.max(3));
        let circumradius = self.inradius / (PI / n).cos();
        let max_side_length = 2.0 * circumradius * (PI / n).sin();
        self.max_side_length = ((max_side_length - 0.01) * 100.0).round() / 100.0;
        if update_side_length || self.side_length >= self.max_side_length {
            self.side_length = (self.max_side_length * 0.75).floor();
        }
        if self.cut > self.nb_face {
            self.cut = self.nb_face;
        }
    }
}

/// Top or bottom plate of a rounded box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopBottomRoundedProperties {
    pub position: PlatePosition,
    pub height_shift: f64,
    /// Extra radius of an outside plate.
    pub radius_outside: f64,
}

impl Default for TopBottomRoundedProperties {
    fn default() -> Self {
        Self {
            position: PlatePosition::Inside,
            height_shift: 0.0,
            radius_outside: 0.0,
        }
    }
}

/// Wall boundaries: for every side the segments at both wall ends, each from
/// the outer corner to the inner one.
fn create_contours(radius: f64, nb_face: u32, side_length: f64, thickness: f64) -> Vec<(Segment, Segment)> {
    let step = 360.0 / f64::from(nb_face);
    let half = side_length / 2.0;
    let seg_a = Segment::new(Point3::new(thickness, -half, 0.0), Point3::new(0.0, -half, 0.0));
    let seg_b = Segment::new(Point3::new(thickness, half, 0.0), Point3::new(0.0, half, 0.0));
    (0..nb_face)
        .map(|index| {
            let angle = step * f64::from(index);
            let offset = Segment::new(Point3::origin(), Point3::new(radius, 0.0, 0.0))
                .rotate_z(angle)
                .b
                .coords;
            (
                seg_a.rotate_z(angle).translated(offset),
                seg_b.rotate_z(angle).translated(offset),
            )
        })
        .collect()
}

/// Corner arcs between consecutive walls, from the outer middle point to the
/// inner one.
fn retrieve_segments_arc(contours: &[(Segment, Segment)]) -> JoineryResult<Vec<Segment>> {
    let count = contours.len();
    (0..count)
        .map(|index| {
            let first = contours[index].1;
            let second = contours[(index + 1) % count].0;
            let ip = do_intersection(&first, &second)?;
            let inner = (ip - first.b).norm();
            let outer = (ip - first.a).norm();
            let direction = (Point3::from((first.b.coords + second.b.coords) * 0.5) - ip).normalize();
            Ok(Segment::new(ip + direction * outer, ip + direction * inner))
        })
        .collect()
}

/// Closed plate outline following either the inner or the outer wall side.
fn plate_outline(
    contours: &[(Segment, Segment)],
    arcs: &[Segment],
    outer: bool,
    arc_segments: usize,
) -> JoineryResult<Vec<Point3<f64>>> {
    let count = contours.len();
    let pick = |s: &Segment| if outer { s.a } else { s.b };
    let mut outline = Vec::new();
    for index in 0..count {
        let (first, second) = &contours[index];
        let next = &contours[(index + 1) % count].0;
        let middle = if outer { arcs[index].a } else { arcs[index].b };
        outline.push(pick(first));
        let arc = arc_through_points(pick(second), middle, pick(next), arc_segments)?;
        outline.extend(&arc[..arc.len() - 1]);
    }
    Ok(outline)
}

fn create_plane_part(
    dimensions: &RoundedBoxProperties,
    plate: &TopBottomRoundedProperties,
    arc_segments: usize,
) -> JoineryResult<Solid> {
    let outer = plate.position == PlatePosition::Outside;
    let (radius, side_length) = if outer {
        let radius = dimensions.inradius + plate.radius_outside;
        (radius, dimensions.side_length * radius / dimensions.inradius)
    } else {
        (dimensions.inradius, dimensions.side_length)
    };
    let contours = create_contours(radius, dimensions.nb_face, side_length, dimensions.thickness);
    let arcs = retrieve_segments_arc(&contours)?;
    let outline = plate_outline(&contours, &arcs, outer, arc_segments)?;
    Ok(Solid::prism(&outline, Vector3::new(0.0, 0.0, dimensions.thickness)))
}

/// First index of each of `parts` nearly equal chunks of `0..count`.
fn chunk_starts(count: u32, parts: u32) -> Vec<u32> {
    if parts == 0 {
        return Vec::new();
    }
    let step = f64::from(count) / f64::from(parts);
    let mut starts = Vec::new();
    let mut last = 0.0;
    while last < f64::from(count) {
        starts.push(last as u32);
        last += step;
    }
    starts
}

fn extrude_quad(points: [Point3<f64>; 4], height: f64) -> Solid {
    Solid::prism(&points, Vector3::new(0.0, 0.0, height)).translated(Vector3::new(0.0, 0.0, -height / 2.0))
}

fn create_sides(contours: &[(Segment, Segment)], height: f64, cut: u32) -> Vec<BoxPart> {
    let cut_indices = chunk_starts(contours.len() as u32, cut);
    let mut parts = Vec::new();
    for (index, (seg_a, seg_b)) in contours.iter().enumerate() {
        if !cut_indices.contains(&(index as u32)) {
            parts.push(BoxPart {
                name: format!("side_face_{index}"),
                solid: extrude_quad([seg_a.a, seg_b.a, seg_b.b, seg_a.b], height),
            });
            continue;
        }
        let mid_outer = Point3::from((seg_a.a.coords + seg_b.a.coords) * 0.5);
        let mid_inner = Point3::from((seg_a.b.coords + seg_b.b.coords) * 0.5);
        parts.push(BoxPart {
            name: format!("side_face_{index}_a"),
            solid: extrude_quad([seg_a.a, mid_outer, mid_inner, seg_a.b], height),
        });
        parts.push(BoxPart {
            name: format!("side_face_{index}_b"),
            solid: extrude_quad([mid_outer, seg_b.a, seg_b.b, mid_inner], height),
        });
    }
    parts
}

/// Bottom plate, top plate, then the walls in polygon order.
pub fn make_rounded_box(
    dimensions: &RoundedBoxProperties,
    top: &TopBottomRoundedProperties,
    bottom: &TopBottomRoundedProperties,
    arc_segments: usize,
) -> JoineryResult<Vec<BoxPart>> {
    if dimensions.nb_face < 3 {
        return Err(JoineryError::InvalidParameters(format!(
            "a rounded box needs at least 3 faces, got {}",
            dimensions.nb_face
        )));
    }
    if dimensions.side_length >= dimensions.max_side_length {
        return Err(JoineryError::InvalidParameters(
            "Side length is bigger than its maximum".to_string(),
        ));
    }
    if dimensions.cut > dimensions.nb_face {
        return Err(JoineryError::InvalidParameters(
            "Number of cut is bigger than number of face".to_string(),
        ));
    }
    let half_height = dimensions.height / 2.0;
    let thickness = dimensions.thickness;

    let bottom_z = match bottom.position {
        PlatePosition::Inside => -half_height + bottom.height_shift,
        PlatePosition::Outside => -half_height - thickness,
    };
    let top_z = match top.position {
        PlatePosition::Inside => half_height - thickness - top.height_shift,
        PlatePosition::Outside => half_height,
    };
    let mut parts = vec![
        BoxPart {
            name: "bottom_face".to_string(),
            solid: create_plane_part(dimensions, bottom, arc_segments)?
                .translated(Vector3::new(0.0, 0.0, bottom_z)),
        },
        BoxPart {
            name: "top_face".to_string(),
            solid: create_plane_part(dimensions, top, arc_segments)?
                .translated(Vector3::new(0.0, 0.0, top_z)),
        },
    ];

    let contours = create_contours(dimensions.inradius, dimensions.nb_face, dimensions.side_length, thickness);
    parts.extend(create_sides(&contours, dimensions.height, dimensions.cut));
    tracing::debug!(
        "Rounded box with {} faces of {} gives {} parts",
        dimensions.nb_face,
        dimensions.side_length,
        parts.len()
    );
    Ok(parts)
}
