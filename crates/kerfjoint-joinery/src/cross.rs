//! Cross joints between panels crossing at right angles.
//!
//! Two panels whose overlap is a rectangular box get complementary notches:
//! each panel loses half of the overlap height, so they slide into each
//! other. The pair configuration is found by probing material beyond the two
//! smallest faces of the overlap.
//!
//! ```text
//!            Y (width of the first panel)
//!            |
//!            |
//!            |Z (height of the overlap)
//!            ---------------------------> X (width of the second panel)
//! ```

use crate::assembler::{MaterialElement, PanelMaterial};
use crate::config::JoineryConfig;
use crate::error::{JoineryError, JoineryResult};
use crate::material::{MaterialProperties, NodeType};
use kerfjoint_geometry::{
    arc_through_points, axes_rotation, group_faces_by_direction, Face, FaceGroup, Matrix4,
    Point3, Probe, Solid, Vector3,
};
use nalgebra::Translation3;
use std::fmt;

/// How two crossing panels sit relative to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossCase {
    /// Both panels span the whole overlap height.
    SameHeight,
    FirstAbove,
    SecondAbove,
    /// The second reference face is the common base, the second panel is higher.
    SecondBaseSecondHigher,
    SecondBaseFirstHigher,
    FirstBaseFirstHigher,
    FirstBaseSecondHigher,
}

impl CrossCase {
    /// Flips which half of the overlap each panel loses.
    pub fn invert_y(self) -> bool {
        matches!(
            self,
            CrossCase::SecondAbove | CrossCase::SecondBaseFirstHigher | CrossCase::FirstBaseSecondHigher
        )
    }
}

impl fmt::Display for CrossCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            CrossCase::SameHeight => "same height parts",
            CrossCase::FirstAbove => "first part is above the second",
            CrossCase::SecondAbove => "second part is above the first",
            CrossCase::SecondBaseSecondHigher => "second face is common base, second part is higher",
            CrossCase::SecondBaseFirstHigher => "second face is common base, first part is higher",
            CrossCase::FirstBaseFirstHigher => "first face is common base, first part is higher",
            CrossCase::FirstBaseSecondHigher => "first face is common base, second part is higher",
        };
        f.write_str(text)
    }
}

/// Classified overlap of two panels.
#[derive(Debug, Clone)]
pub struct CrossClassification {
    pub case: CrossCase,
    /// The two smallest faces of the overlap, bigger first.
    pub reference_faces: [Face; 2],
    /// Local axes of the overlap, see the module diagram.
    pub axes: (Vector3<f64>, Vector3<f64>, Vector3<f64>),
}

impl CrossClassification {
    /// Half the distance between the reference faces.
    pub fn height(&self) -> f64 {
        (self.reference_faces[0].center_of_mass() - self.reference_faces[1].center_of_mass()).norm()
            / 2.0
    }
}

fn is_inside(face: &Face, solid: &Solid, probe: &Probe) -> bool {
    solid.is_material_at(face.center_of_mass(), face.normal(), probe)
}

/// X points out of the middle face when that face leads into `shape`,
/// otherwise Y does.
pub fn retrieve_face_axis(
    groups: &[FaceGroup],
    shape: &Solid,
    probe: &Probe,
) -> JoineryResult<(Vector3<f64>, Vector3<f64>, Vector3<f64>)> {
    let first_face = |index: usize| {
        groups
            .get(index)
            .and_then(|g| g.faces.first())
            .ok_or_else(|| JoineryError::NotRectangularIntersection("face groups".to_string()))
    };
    let test_face = first_face(2)?;
    let z_axis = first_face(0)?.normal();
    if is_inside(test_face, shape, probe) {
        let x_axis = test_face.normal();
        Ok((x_axis, z_axis.cross(&x_axis), z_axis))
    } else {
        let y_axis = test_face.normal();
        Ok((y_axis.cross(&z_axis), y_axis, z_axis))
    }
}

/// Classifies the overlap of two panels. `None` when they do not overlap.
pub fn classify(
    first: &PanelMaterial,
    second: &PanelMaterial,
    config: &JoineryConfig,
) -> JoineryResult<Option<CrossClassification>> {
    let intersection = first.solid.common(&second.solid);
    if intersection.volume() <= config.tolerances.intersection_volume {
        return Ok(None);
    }
    let names = format!("{} -> {}", first.name, second.name);
    let groups = group_faces_by_direction(&intersection.faces(), config.tolerances.direction_epsilon);
    if groups.len() != 3 || groups[0].faces.len() < 2 {
        return Err(JoineryError::NotRectangularIntersection(names));
    }

    let face1 = groups[0].faces[0].clone();
    let face2 = groups[0].faces[1].clone();
    let axes = retrieve_face_axis(&groups, &first.solid, &config.probe)?;

    let probe = &config.probe;
    let flags = (
        is_inside(&face1, &first.solid, probe),
        is_inside(&face2, &first.solid, probe),
        is_inside(&face1, &second.solid, probe),
        is_inside(&face2, &second.solid, probe),
    );
    let case = match flags {
        (false, false, true, true) | (true, true, false, false) => {
            return Err(JoineryError::PartIncluded(names))
        }
        (false, false, false, false) => CrossCase::SameHeight,
        (false, true, true, false) => CrossCase::FirstAbove,
        (true, false, false, true) => CrossCase::SecondAbove,
        (false, false, true, false) => CrossCase::SecondBaseSecondHigher,
        (true, false, false, false) => CrossCase::SecondBaseFirstHigher,
        (false, true, false, false) => CrossCase::FirstBaseFirstHigher,
        (false, false, false, true) => CrossCase::FirstBaseSecondHigher,
        _ => return Err(JoineryError::NotManaged(names)),
    };
    tracing::debug!("{} : {}", names, case);

    Ok(Some(CrossClassification {
        case,
        reference_faces: [face1, face2],
        axes,
    }))
}

/// Box spanning x in [-length/2, length/2], y in [-width/2, width/2] and
/// z in [-height, 0].
fn make_cross_box(length: f64, width: f64, height: f64) -> Solid {
    Solid::cuboid(
        Point3::new(-length / 2.0, -width / 2.0, -height),
        Vector3::new(length, width, height),
    )
}

/// Half disc of chord `height` bulging by `bulge` along `direction`, placed
/// on the chord center and extruded along `extrude` over `span`.
fn make_node(
    center: Point3<f64>,
    bulge: Vector3<f64>,
    height: f64,
    extrude: Vector3<f64>,
    span: f64,
    segments: usize,
) -> JoineryResult<Solid> {
    let base = center - extrude * (span / 2.0);
    let top = base + Vector3::new(0.0, 0.0, height / 2.0);
    let bottom = base - Vector3::new(0.0, 0.0, height / 2.0);
    let mut profile = arc_through_points(bottom, base + bulge, top, segments)?;
    profile.pop();
    profile.insert(0, top);
    Ok(Solid::prism(&profile, extrude * span))
}

/// Node centers along Z and chord heights for a notch of `height`.
fn node_layout(node_type: NodeType, height: f64) -> Vec<(f64, f64)> {
    let middle = -height / 2.0;
    let offset = (0.08 + 0.125) * height;
    match node_type {
        NodeType::NoNode => Vec::new(),
        NodeType::SingleShort => vec![(middle, height / 4.0)],
        NodeType::SingleLong => vec![(middle, height / 2.0)],
        NodeType::DualShort => vec![(middle + offset, height / 4.0), (middle - offset, height / 4.0)],
    }
}

/// Cuts strength nodes into both side walls of a notch. `along_x` puts the
/// walls at x = ±length/2, otherwise at y = ±width/2.
fn make_nodes(
    shape: Solid,
    length: f64,
    width: f64,
    height: f64,
    properties: &MaterialProperties,
    along_x: bool,
    segments: usize,
) -> JoineryResult<Solid> {
    if properties.node_thickness <= 1e-9 {
        return Ok(shape);
    }
    let mut shape = shape;
    for (z, chord) in node_layout(properties.node_type, height) {
        for side in [-1.0, 1.0] {
            let node = if along_x {
                make_node(
                    Point3::new(side * length / 2.0, 0.0, z),
                    Vector3::new(-side * properties.node_thickness, 0.0, 0.0),
                    chord,
                    Vector3::y(),
                    width,
                    segments,
                )?
            } else {
                make_node(
                    Point3::new(0.0, side * width / 2.0, z),
                    Vector3::new(0.0, -side * properties.node_thickness, 0.0),
                    chord,
                    Vector3::x(),
                    length,
                    segments,
                )?
            };
            shape = shape.cut(&node);
        }
    }
    Ok(shape)
}

/// Relief cylinders on the notch corners, at the open top (`up`) or at the
/// bottom.
#[allow(clippy::too_many_arguments)]
fn make_dog_bones(
    shape: Solid,
    length: f64,
    width: f64,
    height: f64,
    radius: f64,
    up: bool,
    along_x: bool,
    segments: usize,
) -> Solid {
    let shift = radius / 2.0;
    let z = if up { -shift } else { -height + shift };
    let bones = [-1.0, 1.0].map(|side| {
        if along_x {
            Solid::cylinder(
                Point3::new(side * (length / 2.0 - shift), -width / 2.0, z),
                Vector3::new(0.0, width, 0.0),
                radius,
                segments,
            )
        } else {
            Solid::cylinder(
                Point3::new(-length / 2.0, side * (width / 2.0 - shift), z),
                Vector3::new(length, 0.0, 0.0),
                radius,
                segments,
            )
        }
    });
    bones.iter().fold(shape, |acc, bone| acc.fuse(bone))
}

/// Notch cuts for a classified pair, returned as (cut for the first panel,
/// cut for the second panel) in world coordinates.
pub fn remove_intersections(
    first: &MaterialProperties,
    second: &MaterialProperties,
    classification: &CrossClassification,
    config: &JoineryConfig,
) -> JoineryResult<(Solid, Solid)> {
    let invert = classification.case.invert_y();
    let height = classification.height();
    let segments = config.tessellation.cylinder_segments;
    let arc_segments = config.tessellation.arc_segments;
    let down = Vector3::new(0.0, 0.0, -height);

    let first_x = second.thickness + second.thickness_tolerance - second.laser_beam_diameter
        + second.hole_width_tolerance;
    let mut first_box = make_cross_box(first_x, first.thickness, height);
    first_box = make_nodes(first_box, first_x, first.thickness, height, first, true, arc_segments)?;
    let radius = first_x.min(height) * 2.0 / 30.0;
    if invert {
        if first.dog_bone {
            first_box = make_dog_bones(first_box, first_x, first.thickness, height, radius, true, true, segments);
        }
        first_box = first_box.translated(down);
    } else if first.dog_bone {
        first_box = make_dog_bones(first_box, first_x, first.thickness, height, radius, false, true, segments);
    }

    let second_y = first.thickness + first.thickness_tolerance - first.laser_beam_diameter
        + first.hole_width_tolerance;
    let mut second_box = make_cross_box(second.thickness, second_y, height);
    second_box = make_nodes(second_box, second.thickness, second_y, height, second, false, arc_segments)?;
    let radius = second_y.min(height) * 2.0 / 30.0;
    if !invert {
        if second.dog_bone {
            second_box = make_dog_bones(second_box, second.thickness, second_y, height, radius, true, false, segments);
        }
        second_box = second_box.translated(down);
    } else if second.dog_bone {
        second_box = make_dog_bones(second_box, second.thickness, second_y, height, radius, false, false, segments);
    }

    let (x, y, z) = classification.axes;
    let rotation = axes_rotation(&x.normalize(), &y.normalize(), &z.normalize());
    let center = classification.reference_faces[0].center_of_mass();
    let placement: Matrix4<f64> =
        Translation3::from(center.coords).to_homogeneous() * rotation.to_homogeneous();

    Ok((first_box.transformed(&placement), second_box.transformed(&placement)))
}

/// Notches every overlapping pair of panels, pairs taken in input order.
pub fn make_cross_parts(
    parts: Vec<PanelMaterial>,
    config: &JoineryConfig,
) -> JoineryResult<Vec<MaterialElement>> {
    for part in &parts {
        part.properties.validate()?;
    }
    let mut elements: Vec<MaterialElement> = parts.into_iter().map(MaterialElement::new).collect();
    for i in 0..elements.len() {
        for j in i + 1..elements.len() {
            let Some(classification) = classify(&elements[i].panel, &elements[j].panel, config)? else {
                continue;
            };
            let (first_cut, second_cut) = remove_intersections(
                elements[i].properties(),
                elements[j].properties(),
                &classification,
                config,
            )?;
            elements[i].remove(first_cut);
            elements[j].remove(second_cut);
        }
    }
    Ok(elements)
}
