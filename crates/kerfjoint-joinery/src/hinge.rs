//! Living hinges.
//!
//! A hinge joins two faces that meet around a bend. Its geometry comes from
//! the thickness edges of both faces: their lines cross on the bend axis,
//! the near end points give the inner arc radius and the far ones the outer
//! radius. A chain of hinges is unrolled into one flat part, with a slit
//! pattern cut into every flat connector.

use crate::assembler::assemble_list_element;
use crate::config::JoineryConfig;
use crate::error::{JoineryError, JoineryResult, ParameterError, ParameterResult};
use crate::material::{estimate_thickness, FALLBACK_THICKNESS};
use kerfjoint_geometry::{
    arc_through_points, do_intersection, place_on_face, resolve_frame, Edge, Face, GeometryError,
    Point3, Segment, Solid, Vector3,
};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Slit pattern of the flexure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HingeType {
    /// Columns alternate between `n` and `n + 1` slits.
    #[default]
    Alternate,
}

impl fmt::Display for HingeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HingeType::Alternate => f.write_str("Alternate"),
        }
    }
}

impl FromStr for HingeType {
    type Err = JoineryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Alternate" => Ok(HingeType::Alternate),
            other => Err(JoineryError::UnknownHingeType(other.to_string())),
        }
    }
}

/// Parameters shared by every hinge of a chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalLivingHingeMaterial {
    /// Name of the first panel of the chain.
    pub label: String,
    pub thickness: f64,
    pub laser_beam_diameter: f64,
    /// Slit width.
    pub link_clearance: f64,
    pub hinge_type: HingeType,
    /// Slits in the shorter columns.
    pub alternate_nb_hinge: u32,
    /// Share of the face width covered by slits.
    pub occupancy_ratio: f64,
    pub dog_bone: bool,
    pub generate_solid: bool,
    pub new_name: String,
    pub solid_name: String,
}

impl GlobalLivingHingeMaterial {
    pub fn new(label: impl Into<String>, thickness: f64) -> Self {
        let label = label.into();
        let laser_beam_diameter = thickness / 15.0;
        Self {
            new_name: format!("{label}_flat"),
            solid_name: format!("{label}_solid"),
            label,
            thickness,
            laser_beam_diameter,
            link_clearance: laser_beam_diameter * 3.0,
            hinge_type: HingeType::Alternate,
            alternate_nb_hinge: 2,
            occupancy_ratio: 0.8,
            dog_bone: false,
            generate_solid: true,
        }
    }

    /// Parameters with the thickness measured on the first panel.
    pub fn from_solid(label: impl Into<String>, solid: &Solid) -> Self {
        let label = label.into();
        let thickness = estimate_thickness(solid).unwrap_or_else(|e| {
            tracing::warn!(
                "Unable to estimate thickness of {}: {}, using {}",
                label,
                e,
                FALLBACK_THICKNESS
            );
            FALLBACK_THICKNESS
        });
        Self::new(label, thickness)
    }

    pub fn validate(&self) -> ParameterResult<()> {
        if self.thickness.is_nan() || self.thickness <= 0.0 {
            return Err(ParameterError::InvalidDimensions(format!(
                "hinge thickness must be > 0, got {}",
                self.thickness
            )));
        }
        if self.alternate_nb_hinge == 0 {
            return Err(ParameterError::OutOfRange {
                name: "alternate_nb_hinge".to_string(),
                value: 0.0,
                min: 1.0,
                max: f64::from(u32::MAX),
            });
        }
        if !(self.occupancy_ratio > 0.0 && self.occupancy_ratio <= 1.0) {
            return Err(ParameterError::OutOfRange {
                name: "occupancy_ratio".to_string(),
                value: self.occupancy_ratio,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(())
    }
}

/// Derived bend geometry of one hinge.
#[derive(Debug, Clone, PartialEq)]
pub struct HingeGeometry {
    /// Thickness edge of the first face, far end to near end.
    pub seg_face_1: Segment,
    pub seg_face_2: Segment,
    /// From the outer arc middle point to the inner one.
    pub arc_middle_segment: Segment,
    /// Along the face width, between the two thickness edges.
    pub extrusion_vector: Vector3<f64>,
    pub rad_angle: f64,
    pub deg_angle: f64,
    pub rotation_vector: Vector3<f64>,
    pub arc_length: f64,
    pub arc_inner_radius: f64,
    pub arc_outer_radius: f64,
    pub thickness: f64,
}

/// Shortest edges of a face, the thickness edges of a panel end face.
fn get_thickness_edge(face: &Face) -> JoineryResult<Vec<Edge>> {
    let edges = face.edges()?;
    let shortest = edges
        .iter()
        .map(Edge::length)
        .fold(f64::INFINITY, f64::min);
    let thickness: Vec<Edge> = edges
        .into_iter()
        .filter(|e| (e.length() - shortest).abs() <= 1e-6 * shortest.max(1.0))
        .collect();
    if thickness.len() < 2 {
        return Err(GeometryError::VertexSort(format!(
            "expected two thickness edges, found {}",
            thickness.len()
        ))
        .into());
    }
    Ok(thickness)
}

/// Pairs the first thickness edge of `face1` with the closest thickness edge
/// of `face2`, and returns the face width vector.
pub fn get_coplanar_edge(face1: &Face, face2: &Face) -> JoineryResult<(Edge, Edge, Vector3<f64>)> {
    let edges1 = get_thickness_edge(face1)?;
    let edges2 = get_thickness_edge(face2)?;
    let mid = edges1[0].mid_point();
    let edge2 = if (mid - edges2[1].mid_point()).norm() < (mid - edges2[0].mid_point()).norm() {
        edges2[1]
    } else {
        edges2[0]
    };
    Ok((edges1[0], edge2, edges1[1].mid_point() - edges1[0].mid_point()))
}

/// Orients both edges from their far end to the end points closest to each
/// other.
pub fn get_segment_from_edge(edge1: &Edge, edge2: &Edge) -> (Segment, Segment) {
    let candidates = [
        (edge1.start, edge2.start),
        (edge1.start, edge2.end),
        (edge1.end, edge2.start),
        (edge1.end, edge2.end),
    ];
    let mut best = 0;
    for (i, (p, q)) in candidates.iter().enumerate() {
        let (bp, bq) = candidates[best];
        if (p - q).norm() < (bp - bq).norm() {
            best = i;
        }
    }
    let (near1, near2) = candidates[best];
    let far1 = if near1 == edge1.start { edge1.end } else { edge1.start };
    let far2 = if near2 == edge2.start { edge2.end } else { edge2.start };
    (Segment::new(far1, near1), Segment::new(far2, near2))
}

/// Resolves the bend between two faces.
pub fn complete_hinges_properties(
    face1: &Face,
    face2: &Face,
    reversed_angle: bool,
    arc_radius_epsilon: f64,
) -> JoineryResult<HingeGeometry> {
    let (edge1, edge2, extrusion_vector) = get_coplanar_edge(face1, face2)?;
    let (seg1, seg2) = get_segment_from_edge(&edge1, &edge2);
    let ip = do_intersection(&seg1, &seg2)?;

    let inner_1 = (ip - seg1.b).norm();
    let inner_2 = (ip - seg2.b).norm();
    if (inner_1 - inner_2).abs() > arc_radius_epsilon {
        return Err(JoineryError::NotAnArc { inner_1, inner_2 });
    }
    let inner = inner_1;
    let outer = (ip - seg1.a).norm();
    let mid = (ip - seg1.mid_point()).norm();

    let towards = Point3::from((seg1.b.coords + seg2.b.coords) * 0.5) - ip;
    if towards.norm() <= 1e-12 {
        return Err(GeometryError::Degenerate("hinge faces touch on the bend axis".to_string()).into());
    }
    let direction = towards.normalize();
    let (inner_point, outer_point) = if reversed_angle {
        (ip - direction * inner, ip - direction * outer)
    } else {
        (ip + direction * inner, ip + direction * outer)
    };

    let mut rad_angle = seg1.angle(&seg2);
    let mut rotation_vector = seg1.vector().cross(&seg2.vector());
    if reversed_angle {
        rad_angle = 2.0 * PI - rad_angle;
        rotation_vector = -rotation_vector;
    }

    Ok(HingeGeometry {
        seg_face_1: seg1,
        seg_face_2: seg2,
        arc_middle_segment: Segment::new(outer_point, inner_point),
        extrusion_vector,
        rad_angle,
        deg_angle: rad_angle.to_degrees(),
        rotation_vector,
        arc_length: mid * rad_angle,
        arc_inner_radius: inner,
        arc_outer_radius: outer,
        thickness: seg1.length(),
    })
}

/// Minimum number of links for the bend not to overstrain the material.
pub fn estimate_min_link(rad_angle: f64, thickness: f64, clearance: f64) -> JoineryResult<u32> {
    let ratio = (clearance + thickness) / (2.0 * (thickness * thickness / 2.0).sqrt());
    let per_link = PI / 4.0 - ratio.acos();
    if per_link.is_nan() || per_link <= 0.0 {
        return Err(JoineryError::InvalidParameters(format!(
            "clearance {clearance} is too wide for thickness {thickness}"
        )));
    }
    Ok((rad_angle / per_link).ceil() as u32)
}

/// Reference solid of the bent corner.
pub fn create_solid_corner(geometry: &HingeGeometry, arc_segments: usize) -> JoineryResult<Solid> {
    let seg1 = &geometry.seg_face_1;
    let seg2 = &geometry.seg_face_2;
    let inner = geometry.arc_middle_segment.b;
    let outer = geometry.arc_middle_segment.a;

    let mut profile = vec![seg1.a];
    profile.extend(arc_through_points(seg1.b, inner, seg2.b, arc_segments)?);
    let outer_arc = arc_through_points(seg2.a, outer, seg1.a, arc_segments)?;
    profile.extend(&outer_arc[..outer_arc.len() - 1]);
    Ok(Solid::prism(&profile, geometry.extrusion_vector))
}

/// Slit columns spread over the connector length.
pub fn get_hinges_x_positions(nb_hinges: u32, x_length: f64) -> Vec<f64> {
    if nb_hinges < 2 {
        return vec![0.0];
    }
    let interval = x_length / f64::from(nb_hinges - 1);
    (0..nb_hinges).map(|i| f64::from(i) * interval).collect()
}

/// Slit centers of one column.
pub fn get_hinges_y_positions(nb_holes: u32, hole_length: f64, hole_space: f64) -> Vec<f64> {
    let interval = hole_length + hole_space;
    let half = nb_holes / 2;
    let mut positions = Vec::with_capacity(nb_holes as usize);
    if nb_holes % 2 == 1 {
        positions.push(0.0);
        for i in 0..half {
            let offset = f64::from(i + 1) * interval;
            positions.push(offset);
            positions.push(-offset);
        }
    } else {
        for i in 0..half {
            let offset = f64::from(i) * interval + interval / 2.0;
            positions.push(offset);
            positions.push(-offset);
        }
    }
    positions
}

/// One slit, long along Y and through the thickness twice over. A plain box
/// when the clearance leaves no room for round ends.
pub fn create_hole_hinge(
    clearance: f64,
    hole_length: f64,
    thickness: f64,
    kerf: f64,
    arc_segments: usize,
) -> JoineryResult<Solid> {
    if clearance < kerf {
        return Err(JoineryError::KerfExceedsClearance { kerf, clearance });
    }
    let height = thickness * 2.0;
    let width = (clearance - kerf).max(1e-2);
    if clearance < 2.0 * kerf {
        let length = hole_length - kerf;
        return Ok(Solid::cuboid(
            Point3::new(-width / 2.0, -length / 2.0, -height / 2.0),
            Vector3::new(width, length, height),
        ));
    }

    let half_w = width / 2.0;
    let half_l = (hole_length - width - kerf) / 2.0;
    if half_l <= 0.0 {
        return Err(ParameterError::InvalidDimensions(format!(
            "hinge hole length {hole_length} is shorter than its width {width} plus kerf {kerf}"
        ))
        .into());
    }
    let z = -height / 2.0;
    let p = |x: f64, y: f64| Point3::new(x, y, z);
    let mut profile = arc_through_points(p(-half_w, -half_l), p(0.0, -(half_l + half_w)), p(half_w, -half_l), arc_segments)?;
    profile.extend(arc_through_points(p(half_w, half_l), p(0.0, half_l + half_w), p(-half_w, half_l), arc_segments)?);
    Ok(Solid::prism(&profile, Vector3::new(0.0, 0.0, height)))
}

/// All slits of a hinge, placed on the reference face. Columns run outward
/// from the face over the connector.
pub fn make_hinges(
    geometry: &HingeGeometry,
    nb_link: u32,
    global: &GlobalLivingHingeMaterial,
    reference: &Face,
    config: &JoineryConfig,
) -> JoineryResult<Solid> {
    let y_length = geometry.extrusion_vector.norm();
    let nb_holes = global.alternate_nb_hinge;
    let ratio = global.occupancy_ratio;
    let hole_length = y_length * ratio / f64::from(nb_holes);
    let hole_space = y_length * (1.0 - ratio) / f64::from(nb_holes + 1);
    let short_column = get_hinges_y_positions(nb_holes, hole_length, hole_space);
    let long_column = get_hinges_y_positions(nb_holes + 1, hole_length, hole_space);

    let slit = create_hole_hinge(
        global.link_clearance,
        hole_length,
        geometry.thickness,
        global.laser_beam_diameter,
        config.tessellation.arc_segments,
    )?;
    let mut slits = Vec::new();
    for (index, x) in get_hinges_x_positions(nb_link, geometry.arc_length).into_iter().enumerate() {
        let column = if index % 2 == 0 { &short_column } else { &long_column };
        for &y in column {
            slits.push(slit.translated(Vector3::new(-x, y, 0.0)));
        }
    }

    let frame = resolve_frame(reference)?;
    let slits = Solid::fuse_all(slits.iter());
    Ok(place_on_face(&slits, reference, &frame, 0.0))
}

/// Flat connector covering the unrolled arc, outside the reference face.
pub fn create_flat_connection(geometry: &HingeGeometry, reference: &Face) -> JoineryResult<Solid> {
    let length = geometry.arc_length;
    let width = geometry.extrusion_vector.norm();
    let height = geometry.thickness;
    let connector = Solid::cuboid(
        Point3::new(-length, -width / 2.0, -height / 2.0),
        Vector3::new(length, width, height),
    );
    let frame = resolve_frame(reference)?;
    Ok(place_on_face(&connector, reference, &frame, 0.0))
}

/// One hinge between two panel faces.
#[derive(Debug, Clone)]
pub struct HingeProperties {
    pub name: String,
    pub panel_1: String,
    pub face_index_1: usize,
    pub panel_2: String,
    pub face_index_2: usize,
    pub reversed_angle: bool,
    pub nb_link: u32,
    pub min_links_nb: u32,
    pub geometry: HingeGeometry,
    pub solid_1: Solid,
    pub face_1: Face,
    pub solid_2: Solid,
    pub face_2: Face,
}

impl HingeProperties {
    /// Resolves the hinge between `face_index_1` of the first panel and
    /// `face_index_2` of the second. The link count starts one above the
    /// minimum for `clearance`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        panel_1: &str,
        solid_1: &Solid,
        face_index_1: usize,
        panel_2: &str,
        solid_2: &Solid,
        face_index_2: usize,
        reversed_angle: bool,
        clearance: f64,
        config: &JoineryConfig,
    ) -> JoineryResult<Self> {
        let face_1 = solid_1.face(face_index_1)?;
        let face_2 = solid_2.face(face_index_2)?;
        let geometry = complete_hinges_properties(
            &face_1,
            &face_2,
            reversed_angle,
            config.tolerances.arc_radius_epsilon,
        )?;
        let mut hinge = Self {
            name: format!("{panel_1} -> {panel_2}"),
            panel_1: panel_1.to_string(),
            face_index_1,
            panel_2: panel_2.to_string(),
            face_index_2,
            reversed_angle,
            nb_link: 0,
            min_links_nb: 0,
            geometry,
            solid_1: solid_1.clone(),
            face_1,
            solid_2: solid_2.clone(),
            face_2,
        };
        hinge.compute_min_link(clearance)?;
        Ok(hinge)
    }

    /// Re-estimates the minimum link count for `clearance` and resets the
    /// link count one above it.
    pub fn compute_min_link(&mut self, clearance: f64) -> JoineryResult<()> {
        self.min_links_nb = estimate_min_link(self.geometry.rad_angle, self.geometry.thickness, clearance)?;
        self.nb_link = self.min_links_nb + 1;
        Ok(())
    }
}

/// Result of unrolling a hinge chain.
#[derive(Debug, Clone)]
pub struct LinkedPart {
    pub flat_part: Solid,
    /// Bent reference copy, when requested.
    pub solid: Option<Solid>,
    /// Non-fatal parameter warnings.
    pub warnings: Vec<String>,
}

/// Unrolls a chain of hinges into one flat part.
///
/// Every following panel is rotated by the accumulated bend angle about the
/// first hinge axis and moved onto the end of the previous connector.
pub fn create_linked_part(
    hinges: &[HingeProperties],
    global: &GlobalLivingHingeMaterial,
    config: &JoineryConfig,
) -> JoineryResult<LinkedPart> {
    let first = hinges.first().ok_or(JoineryError::NoHingeDefined)?;
    global.validate()?;

    let kerf = global.laser_beam_diameter;
    let clearance = global.link_clearance;
    if kerf > clearance {
        return Err(JoineryError::KerfExceedsClearance { kerf, clearance });
    }
    let mut warnings = Vec::new();
    if clearance < 2.0 * kerf {
        let message = format!(
            "Link clearance {clearance} is less than twice the laser beam diameter {kerf}: cut lines will be very close"
        );
        tracing::warn!("{}", message);
        warnings.push(message);
    }

    let tolerance = config.tolerances.direction_epsilon;
    let mut parts_to_fuse = vec![first.solid_1.clone()];
    let mut slits_to_remove = Vec::with_capacity(hinges.len());
    let mut last_face = first.face_1.clone();
    let mut sum_angle = 0.0;
    let mut rotation_vector: Option<Vector3<f64>> = None;

    for (index, hinge) in hinges.iter().enumerate() {
        if hinge.nb_link < hinge.min_links_nb {
            let message = format!(
                "Min. link is not respected for living hinge {} ({} < {})",
                hinge.name, hinge.nb_link, hinge.min_links_nb
            );
            tracing::warn!("{}", message);
            warnings.push(message);
        }

        let connection = create_flat_connection(&hinge.geometry, &last_face)?;
        slits_to_remove.push(make_hinges(&hinge.geometry, hinge.nb_link, global, &last_face, config)?);
        last_face = connection.find_same_normal_face(&last_face, tolerance)?;
        parts_to_fuse.push(connection);

        sum_angle += hinge.geometry.deg_angle;
        let axis = *rotation_vector.get_or_insert(hinge.geometry.rotation_vector);
        let center_2 = hinge.face_2.center_of_mass();
        let panel = hinge
            .solid_2
            .rotated(center_2, axis, -sum_angle)
            .translated(last_face.center_of_mass() - center_2);
        if index + 1 < hinges.len() {
            last_face = panel.find_same_normal_face(&last_face, tolerance)?;
        }
        parts_to_fuse.push(panel);
        tracing::debug!("Unrolled {} at {:.3} degrees", hinge.name, sum_angle);
    }

    let mut flat_part = assemble_list_element(&parts_to_fuse).unwrap_or_default();
    for slits in &slits_to_remove {
        flat_part = flat_part.cut(slits);
    }

    let solid = if global.generate_solid {
        let corners = hinges
            .iter()
            .map(|h| create_solid_corner(&h.geometry, config.tessellation.arc_segments))
            .collect::<JoineryResult<Vec<_>>>()?;
        assemble_list_element(&corners)
    } else {
        None
    };

    Ok(LinkedPart {
        flat_part,
        solid,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_link_formula() {
        assert_eq!(estimate_min_link(PI / 2.0, 3.0, 0.6).unwrap(), 7);
        assert_eq!(estimate_min_link(PI / 2.0, 3.0, 0.2).unwrap(), 23);
        assert!(estimate_min_link(PI / 2.0, 3.0, 5.0).is_err());
    }

    #[test]
    fn test_hinge_positions() {
        assert_eq!(get_hinges_x_positions(3, 10.0), vec![0.0, 5.0, 10.0]);
        assert_eq!(get_hinges_y_positions(3, 8.0, 2.0), vec![0.0, 10.0, -10.0]);
        assert_eq!(get_hinges_y_positions(2, 8.0, 2.0), vec![5.0, -5.0]);
    }

    #[test]
    fn test_hole_hinge_shapes() {
        let rounded = create_hole_hinge(0.6, 12.0, 3.0, 0.2, 12).unwrap().bounding_box();
        assert!((rounded.y_length() - 11.8).abs() < 1e-6);
        assert!((rounded.x_length() - 0.4).abs() < 1e-6);
        assert!((rounded.z_length() - 6.0).abs() < 1e-9);

        let plain = create_hole_hinge(0.3, 12.0, 3.0, 0.2, 12).unwrap().bounding_box();
        assert!((plain.y_length() - 11.8).abs() < 1e-9);
        assert!((plain.x_length() - 0.1).abs() < 1e-9);

        assert!(matches!(
            create_hole_hinge(0.1, 12.0, 3.0, 0.2, 12),
            Err(JoineryError::KerfExceedsClearance { .. })
        ));
        assert!(matches!(
            create_hole_hinge(0.6, 0.5, 3.0, 0.2, 12),
            Err(JoineryError::Parameter(ParameterError::InvalidDimensions(_)))
        ));
    }

    #[test]
    fn test_global_defaults() {
        let global = GlobalLivingHingeMaterial::new("strip", 3.0);
        assert!((global.laser_beam_diameter - 0.2).abs() < 1e-12);
        assert!((global.link_clearance - 0.6).abs() < 1e-12);
        assert_eq!(global.new_name, "strip_flat");
        assert_eq!(global.solid_name, "strip_solid");
        assert_eq!(global.alternate_nb_hinge, 2);
        assert!(!global.dog_bone && global.generate_solid);
        assert_eq!("Alternate".parse::<HingeType>().unwrap(), HingeType::Alternate);
        assert!("Spiral".parse::<HingeType>().is_err());
    }

    #[test]
    fn test_empty_chain() {
        let global = GlobalLivingHingeMaterial::new("strip", 3.0);
        let err = create_linked_part(&[], &global, &JoineryConfig::default()).unwrap_err();
        assert_eq!(err.to_string(), "No hinge defined");
    }
}
