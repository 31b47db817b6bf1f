//! Flex joints: a rounded clip tab at one end of the face and a grooved tab
//! with a relief slot at the other end.
//!
//! Profiles are drawn in the face-local frame with the hook protruding
//! towards negative X, out of the tab panel, and extruded over the tab panel
//! thickness.

use crate::assembler::MaterialElement;
use crate::config::JoineryConfig;
use crate::error::JoineryResult;
use crate::features::{hole_on_plane, transform_feature};
use crate::material::MaterialProperties;
use crate::tab::TabProperties;
use kerfjoint_geometry::{arc_through_points, bezier, Point3, Solid, Vector3};

/// Closed outline assembled from lines and sampled curves.
struct Outline {
    points: Vec<Point3<f64>>,
    z: f64,
}

impl Outline {
    fn start(x: f64, y: f64, z: f64) -> Self {
        Self {
            points: vec![Point3::new(x, y, z)],
            z,
        }
    }

    fn push(&mut self, p: Point3<f64>) {
        if self.points.last().is_none_or(|last| (last - p).norm() > 1e-9) {
            self.points.push(p);
        }
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.push(Point3::new(x, y, self.z));
    }

    /// Bézier from the current point through the given poles.
    fn bezier_to(&mut self, poles: &[(f64, f64)], samples: usize) {
        let Some(&current) = self.points.last() else {
            return;
        };
        let mut control = vec![current];
        control.extend(poles.iter().map(|&(x, y)| Point3::new(x, y, self.z)));
        for p in bezier(&control, samples).into_iter().skip(1) {
            self.push(p);
        }
    }

    fn arc_to(&mut self, mid: (f64, f64), end: (f64, f64), segments: usize) -> JoineryResult<()> {
        let Some(&current) = self.points.last() else {
            return Ok(());
        };
        let arc = arc_through_points(
            current,
            Point3::new(mid.0, mid.1, self.z),
            Point3::new(end.0, end.1, self.z),
            segments,
        )?;
        for p in arc.into_iter().skip(1) {
            self.push(p);
        }
        Ok(())
    }

    /// Mirrors across the YZ plane and extrudes down by `height`.
    fn extrude_mirrored(mut self, height: f64) -> Solid {
        if self.points.len() > 1
            && self
                .points
                .first()
                .zip(self.points.last())
                .is_some_and(|(a, b)| (a - b).norm() < 1e-9)
        {
            self.points.pop();
        }
        let mirrored: Vec<Point3<f64>> = self
            .points
            .iter()
            .map(|p| Point3::new(-p.x, p.y, p.z))
            .collect();
        Solid::prism(&mirrored, Vector3::new(0.0, 0.0, -height))
    }
}

/// Rounded clip tab.
pub fn make_rounded_shape(
    face_material: &MaterialProperties,
    plane_material: &MaterialProperties,
    width: f64,
    pos_y: f64,
    config: &JoineryConfig,
) -> Solid {
    let samples = config.tessellation.bezier_samples;
    let height = face_material.thickness;
    let hw = (width + face_material.laser_beam_diameter) / 2.0;
    let th = plane_material.thickness + plane_material.thickness_tolerance;

    let mut outline = Outline::start(0.0, -hw, height / 2.0);
    outline.line_to(0.3 * th, -hw);
    outline.bezier_to(&[(0.9 * th, -hw), (0.9 * th, 0.0)], samples);
    outline.bezier_to(
        &[(0.9 * th, hw / 4.0), (1.6 * th, hw / 4.0), (1.6 * th, hw / 2.0)],
        samples,
    );
    outline.line_to(1.6 * th, hw);
    outline.bezier_to(&[(1.6 * th, 1.2 * hw), (1.04 * th, 1.2 * hw)], samples);
    outline.line_to(th, hw);
    outline.line_to(0.0, hw);
    outline
        .extrude_mirrored(height)
        .translated(Vector3::new(0.0, pos_y, 0.0))
}

/// Grooved tab, the flexible half of the joint.
pub fn make_rounded_shape_for_groove(
    face_material: &MaterialProperties,
    plane_material: &MaterialProperties,
    width: f64,
    pos_y: f64,
    config: &JoineryConfig,
) -> Solid {
    let samples = config.tessellation.bezier_samples;
    let height = face_material.thickness;
    let hw = (width + face_material.laser_beam_diameter) / 2.0;
    let th = plane_material.thickness + plane_material.thickness_tolerance;

    let mut outline = Outline::start(0.0, -hw, height / 2.0);
    outline.line_to(th, -hw);
    outline.line_to(1.04 * th, -1.15 * hw);
    outline.line_to(1.4 * th, -1.15 * hw);
    outline.bezier_to(&[(1.6 * th, -hw / 4.0), (th, hw / 4.0)], samples);
    outline.line_to(th, 0.7 * hw);
    outline.bezier_to(&[(th, hw), (0.7 * th, hw)], samples);
    outline.line_to(0.0, hw);
    outline
        .extrude_mirrored(height)
        .translated(Vector3::new(0.0, pos_y, 0.0))
}

/// Curved relief slot cut through the groove tab and into the tab panel.
pub fn make_flex_slot(
    face_material: &MaterialProperties,
    plane_material: &MaterialProperties,
    width: f64,
    pos_y: f64,
    config: &JoineryConfig,
) -> JoineryResult<Solid> {
    let samples = config.tessellation.bezier_samples;
    let height = face_material.thickness;
    let corrected_width = width + face_material.laser_beam_diameter;

    let x_start = (plane_material.thickness + plane_material.thickness_tolerance) * 2.0;
    let y_start = width / 5.0;
    let x_length = 1.8 * corrected_width;
    let y_length = 0.6 * corrected_width;
    let half_groove = 0.15 * corrected_width / 2.0;

    let p2 = (-x_length / 12.0, y_start);
    let cp1 = (-x_length / 6.0, y_start);
    let cp2 = (-x_length / 2.0, y_start - y_length);
    let p3 = (-x_length, y_start - y_length / 2.0);
    let shift = |p: (f64, f64), dy: f64| (p.0, p.1 + dy);

    // the end cap bulges along z x (rp3 - lp3), that is towards -X
    let cap = (p3.0 - half_groove, p3.1);

    let mut outline = Outline::start(x_start, y_start - half_groove, height / 2.0);
    let lp2 = shift(p2, -half_groove);
    outline.line_to(lp2.0, lp2.1);
    outline.bezier_to(
        &[shift(cp1, -half_groove), shift(cp2, -half_groove), shift(p3, -half_groove)],
        samples,
    );
    outline.arc_to(cap, shift(p3, half_groove), config.tessellation.arc_segments)?;
    outline.bezier_to(
        &[shift(cp2, half_groove), shift(cp1, half_groove), shift(p2, half_groove)],
        samples,
    );
    outline.line_to(x_start, y_start + half_groove);
    Ok(outline
        .extrude_mirrored(height)
        .translated(Vector3::new(0.0, pos_y, 0.0)))
}

/// Synthesizes both halves of a flex joint. Each half goes to the first
/// other panel it meets.
pub fn make_flex_tab_join(
    tab: &TabProperties,
    tab_index: usize,
    others: &[usize],
    elements: &mut [MaterialElement],
    config: &JoineryConfig,
) -> JoineryResult<()> {
    let face_material = elements[tab_index].properties().clone();
    let width = tab.params.tabs_width;
    let placement = tab.oriented_placement(0.0);
    let mirror = if tab.params.y_invert { -1.0 } else { 1.0 };

    let mut round_done = false;
    for &other in others {
        let plane = &elements[other].panel;
        let y = tab.y_length / 2.0 - plane.thickness() - width / 2.0;
        let shape = make_rounded_shape(&face_material, &plane.properties, width, y, config)
            .transformed(&placement);
        if plane.solid.common(&shape).volume() > config.tolerances.intersection_volume {
            let hole = hole_on_plane(
                tab,
                width,
                mirror * y,
                &face_material,
                plane,
                true,
                true,
                tab.params.dog_bone,
                config,
            );
            let hole = transform_feature(&hole, tab, plane.thickness());
            elements[tab_index].add(shape);
            elements[other].remove(hole);
            round_done = true;
            break;
        }
    }
    if !round_done {
        tracing::debug!("No panel meets the rounded flex tab of {}", tab.name());
    }

    let mut groove_done = false;
    for &other in others {
        let plane = &elements[other].panel;
        let y = -(tab.y_length / 2.0 - plane.thickness() - width / 2.0);
        let shape = make_rounded_shape_for_groove(&face_material, &plane.properties, width, y, config)
            .transformed(&placement);
        if plane.solid.common(&shape).volume() > config.tolerances.intersection_volume {
            let slot = make_flex_slot(&face_material, &plane.properties, width, y, config)?
                .transformed(&placement);
            let hole = hole_on_plane(
                tab,
                width,
                mirror * y,
                &face_material,
                plane,
                true,
                true,
                tab.params.dog_bone,
                config,
            );
            let hole = transform_feature(&hole, tab, plane.thickness());
            elements[tab_index].add(shape);
            elements[tab_index].remove(slot);
            elements[other].remove(hole);
            groove_done = true;
            break;
        }
    }
    if !groove_done {
        tracing::debug!("No panel meets the grooved flex tab of {}", tab.name());
    }
    Ok(())
}
