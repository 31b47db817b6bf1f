//! Parametric joinery features in the face-local frame.
//!
//! ```text
//!            X (length, into the tab panel)
//!            |
//!            |
//!            |Z (height, tab panel thickness)
//!            ---------------------------> Y (width, along the face)
//! ```
//!
//! Every builder returns a solid centered on the local origin. Callers move
//! it onto the tab face with [`transform_feature`], which puts the origin at
//! half the opposing panel thickness outside the face.

use crate::assembler::PanelMaterial;
use crate::config::JoineryConfig;
use crate::material::MaterialProperties;
use crate::screw::ScrewNutSpec;
use crate::tab::TabProperties;
use kerfjoint_geometry::{Point3, Solid, Vector3};

/// Which sides of a hole along Z have opposing material beyond the tab panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ZLimits {
    /// Material under the tab panel (negative Z).
    pub below: bool,
    /// Material over the tab panel (positive Z).
    pub above: bool,
}

pub fn dog_bone_radius(width: f64, height: f64) -> f64 {
    width.min(height) * 2.0 / 30.0
}

/// Relief cylinder along X, centered on x = 0.
pub fn dog_bone_along_x(y: f64, z: f64, length: f64, radius: f64, segments: usize) -> Solid {
    Solid::cylinder(
        Point3::new(-length / 2.0, y, z),
        Vector3::new(length, 0.0, 0.0),
        radius,
        segments,
    )
}

/// Relief cylinder along Z, centered on z = 0.
pub fn dog_bone_along_z(x: f64, y: f64, height: f64, radius: f64, segments: usize) -> Solid {
    Solid::cylinder(
        Point3::new(x, y, -height / 2.0),
        Vector3::new(0.0, 0.0, height),
        radius,
        segments,
    )
}

/// Width and center offset after adding (`sign = 1`) or removing
/// (`sign = -1`) kerf on the requested sides.
fn kerf_corrected(width: f64, kerf: f64, left: bool, right: bool, sign: f64) -> (f64, f64) {
    match (left, right) {
        (true, true) => {
            let w = width + sign * kerf;
            (w, w / 2.0)
        }
        (true, false) => {
            let w = width + sign * kerf / 2.0;
            (w, (w + sign * kerf / 2.0) / 2.0)
        }
        (false, true) => {
            let w = width + sign * kerf / 2.0;
            (w, (w - sign * kerf / 2.0) / 2.0)
        }
        (false, false) => (width, width / 2.0),
    }
}

/// Tab added on the face panel. Kerf is added on the sides that face other
/// material.
pub fn tab_on_face(
    face_material: &MaterialProperties,
    plane_material: &MaterialProperties,
    width: f64,
    pos_y: f64,
    left_kerf: bool,
    right_kerf: bool,
) -> Solid {
    let length = plane_material.thickness;
    let height = face_material.thickness;
    let (width, center) = kerf_corrected(
        width,
        face_material.laser_beam_diameter,
        left_kerf,
        right_kerf,
        1.0,
    );
    Solid::cuboid(
        Point3::new(-length / 2.0, pos_y - center, -height / 2.0),
        Vector3::new(length, width, height),
    )
}

/// Moves a local feature onto the tab face, origin at half the opposing
/// panel thickness.
pub fn transform_feature(feature: &Solid, tab: &TabProperties, plane_thickness: f64) -> Solid {
    tab.place(feature, plane_thickness / 2.0)
}

/// Places `feature` and tells whether it overlaps `plane` by more than the
/// intersection threshold.
pub fn check_intersect(
    feature: &Solid,
    tab: &TabProperties,
    plane: &PanelMaterial,
    config: &JoineryConfig,
) -> (bool, Solid) {
    let placed = transform_feature(feature, tab, plane.thickness());
    let volume = plane.solid.common(&placed).volume();
    (volume > config.tolerances.intersection_volume, placed)
}

/// Probes the opposing panel just beyond both Z sides of the tab panel.
pub fn check_limit_z(
    tab: &TabProperties,
    width: f64,
    pos_y: f64,
    face_material: &MaterialProperties,
    plane: &PanelMaterial,
    config: &JoineryConfig,
) -> ZLimits {
    let size = Vector3::new(plane.thickness() / 2.0, width / 2.0, 0.1);
    let x = -size.x - 0.005;
    let y = pos_y - size.y / 2.0;
    let half = face_material.thickness / 2.0;

    let below = Solid::cuboid(Point3::new(x, y, -size.z - half), size);
    let above = Solid::cuboid(Point3::new(x, y, half), size);
    ZLimits {
        below: check_intersect(&below, tab, plane, config).0,
        above: check_intersect(&above, tab, plane, config).0,
    }
}

/// Hole cut in the opposing panel for a tab. Kerf is removed from the width
/// on the requested sides and from the height where the probes found
/// material; dog-bones go on the corners next to that material.
#[allow(clippy::too_many_arguments)]
pub fn hole_on_plane(
    tab: &TabProperties,
    width: f64,
    pos_y: f64,
    face_material: &MaterialProperties,
    plane: &PanelMaterial,
    left_kerf: bool,
    right_kerf: bool,
    dog_bone: bool,
    config: &JoineryConfig,
) -> Solid {
    let limits = check_limit_z(tab, width, pos_y, face_material, plane, config);
    let kerf = plane.properties.laser_beam_diameter;
    let length = plane.thickness();

    let (width, width_center) = kerf_corrected(width, kerf, left_kerf, right_kerf, -1.0);
    let height = face_material.thickness + face_material.thickness_tolerance;
    let (height, height_center) = match (limits.below, limits.above) {
        (true, true) => (height - kerf, (height - kerf) / 2.0),
        (true, false) => {
            let h = height - kerf / 2.0;
            (h, (h - kerf / 2.0) / 2.0)
        }
        (false, true) => {
            let h = height - kerf / 2.0;
            (h, (h + kerf / 2.0) / 2.0)
        }
        (false, false) => (height, height / 2.0),
    };

    let y_min = pos_y - width_center;
    let z_min = -height_center;
    let hole = Solid::cuboid(
        Point3::new(-length / 2.0, y_min, z_min),
        Vector3::new(length, width, height),
    );
    if !dog_bone {
        return hole;
    }

    let radius = dog_bone_radius(width, height);
    let inset = radius / 2.0;
    let segments = config.tessellation.cylinder_segments;
    let (y_max, z_max) = (y_min + width, z_min + height);
    let mut corners = Vec::new();
    if limits.below {
        corners.push((y_min + inset, z_min + inset));
        corners.push((y_max - inset, z_min + inset));
    }
    if limits.above {
        corners.push((y_min + inset, z_max - inset));
        corners.push((y_max - inset, z_max - inset));
    }
    corners.into_iter().fold(hole, |acc, (y, z)| {
        acc.fuse(&dog_bone_along_x(y, z, length, radius, segments))
    })
}

/// Screw channel and nut pocket cut in the tab panel.
pub fn screw_way_on_face(
    face_material: &MaterialProperties,
    plane_material: &MaterialProperties,
    screw_nut: &ScrewNutSpec,
    screw_length_tolerance: f64,
    pos_y: f64,
    dog_bone: bool,
    config: &JoineryConfig,
) -> Solid {
    let kerf = face_material.laser_beam_diameter;
    let start = plane_material.thickness / 2.0;
    let channel_length = screw_nut.screw_length - plane_material.thickness
        + plane_material.thickness_tolerance
        + screw_length_tolerance;
    let channel_width = screw_nut.screw_diameter * 1.2 - kerf;
    let height = face_material.thickness;
    let channel = Solid::cuboid(
        Point3::new(start, pos_y - channel_width / 2.0, -height / 2.0),
        Vector3::new(channel_length, channel_width, height),
    );

    let nut_length = screw_nut.nut_height - kerf + 0.1;
    let nut_width = screw_nut.nut_flat_flat - kerf + 0.1;
    let nut_x = start + channel_length - nut_length - screw_nut.nut_height;
    let mut nut = Solid::cuboid(
        Point3::new(nut_x, pos_y - nut_width / 2.0, -height / 2.0),
        Vector3::new(nut_length, nut_width, height),
    );
    if dog_bone {
        let radius = dog_bone_radius(nut_length, nut_width);
        let inset = radius / 2.0;
        let segments = config.tessellation.cylinder_segments;
        let (x_min, x_max) = (nut_x + inset, nut_x + nut_length - inset);
        let (y_min, y_max) = (pos_y - nut_width / 2.0 + inset, pos_y + nut_width / 2.0 - inset);
        for (x, y) in [(x_min, y_min), (x_max, y_min), (x_min, y_max), (x_max, y_max)] {
            nut = nut.fuse(&dog_bone_along_z(x, y, height, radius, segments));
        }
    }
    channel.fuse(&nut)
}

/// Screw clearance hole through the opposing panel.
pub fn screw_way_on_plane(
    plane_material: &MaterialProperties,
    screw_nut: &ScrewNutSpec,
    pos_y: f64,
    config: &JoineryConfig,
) -> Solid {
    let radius = (screw_nut.screw_diameter * 1.2 - plane_material.laser_beam_diameter) / 2.0;
    let length = plane_material.thickness;
    Solid::cylinder(
        Point3::new(-length / 2.0, pos_y, 0.0),
        Vector3::new(length, 0.0, 0.0),
        radius,
        config.tessellation.cylinder_segments,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screw::get_screw_nut_spec;

    fn materials() -> (MaterialProperties, MaterialProperties) {
        let mut face = MaterialProperties::new("face", 3.0);
        face.laser_beam_diameter = 0.2;
        let mut plane = MaterialProperties::new("plane", 4.0);
        plane.laser_beam_diameter = 0.3;
        (face, plane)
    }

    #[test]
    fn test_tab_kerf_sides() {
        let (face, plane) = materials();
        let both = tab_on_face(&face, &plane, 10.0, 0.0, true, true).bounding_box();
        assert!((both.y_length() - 10.2).abs() < 1e-9);
        assert!((both.x_length() - 4.0).abs() < 1e-9);
        assert!((both.z_length() - 3.0).abs() < 1e-9);
        assert!((both.center().y).abs() < 1e-9);

        // only the left side grows, so the right edge stays at +5
        let left = tab_on_face(&face, &plane, 10.0, 0.0, true, false).bounding_box();
        assert!((left.y_length() - 10.1).abs() < 1e-9);
        assert!((left.y_min - -5.1).abs() < 1e-9);
        assert!((left.y_max - 5.0).abs() < 1e-9);

        let right = tab_on_face(&face, &plane, 10.0, 0.0, false, true).bounding_box();
        assert!((right.y_min - -5.0).abs() < 1e-9);
        assert!((right.y_max - 5.1).abs() < 1e-9);
    }

    #[test]
    fn test_kerf_removed_from_hole_width() {
        let (w, center) = kerf_corrected(10.0, 0.2, true, false, -1.0);
        assert!((w - 9.9).abs() < 1e-12);
        // right edge stays at +5
        assert!((w - center - 5.0).abs() < 1e-12);
        assert_eq!(kerf_corrected(10.0, 0.2, false, false, -1.0), (10.0, 5.0));
    }

    #[test]
    fn test_screw_way_dimensions() {
        let (face, plane) = materials();
        let screw_nut = get_screw_nut_spec(3.0, 15.0).unwrap();
        let config = JoineryConfig::default();
        let way = screw_way_on_face(&face, &plane, &screw_nut, 0.0, 0.0, false, &config);
        let bbox = way.bounding_box();
        assert!((bbox.x_min - 2.0).abs() < 1e-9);
        assert!((bbox.x_length() - (15.0 - 4.0 + 0.4)).abs() < 1e-9);
        assert!((bbox.y_length() - (5.5 - 0.2 + 0.1)).abs() < 1e-9);

        let hole = screw_way_on_plane(&plane, &screw_nut, 7.0, &config).bounding_box();
        assert!((hole.x_length() - 4.0).abs() < 1e-9);
        assert!((hole.center().y - 7.0).abs() < 1e-6);
        assert!(hole.z_length() <= 3.6 - 0.3 + 1e-9);
    }

    #[test]
    fn test_dog_bone_radius() {
        assert!((dog_bone_radius(9.8, 3.0) - 0.2).abs() < 1e-12);
    }
}
