use kerfjoint_geometry::{Point3, Solid, Vector3};
use kerfjoint_joinery::hinge::complete_hinges_properties;
use kerfjoint_joinery::{
    create_linked_part, estimate_min_link, GlobalLivingHingeMaterial, HingeProperties,
    JoineryConfig, LivingHingeSession, ShapeDocument,
};
use std::f64::consts::PI;

const WIDTH: f64 = 40.0;

/// A flat 100 mm panel and a second panel standing 10 mm past its end, so
/// that the bend has an inner radius of 10 and an outer radius of 13.
fn panels() -> (Solid, Solid) {
    let first = Solid::cuboid(Point3::origin(), Vector3::new(100.0, WIDTH, 3.0));
    let second = Solid::cuboid(Point3::new(110.0, 0.0, 13.0), Vector3::new(3.0, WIDTH, 50.0));
    (first, second)
}

fn face_with_normal(solid: &Solid, normal: Vector3<f64>) -> usize {
    solid
        .faces()
        .iter()
        .position(|f| (f.normal() - normal).norm() < 1e-9)
        .unwrap()
}

#[test]
fn test_quarter_bend_geometry() {
    let (first, second) = panels();
    let face_1 = first.face(face_with_normal(&first, Vector3::x())).unwrap();
    let face_2 = second.face(face_with_normal(&second, -Vector3::z())).unwrap();
    let geometry = complete_hinges_properties(&face_1, &face_2, false, 1e-3).unwrap();

    assert!((geometry.rad_angle - PI / 2.0).abs() < 1e-9);
    assert!((geometry.deg_angle - 90.0).abs() < 1e-9);
    assert!((geometry.arc_inner_radius - 10.0).abs() < 1e-9);
    assert!((geometry.arc_outer_radius - 13.0).abs() < 1e-9);
    assert!((geometry.arc_length - 11.5 * PI / 2.0).abs() < 1e-9);
    assert!((geometry.thickness - 3.0).abs() < 1e-9);
    assert!((geometry.rotation_vector - Vector3::new(0.0, -9.0, 0.0)).norm() < 1e-9);
    assert!((geometry.extrusion_vector.norm() - WIDTH).abs() < 1e-9);
}

#[test]
fn test_unequal_radii_are_not_an_arc() {
    let first = Solid::cuboid(Point3::origin(), Vector3::new(100.0, WIDTH, 3.0));
    let second = Solid::cuboid(Point3::new(112.0, 0.0, 13.0), Vector3::new(3.0, WIDTH, 50.0));
    let face_1 = first.face(face_with_normal(&first, Vector3::x())).unwrap();
    let face_2 = second.face(face_with_normal(&second, -Vector3::z())).unwrap();
    let err = complete_hinges_properties(&face_1, &face_2, false, 1e-3).unwrap_err();
    assert!(err.to_string().starts_with("Not an arc"));
}

#[test]
fn test_min_link_literals() {
    assert_eq!(estimate_min_link(PI / 2.0, 3.0, 0.6).unwrap(), 7);
    assert_eq!(estimate_min_link(PI / 2.0, 3.0, 0.2).unwrap(), 23);
}

#[test]
fn test_chain_unrolls_flat() {
    let (first, second) = panels();
    let config = JoineryConfig::default();
    let global = GlobalLivingHingeMaterial::from_solid("first", &first);
    let hinge = HingeProperties::new(
        "first",
        &first,
        face_with_normal(&first, Vector3::x()),
        "second",
        &second,
        face_with_normal(&second, -Vector3::z()),
        false,
        global.link_clearance,
        &config,
    )
    .unwrap();
    assert_eq!(hinge.name, "first -> second");
    assert_eq!(hinge.min_links_nb, 7);
    assert_eq!(hinge.nb_link, 8);

    let linked = create_linked_part(&[hinge], &global, &config).unwrap();
    assert!(linked.warnings.is_empty());
    let bbox = linked.flat_part.bounding_box();
    let arc = 11.5 * PI / 2.0;
    assert!((bbox.x_length() - (150.0 + arc)).abs() < 1e-6);
    assert!((bbox.z_length() - 3.0).abs() < 1e-6);
    assert!((bbox.y_length() - WIDTH).abs() < 1e-6);

    let plain = (150.0 + arc) * WIDTH * 3.0;
    assert!(linked.flat_part.volume() < plain);

    let corner = linked.solid.unwrap();
    let quarter_ring = PI / 4.0 * (13.0 * 13.0 - 10.0 * 10.0) * WIDTH;
    assert!(corner.volume() < quarter_ring + 1e-6);
    assert!(corner.volume() > quarter_ring * 0.95);
}

#[test]
fn test_too_few_links_warns() {
    let (first, second) = panels();
    let config = JoineryConfig::default();
    let global = GlobalLivingHingeMaterial::from_solid("first", &first);
    let mut hinge = HingeProperties::new(
        "first",
        &first,
        face_with_normal(&first, Vector3::x()),
        "second",
        &second,
        face_with_normal(&second, -Vector3::z()),
        false,
        global.link_clearance,
        &config,
    )
    .unwrap();
    hinge.nb_link = 3;
    let linked = create_linked_part(&[hinge], &global, &config).unwrap();
    assert_eq!(linked.warnings.len(), 1);
    assert!(linked.warnings[0].starts_with("Min. link is not respected"));
}

#[test]
fn test_session_writes_flat_and_solid() {
    let (first, second) = panels();
    let mut doc = ShapeDocument::new();
    let face_1 = face_with_normal(&first, Vector3::x());
    let face_2 = face_with_normal(&second, -Vector3::z());
    doc.add_object("first", first);
    doc.add_object("second", second);

    let mut session = LivingHingeSession::new(JoineryConfig::default());
    let record = session.add_hinge(&doc, "first", face_1, "second", face_2).unwrap();
    // estimated with the default 0.2 clearance before the chain parameters exist
    assert_eq!(record.nb_link, 24);
    assert!(session.needs_recompute());
    assert_eq!(session.global().unwrap().new_name, "first_flat");

    let output = session.recompute(&mut doc).unwrap();
    assert_eq!(output.written, vec!["first_flat", "first_solid"]);
    assert!(!session.needs_recompute());
    assert!(doc.contains("first_flat"));
    assert!(doc.contains("first_solid"));
}

#[test]
fn test_link_count_follows_clearance() {
    let (first, second) = panels();
    let mut hinge = HingeProperties::new(
        "first",
        &first,
        face_with_normal(&first, Vector3::x()),
        "second",
        &second,
        face_with_normal(&second, -Vector3::z()),
        false,
        0.6,
        &JoineryConfig::default(),
    )
    .unwrap();
    assert_eq!((hinge.min_links_nb, hinge.nb_link), (7, 8));

    hinge.compute_min_link(0.2).unwrap();
    assert_eq!((hinge.min_links_nb, hinge.nb_link), (23, 24));
}
