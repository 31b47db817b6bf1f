use kerfjoint_geometry::{Point3, Solid, Vector3};
use kerfjoint_joinery::{
    estimate_thickness, make_box, make_tabs_joins, BoxProperties, IdAllocator, JoineryConfig,
    MaterialProperties, PanelMaterial, TabType, TabsList, TopBottomProperties,
};

/// Floor 100 x 50 x 3 with a 100 x 3 x 30 wall standing on its back edge.
fn corner() -> Vec<PanelMaterial> {
    let floor = Solid::cuboid(Point3::origin(), Vector3::new(100.0, 50.0, 3.0));
    let wall = Solid::cuboid(Point3::new(0.0, 47.0, 3.0), Vector3::new(100.0, 3.0, 30.0));
    vec![
        PanelMaterial::new("floor", floor, MaterialProperties::new("floor", 3.0)),
        PanelMaterial::new("wall", wall, MaterialProperties::new("wall", 3.0)),
    ]
}

fn face_with_normal(solid: &Solid, normal: Vector3<f64>) -> usize {
    solid
        .faces()
        .iter()
        .position(|f| (f.normal() - normal).norm() < 1e-9)
        .unwrap()
}

#[test]
fn test_box_panels_are_three_millimeters() {
    let parts = make_box(
        &BoxProperties::default(),
        &TopBottomProperties::default(),
        &TopBottomProperties::default(),
    )
    .unwrap();
    assert_eq!(parts.len(), 6);
    for part in &parts {
        let thickness = estimate_thickness(&part.solid).unwrap();
        assert!((thickness - 3.0).abs() < 1e-6, "{} is {}", part.name, thickness);
    }
}

#[test]
fn test_continuous_joint_fills_every_other_segment() {
    let parts = corner();
    let mut ids = IdAllocator::new();
    let mut tabs = TabsList::new();
    let face = face_with_normal(&parts[1].solid, -Vector3::z());
    let id = tabs
        .append(&mut ids, "wall", &parts[1].solid, face, TabType::Continuous)
        .unwrap();
    tabs.params_mut(id).unwrap().tabs_number = 4;
    let resolved = tabs.resolve(&parts).unwrap();
    assert!((resolved[0].y_length - 100.0).abs() < 1e-9);

    let elements = make_tabs_joins(parts, &resolved, &JoineryConfig::default()).unwrap();
    assert_eq!(elements[1].to_add().len(), 2);
    assert_eq!(elements[0].to_remove().len(), 2);

    // the first segment has no kerf on the open end of the face
    let wall = elements[1].get_shape().bounding_box();
    assert!(wall.x_min.abs() < 1e-6);
    assert!((wall.x_max - 100.0).abs() < 1e-6);
}

#[test]
fn test_tslot_adds_two_tabs_and_a_screw_way() {
    let parts = corner();
    let mut ids = IdAllocator::new();
    let mut tabs = TabsList::new();
    let face = face_with_normal(&parts[1].solid, -Vector3::z());
    tabs.append(&mut ids, "wall", &parts[1].solid, face, TabType::TSlot)
        .unwrap();
    let resolved = tabs.resolve(&parts).unwrap();
    let elements = make_tabs_joins(parts, &resolved, &JoineryConfig::default()).unwrap();

    assert_eq!(elements[1].to_add().len(), 2);
    assert_eq!(elements[1].to_remove().len(), 1);
    assert_eq!(elements[0].to_remove().len(), 3);

    let wall = elements[1].get_shape();
    let plain = 100.0 * 3.0 * 30.0;
    // two 10.2 x 3 x 3 tabs minus the screw channel and nut pocket
    assert!(wall.volume() < plain + 2.0 * 10.2 * 9.0);
    assert!(wall.volume() > plain);
}

#[test]
fn test_get_shape_is_repeatable() {
    let parts = corner();
    let mut ids = IdAllocator::new();
    let mut tabs = TabsList::new();
    let face = face_with_normal(&parts[1].solid, -Vector3::z());
    let id = tabs
        .append(&mut ids, "wall", &parts[1].solid, face, TabType::Tab)
        .unwrap();
    tabs.params_mut(id).unwrap().tabs_number = 2;
    let resolved = tabs.resolve(&parts).unwrap();
    let elements = make_tabs_joins(parts, &resolved, &JoineryConfig::default()).unwrap();

    let first = elements[0].get_shape();
    let second = elements[0].get_shape();
    assert!((first.volume() - second.volume()).abs() < 1e-9);
    assert_eq!(first.bounding_box(), second.bounding_box());
}

#[test]
fn test_linked_face_cuts_its_own_slots() {
    let mut parts = corner();
    let front = Solid::cuboid(Point3::new(0.0, 0.0, 3.0), Vector3::new(100.0, 3.0, 30.0));
    parts.push(PanelMaterial::new("front", front, MaterialProperties::new("front", 3.0)));

    let mut ids = IdAllocator::new();
    let mut tabs = TabsList::new();
    let back_bottom = face_with_normal(&parts[1].solid, -Vector3::z());
    let source = tabs
        .append(&mut ids, "wall", &parts[1].solid, back_bottom, TabType::Tab)
        .unwrap();
    {
        let params = tabs.params_mut(source).unwrap();
        params.tabs_number = 2;
        params.tabs_shift = 10.0;
    }
    let front_bottom = face_with_normal(&parts[2].solid, -Vector3::z());
    tabs.append_link(&mut ids, "front", &parts[2].solid, front_bottom, source, &parts[1].solid)
        .unwrap();

    let resolved = tabs.resolve(&parts).unwrap();
    assert_eq!(resolved[1].link, Some(source));
    assert_eq!(resolved[0].group_id, resolved[1].group_id);
    assert_eq!(resolved[0].slot_positions(), resolved[1].slot_positions());

    let config = JoineryConfig::default();
    let elements = make_tabs_joins(parts, &resolved, &config).unwrap();
    // both walls tab into the floor and never into each other
    assert_eq!(elements[1].to_add().len(), 2);
    assert_eq!(elements[2].to_add().len(), 2);
    assert_eq!(elements[0].to_remove().len(), 4);

    let floor = elements[0].get_shape();
    let linked = &resolved[1];
    let at = |y: f64| linked.placement(1.5).transform_point(&Point3::new(0.0, y, 0.0));
    for y in linked.slot_positions() {
        let center = at(y);
        assert!((center.z - 1.5).abs() < 1e-9);
        assert!(center.y < 3.0);
        assert!(!floor.is_material_at(center, -Vector3::z(), &config.probe));
    }
    let between: f64 = linked.slot_positions().iter().sum::<f64>() / 2.0;
    assert!(floor.is_material_at(at(between), -Vector3::z(), &config.probe));
}
