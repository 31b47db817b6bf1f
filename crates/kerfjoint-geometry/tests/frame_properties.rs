use kerfjoint_geometry::{group_faces_by_direction, resolve_frame, Point3, Solid, Vector3};
use proptest::prelude::*;

fn assert_orthonormal_frame(solid: &Solid) {
    for face in solid.faces() {
        let frame = resolve_frame(&face).unwrap();
        let (x, y, z) = (frame.x_axis, frame.y_axis(), frame.z_axis());
        assert!(x.dot(&y).abs() < 1e-6);
        assert!(x.dot(&z).abs() < 1e-6);
        assert!(y.dot(&z).abs() < 1e-6);
        assert!((y.cross(&z) - x).norm() < 1e-6);
        assert!(frame.width() >= frame.thickness());
    }
}

#[test]
fn test_frame_on_every_face_of_a_panel() {
    let panel = Solid::cuboid(Point3::new(-45.0, -1.5, 0.0), Vector3::new(90.0, 3.0, 50.0));
    assert_orthonormal_frame(&panel);
}

#[test]
fn test_biggest_group_is_panel_sides() {
    let panel = Solid::cuboid(Point3::origin(), Vector3::new(90.0, 3.0, 50.0));
    let groups = group_faces_by_direction(&panel.faces(), 1e-5);
    let biggest = groups.last().unwrap();
    assert!(biggest.direction.cross(&Vector3::y()).norm() < 1e-9);
    assert!((biggest.area - 2.0 * 90.0 * 50.0).abs() < 1e-6);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_frame_is_orthonormal_after_rotation(
        length in 5.0f64..200.0,
        width in 5.0f64..200.0,
        thickness in 0.5f64..10.0,
        angle in -180.0f64..180.0,
        ax in -1.0f64..1.0,
        ay in -1.0f64..1.0,
        az in 0.1f64..1.0,
    ) {
        let panel = Solid::cuboid(Point3::origin(), Vector3::new(length, width, thickness))
            .rotated(Point3::new(1.0, 2.0, 3.0), Vector3::new(ax, ay, az), angle);
        assert_orthonormal_frame(&panel);
    }
}
