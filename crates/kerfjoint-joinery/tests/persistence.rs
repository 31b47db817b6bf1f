use kerfjoint_geometry::Vector3;
use kerfjoint_joinery::{
    make_box, BoxProperties, CrossSession, JoineryConfig, JoineryError, JoinerySession,
    LengthWidthPriority, ParameterRecord, ShapeDocument, TabType, TopBottomProperties,
};
use tempfile::TempDir;

fn box_document() -> ShapeDocument {
    let parts = make_box(
        &BoxProperties::default(),
        &TopBottomProperties::default(),
        &TopBottomProperties::default(),
    )
    .unwrap();
    let mut doc = ShapeDocument::new();
    for part in parts {
        doc.add_object(part.name, part.solid);
    }
    doc
}

fn face_with_normal(doc: &ShapeDocument, name: &str, normal: Vector3<f64>) -> usize {
    doc.get(name)
        .unwrap()
        .faces()
        .iter()
        .position(|f| (f.normal() - normal).norm() < 1e-9)
        .unwrap()
}

#[test]
fn test_config_round_trip_toml_and_json() {
    let dir = TempDir::new().unwrap();
    let mut config = JoineryConfig::default();
    config.tessellation.cylinder_segments = 24;
    config.box_job.properties.length_width_priority = LengthWidthPriority::Width;
    config.box_job.properties.length = 120.0;

    for file in ["joinery.toml", "joinery.json"] {
        let path = dir.path().join(file);
        config.save_to_file(&path).unwrap();
        let loaded = JoineryConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    let err = config.save_to_file(&dir.path().join("joinery.yaml")).unwrap_err();
    assert!(matches!(err, JoineryError::InvalidParameters(_)));
}

#[test]
fn test_invalid_config_is_rejected_on_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[probe]\nradius = 1.0\noffset = 0.1\n").unwrap();
    assert!(JoineryConfig::load_from_file(&path).is_err());
}

#[test]
fn test_tab_session_round_trip_and_recompute() {
    let dir = TempDir::new().unwrap();
    let mut doc = box_document();
    let mut session = JoinerySession::new(JoineryConfig::default());
    session.add_part(&doc, "left_panel").unwrap();
    session.add_part(&doc, "bottom_panel").unwrap();
    session.add_part_link(&doc, "right_panel", "left_panel").unwrap();

    let left_bottom = face_with_normal(&doc, "left_panel", -Vector3::z());
    let source = session
        .add_tab(&doc, "left_panel", left_bottom, TabType::Tab)
        .unwrap();
    session.tab_params_mut(source).unwrap().tabs_number = 3;
    let right_bottom = face_with_normal(&doc, "right_panel", -Vector3::z());
    session
        .add_tab_link(&doc, "right_panel", right_bottom, source)
        .unwrap();

    let path = dir.path().join("tabs.json");
    session.save(&path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"type\": \"Material\""));
    assert!(text.contains("\"type\": \"MaterialLink\""));
    assert!(text.contains("\"type\": \"TabLink\""));

    let mut loaded = JoinerySession::load(&path, &doc, JoineryConfig::default()).unwrap();
    assert_eq!(loaded.to_records(), session.to_records());
    assert!(loaded.needs_recompute());

    let written = loaded.recompute(&mut doc).unwrap();
    assert_eq!(written, vec!["left_panel_tab", "bottom_panel_tab", "right_panel_tab"]);
    assert!(!loaded.needs_recompute());

    let bottom = doc.get("bottom_panel").unwrap().volume();
    let cut = doc.get("bottom_panel_tab").unwrap().volume();
    assert!(cut < bottom);
}

#[test]
fn test_failed_recompute_leaves_document_untouched() {
    let mut doc = box_document();
    let mut session = JoinerySession::new(JoineryConfig::default());
    session.add_part(&doc, "left_panel").unwrap();
    session.add_part(&doc, "bottom_panel").unwrap();
    let face = face_with_normal(&doc, "left_panel", -Vector3::z());
    session.add_tab(&doc, "left_panel", face, TabType::Tab).unwrap();

    doc.remove_object("bottom_panel");
    let count = doc.len();
    let err = session.recompute(&mut doc).unwrap_err();
    assert_eq!(err.to_string(), "Missing reference: bottom_panel");
    assert_eq!(doc.len(), count);
    assert!(session.needs_recompute());
}

#[test]
fn test_cross_session_rejects_foreign_records() {
    let doc = box_document();
    let records = vec![ParameterRecord::Hinge(kerfjoint_joinery::HingeRecord {
        panel_1: "left_panel".to_string(),
        face_index_1: 0,
        panel_2: "bottom_panel".to_string(),
        face_index_2: 0,
        reversed_angle: false,
        nb_link: 5,
    })];
    assert!(CrossSession::from_records(&records, &doc, JoineryConfig::default()).is_err());
}

#[test]
fn test_part_with_tabs_cannot_be_removed() {
    let doc = box_document();
    let mut session = JoinerySession::new(JoineryConfig::default());
    session.add_part(&doc, "left_panel").unwrap();
    session.add_part(&doc, "bottom_panel").unwrap();
    let face = face_with_normal(&doc, "left_panel", -Vector3::z());
    session.add_tab(&doc, "left_panel", face, TabType::Tab).unwrap();

    let err = session.remove_part("left_panel").unwrap_err();
    assert!(matches!(err, JoineryError::PartHasTabs(_)));
    assert_eq!(err.to_string(), "Part left_panel still has tabs");
    session.remove_part("bottom_panel").unwrap();
}
