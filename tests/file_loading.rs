use camoverlay::{load_homography, load_step, HomographyEnvelope, HomographyRecord, StepType, Vec2};

fn record() -> HomographyRecord {
    HomographyRecord {
        src_pts: vec![0.0, 0.0, 10.0, 0.0, 10.0, 10.0, 0.0, 10.0],
        dst_pts: vec![2.0, 1.0, 12.0, 1.0, 12.0, 11.0, 2.0, 11.0],
    }
}

#[test]
fn test_load_step_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("step.json");
    std::fs::write(
        &path,
        r#"{"name":"dowels","type":"step","marks":[{"type":"crosshair","location":{"x":1,"y":2}}]}"#,
    )
    .unwrap();

    let step = load_step(&path).unwrap();
    assert_eq!(step.step_type, StepType::Step);
    assert_eq!(step.marks.len(), 1);
}

#[test]
fn test_load_homography_record_and_envelope() {
    let dir = tempfile::tempdir().unwrap();

    let bare = dir.path().join("record.json");
    std::fs::write(&bare, record().to_json()).unwrap();
    let wrapped = dir.path().join("envelope.json");
    std::fs::write(
        &wrapped,
        serde_json::to_string(&HomographyEnvelope::wrap(&record())).unwrap(),
    )
    .unwrap();

    for path in [bare, wrapped] {
        let h = load_homography(&path).unwrap();
        let p = h.transform_point(Vec2::new(5.0, 5.0));
        assert!(p.distance(Vec2::new(7.0, 6.0)) < 1e-6);
    }
}

#[test]
fn test_half_filled_record_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("record.json");
    std::fs::write(&path, r#"{"srcPts":[0,0,1,0,1,1,0,1]}"#).unwrap();
    assert!(load_homography(&path).is_err());
}
