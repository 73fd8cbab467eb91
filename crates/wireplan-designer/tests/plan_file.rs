// Integration tests for plan file persistence

use tempfile::tempdir;
use wireplan_core::{DeviceKind, Point2, Scale};
use wireplan_designer::{DeviceSet, PlanContext, PlanFile, RoomOutline};
use wireplan_settings::{Config, DeviceDefaults};

#[test]
fn test_save_and_load_relinks_controls() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("plan.json");

    let defaults = DeviceDefaults::default();
    let mut devices = DeviceSet::new();
    let switch = devices.add(DeviceKind::Switch, Point2::new(0.0, 0.0), &defaults);
    let light = devices.add(DeviceKind::Light, Point2::new(30.0, 0.0), &defaults);
    let panel = devices.add(DeviceKind::ElectricalPanel, Point2::new(60.0, 0.0), &defaults);
    devices.link_control(&switch, &light).unwrap();
    devices.set_room(&switch, "Den").unwrap();
    devices.set_amperage(&light, "2.5").unwrap();

    let scale = Scale::new(0.05).unwrap();
    PlanFile::from_devices(&devices, Some(scale))
        .save_to_file(&path)
        .unwrap();

    let loaded = PlanFile::load_from_file(&path).unwrap();
    assert_eq!(loaded.scale, Some(scale));
    let restored = loaded.into_devices();

    assert_eq!(restored.len(), 3);
    assert_eq!(restored.get(&switch).unwrap().controls(), &[light.clone()]);
    assert_eq!(restored.controller_of(&light), Some(&switch));
    assert_eq!(restored.get(&light).unwrap().amperage, Some(2.5));
    assert_eq!(restored.get(&switch).unwrap().room.as_deref(), Some("Den"));
    assert_eq!(restored.get(&panel).unwrap().kind, DeviceKind::ElectricalPanel);
}

#[test]
fn test_load_missing_file_has_context() {
    let dir = tempdir().unwrap();
    let err = PlanFile::load_from_file(dir.path().join("absent.json")).unwrap_err();
    assert!(err.to_string().contains("Failed to read plan file"));
}

#[test]
fn test_load_malformed_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{\"symbols\": [").unwrap();
    let err = PlanFile::load_from_file(&path).unwrap_err();
    assert_eq!(err.to_string(), "Failed to parse plan file");
}

#[test]
fn test_legacy_plan_runs_end_to_end() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("legacy.json");
    std::fs::write(
        &path,
        r#"{
            "scale": 0.5,
            "symbols": [
                {"id": "aaaaaa", "type": "outlet", "coords": [10, 10], "room": null, "amperage": "15", "height": 7.0, "controls": []},
                {"id": "bbbbbb", "type": "junction box", "coords": [40, 10], "room": null, "amperage": null, "height": 8.0, "controls": []},
                {"id": "cccccc", "type": "electrical panel", "coords": [80, 60], "room": "Garage", "amperage": null, "height": 6.0, "controls": []}
            ],
            "rooms": [
                {"label": "Office", "points": [[0, 0], [50, 0], [50, 70], [0, 70]]}
            ]
        }"#,
    )
    .unwrap();

    let plan = PlanFile::load_from_file(&path).unwrap();
    let (mut context, outlines) = PlanContext::from_plan(plan, Config::default());
    let office = RoomOutline::new(
        "Office",
        &[(0.0, 0.0), (50.0, 0.0), (50.0, 70.0), (0.0, 70.0)],
    );
    assert_eq!(outlines, vec![office]);
    assert_eq!(context.scale.factor(), 0.5);

    let design = context.run(&outlines).unwrap();
    assert_eq!(design.network.room_wires("Office").len(), 1);
    assert_eq!(design.network.home_runs().len(), 1);
    // 30 units at 0.5 plus the outlet's 7 unit rise
    assert_eq!(design.network.room_wires("Office")[0].length(), 22.0);
}
