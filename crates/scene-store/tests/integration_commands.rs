//! Integration tests for the SceneCommand JSON protocol.
//!
//! Tests the full command pipeline: JSON string -> parse -> execute -> response.

use klorad_scene_store::command::{execute_json, execute_json_batch};
use klorad_scene_store::fixtures::*;
use klorad_scene_store::state::SceneStore;

#[test]
fn test_command_add_update_remove() {
    let mut s = SceneStore::new();

    let resp = execute_json(&mut s, r#"{"command": "add_model", "model": {}}"#).unwrap();
    assert!(resp.success);
    let id = resp.data.unwrap()["id"].as_str().unwrap().to_string();

    let update = format!(
        r#"{{"command": "update_object_property", "id": "{id}", "property": "position", "value": [1, 2, 3]}}"#
    );
    assert!(execute_json(&mut s, &update).unwrap().success);
    assert_eq!(s.object(&id).unwrap().position, [1.0, 2.0, 3.0]);

    let remove = format!(r#"{{"command": "remove_object", "id": "{id}"}}"#);
    let resp = execute_json(&mut s, &remove).unwrap();
    assert_eq!(resp.data.unwrap()["removed"], true);
    assert!(s.objects().is_empty());
}

#[test]
fn test_command_observation_workflow_via_json_batch() {
    let mut s = SceneStore::new();

    let json = r#"[
        {"command": "set_camera", "camera": {"eye": [0.0, 10.0, 30.0], "target": [0.0, 0.0, 0.0]}},
        {"command": "add_observation_point"},
        {"command": "add_observation_point"},
        {"command": "start_preview"},
        {"command": "next_observation"},
        {"command": "next_observation"},
        {"command": "inspect"}
    ]"#;

    let responses = execute_json_batch(&mut s, json).unwrap();
    assert_eq!(responses.len(), 7);
    for resp in &responses {
        assert!(resp.success, "Failed: {:?}", resp.error);
    }

    assert_eq!(responses[4].data.as_ref().unwrap()["moved"], true);
    assert_eq!(responses[5].data.as_ref().unwrap()["moved"], false);

    let inspect = responses[6].data.as_ref().unwrap();
    assert_eq!(inspect["observation_point_count"], 2);
    assert_eq!(inspect["preview"]["active"], true);
    assert_eq!(inspect["preview"]["index"], 1);
}

#[test]
fn test_command_capture_and_update_point() {
    let mut s = SceneStore::new();
    s.set_observation_points(vec![observation_point(7)]);

    let json = r#"[
        {"command": "set_camera", "camera": {"eye": [1.0, 2.0, 3.0], "target": [4.0, 5.0, 6.0]}},
        {"command": "capture_pov", "id": 7},
        {"command": "update_observation_point", "id": 7, "updates": {"title": "North gate"}}
    ]"#;
    let responses = execute_json_batch(&mut s, json).unwrap();
    assert!(responses.iter().all(|r| r.success));

    let p = s.observation_point(7).unwrap();
    assert_eq!(p.title, "North gate");
    assert_eq!(p.position, Some([1.0, 2.0, 3.0]));
    assert_eq!(p.target, Some([4.0, 5.0, 6.0]));
}

#[test]
fn test_command_rejected_update_reports_error() {
    let mut s = SceneStore::new();
    s.set_objects(vec![model("a")]);

    let resp = execute_json(
        &mut s,
        r#"{"command": "update_object_property", "id": "a", "property": "observationProperties.sensorType", "value": "sphere"}"#,
    )
    .unwrap();
    assert!(!resp.success);
    assert!(resp.error.is_some());
    assert!(s.object("a").unwrap().observation_properties.is_none());
}

#[test]
fn test_command_load_and_export_scene() {
    let mut s = SceneStore::new();
    let scene = serde_json::to_string(&scene_document()).unwrap();
    let load = format!(r#"{{"command": "load_scene", "scene": {scene}}}"#);
    assert!(execute_json(&mut s, &load).unwrap().success);
    assert_eq!(s.objects().len(), 3);

    let resp = execute_json(&mut s, r#"{"command": "export_scene"}"#).unwrap();
    let data = resp.data.unwrap();
    let exported: shared::SceneDocument =
        serde_json::from_str(data["scene_json"].as_str().unwrap()).unwrap();
    assert_eq!(exported, scene_document());
}

#[test]
fn test_command_undo_redo_via_json() {
    let mut s = SceneStore::new();
    s.set_objects(vec![model("a"), model("b")]);

    let resp = execute_json(&mut s, r#"{"command": "reorder_objects", "start": 0, "end": 1}"#).unwrap();
    assert!(resp.success);
    assert_eq!(s.objects()[0].id, "b");

    let resp = execute_json(&mut s, r#"{"command": "undo"}"#).unwrap();
    assert_eq!(resp.data.unwrap()["undone"], true);
    assert_eq!(s.objects()[0].id, "a");

    let resp = execute_json(&mut s, r#"{"command": "redo"}"#).unwrap();
    assert_eq!(resp.data.unwrap()["redone"], true);
    assert_eq!(s.objects()[0].id, "b");
}

#[test]
fn test_command_invalid_json_error() {
    let mut s = SceneStore::new();
    let result = execute_json(&mut s, "not valid json");
    assert!(result.unwrap_err().contains("Invalid command JSON"));

    let result = execute_json_batch(&mut s, r#"{"command": "undo"}"#);
    assert!(result.unwrap_err().contains("Invalid commands JSON"));
}
