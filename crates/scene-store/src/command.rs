//! JSON command protocol.
//!
//! One command per store operation, so a host UI (or a script fed to the
//! `klorad-scene` binary) can drive the store without linking against it.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shared::{CesiumIonAsset, ModelRecord, ObservationId, ObservationPoint, SceneDocument, Vec3Array};

use crate::state::engine::{from_array, CameraPose, SceneFrame};
use crate::state::scene::{model_display_name, observation_display_name};
use crate::state::{ModelDraft, ObservationPointPatch, SceneStore, Selection};

/// A command the store can execute.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum SceneCommand {
    /// Replace the object list
    SetObjects { objects: Vec<ModelRecord> },
    /// Add a model built from a partial description
    AddModel {
        #[serde(default)]
        model: ModelDraft,
    },
    SelectObject { id: String },
    DeselectObject,
    RemoveObject { id: String },
    /// Set one property by path, e.g. `"observationProperties.fov"`
    UpdateObjectProperty {
        id: String,
        property: String,
        value: Value,
    },
    /// Start of a gizmo drag (one undo step for the whole drag)
    BeginTransform,
    SetModelPosition { id: String, value: Vec3Array },
    SetModelRotation { id: String, value: Vec3Array },
    SetModelScale { id: String, value: Vec3Array },
    ReorderObjects { start: usize, end: usize },
    SetCesiumIonAssets { assets: Vec<CesiumIonAsset> },
    AddCesiumIonAsset { asset: CesiumIonAsset },

    SetObservationPoints { points: Vec<ObservationPoint> },
    AddObservationPoint,
    /// Select a point, or clear the selection with `id: null`
    SelectObservation {
        #[serde(default)]
        id: Option<ObservationId>,
    },
    UpdateObservationPoint {
        id: ObservationId,
        updates: ObservationPointPatch,
    },
    DeleteObservationPoint { id: ObservationId },
    SetCapturingPov { capturing: bool },
    CapturePov { id: ObservationId },
    StartPreview,
    ExitPreview,
    NextObservation,
    PrevObservation,

    /// Register (or clear) the engine camera
    SetCamera {
        #[serde(default)]
        camera: Option<CameraPose>,
    },
    SetSceneFrame {
        #[serde(default)]
        scene: Option<SceneFrame>,
    },
    /// Replace the whole scene with a document
    LoadScene { scene: SceneDocument },
    Undo,
    Redo,
    /// Summary of objects, points, selection and preview state
    Inspect,
    /// Export the scene as JSON.
    ExportScene,
}

/// Response from executing a command.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl CommandResponse {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
            data: None,
        }
    }

    fn ok_with_data(data: Value) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(msg.into()),
            data: None,
        }
    }
}

/// Execute a single command on the store.
pub fn execute_command(store: &mut SceneStore, cmd: SceneCommand) -> CommandResponse {
    match cmd {
        SceneCommand::SetObjects { objects } => {
            store.set_objects(objects);
            CommandResponse::ok()
        }

        SceneCommand::AddModel { model } => {
            let id = store.add_model(model);
            CommandResponse::ok_with_data(json!({ "id": id }))
        }

        SceneCommand::SelectObject { id } => {
            store.select_object(&id);
            CommandResponse::ok_with_data(json!({ "selected": store.selected_object().is_some() }))
        }

        SceneCommand::DeselectObject => {
            store.deselect_object();
            CommandResponse::ok()
        }

        SceneCommand::RemoveObject { id } => {
            let removed = store.remove_object(&id);
            CommandResponse::ok_with_data(json!({ "removed": removed }))
        }

        SceneCommand::UpdateObjectProperty {
            id,
            property,
            value,
        } => match store.update_object_property(&id, &property, value) {
            Ok(()) => CommandResponse::ok(),
            Err(e) => CommandResponse::err(e.to_string()),
        },

        SceneCommand::BeginTransform => {
            store.begin_transform();
            CommandResponse::ok()
        }

        SceneCommand::SetModelPosition { id, value } => {
            store.set_model_position(&id, from_array(value));
            CommandResponse::ok()
        }

        SceneCommand::SetModelRotation { id, value } => {
            store.set_model_rotation(&id, from_array(value));
            CommandResponse::ok()
        }

        SceneCommand::SetModelScale { id, value } => {
            store.set_model_scale(&id, from_array(value));
            CommandResponse::ok()
        }

        SceneCommand::ReorderObjects { start, end } => {
            store.reorder_objects(start, end);
            CommandResponse::ok()
        }

        SceneCommand::SetCesiumIonAssets { assets } => {
            store.set_cesium_ion_assets(assets);
            CommandResponse::ok()
        }

        SceneCommand::AddCesiumIonAsset { asset } => {
            store.add_cesium_ion_asset(asset);
            CommandResponse::ok()
        }

        SceneCommand::SetObservationPoints { points } => {
            store.set_observation_points(points);
            CommandResponse::ok()
        }

        SceneCommand::AddObservationPoint => {
            let id = store.add_observation_point();
            CommandResponse::ok_with_data(json!({ "id": id }))
        }

        SceneCommand::SelectObservation { id } => {
            store.select_observation(id);
            CommandResponse::ok_with_data(
                json!({ "selected": store.selected_observation().is_some() }),
            )
        }

        SceneCommand::UpdateObservationPoint { id, updates } => {
            if updates.is_empty() {
                return CommandResponse::err("No updates given");
            }
            let updated = store.update_observation_point(id, &updates);
            CommandResponse::ok_with_data(json!({ "updated": updated }))
        }

        SceneCommand::DeleteObservationPoint { id } => {
            let removed = store.delete_observation_point(id);
            CommandResponse::ok_with_data(json!({ "removed": removed }))
        }

        SceneCommand::SetCapturingPov { capturing } => {
            store.set_capturing_pov(capturing);
            CommandResponse::ok()
        }

        SceneCommand::CapturePov { id } => {
            if store.camera().is_none() {
                return CommandResponse::err("No camera registered");
            }
            let captured = store.capture_pov(id);
            CommandResponse::ok_with_data(json!({ "captured": captured }))
        }

        SceneCommand::StartPreview => {
            store.start_preview();
            CommandResponse::ok()
        }

        SceneCommand::ExitPreview => {
            store.exit_preview();
            CommandResponse::ok()
        }

        SceneCommand::NextObservation => {
            let moved = store.next_observation();
            CommandResponse::ok_with_data(json!({ "moved": moved, "index": store.preview_index() }))
        }

        SceneCommand::PrevObservation => {
            let moved = store.prev_observation();
            CommandResponse::ok_with_data(json!({ "moved": moved, "index": store.preview_index() }))
        }

        SceneCommand::SetCamera { camera } => {
            store.set_camera(camera);
            CommandResponse::ok()
        }

        SceneCommand::SetSceneFrame { scene } => {
            store.set_scene_frame(scene);
            CommandResponse::ok()
        }

        SceneCommand::LoadScene { scene } => {
            store.load_document(scene);
            CommandResponse::ok()
        }

        SceneCommand::Undo => {
            let success = store.undo();
            CommandResponse::ok_with_data(json!({ "undone": success }))
        }

        SceneCommand::Redo => {
            let success = store.redo();
            CommandResponse::ok_with_data(json!({ "redone": success }))
        }

        SceneCommand::Inspect => CommandResponse::ok_with_data(inspect(store)),

        SceneCommand::ExportScene => match store.export_json() {
            Ok(json) => CommandResponse::ok_with_data(json!({ "scene_json": json })),
            Err(e) => CommandResponse::err(e.to_string()),
        },
    }
}

fn inspect(store: &SceneStore) -> Value {
    let objects: Vec<Value> = store
        .objects()
        .iter()
        .map(|o| {
            json!({
                "id": o.id,
                "name": model_display_name(o),
                "type": o.kind.as_str(),
                "position": o.position,
                "observation": o.is_observation_model,
                "live": store.live_handle(&o.id).is_some(),
            })
        })
        .collect();
    let points: Vec<Value> = store
        .observation_points()
        .iter()
        .enumerate()
        .map(|(i, p)| {
            json!({
                "id": p.id,
                "title": observation_display_name(p, i),
                "captured": p.is_captured(),
            })
        })
        .collect();
    let selection = match store.selection() {
        Selection::None => Value::Null,
        Selection::Object(o) => json!({ "object": o.id }),
        Selection::Observation(p) => json!({ "observation": p.id }),
    };
    let preview = store.preview();

    json!({
        "version": store.version(),
        "object_count": objects.len(),
        "objects": objects,
        "observation_point_count": points.len(),
        "observation_points": points,
        "cesium_ion_asset_count": store.cesium_ion_assets().len(),
        "selection": selection,
        "preview": {
            "active": preview.active,
            "index": preview.index,
            "capturing_pov": preview.capturing_pov,
        },
        "can_undo": store.can_undo(),
        "can_redo": store.can_redo(),
    })
}

/// Parse and execute a single JSON command string.
pub fn execute_json(store: &mut SceneStore, json: &str) -> Result<CommandResponse, String> {
    let cmd: SceneCommand =
        serde_json::from_str(json).map_err(|e| format!("Invalid command JSON: {e}"))?;
    Ok(execute_command(store, cmd))
}

/// Parse and execute multiple JSON commands (array).
pub fn execute_json_batch(
    store: &mut SceneStore,
    json: &str,
) -> Result<Vec<CommandResponse>, String> {
    let cmds: Vec<SceneCommand> =
        serde_json::from_str(json).map_err(|e| format!("Invalid commands JSON: {e}"))?;
    Ok(cmds
        .into_iter()
        .map(|cmd| execute_command(store, cmd))
        .collect())
}
