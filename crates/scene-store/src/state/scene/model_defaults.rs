//! Construction of new placed objects

use serde::{Deserialize, Serialize};
use shared::{
    ExtraProperties, IotProperties, ModelKind, ModelRecord, ObservationProperties, Vec3Array,
};

use crate::state::engine::{ray_ground, to_array, CameraPose, SceneFrame};

/// Caller-supplied fields of a model about to be added.
///
/// Anything left `None` gets its default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelDraft {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<ModelKind>,
    pub url: Option<String>,
    pub position: Option<Vec3Array>,
    pub rotation: Option<Vec3Array>,
    pub scale: Option<Vec3Array>,
    pub is_observation_model: Option<bool>,
    pub observation_properties: Option<ObservationProperties>,
    pub iot_properties: Option<IotProperties>,
    pub asset_id: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraProperties,
}

impl ModelDraft {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn at(mut self, position: Vec3Array) -> Self {
        self.position = Some(position);
        self
    }

    pub fn kind(mut self, kind: ModelKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn asset_id(mut self, asset_id: impl Into<String>) -> Self {
        self.asset_id = Some(asset_id.into());
        self
    }
}

/// Default sensor settings for a freshly enabled observation model
pub fn create_default_observation_properties() -> ObservationProperties {
    ObservationProperties::default()
}

/// Default live-data settings for a freshly enabled IoT overlay
pub fn create_default_iot_properties() -> IotProperties {
    IotProperties::default()
}

/// Where a model placed in front of the camera should appear.
///
/// The view ray is intersected with the scene's ground plane; a hit closer
/// than `distance` wins, otherwise the point `distance` along the ray is used.
pub fn spawn_position(
    camera: Option<&CameraPose>,
    scene: Option<&SceneFrame>,
    distance: f64,
) -> Vec3Array {
    let Some(ray) = camera.and_then(CameraPose::view_ray) else {
        return [0.0; 3];
    };
    let t = scene
        .and_then(|frame| ray_ground(&ray, frame.ground_height))
        .filter(|t| *t <= distance)
        .unwrap_or(distance);
    to_array(ray.at(t))
}

/// Build a complete record with a fresh id from a draft
pub fn create_new_model(
    draft: ModelDraft,
    scene: Option<&SceneFrame>,
    camera: Option<&CameraPose>,
    spawn_distance: f64,
) -> ModelRecord {
    let mut model = ModelRecord::new(uuid::Uuid::new_v4().to_string());

    model.position = draft
        .position
        .unwrap_or_else(|| spawn_position(camera, scene, spawn_distance));
    if let Some(rotation) = draft.rotation {
        model.rotation = rotation;
    }
    if let Some(scale) = draft.scale {
        model.scale = scale;
    }
    if let Some(name) = draft.name {
        model.name = name;
    }
    if let Some(kind) = draft.kind {
        model.kind = kind;
    }
    model.url = draft.url;
    model.asset_id = draft.asset_id;
    model.iot_properties = draft.iot_properties;
    model.is_observation_model = draft.is_observation_model.unwrap_or(false);
    model.observation_properties = match draft.observation_properties {
        Some(props) => Some(props),
        None if model.is_observation_model => Some(create_default_observation_properties()),
        None => None,
    };
    model.extra = draft.extra;
    model.strip_reserved_extra();
    model
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::DVec3;

    #[test]
    fn test_defaults_without_camera() {
        let m = create_new_model(ModelDraft::default(), None, None, 10.0);
        assert!(!m.id.is_empty());
        assert_eq!(m.position, [0.0, 0.0, 0.0]);
        assert_eq!(m.rotation, [0.0, 0.0, 0.0]);
        assert_eq!(m.scale, [1.0, 1.0, 1.0]);
        assert_eq!(m.kind, ModelKind::Model);
        assert!(m.observation_properties.is_none());
        assert!(m.iot_properties.is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        let a = create_new_model(ModelDraft::default(), None, None, 10.0);
        let b = create_new_model(ModelDraft::default(), None, None, 10.0);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_spawn_in_front_of_camera() {
        let cam = CameraPose::new(DVec3::new(0.0, 5.0, 20.0), DVec3::new(0.0, 5.0, 0.0));
        let m = create_new_model(ModelDraft::default(), None, Some(&cam), 10.0);
        assert_relative_eq!(m.position[0], 0.0);
        assert_relative_eq!(m.position[1], 5.0);
        assert_relative_eq!(m.position[2], 10.0);
    }

    #[test]
    fn test_spawn_on_ground_when_closer() {
        // Looking straight down from 4 units above the ground
        let cam = CameraPose::new(DVec3::new(1.0, 4.0, 2.0), DVec3::new(1.0, 0.0, 2.0));
        let frame = SceneFrame { ground_height: 0.0 };
        let pos = spawn_position(Some(&cam), Some(&frame), 10.0);
        assert_relative_eq!(pos[0], 1.0);
        assert_relative_eq!(pos[1], 0.0);
        assert_relative_eq!(pos[2], 2.0);
    }

    #[test]
    fn test_spawn_ignores_distant_ground() {
        let cam = CameraPose::new(DVec3::new(0.0, 100.0, 0.0), DVec3::new(0.0, 0.0, 0.0));
        let frame = SceneFrame { ground_height: 0.0 };
        let pos = spawn_position(Some(&cam), Some(&frame), 10.0);
        assert_relative_eq!(pos[1], 90.0);
    }

    #[test]
    fn test_explicit_position_wins() {
        let cam = CameraPose::new(DVec3::new(0.0, 0.0, 20.0), DVec3::ZERO);
        let m = create_new_model(ModelDraft::default().at([7.0, 8.0, 9.0]), None, Some(&cam), 10.0);
        assert_eq!(m.position, [7.0, 8.0, 9.0]);
    }

    #[test]
    fn test_observation_draft_materializes_defaults() {
        let draft = ModelDraft {
            is_observation_model: Some(true),
            ..ModelDraft::default()
        };
        let m = create_new_model(draft, None, None, 10.0);
        assert!(m.is_observation_model);
        assert_eq!(m.observation_properties, Some(ObservationProperties::default()));
    }

    #[test]
    fn test_draft_cannot_force_id_or_ref() {
        let draft: ModelDraft =
            serde_json::from_str(r#"{"id": "forced", "ref": {"mesh": 1}, "label": "L"}"#).unwrap();
        let m = create_new_model(draft, None, None, 10.0);
        assert_ne!(m.id, "forced");
        assert!(m.extra.get("id").is_none());
        assert!(m.extra.get("ref").is_none());
        assert_eq!(m.extra["label"], "L");
    }

    #[test]
    fn test_draft_from_json() {
        let draft: ModelDraft = serde_json::from_str(
            r#"{"name": "Tower", "type": "cesiumIonAsset", "assetId": "A1", "opacity": 0.4}"#,
        )
        .unwrap();
        let m = create_new_model(draft, None, None, 10.0);
        assert_eq!(m.name, "Tower");
        assert_eq!(m.kind, ModelKind::CesiumIonAsset);
        assert_eq!(m.asset_id.as_deref(), Some("A1"));
        assert_eq!(m.extra["opacity"], 0.4);
    }
}
