//! Observation point operations and preview cycling

use serde::{Deserialize, Deserializer, Serialize};
use shared::{ObservationId, ObservationPoint, Vec3Array};

use super::SceneStore;
use crate::state::engine::to_array;
use crate::state::selection::Selection;

/// Partial update of an observation point.
///
/// `position` / `target` distinguish "leave alone" (`None`) from "clear" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservationPointPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub position: Option<Option<Vec3Array>>,
    #[serde(
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub target: Option<Option<Vec3Array>>,
}

fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

impl ObservationPointPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.position.is_none()
            && self.target.is_none()
    }

    fn apply(&self, point: &mut ObservationPoint) {
        if let Some(title) = &self.title {
            point.title = title.clone();
        }
        if let Some(description) = &self.description {
            point.description = description.clone();
        }
        if let Some(position) = self.position {
            point.position = position;
        }
        if let Some(target) = self.target {
            point.target = target;
        }
    }
}

impl SceneStore {
    /// Replace the observation point list (scene load)
    pub fn set_observation_points(&mut self, points: Vec<ObservationPoint>) {
        if let Some(max) = points.iter().map(|p| p.id).max() {
            self.last_observation_id = self.last_observation_id.max(max);
        }
        self.observation_points = points;
        self.refresh_selection();
        self.clamp_preview_index();
        self.version += 1;
    }

    /// Time-based id, strictly greater than every id seen so far. Once ids
    /// reach `i64::MAX` the lowest positive id not in use is handed out.
    fn next_observation_id(&mut self) -> ObservationId {
        let Some(next) = self.last_observation_id.checked_add(1) else {
            let id = self.lowest_unused_observation_id();
            tracing::warn!("observation ids exhausted, reusing {id}");
            return id;
        };
        let id = chrono::Utc::now().timestamp_millis().max(next);
        self.last_observation_id = id;
        id
    }

    fn lowest_unused_observation_id(&self) -> ObservationId {
        let mut used: Vec<ObservationId> = self
            .observation_points
            .iter()
            .map(|p| p.id)
            .filter(|id| *id > 0)
            .collect();
        used.sort_unstable();
        used.dedup();

        let mut candidate = 1;
        for id in used {
            if id != candidate {
                break;
            }
            candidate += 1;
        }
        candidate
    }

    /// Append an empty, uncaptured point, select it and move the cursor onto it
    pub fn add_observation_point(&mut self) -> ObservationId {
        self.save_undo();

        let point = ObservationPoint::new(self.next_observation_id());
        let id = point.id;
        self.selection = Selection::Observation(point.clone());
        self.observation_points.push(point);
        self.preview.index = self.observation_points.len() - 1;

        self.version += 1;
        id
    }

    /// Select an observation point (or nothing); always clears an object selection
    pub fn select_observation(&mut self, id: Option<ObservationId>) {
        self.selection = id
            .and_then(|id| self.observation_point(id))
            .map(|p| Selection::Observation(p.clone()))
            .unwrap_or_default();
        self.version += 1;
    }

    /// Merge `patch` into a point; returns false for an unknown id
    pub fn update_observation_point(
        &mut self,
        id: ObservationId,
        patch: &ObservationPointPatch,
    ) -> bool {
        let Some(index) = self.observation_points.iter().position(|p| p.id == id) else {
            tracing::debug!("update_observation_point: no point {id}");
            return false;
        };

        self.save_undo();
        patch.apply(&mut self.observation_points[index]);
        self.refresh_selection();
        self.version += 1;
        true
    }

    /// Remove a point. The preview cursor keeps pointing at the same point
    /// when possible and is clamped into the shortened list.
    pub fn delete_observation_point(&mut self, id: ObservationId) -> bool {
        let Some(index) = self.observation_points.iter().position(|p| p.id == id) else {
            return false;
        };

        self.save_undo();
        self.observation_points.remove(index);
        if self.selection.is_observation(id) {
            self.selection = Selection::None;
        }
        if index < self.preview.index {
            self.preview.index -= 1;
        }
        self.clamp_preview_index();

        self.version += 1;
        true
    }

    pub fn set_capturing_pov(&mut self, capturing: bool) {
        self.preview.capturing_pov = capturing;
        self.version += 1;
    }

    /// Store the current camera eye and target on a point and leave capture mode
    pub fn capture_pov(&mut self, id: ObservationId) -> bool {
        let Some(camera) = self.engine.camera else {
            tracing::warn!("capture_pov: no camera registered");
            return false;
        };
        let Some(index) = self.observation_points.iter().position(|p| p.id == id) else {
            return false;
        };

        self.save_undo();
        let point = &mut self.observation_points[index];
        point.position = Some(to_array(camera.eye));
        point.target = Some(to_array(camera.target));
        self.preview.capturing_pov = false;
        self.refresh_selection();
        self.version += 1;
        true
    }

    pub fn start_preview(&mut self) {
        self.preview.active = true;
        self.preview.index = 0;
        self.version += 1;
    }

    pub fn exit_preview(&mut self) {
        self.preview.active = false;
        self.preview.index = 0;
        self.version += 1;
    }

    /// Step the cursor forward; no-op on the last point or an empty list
    pub fn next_observation(&mut self) -> bool {
        let next = self.preview.index + 1;
        if next >= self.observation_points.len() {
            return false;
        }
        self.move_preview_to(next);
        true
    }

    /// Step the cursor back; no-op on the first point or an empty list
    pub fn prev_observation(&mut self) -> bool {
        if self.preview.index == 0 || self.observation_points.is_empty() {
            return false;
        }
        let prev = (self.preview.index - 1).min(self.observation_points.len() - 1);
        self.move_preview_to(prev);
        true
    }

    fn move_preview_to(&mut self, index: usize) {
        self.preview.index = index;
        self.selection = Selection::Observation(self.observation_points[index].clone());
        self.version += 1;
    }
}
