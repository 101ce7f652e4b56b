//! Placed object operations

use std::sync::Arc;

use glam::DVec3;
use serde_json::Value;
use shared::{CesiumIonAsset, ModelId, ModelRecord};

use super::model_defaults::{create_new_model, ModelDraft};
use super::object_updates::{update_object_in_array, ObjectUpdate, TransformKind, UpdateError};
use super::SceneStore;
use crate::state::engine::to_array;
use crate::state::live::LiveModelHandle;
use crate::state::selection::Selection;

impl SceneStore {
    /// Replace the whole object list (scene load)
    pub fn set_objects(&mut self, objects: Vec<ModelRecord>) {
        self.objects = Self::into_entries(objects);
        self.prune_live_handles();
        self.refresh_selection();
        self.version += 1;
    }

    /// Create a model from a draft, placed with the registered camera and scene frame
    pub fn add_model(&mut self, draft: ModelDraft) -> ModelId {
        self.save_undo();

        let model = create_new_model(
            draft,
            self.engine.scene.as_ref(),
            self.engine.camera.as_ref(),
            self.settings.spawn_distance,
        );
        let id = model.id.clone();
        tracing::debug!("add model {id} at {:?}", model.position);
        self.objects.push(Arc::new(model));

        self.version += 1;
        id
    }

    /// Select an object; an unknown id clears the selection
    pub fn select_object(&mut self, id: &str) {
        self.selection = self
            .object(id)
            .map(|o| Selection::Object(Arc::clone(o)))
            .unwrap_or_default();
        self.version += 1;
    }

    /// Clear an object selection
    pub fn deselect_object(&mut self) {
        if self.selection.object().is_some() {
            self.selection = Selection::None;
            self.version += 1;
        }
    }

    /// Remove an object by ID.
    ///
    /// Removing a Cesium Ion object also drops the Ion asset entries sharing its `assetId`.
    pub fn remove_object(&mut self, id: &str) -> bool {
        let Some(index) = self.objects.iter().position(|o| o.id == id) else {
            tracing::debug!("remove_object: no object {id}");
            return false;
        };

        self.save_undo();

        let removed = self.objects.remove(index);
        if removed.kind.is_cesium_ion() {
            if let Some(asset_id) = &removed.asset_id {
                let before = self.cesium_ion_assets.len();
                self.cesium_ion_assets.retain(|a| &a.asset_id != asset_id);
                tracing::debug!(
                    "dropped {} Ion asset(s) for {asset_id}",
                    before - self.cesium_ion_assets.len()
                );
            }
        }
        if self.selection.is_object(id) {
            self.selection = Selection::None;
        }
        self.live.remove(id);

        self.version += 1;
        true
    }

    /// Set a property by dotted path.
    ///
    /// A path or value that does not resolve changes nothing. An unknown id is
    /// not an error.
    pub fn update_object_property(
        &mut self,
        id: &str,
        property: &str,
        value: Value,
    ) -> Result<(), UpdateError> {
        let update = ObjectUpdate::parse(property, value).inspect_err(|e| {
            tracing::warn!("rejected update of {property} on {id}: {e}");
        })?;
        self.apply_object_update(id, &update);
        Ok(())
    }

    /// Apply a resolved update; returns false for an unknown id
    pub fn apply_object_update(&mut self, id: &str, update: &ObjectUpdate) -> bool {
        if !self.contains_object(id) {
            tracing::debug!("update: no object {id}");
            return false;
        }

        self.save_undo();
        self.objects = update_object_in_array(&self.objects, id, update);
        self.refresh_selection();
        self.version += 1;
        true
    }

    /// Attach, replace or detach the live engine object of a model
    pub fn update_model_ref(&mut self, id: &str, handle: Option<LiveModelHandle>) {
        if !self.contains_object(id) {
            return;
        }
        match handle {
            Some(h) => {
                self.live.insert(id.to_string(), h);
            }
            None => {
                self.live.remove(id);
            }
        }
        self.version += 1;
    }

    /// Save undo state once at the beginning of a gizmo drag
    pub fn begin_transform(&mut self) {
        self.save_undo();
        self.version += 1;
    }

    pub fn set_model_position(&mut self, id: &str, position: DVec3) {
        self.set_transform(id, TransformKind::Position, position);
    }

    pub fn set_model_rotation(&mut self, id: &str, rotation: DVec3) {
        self.set_transform(id, TransformKind::Rotation, rotation);
    }

    pub fn set_model_scale(&mut self, id: &str, scale: DVec3) {
        self.set_transform(id, TransformKind::Scale, scale);
    }

    /// Drag updates skip the undo stack; `begin_transform` records one snapshot per drag
    fn set_transform(&mut self, id: &str, kind: TransformKind, v: DVec3) {
        if !self.contains_object(id) {
            return;
        }
        let update = ObjectUpdate::Transform(kind, to_array(v));
        self.objects = update_object_in_array(&self.objects, id, &update);
        self.refresh_selection();
        self.version += 1;
    }

    /// Move the object at `start` to `end`. Out-of-range indices are ignored.
    pub fn reorder_objects(&mut self, start: usize, end: usize) {
        let len = self.objects.len();
        if start >= len || end >= len || start == end {
            return;
        }

        self.save_undo();
        let item = self.objects.remove(start);
        self.objects.insert(end, item);
        self.refresh_selection();
        self.version += 1;
    }

    /// Replace the Cesium Ion asset list (scene load)
    pub fn set_cesium_ion_assets(&mut self, assets: Vec<CesiumIonAsset>) {
        self.cesium_ion_assets = assets;
        self.version += 1;
    }

    pub fn add_cesium_ion_asset(&mut self, asset: CesiumIonAsset) {
        self.save_undo();
        self.cesium_ion_assets.push(asset);
        self.version += 1;
    }
}
