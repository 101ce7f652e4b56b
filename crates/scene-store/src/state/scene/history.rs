//! Undo/redo functionality

use std::sync::Arc;

use shared::{CesiumIonAsset, ModelRecord, ObservationPoint};

use super::SceneStore;

/// Persisted lists at one point in time.
///
/// Objects are `Arc` clones, so taking a snapshot never deep-copies a record.
#[derive(Clone)]
pub(crate) struct Snapshot {
    objects: Vec<Arc<ModelRecord>>,
    cesium_ion_assets: Vec<CesiumIonAsset>,
    observation_points: Vec<ObservationPoint>,
}

impl Snapshot {
    pub(crate) fn capture(store: &SceneStore) -> Self {
        Self {
            objects: store.objects.clone(),
            cesium_ion_assets: store.cesium_ion_assets.clone(),
            observation_points: store.observation_points.clone(),
        }
    }

    fn restore(self, store: &mut SceneStore) {
        store.objects = self.objects;
        store.cesium_ion_assets = self.cesium_ion_assets;
        store.observation_points = self.observation_points;
        store.refresh_selection();
        store.clamp_preview_index();
        store.version += 1;
    }
}

impl SceneStore {
    /// Undo last change
    pub fn undo(&mut self) -> bool {
        let Some(prev) = self.undo_stack.pop() else {
            return false;
        };
        self.redo_stack.push(Snapshot::capture(self));
        prev.restore(self);
        tracing::debug!("undo ({} left)", self.undo_stack.len());
        true
    }

    /// Redo last undone change
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        self.undo_stack.push(Snapshot::capture(self));
        next.restore(self);
        tracing::debug!("redo ({} left)", self.redo_stack.len());
        true
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Forget all undo/redo snapshots
    pub fn clear_history(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
