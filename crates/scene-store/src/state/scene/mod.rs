//! Scene state management
//!
//! `SceneStore` owns the placed objects, the Cesium Ion asset list, the
//! observation points, the selection and the preview cursor. Every mutation goes
//! through the `*_ops` methods, which replace changed entries and leave every
//! other `Arc<ModelRecord>` untouched.

mod display;
mod history;
mod model_defaults;
mod object_ops;
mod object_updates;
mod observation_ops;
mod persistence;

pub use display::{model_display_name, model_kind_label, observation_display_name, short_id};
pub use model_defaults::{
    create_default_iot_properties, create_default_observation_properties, create_new_model,
    spawn_position, ModelDraft,
};
pub use object_updates::{
    apply_update, update_object_in_array, IotField, ObjectUpdate, ObservationField,
    TransformKind, UpdateError,
};
pub use observation_ops::ObservationPointPatch;
pub use persistence::PersistenceError;

use std::collections::HashMap;
use std::sync::Arc;

use shared::{CesiumIonAsset, ModelId, ModelRecord, ObservationId, ObservationPoint};

use super::engine::{CameraPose, EngineContext, SceneFrame};
use super::live::LiveModelHandle;
use super::selection::Selection;
use super::settings::StoreSettings;
use history::Snapshot;

/// Observation preview cursor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreviewState {
    /// Stepping through observation points
    pub active: bool,
    /// Index into the observation point list
    pub index: usize,
    /// The UI is waiting to capture a camera point of view
    pub capturing_pov: bool,
}

/// Scene state with objects, observation points, selection and undo/redo history
#[derive(Default)]
pub struct SceneStore {
    pub(crate) objects: Vec<Arc<ModelRecord>>,
    pub(crate) cesium_ion_assets: Vec<CesiumIonAsset>,
    pub(crate) observation_points: Vec<ObservationPoint>,
    pub(crate) selection: Selection,
    pub(crate) preview: PreviewState,
    /// Live engine objects by model id (never persisted)
    pub(crate) live: HashMap<ModelId, LiveModelHandle>,
    pub(crate) engine: EngineContext,
    pub(crate) settings: StoreSettings,
    pub(crate) undo_stack: Vec<Snapshot>,
    pub(crate) redo_stack: Vec<Snapshot>,
    /// Monotonically increasing version counter for change detection
    pub(crate) version: u64,
    /// Highest observation id handed out or loaded
    pub(crate) last_observation_id: ObservationId,
}

impl SceneStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: StoreSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Current store version (increments on every mutation)
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    pub fn objects(&self) -> &[Arc<ModelRecord>] {
        &self.objects
    }

    /// Get an object by ID
    pub fn object(&self, id: &str) -> Option<&Arc<ModelRecord>> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn cesium_ion_assets(&self) -> &[CesiumIonAsset] {
        &self.cesium_ion_assets
    }

    pub fn observation_points(&self) -> &[ObservationPoint] {
        &self.observation_points
    }

    /// Get an observation point by ID
    pub fn observation_point(&self, id: ObservationId) -> Option<&ObservationPoint> {
        self.observation_points.iter().find(|p| p.id == id)
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selected_object(&self) -> Option<&Arc<ModelRecord>> {
        self.selection.object()
    }

    pub fn selected_observation(&self) -> Option<&ObservationPoint> {
        self.selection.observation()
    }

    pub fn preview(&self) -> PreviewState {
        self.preview
    }

    pub fn preview_mode(&self) -> bool {
        self.preview.active
    }

    pub fn preview_index(&self) -> usize {
        self.preview.index
    }

    pub fn is_capturing_pov(&self) -> bool {
        self.preview.capturing_pov
    }

    /// Live engine object registered for a model
    pub fn live_handle(&self, id: &str) -> Option<&LiveModelHandle> {
        self.live.get(id)
    }

    pub fn camera(&self) -> Option<&CameraPose> {
        self.engine.camera.as_ref()
    }

    pub fn scene_frame(&self) -> Option<&SceneFrame> {
        self.engine.scene.as_ref()
    }

    /// Register the engine camera used for spawning and POV capture
    pub fn set_camera(&mut self, camera: Option<CameraPose>) {
        self.engine.camera = camera;
    }

    /// Register the scene frame used for spawning
    pub fn set_scene_frame(&mut self, scene: Option<SceneFrame>) {
        self.engine.scene = scene;
    }

    /// Wrap loaded records, dropping keys that would shadow typed fields
    pub(crate) fn into_entries(objects: Vec<ModelRecord>) -> Vec<Arc<ModelRecord>> {
        objects
            .into_iter()
            .map(|mut o| {
                o.strip_reserved_extra();
                Arc::new(o)
            })
            .collect()
    }

    pub(crate) fn contains_object(&self, id: &str) -> bool {
        self.objects.iter().any(|o| o.id == id)
    }

    /// Point the selection at the current entries with the same id
    pub(crate) fn refresh_selection(&mut self) {
        self.selection = self
            .selection
            .resolve(&self.objects, &self.observation_points);
    }

    /// Keep the preview cursor inside the observation list
    pub(crate) fn clamp_preview_index(&mut self) {
        let last = self.observation_points.len().saturating_sub(1);
        self.preview.index = self.preview.index.min(last);
    }

    /// Drop live handles whose object is gone
    pub(crate) fn prune_live_handles(&mut self) {
        let objects = &self.objects;
        self.live
            .retain(|id, _| objects.iter().any(|o| &o.id == id));
    }

    /// Save current state to undo stack
    pub(crate) fn save_undo(&mut self) {
        self.undo_stack.push(Snapshot::capture(self));
        if self.undo_stack.len() > self.settings.undo_depth {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }
}
