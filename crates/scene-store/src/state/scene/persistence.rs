//! Scene documents, JSON export and autosave

use std::path::{Path, PathBuf};

use shared::{ModelRecord, SceneDocument};

use super::{PreviewState, SceneStore};
use crate::state::selection::Selection;

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scene JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no per-user data directory available")]
    NoDataDir,
}

impl SceneStore {
    fn autosave_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "klorad", "klorad-scene")
            .map(|dirs| dirs.data_dir().join("autosave.json"))
    }

    /// Persistable view of the scene. Live handles live outside the records,
    /// so the document never carries them.
    pub fn document(&self) -> SceneDocument {
        SceneDocument {
            objects: self.objects.iter().map(|o| ModelRecord::clone(o)).collect(),
            observation_points: self.observation_points.clone(),
            cesium_ion_assets: self.cesium_ion_assets.clone(),
            ..SceneDocument::default()
        }
    }

    /// Replace the whole scene. Selection, preview and history start fresh.
    pub fn load_document(&mut self, doc: SceneDocument) {
        tracing::info!(
            "Loading scene: {} objects, {} observation points",
            doc.objects.len(),
            doc.observation_points.len()
        );
        self.objects = Self::into_entries(doc.objects);
        self.cesium_ion_assets = doc.cesium_ion_assets;
        self.last_observation_id = doc
            .observation_points
            .iter()
            .map(|p| p.id)
            .max()
            .unwrap_or(0)
            .max(self.last_observation_id);
        self.observation_points = doc.observation_points;
        self.selection = Selection::None;
        self.preview = PreviewState::default();
        self.prune_live_handles();
        self.clear_history();
        self.version += 1;
    }

    pub fn export_json(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string_pretty(&self.document())?)
    }

    pub fn load_json(&mut self, json: &str) -> Result<(), PersistenceError> {
        let doc: SceneDocument = serde_json::from_str(json)?;
        self.load_document(doc);
        Ok(())
    }

    /// Write the scene document to `path`
    pub fn save_to(&self, path: &Path) -> Result<(), PersistenceError> {
        let json = self.export_json()?;
        std::fs::write(path, json).map_err(|source| PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read a scene document from `path` without touching the store
    pub fn read_document(path: &Path) -> Result<SceneDocument, PersistenceError> {
        let json = std::fs::read_to_string(path).map_err(|source| PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Save scene to autosave file
    pub fn autosave(&self) {
        let Some(path) = Self::autosave_path() else {
            tracing::warn!("Autosave skipped: {}", PersistenceError::NoDataDir);
            return;
        };
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!("Cannot create data dir {}: {e}", parent.display());
                return;
            }
        }
        match self.save_to(&path) {
            Ok(()) => tracing::debug!("Autosaved to {}", path.display()),
            Err(e) => tracing::warn!("Autosave failed: {e}"),
        }
    }

    /// Load scene from autosave file; `Ok(None)` when there is none yet
    pub fn load_autosave() -> Result<Option<SceneDocument>, PersistenceError> {
        let path = Self::autosave_path().ok_or(PersistenceError::NoDataDir)?;
        if !path.exists() {
            return Ok(None);
        }
        Self::read_document(&path).map(Some)
    }

    /// Check if autosave file exists
    pub fn has_autosave() -> bool {
        Self::autosave_path()
            .map(|p| p.exists())
            .unwrap_or(false)
    }
}
