//! Store settings

use serde::{Deserialize, Serialize};

/// Tunables of the scene store, persisted as `settings.json` in the user config dir
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Distance in front of the camera at which new models spawn
    pub spawn_distance: f64,
    /// Maximum number of undo snapshots kept
    pub undo_depth: usize,
    /// `klorad-scene` writes the scene to the autosave file before exiting
    pub autosave: bool,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            spawn_distance: 10.0,
            undo_depth: 100,
            autosave: false,
        }
    }
}

impl StoreSettings {
    fn config_path() -> Option<std::path::PathBuf> {
        directories::ProjectDirs::from("com", "klorad", "klorad-scene")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load settings from file, or return default if not found
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed settings in {}: {e}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save settings to file
    pub fn save(&self) {
        if let Some(path) = Self::config_path() {
            if let Some(dir) = path.parent() {
                if let Err(e) = std::fs::create_dir_all(dir) {
                    tracing::warn!("Cannot create config dir {}: {e}", dir.display());
                    return;
                }
            }
            match serde_json::to_string_pretty(self) {
                Ok(json) => {
                    if let Err(e) = std::fs::write(&path, json) {
                        tracing::warn!("Cannot write settings to {}: {e}", path.display());
                    }
                }
                Err(e) => tracing::warn!("Cannot serialize settings: {e}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_json() {
        let s: StoreSettings = serde_json::from_str(r#"{"undo_depth": 5}"#).unwrap();
        assert_eq!(s.undo_depth, 5);
        assert_eq!(s.spawn_distance, 10.0);
        assert!(!s.autosave);
    }
}
