//! Display helper functions for objects and observation points

use shared::{ModelKind, ModelRecord, ObservationPoint};

/// Get display name for an object
pub fn model_display_name(model: &ModelRecord) -> String {
    if model.name.is_empty() {
        format!("{} ({})", model_kind_label(&model.kind), short_id(&model.id))
    } else {
        format!("{} ({})", model.name, short_id(&model.id))
    }
}

/// Human-readable label for a model kind
pub fn model_kind_label(kind: &ModelKind) -> &str {
    match kind {
        ModelKind::Model => "Model",
        ModelKind::CesiumIonTileset => "Ion Tileset",
        ModelKind::CesiumIonAsset => "Ion Asset",
        ModelKind::Custom(other) => other,
    }
}

/// Title of an observation point, or its 1-based position when untitled
pub fn observation_display_name(point: &ObservationPoint, index: usize) -> String {
    if point.title.is_empty() {
        format!("Observation Point {}", index + 1)
    } else {
        point.title.clone()
    }
}

/// Get shortened ID (first 8 characters)
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}
