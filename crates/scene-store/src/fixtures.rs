//! Factory functions for creating test data.
//!
//! Provides helpers to construct `ModelRecord`, `ObservationPoint`,
//! `SceneDocument` and friends for tests and command scripts.

use shared::*;

// ── Object factories ────────────────────────────────────────────

/// Plain mesh model named after its id, at the origin.
pub fn model(id: &str) -> ModelRecord {
    ModelRecord {
        name: id.to_uppercase(),
        url: Some(format!("models/{id}.glb")),
        ..ModelRecord::new(id)
    }
}

/// Mesh model at a specific position.
pub fn model_at(id: &str, pos: Vec3Array) -> ModelRecord {
    ModelRecord {
        position: pos,
        ..model(id)
    }
}

/// Object backed by a Cesium Ion asset.
pub fn ion_model(id: &str, kind: ModelKind, asset_id: &str) -> ModelRecord {
    ModelRecord {
        name: format!("Ion {asset_id}"),
        kind,
        asset_id: Some(asset_id.to_string()),
        ..ModelRecord::new(id)
    }
}

// ── Ion asset list ──────────────────────────────────────────────

/// Ion list entry for `asset_id`.
pub fn ion_asset(asset_id: &str) -> CesiumIonAsset {
    CesiumIonAsset {
        id: format!("ion-{asset_id}"),
        name: format!("Asset {asset_id}"),
        asset_id: asset_id.to_string(),
        url: None,
    }
}

// ── Observation points ──────────────────────────────────────────

/// Uncaptured point titled after its id.
pub fn observation_point(id: ObservationId) -> ObservationPoint {
    ObservationPoint {
        title: format!("Point {id}"),
        ..ObservationPoint::new(id)
    }
}

/// Point with a captured camera pose.
pub fn captured_point(id: ObservationId, position: Vec3Array, target: Vec3Array) -> ObservationPoint {
    ObservationPoint {
        position: Some(position),
        target: Some(target),
        ..observation_point(id)
    }
}

// ── Documents ───────────────────────────────────────────────────

/// Small scene: two models, one Ion tileset with its asset entry and three points.
pub fn scene_document() -> SceneDocument {
    let mut lamp = model_at("lamp", [2.0, 0.0, -3.0]);
    lamp.extra
        .insert("opacity".to_string(), serde_json::json!(0.8));

    SceneDocument {
        objects: vec![
            model("house"),
            lamp,
            ion_model("city", ModelKind::CesiumIonTileset, "96188"),
        ],
        observation_points: vec![
            captured_point(1, [0.0, 10.0, 30.0], [0.0, 0.0, 0.0]),
            captured_point(2, [30.0, 10.0, 0.0], [0.0, 0.0, 0.0]),
            observation_point(3),
        ],
        cesium_ion_assets: vec![ion_asset("96188")],
        ..SceneDocument::default()
    }
}
