//! Persisted scene document shared between the scene store and the backend.
//!
//! Everything in this crate is plain serializable data. Field names follow the
//! camelCase layout of the saved scene JSON.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Unique identifier of a placed object
pub type ModelId = String;

/// Identifier of an observation point (Unix milliseconds at creation)
pub type ObservationId = i64;

/// Plain x/y/z triple as stored in the scene document
pub type Vec3Array = [f64; 3];

/// Free-form properties the typed model does not name
pub type ExtraProperties = Map<String, Value>;

fn unit_scale() -> Vec3Array {
    [1.0, 1.0, 1.0]
}

fn default_document_version() -> u32 {
    1
}

// ============================================================================
// Placed objects
// ============================================================================

/// Discriminator of a placed object.
///
/// Serialized as the bare type string; unknown strings survive as `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ModelKind {
    /// Generic mesh model
    #[default]
    Model,
    /// Cesium Ion 3D tileset
    CesiumIonTileset,
    /// Cesium Ion asset reference
    CesiumIonAsset,
    Custom(String),
}

impl ModelKind {
    pub fn as_str(&self) -> &str {
        match self {
            ModelKind::Model => "model",
            ModelKind::CesiumIonTileset => "cesium-ion-tileset",
            ModelKind::CesiumIonAsset => "cesiumIonAsset",
            ModelKind::Custom(s) => s,
        }
    }

    /// Objects backed by an entry in the Cesium Ion asset list
    pub fn is_cesium_ion(&self) -> bool {
        matches!(self, ModelKind::CesiumIonTileset | ModelKind::CesiumIonAsset)
    }
}

impl From<String> for ModelKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "model" => ModelKind::Model,
            "cesium-ion-tileset" => ModelKind::CesiumIonTileset,
            "cesiumIonAsset" => ModelKind::CesiumIonAsset,
            _ => ModelKind::Custom(s),
        }
    }
}

impl From<&str> for ModelKind {
    fn from(s: &str) -> Self {
        ModelKind::from(s.to_string())
    }
}

impl From<ModelKind> for String {
    fn from(kind: ModelKind) -> Self {
        match kind {
            ModelKind::Custom(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

/// A placed scene object as it is persisted.
///
/// The live rendering-engine object is never part of this record; the store
/// keeps it in a separate map keyed by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRecord {
    pub id: ModelId,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: ModelKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub position: Vec3Array,
    #[serde(default)]
    pub rotation: Vec3Array,
    #[serde(default = "unit_scale")]
    pub scale: Vec3Array,
    #[serde(default)]
    pub is_observation_model: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation_properties: Option<ObservationProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iot_properties: Option<IotProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraProperties,
}

impl ModelRecord {
    /// Record with identity transform and no optional bags
    pub fn new(id: impl Into<ModelId>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            kind: ModelKind::Model,
            url: None,
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: unit_scale(),
            is_observation_model: false,
            observation_properties: None,
            iot_properties: None,
            asset_id: None,
            extra: ExtraProperties::new(),
        }
    }

    /// JSON keys owned by the typed fields
    pub const TYPED_KEYS: &'static [&'static str] = &[
        "id",
        "name",
        "type",
        "url",
        "position",
        "rotation",
        "scale",
        "isObservationModel",
        "observationProperties",
        "iotProperties",
        "assetId",
    ];

    /// Key of the live engine back-reference; never persisted
    pub const TRANSIENT_KEY: &'static str = "ref";

    /// Keys that may not appear in `extra`
    pub fn is_reserved_key(key: &str) -> bool {
        key == Self::TRANSIENT_KEY || Self::TYPED_KEYS.contains(&key)
    }

    /// Drop reserved keys from `extra`. A record with a typed key duplicated
    /// in `extra` serializes to JSON that cannot be read back.
    pub fn strip_reserved_extra(&mut self) {
        self.extra.retain(|key, _| !Self::is_reserved_key(key));
    }
}

// ============================================================================
// Observation (sensor / viewshed) settings
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorType {
    #[default]
    Cone,
    Rectangle,
}

impl SensorType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cone" => Some(SensorType::Cone),
            "rectangle" => Some(SensorType::Rectangle),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisQuality {
    Low,
    #[default]
    Medium,
    High,
}

impl AnalysisQuality {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(AnalysisQuality::Low),
            "medium" => Some(AnalysisQuality::Medium),
            "high" => Some(AnalysisQuality::High),
            _ => None,
        }
    }
}

/// Sensor and viewshed analysis settings of an observation model.
///
/// Missing fields fall back to the defaults, so partially stored bags load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObservationProperties {
    pub sensor_type: SensorType,
    pub analysis_quality: AnalysisQuality,
    /// Cone field of view in degrees
    pub fov: f64,
    /// Horizontal field of view for rectangle sensors
    #[serde(rename = "fovH")]
    pub fov_h: f64,
    /// Vertical field of view for rectangle sensors
    #[serde(rename = "fovV")]
    pub fov_v: f64,
    /// Sensor range in scene units
    pub visibility_radius: f64,
    pub show_sensor_geometry: bool,
    pub show_viewshed: bool,
    pub sensor_color: String,
    pub viewshed_color: String,
    #[serde(flatten)]
    pub extra: ExtraProperties,
}

impl Default for ObservationProperties {
    fn default() -> Self {
        Self {
            sensor_type: SensorType::Cone,
            analysis_quality: AnalysisQuality::Medium,
            fov: 60.0,
            fov_h: 60.0,
            fov_v: 40.0,
            visibility_radius: 500.0,
            show_sensor_geometry: true,
            show_viewshed: false,
            sensor_color: "#00ff00".to_string(),
            viewshed_color: "#0080ff".to_string(),
            extra: ExtraProperties::new(),
        }
    }
}

// ============================================================================
// IoT live-data settings
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayFormat {
    #[default]
    Compact,
    Detailed,
    Minimal,
}

impl DisplayFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "compact" => Some(DisplayFormat::Compact),
            "detailed" => Some(DisplayFormat::Detailed),
            "minimal" => Some(DisplayFormat::Minimal),
            _ => None,
        }
    }
}

/// Live-data overlay settings of an object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IotProperties {
    pub enabled: bool,
    pub service_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_endpoint: Option<String>,
    /// Polling interval in milliseconds
    pub update_interval: u64,
    pub display_format: DisplayFormat,
    pub auto_refresh: bool,
    pub show_in_scene: bool,
    #[serde(flatten)]
    pub extra: ExtraProperties,
}

impl Default for IotProperties {
    fn default() -> Self {
        Self {
            enabled: false,
            service_type: "weather".to_string(),
            api_endpoint: None,
            update_interval: 5000,
            display_format: DisplayFormat::Compact,
            auto_refresh: true,
            show_in_scene: true,
            extra: ExtraProperties::new(),
        }
    }
}

// ============================================================================
// Observation points, Ion assets, document
// ============================================================================

/// Named camera viewpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationPoint {
    pub id: ObservationId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Camera eye, unset until captured
    #[serde(default)]
    pub position: Option<Vec3Array>,
    /// Look-at point, unset until captured
    #[serde(default)]
    pub target: Option<Vec3Array>,
}

impl ObservationPoint {
    pub fn new(id: ObservationId) -> Self {
        Self {
            id,
            title: String::new(),
            description: String::new(),
            position: None,
            target: None,
        }
    }

    /// Both eye and target have been captured
    pub fn is_captured(&self) -> bool {
        self.position.is_some() && self.target.is_some()
    }
}

/// Entry in the scene's Cesium Ion asset list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CesiumIonAsset {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub asset_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Everything the backend stores for one scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDocument {
    #[serde(default = "default_document_version")]
    pub version: u32,
    #[serde(default)]
    pub objects: Vec<ModelRecord>,
    #[serde(default)]
    pub observation_points: Vec<ObservationPoint>,
    #[serde(default)]
    pub cesium_ion_assets: Vec<CesiumIonAsset>,
}

impl Default for SceneDocument {
    fn default() -> Self {
        Self {
            version: default_document_version(),
            objects: Vec::new(),
            observation_points: Vec::new(),
            cesium_ion_assets: Vec::new(),
        }
    }
}

impl SceneDocument {
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty() && self.observation_points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_kind_strings() {
        assert_eq!(ModelKind::from("model"), ModelKind::Model);
        assert_eq!(ModelKind::from("cesium-ion-tileset"), ModelKind::CesiumIonTileset);
        assert_eq!(ModelKind::from("cesiumIonAsset"), ModelKind::CesiumIonAsset);
        assert_eq!(
            ModelKind::from("pointcloud"),
            ModelKind::Custom("pointcloud".to_string())
        );
        assert_eq!(String::from(ModelKind::CesiumIonAsset), "cesiumIonAsset");
    }

    #[test]
    fn test_model_kind_is_cesium_ion() {
        assert!(ModelKind::CesiumIonTileset.is_cesium_ion());
        assert!(ModelKind::CesiumIonAsset.is_cesium_ion());
        assert!(!ModelKind::Model.is_cesium_ion());
        assert!(!ModelKind::Custom("cesium".to_string()).is_cesium_ion());
    }

    #[test]
    fn test_model_record_new_has_identity_transform() {
        let m = ModelRecord::new("m1");
        assert_eq!(m.position, [0.0, 0.0, 0.0]);
        assert_eq!(m.rotation, [0.0, 0.0, 0.0]);
        assert_eq!(m.scale, [1.0, 1.0, 1.0]);
        assert!(m.observation_properties.is_none());
    }

    #[test]
    fn test_model_record_json_layout() {
        let mut m = ModelRecord::new("m1");
        m.kind = ModelKind::CesiumIonAsset;
        m.asset_id = Some("A1".to_string());
        m.is_observation_model = true;
        let json = serde_json::to_value(&m).unwrap();

        assert_eq!(json["type"], "cesiumIonAsset");
        assert_eq!(json["assetId"], "A1");
        assert_eq!(json["isObservationModel"], true);
        assert!(json.get("observationProperties").is_none());
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn test_typed_keys_cover_every_field() {
        let mut m = ModelRecord::new("m1");
        m.url = Some("a.glb".to_string());
        m.asset_id = Some("A1".to_string());
        m.observation_properties = Some(ObservationProperties::default());
        m.iot_properties = Some(IotProperties::default());
        let json = serde_json::to_value(&m).unwrap();

        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), ModelRecord::TYPED_KEYS.len());
        for key in &keys {
            assert!(ModelRecord::is_reserved_key(key), "{key} missing");
        }
        assert!(ModelRecord::is_reserved_key("ref"));
        assert!(!ModelRecord::is_reserved_key("opacity"));
    }

    #[test]
    fn test_strip_reserved_extra() {
        let mut m = ModelRecord::new("m1");
        m.extra.insert("id".to_string(), serde_json::json!({"x": 1}));
        m.extra.insert("ref".to_string(), serde_json::json!({"mesh": 1}));
        m.extra.insert("opacity".to_string(), serde_json::json!(0.5));
        m.strip_reserved_extra();

        let json = serde_json::to_string(&m).unwrap();
        let back: ModelRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, "m1");
        assert_eq!(back.extra.len(), 1);
        assert_eq!(back.extra["opacity"], 0.5);
    }

    #[test]
    fn test_model_record_minimal_json_uses_defaults() {
        let m: ModelRecord = serde_json::from_str(r#"{"id": "x"}"#).unwrap();
        assert_eq!(m.kind, ModelKind::Model);
        assert_eq!(m.scale, [1.0, 1.0, 1.0]);
        assert!(!m.is_observation_model);
        assert!(m.extra.is_empty());
    }

    #[test]
    fn test_model_record_keeps_unknown_properties() {
        let json = r#"{"id": "x", "type": "model", "opacity": 0.5, "material": {"color": "red"}}"#;
        let m: ModelRecord = serde_json::from_str(json).unwrap();
        assert_eq!(m.extra["opacity"], 0.5);
        assert_eq!(m.extra["material"]["color"], "red");

        let back = serde_json::to_value(&m).unwrap();
        assert_eq!(back["opacity"], 0.5);
        assert_eq!(back["material"]["color"], "red");
    }

    #[test]
    fn test_observation_properties_defaults() {
        let p = ObservationProperties::default();
        assert_eq!(p.sensor_type, SensorType::Cone);
        assert_eq!(p.analysis_quality, AnalysisQuality::Medium);
        assert_eq!(p.fov, 60.0);
        assert_eq!(p.visibility_radius, 500.0);

        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["sensorType"], "cone");
        assert_eq!(json["analysisQuality"], "medium");
        assert_eq!(json["fovH"], 60.0);
    }

    #[test]
    fn test_iot_properties_defaults() {
        let p = IotProperties::default();
        assert!(!p.enabled);
        assert_eq!(p.service_type, "weather");
        assert_eq!(p.display_format, DisplayFormat::Compact);
        assert!(p.auto_refresh);

        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["displayFormat"], "compact");
        assert_eq!(json["updateInterval"], 5000);
    }

    #[test]
    fn test_enum_parse_rejects_unknown() {
        assert_eq!(SensorType::parse("rectangle"), Some(SensorType::Rectangle));
        assert_eq!(SensorType::parse("sphere"), None);
        assert_eq!(AnalysisQuality::parse("high"), Some(AnalysisQuality::High));
        assert_eq!(AnalysisQuality::parse("ultra"), None);
        assert_eq!(DisplayFormat::parse("minimal"), Some(DisplayFormat::Minimal));
        assert_eq!(DisplayFormat::parse("fancy"), None);
    }

    #[test]
    fn test_invalid_sensor_type_fails_deserialize() {
        let json = r#"{"sensorType": "sphere"}"#;
        assert!(serde_json::from_str::<ObservationProperties>(json).is_err());
    }

    #[test]
    fn test_partial_bags_fill_defaults() {
        let obs: ObservationProperties =
            serde_json::from_str(r#"{"sensorType": "rectangle", "range": 12}"#).unwrap();
        assert_eq!(obs.sensor_type, SensorType::Rectangle);
        assert_eq!(obs.fov_v, 40.0);
        assert_eq!(obs.extra["range"], 12);

        let iot: IotProperties = serde_json::from_str(r#"{"enabled": true}"#).unwrap();
        assert!(iot.enabled);
        assert_eq!(iot.service_type, "weather");
        assert_eq!(iot.update_interval, 5000);
    }

    #[test]
    fn test_observation_point_uncaptured() {
        let p: ObservationPoint = serde_json::from_str(r#"{"id": 1700000000000}"#).unwrap();
        assert_eq!(p.id, 1_700_000_000_000);
        assert!(p.position.is_none());
        assert!(!p.is_captured());

        let json = serde_json::to_value(&p).unwrap();
        assert!(json["position"].is_null());
        assert!(json["target"].is_null());
    }

    #[test]
    fn test_scene_document_missing_lists_default() {
        let doc: SceneDocument = serde_json::from_str(r#"{"objects": []}"#).unwrap();
        assert_eq!(doc.version, 1);
        assert!(doc.observation_points.is_empty());
        assert!(doc.cesium_ion_assets.is_empty());
        assert!(doc.is_empty());
    }

    #[test]
    fn test_scene_document_json_layout() {
        let doc = SceneDocument {
            version: 1,
            objects: vec![ModelRecord::new("m1")],
            observation_points: vec![ObservationPoint::new(5)],
            cesium_ion_assets: vec![CesiumIonAsset {
                id: "ion1".to_string(),
                name: "Terrain".to_string(),
                asset_id: "A1".to_string(),
                url: None,
            }],
        };
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["objects"][0]["id"], "m1");
        assert_eq!(json["observationPoints"][0]["id"], 5);
        assert_eq!(json["cesiumIonAssets"][0]["assetId"], "A1");

        let back: SceneDocument = serde_json::from_value(json).unwrap();
        assert_eq!(back, doc);
    }
}
