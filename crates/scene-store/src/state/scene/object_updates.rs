//! Property updates on placed objects.
//!
//! UI layers address properties with dotted paths such as
//! `observationProperties.sensorType`. Paths are resolved once into an
//! [`ObjectUpdate`] and then applied by `match`, so every accepted update has a
//! known shape. Unknown keys still land in the record's `extra` bag.

use std::sync::Arc;

use serde_json::{Map, Value};
use shared::{
    AnalysisQuality, DisplayFormat, IotProperties, ModelKind, ModelRecord,
    ObservationProperties, SensorType, Vec3Array,
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum UpdateError {
    #[error("Property path is empty")]
    EmptyPath,
    #[error("Property `{0}` cannot be changed")]
    ImmutableField(String),
    #[error("`{0}` is a reserved key and cannot hold free-form properties")]
    ReservedKey(String),
    #[error("`{value}` is not a valid {field}")]
    InvalidEnum { field: &'static str, value: String },
    #[error("Invalid value for `{property}`: expected {expected}")]
    InvalidValue {
        property: String,
        expected: &'static str,
    },
}

/// Which transform vector an update targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformKind {
    Position,
    Rotation,
    Scale,
}

impl TransformKind {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "position" => Some(TransformKind::Position),
            "rotation" => Some(TransformKind::Rotation),
            "scale" => Some(TransformKind::Scale),
            _ => None,
        }
    }

    fn slot<'a>(&self, model: &'a mut ModelRecord) -> &'a mut Vec3Array {
        match self {
            TransformKind::Position => &mut model.position,
            TransformKind::Rotation => &mut model.rotation,
            TransformKind::Scale => &mut model.scale,
        }
    }
}

/// One field of `observationProperties`
#[derive(Debug, Clone, PartialEq)]
pub enum ObservationField {
    SensorType(SensorType),
    AnalysisQuality(AnalysisQuality),
    Fov(f64),
    FovH(f64),
    FovV(f64),
    VisibilityRadius(f64),
    ShowSensorGeometry(bool),
    ShowViewshed(bool),
    SensorColor(String),
    ViewshedColor(String),
    Other(String, Value),
}

impl ObservationField {
    pub fn parse(key: &str, value: Value) -> Result<Self, UpdateError> {
        let property = || format!("observationProperties.{key}");
        Ok(match key {
            "sensorType" => ObservationField::SensorType(
                value
                    .as_str()
                    .and_then(SensorType::parse)
                    .ok_or_else(|| invalid_enum("sensor type", &value))?,
            ),
            "analysisQuality" => ObservationField::AnalysisQuality(
                value
                    .as_str()
                    .and_then(AnalysisQuality::parse)
                    .ok_or_else(|| invalid_enum("analysis quality", &value))?,
            ),
            "fov" => ObservationField::Fov(number(&property(), &value)?),
            "fovH" => ObservationField::FovH(number(&property(), &value)?),
            "fovV" => ObservationField::FovV(number(&property(), &value)?),
            "visibilityRadius" => ObservationField::VisibilityRadius(number(&property(), &value)?),
            "showSensorGeometry" => ObservationField::ShowSensorGeometry(boolean(&property(), &value)?),
            "showViewshed" => ObservationField::ShowViewshed(boolean(&property(), &value)?),
            "sensorColor" => ObservationField::SensorColor(string(&property(), &value)?),
            "viewshedColor" => ObservationField::ViewshedColor(string(&property(), &value)?),
            _ => ObservationField::Other(key.to_string(), value),
        })
    }

    fn apply(&self, props: &mut ObservationProperties) {
        match self {
            ObservationField::SensorType(v) => props.sensor_type = *v,
            ObservationField::AnalysisQuality(v) => props.analysis_quality = *v,
            ObservationField::Fov(v) => props.fov = *v,
            ObservationField::FovH(v) => props.fov_h = *v,
            ObservationField::FovV(v) => props.fov_v = *v,
            ObservationField::VisibilityRadius(v) => props.visibility_radius = *v,
            ObservationField::ShowSensorGeometry(v) => props.show_sensor_geometry = *v,
            ObservationField::ShowViewshed(v) => props.show_viewshed = *v,
            ObservationField::SensorColor(v) => props.sensor_color = v.clone(),
            ObservationField::ViewshedColor(v) => props.viewshed_color = v.clone(),
            ObservationField::Other(key, value) => {
                props.extra.insert(key.clone(), value.clone());
            }
        }
    }
}

/// One field of `iotProperties`
#[derive(Debug, Clone, PartialEq)]
pub enum IotField {
    Enabled(bool),
    ServiceType(String),
    ApiEndpoint(Option<String>),
    UpdateInterval(u64),
    DisplayFormat(DisplayFormat),
    AutoRefresh(bool),
    ShowInScene(bool),
    Other(String, Value),
}

impl IotField {
    pub fn parse(key: &str, value: Value) -> Result<Self, UpdateError> {
        let property = || format!("iotProperties.{key}");
        Ok(match key {
            "enabled" => IotField::Enabled(boolean(&property(), &value)?),
            "serviceType" => IotField::ServiceType(string(&property(), &value)?),
            "apiEndpoint" => IotField::ApiEndpoint(optional_string(&property(), &value)?),
            "updateInterval" => IotField::UpdateInterval(value.as_u64().ok_or_else(|| {
                UpdateError::InvalidValue {
                    property: property(),
                    expected: "a non-negative integer",
                }
            })?),
            "displayFormat" => IotField::DisplayFormat(
                value
                    .as_str()
                    .and_then(DisplayFormat::parse)
                    .ok_or_else(|| invalid_enum("display format", &value))?,
            ),
            "autoRefresh" => IotField::AutoRefresh(boolean(&property(), &value)?),
            "showInScene" => IotField::ShowInScene(boolean(&property(), &value)?),
            _ => IotField::Other(key.to_string(), value),
        })
    }

    fn apply(&self, props: &mut IotProperties) {
        match self {
            IotField::Enabled(v) => props.enabled = *v,
            IotField::ServiceType(v) => props.service_type = v.clone(),
            IotField::ApiEndpoint(v) => props.api_endpoint = v.clone(),
            IotField::UpdateInterval(v) => props.update_interval = *v,
            IotField::DisplayFormat(v) => props.display_format = *v,
            IotField::AutoRefresh(v) => props.auto_refresh = *v,
            IotField::ShowInScene(v) => props.show_in_scene = *v,
            IotField::Other(key, value) => {
                props.extra.insert(key.clone(), value.clone());
            }
        }
    }
}

/// A single resolved change to a placed object
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectUpdate {
    Name(String),
    Kind(ModelKind),
    Url(Option<String>),
    AssetId(Option<String>),
    Transform(TransformKind, Vec3Array),
    /// One component (0 = x, 1 = y, 2 = z) of a transform vector
    TransformAxis(TransformKind, usize, f64),
    /// `isObservationModel`; `true` materializes default observation properties
    ObservationModel(bool),
    ObservationProperties(Option<ObservationProperties>),
    IotProperties(Option<IotProperties>),
    Observation(ObservationField),
    Iot(IotField),
    /// `parent.child` shallow merge into `extra[parent]`
    Nested {
        parent: String,
        child: String,
        value: Value,
    },
    /// Top-level key outside the typed model
    Flat { key: String, value: Value },
}

impl ObjectUpdate {
    /// Resolve a dotted property path and a JSON value into an update.
    ///
    /// Only the first `.` separates parent and child.
    pub fn parse(property: &str, value: Value) -> Result<Self, UpdateError> {
        if let Some((parent, child)) = property.split_once('.') {
            if parent.is_empty() || child.is_empty() {
                return Err(UpdateError::EmptyPath);
            }
            return match parent {
                "observationProperties" => {
                    ObservationField::parse(child, value).map(ObjectUpdate::Observation)
                }
                "iotProperties" => IotField::parse(child, value).map(ObjectUpdate::Iot),
                _ => match TransformKind::from_key(parent) {
                    Some(kind) => {
                        let axis = axis_index(child).ok_or_else(|| UpdateError::InvalidValue {
                            property: property.to_string(),
                            expected: "an axis of x, y or z",
                        })?;
                        Ok(ObjectUpdate::TransformAxis(kind, axis, number(property, &value)?))
                    }
                    None if ModelRecord::is_reserved_key(parent) => {
                        Err(UpdateError::ReservedKey(parent.to_string()))
                    }
                    None => Ok(ObjectUpdate::Nested {
                        parent: parent.to_string(),
                        child: child.to_string(),
                        value,
                    }),
                },
            };
        }

        if let Some(kind) = TransformKind::from_key(property) {
            return Ok(ObjectUpdate::Transform(kind, vector(property, &value)?));
        }

        Ok(match property {
            "" => return Err(UpdateError::EmptyPath),
            "id" => return Err(UpdateError::ImmutableField(property.to_string())),
            "name" => ObjectUpdate::Name(string(property, &value)?),
            "type" => ObjectUpdate::Kind(ModelKind::from(string(property, &value)?)),
            "url" => ObjectUpdate::Url(optional_string(property, &value)?),
            "assetId" => ObjectUpdate::AssetId(optional_string(property, &value)?),
            "isObservationModel" => ObjectUpdate::ObservationModel(boolean(property, &value)?),
            "observationProperties" => ObjectUpdate::ObservationProperties(bag(property, value)?),
            "iotProperties" => ObjectUpdate::IotProperties(bag(property, value)?),
            ModelRecord::TRANSIENT_KEY => {
                return Err(UpdateError::ReservedKey(property.to_string()));
            }
            _ => ObjectUpdate::Flat {
                key: property.to_string(),
                value,
            },
        })
    }
}

/// Return a copy of `model` with `update` applied
pub fn apply_update(model: &ModelRecord, update: &ObjectUpdate) -> ModelRecord {
    let mut next = model.clone();
    match update {
        ObjectUpdate::Name(name) => next.name = name.clone(),
        ObjectUpdate::Kind(kind) => next.kind = kind.clone(),
        ObjectUpdate::Url(url) => next.url = url.clone(),
        ObjectUpdate::AssetId(asset_id) => next.asset_id = asset_id.clone(),
        ObjectUpdate::Transform(kind, v) => *kind.slot(&mut next) = *v,
        ObjectUpdate::TransformAxis(kind, axis, v) => kind.slot(&mut next)[*axis] = *v,
        ObjectUpdate::ObservationModel(enabled) => {
            next.is_observation_model = *enabled;
            if *enabled && next.observation_properties.is_none() {
                next.observation_properties = Some(ObservationProperties::default());
            }
        }
        ObjectUpdate::ObservationProperties(props) => next.observation_properties = props.clone(),
        ObjectUpdate::IotProperties(props) => next.iot_properties = props.clone(),
        ObjectUpdate::Observation(field) => {
            field.apply(
                next.observation_properties
                    .get_or_insert_with(ObservationProperties::default),
            );
        }
        ObjectUpdate::Iot(field) => {
            field.apply(next.iot_properties.get_or_insert_with(IotProperties::default));
        }
        ObjectUpdate::Nested {
            parent,
            child,
            value,
        } => {
            let mut merged = match next.extra.get(parent) {
                Some(Value::Object(existing)) => existing.clone(),
                _ => Map::new(),
            };
            merged.insert(child.clone(), value.clone());
            next.extra.insert(parent.clone(), Value::Object(merged));
        }
        ObjectUpdate::Flat { key, value } => {
            next.extra.insert(key.clone(), value.clone());
        }
    }
    next
}

/// New list with the object `id` updated.
///
/// Every other element is the same `Arc` as in `objects`, so subscribers can
/// detect changes with `Arc::ptr_eq`.
pub fn update_object_in_array(
    objects: &[Arc<ModelRecord>],
    id: &str,
    update: &ObjectUpdate,
) -> Vec<Arc<ModelRecord>> {
    objects
        .iter()
        .map(|o| {
            if o.id == id {
                Arc::new(apply_update(o, update))
            } else {
                Arc::clone(o)
            }
        })
        .collect()
}

// ── Value coercion ──────────────────────────────────────────────

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn invalid_enum(field: &'static str, value: &Value) -> UpdateError {
    UpdateError::InvalidEnum {
        field,
        value: display_value(value),
    }
}

fn invalid(property: &str, expected: &'static str) -> UpdateError {
    UpdateError::InvalidValue {
        property: property.to_string(),
        expected,
    }
}

fn number(property: &str, value: &Value) -> Result<f64, UpdateError> {
    value.as_f64().ok_or_else(|| invalid(property, "a number"))
}

fn boolean(property: &str, value: &Value) -> Result<bool, UpdateError> {
    value.as_bool().ok_or_else(|| invalid(property, "a boolean"))
}

fn string(property: &str, value: &Value) -> Result<String, UpdateError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid(property, "a string"))
}

fn optional_string(property: &str, value: &Value) -> Result<Option<String>, UpdateError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        _ => Err(invalid(property, "a string or null")),
    }
}

fn axis_index(key: &str) -> Option<usize> {
    match key {
        "x" | "0" => Some(0),
        "y" | "1" => Some(1),
        "z" | "2" => Some(2),
        _ => None,
    }
}

/// Accepts `[x, y, z]` or `{"x": .., "y": .., "z": ..}`
fn vector(property: &str, value: &Value) -> Result<Vec3Array, UpdateError> {
    let err = || invalid(property, "a 3-component vector");
    match value {
        Value::Array(items) if items.len() == 3 => {
            let mut out = [0.0; 3];
            for (slot, item) in out.iter_mut().zip(items) {
                *slot = item.as_f64().ok_or_else(err)?;
            }
            Ok(out)
        }
        Value::Object(map) => {
            let mut out = [0.0; 3];
            for (slot, key) in out.iter_mut().zip(["x", "y", "z"]) {
                *slot = map.get(key).and_then(Value::as_f64).ok_or_else(err)?;
            }
            Ok(out)
        }
        _ => Err(err()),
    }
}

fn bag<T: serde::de::DeserializeOwned>(
    property: &str,
    value: Value,
) -> Result<Option<T>, UpdateError> {
    if value.is_null() {
        return Ok(None);
    }
    serde_json::from_value(value)
        .map(Some)
        .map_err(|_| invalid(property, "a property bag"))
}
