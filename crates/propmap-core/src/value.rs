//! Dynamic values and source type classification
//!
//! [`Value`] is the unit of data flowing through the mapper: already-decoded
//! primitives and structures on the source side, typed objects and date-times
//! on the target side. [`SourceType`] is the category a source value is looked
//! up under in the converter registry.
//!
//! Copyright (c) 2025 Propmap Team
//! Licensed under the Apache-2.0 license

use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Class name reported by [`Value::DateTime`]
pub const DATE_TIME_CLASS: &str = "DateTime";

/// Key carrying the class name when an object is serialized
pub const TYPE_KEY: &str = "__type";

/// A dynamically typed value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    /// Ordered sequence
    Array(Vec<Value>),
    /// Keyed mapping
    Map(BTreeMap<String, Value>),
    /// Instance of a declared class; shared so short-circuits stay cheap
    Object(Arc<ObjectValue>),
    DateTime(DateTime<FixedOffset>),
}

/// An instance of a declared class
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectValue {
    class_name: String,
    properties: BTreeMap<String, Value>,
}

impl ObjectValue {
    /// Create an object of the given class
    pub fn new(class_name: impl Into<String>, properties: BTreeMap<String, Value>) -> Self {
        Self {
            class_name: class_name.into(),
            properties,
        }
    }

    /// Class this object is an instance of
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// All properties
    pub fn properties(&self) -> &BTreeMap<String, Value> {
        &self.properties
    }

    /// A single property
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }
}

/// Category a source value is registered and looked up under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    String,
    Integer,
    Float,
    Boolean,
    /// Ordered sequences and keyed mappings alike
    Array,
}

impl SourceType {
    /// Every source type category
    pub const ALL: [SourceType; 5] = [
        SourceType::String,
        SourceType::Integer,
        SourceType::Float,
        SourceType::Boolean,
        SourceType::Array,
    ];

    /// Classify a value; `None` for null, objects and date-times
    pub fn classify(value: &Value) -> Option<SourceType> {
        match value {
            Value::String(_) => Some(SourceType::String),
            Value::Integer(_) => Some(SourceType::Integer),
            Value::Float(_) => Some(SourceType::Float),
            Value::Bool(_) => Some(SourceType::Boolean),
            Value::Array(_) | Value::Map(_) => Some(SourceType::Array),
            Value::Null | Value::Object(_) | Value::DateTime(_) => None,
        }
    }

    /// Lowercase name, identical to the simple target type name
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::String => "string",
            SourceType::Integer => "integer",
            SourceType::Float => "float",
            SourceType::Boolean => "boolean",
            SourceType::Array => "array",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match crate::types::normalize_type(s.trim()) {
            "string" => Ok(SourceType::String),
            "integer" => Ok(SourceType::Integer),
            "float" => Ok(SourceType::Float),
            "boolean" => Ok(SourceType::Boolean),
            "array" => Ok(SourceType::Array),
            other => Err(crate::Error::configuration(format!(
                "\"{}\" is not a source type",
                other
            ))),
        }
    }
}

impl Value {
    /// Create a typed object value
    pub fn object(class_name: impl Into<String>, properties: BTreeMap<String, Value>) -> Self {
        Value::Object(Arc::new(ObjectValue::new(class_name, properties)))
    }

    /// Short name of the variant, used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "sequence",
            Value::Map(_) => "map",
            Value::Object(_) => "object",
            Value::DateTime(_) => "date-time",
        }
    }

    /// Class name for object-like values
    pub fn class_name(&self) -> Option<&str> {
        match self {
            Value::Object(object) => Some(object.class_name()),
            Value::DateTime(_) => Some(DATE_TIME_CLASS),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            Value::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectValue> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Members of a sequence or mapping, keyed by index or key
    pub fn members(&self) -> BTreeMap<String, Value> {
        match self {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| (index.to_string(), item.clone()))
                .collect(),
            Value::Map(map) => map.clone(),
            Value::Object(object) => object.properties().clone(),
            _ => BTreeMap::new(),
        }
    }

    /// Convert into plain JSON; objects carry their class under `__type`
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Integer(n) => serde_json::Value::from(*n),
            Value::Float(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Value::Object(object) => {
                let mut map = serde_json::Map::new();
                map.insert(
                    TYPE_KEY.to_string(),
                    serde_json::Value::String(object.class_name().to_string()),
                );
                for (k, v) in object.properties() {
                    map.insert(k.clone(), v.to_json());
                }
                serde_json::Value::Object(map)
            }
            Value::DateTime(dt) => {
                serde_json::Value::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<V: Into<Value>> From<Vec<V>> for Value {
    fn from(items: Vec<V>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(n) => serializer.serialize_i64(*n),
            Value::Float(n) => serializer.serialize_f64(*n),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => items.serialize(serializer),
            Value::Map(map) => map.serialize(serializer),
            Value::Object(object) => {
                let mut map = serializer.serialize_map(Some(object.properties().len() + 1))?;
                map.serialize_entry(TYPE_KEY, object.class_name())?;
                for (k, v) in object.properties() {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Value::DateTime(dt) => {
                serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}
