//! Built-in converters
//!
//! Converters for the simple types, typed arrays, date-times and declared
//! classes. [`register_defaults`] adds all of them to a registry builder;
//! [`standard_types`] declares the types they produce.
//!
//! | Converter | Sources | Target | Priority |
//! |---|---|---|---|
//! | [`StringConverter`] | string, integer, float, boolean, array | string | 1 |
//! | [`IntegerConverter`] | integer, string, float | integer | 1 |
//! | [`FloatConverter`] | float, integer, string | float | 1 |
//! | [`BooleanConverter`] | boolean, string, integer, float | boolean | 1 |
//! | [`ArrayConverter`] | array, string | array | 1 |
//! | [`TypedArrayConverter`] | array | array | 2 |
//! | [`DateTimeConverter`] | string, integer | DateTime | 1 |
//! | [`ObjectConverter`] | array | object | 0 |
//!
//! Copyright (c) 2025 Propmap Team
//! Licensed under the Apache-2.0 license

use super::TypeConverter;
use crate::configuration::PropertyMappingConfiguration;
use crate::error::{Error, Result};
use crate::hierarchy::{TypeDeclaration, TypeHierarchy};
use crate::registry::ConverterRegistryBuilder;
use crate::types::{TargetType, OBJECT_TYPE};
use crate::value::{SourceType, Value, DATE_TIME_CLASS};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Interface implemented by [`DATE_TIME_CLASS`]
pub const DATE_TIME_INTERFACE: &str = "DateTimeInterface";

/// Option of [`StringConverter`]: `csv` (default) or `json`
pub const ARRAY_FORMAT: &str = "array_format";
/// Option of [`StringConverter`]: separator for the csv array format
pub const CSV_DELIMITER: &str = "csv_delimiter";
/// Option of [`ArrayConverter`]: separator used to split strings
pub const STRING_DELIMITER: &str = "string_delimiter";
/// Option of [`DateTimeConverter`]: chrono format string tried before RFC 3339
pub const DATE_FORMAT: &str = "date_format";

const DEFAULT_DELIMITER: &str = ",";

/// Declarations of the types produced by the built-in converters
pub fn standard_types() -> Vec<TypeDeclaration> {
    vec![
        TypeDeclaration::interface(DATE_TIME_INTERFACE),
        TypeDeclaration::class(DATE_TIME_CLASS).implements(DATE_TIME_INTERFACE),
    ]
}

/// Register every built-in converter
///
/// `hierarchy` is consulted by [`ObjectConverter`] for declared property types.
pub fn register_defaults(
    builder: ConverterRegistryBuilder,
    hierarchy: Arc<TypeHierarchy>,
) -> Result<ConverterRegistryBuilder> {
    builder
        .register(StringConverter)?
        .register(IntegerConverter)?
        .register(FloatConverter)?
        .register(BooleanConverter)?
        .register(ArrayConverter)?
        .register(TypedArrayConverter)?
        .register(DateTimeConverter)?
        .register(ObjectConverter::new(hierarchy))
}

fn option_str<'a>(
    configuration: &'a PropertyMappingConfiguration,
    converter: &str,
    key: &str,
) -> Option<&'a str> {
    configuration
        .type_converter_option(converter, key)
        .and_then(Value::as_str)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Integer(n) => Some(n.to_string()),
        Value::Float(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        _ => None,
    }
}

/// Converts simple values to strings; arrays become csv or json
#[derive(Debug, Clone, Copy, Default)]
pub struct StringConverter;

impl TypeConverter for StringConverter {
    fn name(&self) -> &str {
        "StringConverter"
    }

    fn supported_source_types(&self) -> &[SourceType] {
        &SourceType::ALL
    }

    fn supported_target_type(&self) -> &str {
        "string"
    }

    fn priority(&self) -> i32 {
        1
    }

    fn convert_from(
        &self,
        source: &Value,
        target_type: &str,
        _converted_child_properties: BTreeMap<String, Value>,
        configuration: &PropertyMappingConfiguration,
    ) -> Result<Value> {
        let items: Vec<&Value> = match source {
            Value::Array(items) => items.iter().collect(),
            Value::Map(map) => map.values().collect(),
            other => {
                return scalar_to_string(other).map(Value::String).ok_or_else(|| {
                    Error::conversion_failed(
                        target_type,
                        format!("cannot convert a {} to a string", other.kind_name()),
                    )
                });
            }
        };

        match option_str(configuration, self.name(), ARRAY_FORMAT).unwrap_or("csv") {
            "json" => Ok(Value::String(serde_json::to_string(&source.to_json())?)),
            "csv" => {
                let delimiter =
                    option_str(configuration, self.name(), CSV_DELIMITER).unwrap_or(DEFAULT_DELIMITER);
                let parts = items
                    .into_iter()
                    .map(|item| {
                        scalar_to_string(item).ok_or_else(|| {
                            Error::conversion_failed(
                                target_type,
                                format!("cannot write a nested {} as csv", item.kind_name()),
                            )
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Value::String(parts.join(delimiter)))
            }
            other => Err(Error::configuration(format!(
                "unknown array format \"{}\" for {}",
                other,
                self.name()
            ))),
        }
    }
}

/// Converts numbers and numeric strings to integers
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerConverter;

impl IntegerConverter {
    const SOURCES: [SourceType; 3] = [SourceType::Integer, SourceType::String, SourceType::Float];

    fn from_float(value: f64, target_type: &str) -> Result<Value> {
        if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            Ok(Value::Integer(value as i64))
        } else {
            Err(Error::conversion_failed(
                target_type,
                format!("{} is not an integral number", value),
            ))
        }
    }
}

impl TypeConverter for IntegerConverter {
    fn name(&self) -> &str {
        "IntegerConverter"
    }

    fn supported_source_types(&self) -> &[SourceType] {
        &Self::SOURCES
    }

    fn supported_target_type(&self) -> &str {
        "integer"
    }

    fn priority(&self) -> i32 {
        1
    }

    fn convert_from(
        &self,
        source: &Value,
        target_type: &str,
        _converted_child_properties: BTreeMap<String, Value>,
        _configuration: &PropertyMappingConfiguration,
    ) -> Result<Value> {
        match source {
            Value::Integer(n) => Ok(Value::Integer(*n)),
            Value::Float(n) => Self::from_float(*n, target_type),
            Value::String(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return Ok(Value::Null);
                }
                if let Ok(n) = s.parse::<i64>() {
                    return Ok(Value::Integer(n));
                }
                match s.parse::<f64>() {
                    Ok(n) => Self::from_float(n, target_type),
                    Err(_) => Err(Error::conversion_failed(
                        target_type,
                        format!("\"{}\" is not a valid integer", s),
                    )),
                }
            }
            other => Err(Error::conversion_failed(
                target_type,
                format!("cannot convert a {} to an integer", other.kind_name()),
            )),
        }
    }
}

/// Converts numbers and numeric strings to floats
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatConverter;

impl FloatConverter {
    const SOURCES: [SourceType; 3] = [SourceType::Float, SourceType::Integer, SourceType::String];
}

impl TypeConverter for FloatConverter {
    fn name(&self) -> &str {
        "FloatConverter"
    }

    fn supported_source_types(&self) -> &[SourceType] {
        &Self::SOURCES
    }

    fn supported_target_type(&self) -> &str {
        "float"
    }

    fn priority(&self) -> i32 {
        1
    }

    fn convert_from(
        &self,
        source: &Value,
        target_type: &str,
        _converted_child_properties: BTreeMap<String, Value>,
        _configuration: &PropertyMappingConfiguration,
    ) -> Result<Value> {
        match source {
            Value::Float(n) => Ok(Value::Float(*n)),
            Value::Integer(n) => Ok(Value::Float(*n as f64)),
            Value::String(s) if s.trim().is_empty() => Ok(Value::Null),
            Value::String(s) => s.trim().parse::<f64>().map(Value::Float).map_err(|_| {
                Error::conversion_failed(target_type, format!("\"{}\" is not a valid float", s))
            }),
            other => Err(Error::conversion_failed(
                target_type,
                format!("cannot convert a {} to a float", other.kind_name()),
            )),
        }
    }
}

/// Converts flags, numbers and the usual yes/no words to booleans
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanConverter;

impl BooleanConverter {
    const SOURCES: [SourceType; 4] = [
        SourceType::Boolean,
        SourceType::String,
        SourceType::Integer,
        SourceType::Float,
    ];
}

impl TypeConverter for BooleanConverter {
    fn name(&self) -> &str {
        "BooleanConverter"
    }

    fn supported_source_types(&self) -> &[SourceType] {
        &Self::SOURCES
    }

    fn supported_target_type(&self) -> &str {
        "boolean"
    }

    fn priority(&self) -> i32 {
        1
    }

    fn convert_from(
        &self,
        source: &Value,
        target_type: &str,
        _converted_child_properties: BTreeMap<String, Value>,
        _configuration: &PropertyMappingConfiguration,
    ) -> Result<Value> {
        match source {
            Value::Bool(b) => Ok(Value::Bool(*b)),
            Value::Integer(n) => Ok(Value::Bool(*n != 0)),
            Value::Float(n) => Ok(Value::Bool(*n != 0.0)),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" | "on" => Ok(Value::Bool(true)),
                "false" | "no" | "0" | "off" | "" => Ok(Value::Bool(false)),
                _ => Err(Error::conversion_failed(
                    target_type,
                    format!("\"{}\" is not a boolean", s),
                )),
            },
            other => Err(Error::conversion_failed(
                target_type,
                format!("cannot convert a {} to a boolean", other.kind_name()),
            )),
        }
    }
}

/// Passes arrays through and splits strings into arrays
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayConverter;

impl ArrayConverter {
    const SOURCES: [SourceType; 2] = [SourceType::Array, SourceType::String];
}

impl TypeConverter for ArrayConverter {
    fn name(&self) -> &str {
        "ArrayConverter"
    }

    fn supported_source_types(&self) -> &[SourceType] {
        &Self::SOURCES
    }

    fn supported_target_type(&self) -> &str {
        "array"
    }

    fn priority(&self) -> i32 {
        1
    }

    // Members are left as they are, so element-typed targets are not ours.
    fn can_convert_from(&self, _source: &Value, target_type: &str) -> bool {
        TargetType::parse(target_type)
            .map(|target| !target.is_parameterized())
            .unwrap_or(false)
    }

    fn convert_from(
        &self,
        source: &Value,
        target_type: &str,
        _converted_child_properties: BTreeMap<String, Value>,
        configuration: &PropertyMappingConfiguration,
    ) -> Result<Value> {
        match source {
            Value::Array(_) | Value::Map(_) => Ok(source.clone()),
            Value::String(s) if s.is_empty() => Ok(Value::Array(Vec::new())),
            Value::String(s) => {
                let delimiter = option_str(configuration, self.name(), STRING_DELIMITER)
                    .unwrap_or(DEFAULT_DELIMITER);
                Ok(Value::Array(
                    s.split(delimiter)
                        .map(|part| Value::from(part.trim()))
                        .collect(),
                ))
            }
            other => Err(Error::conversion_failed(
                target_type,
                format!("cannot convert a {} to an array", other.kind_name()),
            )),
        }
    }
}

/// Converts every member of an array to the element type of `array<Element>`
#[derive(Debug, Clone, Copy, Default)]
pub struct TypedArrayConverter;

impl TypedArrayConverter {
    const SOURCES: [SourceType; 1] = [SourceType::Array];
}

impl TypeConverter for TypedArrayConverter {
    fn name(&self) -> &str {
        "TypedArrayConverter"
    }

    fn supported_source_types(&self) -> &[SourceType] {
        &Self::SOURCES
    }

    fn supported_target_type(&self) -> &str {
        "array"
    }

    fn priority(&self) -> i32 {
        2
    }

    fn can_convert_from(&self, _source: &Value, target_type: &str) -> bool {
        TargetType::parse(target_type)
            .map(|target| target.is_parameterized())
            .unwrap_or(false)
    }

    fn source_child_properties_to_be_converted(&self, source: &Value) -> BTreeMap<String, Value> {
        source.members()
    }

    fn type_of_child_property(
        &self,
        target_type: &str,
        _property_name: &str,
        _configuration: &PropertyMappingConfiguration,
    ) -> Result<Option<String>> {
        let target = TargetType::parse(target_type)?;
        Ok(target.element().map(ToString::to_string))
    }

    fn convert_from(
        &self,
        source: &Value,
        _target_type: &str,
        converted_child_properties: BTreeMap<String, Value>,
        _configuration: &PropertyMappingConfiguration,
    ) -> Result<Value> {
        match source {
            // Index keys sort as strings; restore numeric order.
            Value::Array(_) => {
                let mut indexed: Vec<(usize, Value)> = converted_child_properties
                    .into_iter()
                    .filter_map(|(key, value)| key.parse::<usize>().ok().map(|index| (index, value)))
                    .collect();
                indexed.sort_by_key(|(index, _)| *index);
                Ok(Value::Array(indexed.into_iter().map(|(_, value)| value).collect()))
            }
            _ => Ok(Value::Map(converted_child_properties)),
        }
    }
}

/// Parses date-time strings and unix timestamps
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeConverter;

impl DateTimeConverter {
    const SOURCES: [SourceType; 2] = [SourceType::String, SourceType::Integer];

    fn parse_with_format(input: &str, format: &str) -> Option<Value> {
        if let Ok(dt) = DateTime::parse_from_str(input, format) {
            return Some(Value::DateTime(dt));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(Value::DateTime(Utc.from_utc_datetime(&naive).fixed_offset()));
        }
        NaiveDate::parse_from_str(input, format)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| Value::DateTime(Utc.from_utc_datetime(&naive).fixed_offset()))
    }
}

impl TypeConverter for DateTimeConverter {
    fn name(&self) -> &str {
        "DateTimeConverter"
    }

    fn supported_source_types(&self) -> &[SourceType] {
        &Self::SOURCES
    }

    fn supported_target_type(&self) -> &str {
        DATE_TIME_CLASS
    }

    fn priority(&self) -> i32 {
        1
    }

    fn convert_from(
        &self,
        source: &Value,
        target_type: &str,
        _converted_child_properties: BTreeMap<String, Value>,
        configuration: &PropertyMappingConfiguration,
    ) -> Result<Value> {
        match source {
            Value::Integer(seconds) => Utc
                .timestamp_opt(*seconds, 0)
                .single()
                .map(|dt| Value::DateTime(dt.fixed_offset()))
                .ok_or_else(|| {
                    Error::conversion_failed(
                        target_type,
                        format!("{} is not a valid unix timestamp", seconds),
                    )
                }),
            Value::String(s) if s.trim().is_empty() => Ok(Value::Null),
            Value::String(s) => {
                let input = s.trim();
                if let Some(format) = option_str(configuration, self.name(), DATE_FORMAT) {
                    if let Some(value) = Self::parse_with_format(input, format) {
                        return Ok(value);
                    }
                }
                DateTime::parse_from_rfc3339(input)
                    .map(Value::DateTime)
                    .map_err(|e| {
                        Error::conversion_failed(
                            target_type,
                            format!("\"{}\" is not a valid date-time: {}", input, e),
                        )
                    })
            }
            other => Err(Error::conversion_failed(
                target_type,
                format!("cannot convert a {} to a date-time", other.kind_name()),
            )),
        }
    }
}

/// Builds instances of declared classes from keyed maps
///
/// Plain targets read the declared property types from the hierarchy;
/// `Name<Element>` targets build a collection object whose members are
/// converted to `Element`. Interfaces, undeclared names and date-times are
/// declined.
#[derive(Debug, Clone)]
pub struct ObjectConverter {
    hierarchy: Arc<TypeHierarchy>,
}

impl ObjectConverter {
    const SOURCES: [SourceType; 1] = [SourceType::Array];

    pub fn new(hierarchy: Arc<TypeHierarchy>) -> Self {
        Self { hierarchy }
    }
}

impl TypeConverter for ObjectConverter {
    fn name(&self) -> &str {
        "ObjectConverter"
    }

    fn supported_source_types(&self) -> &[SourceType] {
        &Self::SOURCES
    }

    fn supported_target_type(&self) -> &str {
        OBJECT_TYPE
    }

    fn priority(&self) -> i32 {
        0
    }

    fn can_convert_from(&self, source: &Value, target_type: &str) -> bool {
        let Ok(target) = TargetType::parse(target_type) else {
            return false;
        };
        if target.name() == DATE_TIME_CLASS {
            return false;
        }
        let declared_class = self
            .hierarchy
            .get(target.name())
            .map(|declaration| !declaration.is_interface())
            .unwrap_or(false);

        declared_class && (target.is_parameterized() || matches!(source, Value::Map(_)))
    }

    fn source_child_properties_to_be_converted(&self, source: &Value) -> BTreeMap<String, Value> {
        source.members()
    }

    fn type_of_child_property(
        &self,
        target_type: &str,
        property_name: &str,
        _configuration: &PropertyMappingConfiguration,
    ) -> Result<Option<String>> {
        let target = TargetType::parse(target_type)?;
        if let Some(element) = target.element() {
            return Ok(Some(element.to_string()));
        }
        Ok(self
            .hierarchy
            .property_type(target.name(), property_name)
            .map(str::to_string))
    }

    fn convert_from(
        &self,
        _source: &Value,
        target_type: &str,
        converted_child_properties: BTreeMap<String, Value>,
        _configuration: &PropertyMappingConfiguration,
    ) -> Result<Value> {
        let target = TargetType::parse(target_type)?;
        Ok(Value::object(target.name(), converted_child_properties))
    }
}
