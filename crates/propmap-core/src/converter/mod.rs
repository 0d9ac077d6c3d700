//! Type converter capability
//!
//! A [`TypeConverter`] declares which source type categories it reads, which
//! target type it produces and with which priority it competes against other
//! converters for the same pair. During mapping it is asked, in order:
//!
//! 1. whether it accepts a concrete source ([`TypeConverter::can_convert_from`]),
//! 2. which child properties of the source need recursive conversion,
//! 3. which target type each of those children should become,
//! 4. to assemble the final value from the source and the converted children.
//!
//! # Module Organization
//!
//! - [`built_in`] - Converters for the simple types, typed arrays, date-times
//!   and declared classes
//!
//! Copyright (c) 2025 Propmap Team
//! Licensed under the Apache-2.0 license

use crate::configuration::PropertyMappingConfiguration;
use crate::error::Result;
use crate::value::{SourceType, Value};
use std::collections::BTreeMap;

pub mod built_in;


/// A registered unit able to convert values into one target type
///
/// Implementations are shared between threads for the lifetime of the
/// registry and must not keep per-call state.
pub trait TypeConverter: Send + Sync {
    /// Human-readable name used in diagnostics and for converter options
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Source type categories this converter is registered under
    fn supported_source_types(&self) -> &[SourceType];

    /// Bare target type name this converter is registered for
    fn supported_target_type(&self) -> &str;

    /// Higher priorities are asked first
    fn priority(&self) -> i32;

    /// Whether this converter accepts the given source for `target_type`
    fn can_convert_from(&self, _source: &Value, _target_type: &str) -> bool {
        true
    }

    /// Child properties of `source` that must be converted before
    /// [`convert_from`](TypeConverter::convert_from) is called
    fn source_child_properties_to_be_converted(&self, _source: &Value) -> BTreeMap<String, Value> {
        BTreeMap::new()
    }

    /// Target type of a child property; `None` when the target does not know
    /// the property
    fn type_of_child_property(
        &self,
        _target_type: &str,
        _property_name: &str,
        _configuration: &PropertyMappingConfiguration,
    ) -> Result<Option<String>> {
        Ok(None)
    }

    /// Produce the target value
    fn convert_from(
        &self,
        source: &Value,
        target_type: &str,
        converted_child_properties: BTreeMap<String, Value>,
        configuration: &PropertyMappingConfiguration,
    ) -> Result<Value>;
}
