//! Property mapper
//!
//! The conversion engine. [`PropertyMapper::convert`] walks a source value
//! top-down: it selects a converter for the current level, asks it which
//! child properties need converting, maps each allowed child recursively into
//! the type the converter declares for it, and hands the converted children
//! back to the converter to assemble the result.
//!
//! Values that already satisfy the target type are returned unchanged.
//! Security failures reach the caller as raised; any other failure is wrapped
//! in [`Error::Mapping`] with the dotted property path it occurred at.
//!
//! # Examples
//!
//! ```
//! use propmap_core::converter::built_in::{register_defaults, standard_types};
//! use propmap_core::{ConverterRegistry, PropertyMapper, TypeDeclaration, TypeHierarchy, Value};
//! use std::sync::Arc;
//!
//! # fn main() -> propmap_core::Result<()> {
//! let hierarchy = Arc::new(
//!     TypeHierarchy::builder()
//!         .declare_all(standard_types())
//!         .declare(TypeDeclaration::class("Point").property("x", "int").property("y", "int"))
//!         .build()?,
//! );
//! let registry = register_defaults(ConverterRegistry::builder(), hierarchy.clone())?.build();
//! let mapper = PropertyMapper::new(Arc::new(registry), hierarchy);
//!
//! let source = Value::from(serde_json::json!({"x": "3", "y": 4}));
//! let point = mapper.convert(&source, "Point")?;
//! assert_eq!(point.as_object().unwrap().get("x"), Some(&Value::from(3)));
//! # Ok(())
//! # }
//! ```
//!
//! Copyright (c) 2025 Propmap Team
//! Licensed under the Apache-2.0 license

use crate::configuration::PropertyMappingConfiguration;
use crate::converter::TypeConverter;
use crate::error::{Error, Result};
use crate::hierarchy::TypeHierarchy;
use crate::registry::ConverterRegistry;
use crate::selector::ConverterSelector;
use crate::types::{TargetType, OBJECT_TYPE};
use crate::value::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, instrument, trace};

#[cfg(test)]
mod tests;

/// Default nesting limit of [`PropertyMapper`]
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Recursive conversion engine over a frozen registry and hierarchy
#[derive(Debug, Clone)]
pub struct PropertyMapper {
    selector: ConverterSelector,
    default_configuration: PropertyMappingConfiguration,
    max_depth: usize,
}

impl PropertyMapper {
    pub fn new(registry: Arc<ConverterRegistry>, hierarchy: Arc<TypeHierarchy>) -> Self {
        Self {
            selector: ConverterSelector::new(registry, hierarchy),
            default_configuration: PropertyMappingConfiguration::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Configuration used by [`convert`](Self::convert)
    pub fn with_default_configuration(mut self, configuration: PropertyMappingConfiguration) -> Self {
        self.default_configuration = configuration;
        self
    }

    /// Maximum nesting depth below the top-level value
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn selector(&self) -> &ConverterSelector {
        &self.selector
    }

    pub fn hierarchy(&self) -> &TypeHierarchy {
        self.selector.hierarchy()
    }

    pub fn default_configuration(&self) -> &PropertyMappingConfiguration {
        &self.default_configuration
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Convert `source` to `target_type` with the default configuration
    pub fn convert(&self, source: &Value, target_type: &str) -> Result<Value> {
        self.convert_with(source, target_type, &self.default_configuration)
    }

    /// Convert `source` to `target_type` with an explicit configuration
    #[instrument(level = "debug", skip(self, source, configuration), fields(source_kind = source.kind_name()))]
    pub fn convert_with(
        &self,
        source: &Value,
        target_type: &str,
        configuration: &PropertyMappingConfiguration,
    ) -> Result<Value> {
        let mut path = Vec::new();
        match self.do_mapping(source, target_type, configuration, &mut path) {
            Ok(value) => Ok(value),
            Err(err) if err.is_security() => Err(err),
            Err(err) => {
                let property_path = path.join(".");
                debug!(
                    target_type,
                    property_path = %property_path,
                    error = %err,
                    "Property mapping failed"
                );
                Err(Error::Mapping {
                    target_type: target_type.to_string(),
                    property_path,
                    source: Box::new(err),
                })
            }
        }
    }

    /// Converter that would be used for `source` and `target_type`
    pub fn find_type_converter(
        &self,
        source: &Value,
        target_type: &str,
        configuration: &PropertyMappingConfiguration,
    ) -> Result<Arc<dyn TypeConverter>> {
        self.selector
            .find_type_converter(source, target_type, configuration)
    }

    /// Whether `source` already satisfies `target`
    ///
    /// Only objects and date-times qualify. For `Name<Element>` every member
    /// must itself satisfy `Element`.
    pub fn is_already_converted(&self, source: &Value, target: &TargetType) -> bool {
        let Some(class_name) = source.class_name() else {
            return false;
        };
        if !self.satisfies(class_name, target.name()) {
            return false;
        }
        match target.element() {
            None => true,
            Some(element) => source
                .members()
                .values()
                .all(|member| self.is_already_converted(member, element)),
        }
    }

    fn satisfies(&self, class_name: &str, target_name: &str) -> bool {
        target_name == OBJECT_TYPE || self.hierarchy().is_instance_of(class_name, target_name)
    }

    /// One level of the recursive conversion
    ///
    /// `path` is left pointing at the failing property when an error is returned.
    fn do_mapping(
        &self,
        source: &Value,
        target_type: &str,
        configuration: &PropertyMappingConfiguration,
        path: &mut Vec<String>,
    ) -> Result<Value> {
        if path.len() > self.max_depth {
            return Err(Error::MaxDepthExceeded {
                max_depth: self.max_depth,
            });
        }

        let target = TargetType::parse(target_type)?;
        if self.is_already_converted(source, &target) {
            debug!(target_type = %target, "Source already satisfies the target type");
            return Ok(source.clone());
        }
        let spec = target.to_string();

        let converter = self
            .selector
            .find_type_converter(source, &spec, configuration)?;

        let mut converted = BTreeMap::new();
        for (source_name, child) in converter.source_child_properties_to_be_converted(source) {
            let property = configuration.target_property_name(&source_name).to_string();

            if configuration.should_skip(&property) {
                trace!(property = %property, "Skipping property");
                continue;
            }
            if !configuration.should_map(&property) {
                if configuration.should_skip_unknown_properties() {
                    trace!(property = %property, "Skipping property that is not allowed");
                    continue;
                }
                return Err(Error::InvalidPropertyMappingConfiguration { property });
            }

            let child_type = match converter.type_of_child_property(&spec, &property, configuration)? {
                Some(child_type) => child_type,
                None if configuration.should_skip_unknown_properties() => {
                    trace!(property = %property, "Skipping unknown property");
                    continue;
                }
                None => {
                    return Err(Error::UnknownProperty {
                        property,
                        target_type: spec,
                    })
                }
            };

            path.push(property.clone());
            let value = self.do_mapping(
                &child,
                &child_type,
                configuration.configuration_for(&property),
                path,
            )?;
            path.pop();
            if value.is_null() {
                trace!(property = %property, "Dropping property converted to null");
                continue;
            }
            converted.insert(property, value);
        }

        converter.convert_from(source, &spec, converted, configuration)
    }
}
