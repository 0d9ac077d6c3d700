//! Type declaration and mapping files
//!
//! Both files are YAML or JSON, chosen by extension. A type declarations
//! file is a list of classes and interfaces:
//!
//! ```yaml
//! - name: Address
//!   properties: { street: string, zip: integer }
//! - name: Customer
//!   parent: Entity
//!   interfaces: [Identifiable]
//!   properties: { name: string, address: Address }
//! ```
//!
//! A mapping file mirrors [`PropertyMappingConfiguration`], with nested
//! `properties` sections configuring child properties by name or dotted path.

use crate::config::is_yaml;
use crate::error::{Error, Result};
use propmap_core::{ConverterRegistry, PropertyMappingConfiguration, TypeDeclaration, Value};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// On-disk form of a mapping configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MappingFile {
    /// Map only these properties
    pub allow: Option<Vec<String>>,
    /// Map every property except these
    pub allow_all_except: Option<Vec<String>>,
    /// Properties silently left out
    pub skip: Vec<String>,
    /// Skip disallowed or undeclared properties instead of failing
    pub skip_unknown: bool,
    /// Source property name to target property name
    pub rename: BTreeMap<String, String>,
    /// Target type to the name of a registered converter
    pub converters: BTreeMap<String, String>,
    /// Converter name to option key to value
    pub options: BTreeMap<String, BTreeMap<String, Value>>,
    /// Nested configuration per property
    pub properties: BTreeMap<String, MappingFile>,
}

impl MappingFile {
    /// Build the configuration, resolving converter names against `registry`
    pub fn to_configuration(&self, registry: &ConverterRegistry) -> Result<PropertyMappingConfiguration> {
        let mut configuration = PropertyMappingConfiguration::new();

        configuration = match (&self.allow, &self.allow_all_except) {
            (Some(_), Some(_)) => {
                return Err(Error::config(
                    "'allow' and 'allow_all_except' cannot be combined",
                ))
            }
            (Some(names), None) => configuration.allow_properties(names.iter().cloned()),
            (None, Some(names)) => configuration.allow_all_properties_except(names.iter().cloned()),
            (None, None) => configuration,
        };

        configuration = configuration.skip_properties(self.skip.iter().cloned());
        if self.skip_unknown {
            configuration = configuration.skip_unknown_properties();
        }

        for (source_name, target_name) in &self.rename {
            configuration = configuration.set_mapping(source_name.clone(), target_name.clone());
        }

        for (target_type, name) in &self.converters {
            let converter = registry
                .converters()
                .find(|(_, converter)| converter.name() == name)
                .map(|(_, converter)| converter.clone())
                .ok_or_else(|| Error::UnknownConverter {
                    name: name.clone(),
                    target_type: target_type.clone(),
                })?;
            configuration = configuration.set_type_converter(target_type, converter);
        }

        for (converter_name, options) in &self.options {
            for (key, value) in options {
                configuration = configuration.set_type_converter_option(
                    converter_name.clone(),
                    key.clone(),
                    value.clone(),
                );
            }
        }

        for (path, nested) in &self.properties {
            let nested = nested.to_configuration(registry)?;
            configuration = configuration.for_property(path, |_| nested);
        }

        Ok(configuration)
    }
}

/// Load a list of type declarations
pub fn load_types(path: &Path) -> Result<Vec<TypeDeclaration>> {
    let declarations: Vec<TypeDeclaration> = read_document(path)?;
    tracing::debug!(path = %path.display(), count = declarations.len(), "Loaded type declarations");
    Ok(declarations)
}

/// Load a mapping file
pub fn load_mapping(path: &Path) -> Result<MappingFile> {
    read_document(path)
}

/// Read and deserialize a YAML or JSON document
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;

    if is_yaml(path) {
        serde_yaml::from_str(&content).map_err(|e| Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: "YAML".to_string(),
            reason: e.to_string(),
        })
    } else {
        serde_json::from_str(&content).map_err(|e| Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: "JSON".to_string(),
            reason: e.to_string(),
        })
    }
}
