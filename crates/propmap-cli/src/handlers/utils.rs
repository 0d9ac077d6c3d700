//! Shared utilities for command handlers

use crate::config::Config;
use crate::error::{Error, ErrorContext, Result};
use crate::logging::timing::Timer;
use crate::mapping;
use propmap_core::converter::built_in::{register_defaults, standard_types};
use propmap_core::{
    ConverterRegistry, ConverterSelector, PropertyMapper, PropertyMappingConfiguration, TypeHierarchy,
};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Declared types and the built-in converters registered over them
pub struct Engine {
    pub hierarchy: Arc<TypeHierarchy>,
    pub registry: Arc<ConverterRegistry>,
}

impl Engine {
    /// Load declarations from `types` (or the configured default) and register the built-ins
    pub fn load(types: Option<&Path>, config: &Config) -> Result<Self> {
        let _timer = Timer::new("engine_setup");

        let mut builder = TypeHierarchy::builder().declare_all(standard_types());
        match types.or(config.types_file.as_deref()) {
            Some(path) => {
                builder = builder.declare_all(mapping::load_types(path)?);
            }
            None => tracing::debug!("No type declarations given; only built-in types are available"),
        }

        let hierarchy = Arc::new(builder.build()?);
        let registry = register_defaults(ConverterRegistry::builder(), hierarchy.clone())?.build();
        tracing::info!(
            types = hierarchy.len(),
            converters = registry.len(),
            "Converter registry ready"
        );

        Ok(Self {
            hierarchy,
            registry: Arc::new(registry),
        })
    }

    /// Mapper limited to `max_depth` levels of nesting
    pub fn mapper(&self, max_depth: usize) -> PropertyMapper {
        PropertyMapper::new(self.registry.clone(), self.hierarchy.clone()).with_max_depth(max_depth)
    }

    pub fn selector(&self) -> ConverterSelector {
        ConverterSelector::new(self.registry.clone(), self.hierarchy.clone())
    }

    /// Mapping configuration from `path` (or the configured default), else map everything
    pub fn configuration(
        &self,
        path: Option<&Path>,
        config: &Config,
    ) -> Result<PropertyMappingConfiguration> {
        match path.or(config.mapping_file.as_deref()) {
            Some(path) => mapping::load_mapping(path)?.to_configuration(&self.registry),
            None => Ok(PropertyMappingConfiguration::new()),
        }
    }
}

/// Read the input document from a file, or from stdin when no path is given
pub fn read_input(path: Option<&Path>) -> Result<serde_json::Value> {
    match path {
        Some(path) => mapping::read_document(path),
        None => {
            let mut content = String::new();
            std::io::stdin()
                .read_to_string(&mut content)
                .with_context(|| "Reading input from stdin".to_string())?;
            serde_json::from_str(&content).map_err(|e| Error::InvalidFormat {
                path: PathBuf::from("<stdin>"),
                expected: "JSON".to_string(),
                reason: e.to_string(),
            })
        }
    }
}

/// Parse an inline JSON argument
pub fn parse_inline_json(argument: &str, text: &str) -> Result<serde_json::Value> {
    serde_json::from_str(text)
        .map_err(|e| Error::invalid_args(format!("{} is not valid JSON: {}", argument, e)))
}
