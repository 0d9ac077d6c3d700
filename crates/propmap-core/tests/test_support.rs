//! Shared test support utilities for integration tests

#![allow(dead_code)]

use propmap_core::converter::built_in::{register_defaults, standard_types};
use propmap_core::{
    ConverterRegistry, Error, PropertyMapper, PropertyMappingConfiguration, Result, SourceType,
    TypeConverter, TypeDeclaration, TypeHierarchy, Value,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// What a mock converter does when asked to convert
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Return the converted children as a map
    Children,
    /// Return a fixed value
    Fixed(Value),
    /// Fail with an authorization error
    Deny,
    /// Fail with a conversion error
    Fail,
}

/// Configurable converter recording how it was called
#[derive(Debug)]
pub struct MockConverter {
    name: String,
    sources: Vec<SourceType>,
    target: String,
    priority: i32,
    accepts: bool,
    children: Vec<String>,
    child_type: Option<String>,
    outcome: Outcome,
    calls: AtomicUsize,
    received: Mutex<Option<BTreeMap<String, Value>>>,
}

impl MockConverter {
    /// A converter named `name` for `target`, accepting every source type
    pub fn new(name: &str, target: &str, priority: i32) -> Self {
        Self {
            name: name.to_string(),
            sources: SourceType::ALL.to_vec(),
            target: target.to_string(),
            priority,
            accepts: true,
            children: Vec::new(),
            child_type: None,
            outcome: Outcome::Fixed(Value::from(name)),
            calls: AtomicUsize::new(0),
            received: Mutex::new(None),
        }
    }

    pub fn sources(mut self, sources: &[SourceType]) -> Self {
        self.sources = sources.to_vec();
        self
    }

    /// Decline every source in `can_convert_from`
    pub fn declining(mut self) -> Self {
        self.accepts = false;
        self
    }

    /// Report these members of a map source as children to convert
    pub fn children(mut self, names: &[&str]) -> Self {
        self.children = names.iter().map(|name| name.to_string()).collect();
        self
    }

    /// Type reported for every child property
    pub fn child_type(mut self, type_spec: &str) -> Self {
        self.child_type = Some(type_spec.to_string());
        self
    }

    pub fn outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = outcome;
        self
    }

    /// Keep a handle for inspecting calls
    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Handle ready for registration
    pub fn into_dyn(self) -> Arc<dyn TypeConverter> {
        Arc::new(self)
    }

    /// Number of `convert_from` calls
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Children passed to the last `convert_from` call
    pub fn received(&self) -> Option<BTreeMap<String, Value>> {
        self.received.lock().unwrap().clone()
    }
}

impl TypeConverter for MockConverter {
    fn name(&self) -> &str {
        &self.name
    }

    fn supported_source_types(&self) -> &[SourceType] {
        &self.sources
    }

    fn supported_target_type(&self) -> &str {
        &self.target
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn can_convert_from(&self, _source: &Value, _target_type: &str) -> bool {
        self.accepts
    }

    fn source_child_properties_to_be_converted(&self, source: &Value) -> BTreeMap<String, Value> {
        source
            .members()
            .into_iter()
            .filter(|(name, _)| self.children.contains(name))
            .collect()
    }

    fn type_of_child_property(
        &self,
        _target_type: &str,
        _property_name: &str,
        _configuration: &PropertyMappingConfiguration,
    ) -> Result<Option<String>> {
        Ok(self.child_type.clone())
    }

    fn convert_from(
        &self,
        _source: &Value,
        target_type: &str,
        converted_child_properties: BTreeMap<String, Value>,
        _configuration: &PropertyMappingConfiguration,
    ) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.received.lock().unwrap() = Some(converted_child_properties.clone());
        match &self.outcome {
            Outcome::Children => Ok(Value::Map(converted_child_properties)),
            Outcome::Fixed(value) => Ok(value.clone()),
            Outcome::Deny => Err(Error::access_denied(format!("{} denies access", self.name))),
            Outcome::Fail => Err(Error::conversion_failed(target_type, "mock failure")),
        }
    }
}

/// `C3 extends C2 extends C1`; `C1` implements `I1`, `C3` implements `I3`,
/// and `I3` extends `I2`
pub fn fixture_hierarchy() -> TypeHierarchy {
    TypeHierarchy::builder()
        .declare_all(standard_types())
        .declare(TypeDeclaration::interface("I1"))
        .declare(TypeDeclaration::interface("I2"))
        .declare(TypeDeclaration::interface("I3").implements("I2"))
        .declare(TypeDeclaration::class("C1").implements("I1"))
        .declare(TypeDeclaration::class("C2").extends("C1"))
        .declare(TypeDeclaration::class("C3").extends("C2").implements("I3"))
        .build()
        .expect("fixture hierarchy is valid")
}

/// Share a mock as a registrable converter
pub fn shared(converter: &Arc<MockConverter>) -> Arc<dyn TypeConverter> {
    converter.clone()
}

/// Mapper over the fixture hierarchy with only the given converters
pub fn mapper_with(converters: Vec<Arc<dyn TypeConverter>>) -> PropertyMapper {
    let registry = ConverterRegistry::builder()
        .register_all(converters)
        .expect("converters register")
        .build();
    PropertyMapper::new(Arc::new(registry), Arc::new(fixture_hierarchy()))
}

/// Mapper with the built-in converters over the given declarations
pub fn default_mapper(declarations: Vec<TypeDeclaration>) -> PropertyMapper {
    let hierarchy = Arc::new(
        TypeHierarchy::builder()
            .declare_all(standard_types())
            .declare_all(declarations)
            .build()
            .expect("declarations are valid"),
    );
    let registry = register_defaults(ConverterRegistry::builder(), hierarchy.clone())
        .expect("built-in converters register")
        .build();
    PropertyMapper::new(Arc::new(registry), hierarchy)
}

/// Names of the converter selected for `source` and `target`
pub fn selected_name(mapper: &PropertyMapper, source: &Value, target: &str) -> Result<String> {
    mapper
        .find_type_converter(source, target, &PropertyMappingConfiguration::new())
        .map(|converter| converter.name().to_string())
}
