//! Converter registry
//!
//! Converters are registered once, before any conversion runs, into an arena
//! addressed by [`ConverterId`]. Lookups go through a two-level table
//! `source type -> target type name -> priority -> converter`, so that the
//! candidates for a pair come out already ordered by descending priority.
//!
//! Copyright (c) 2025 Propmap Team
//! Licensed under the Apache-2.0 license

use crate::converter::TypeConverter;
use crate::error::{Error, Result};
use crate::types::TargetType;
use crate::value::SourceType;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Stable handle of a registered converter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConverterId(usize);

impl ConverterId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A converter together with the priority it is registered under
#[derive(Clone, Copy)]
pub struct Candidate<'a> {
    pub id: ConverterId,
    pub priority: i32,
    pub converter: &'a Arc<dyn TypeConverter>,
}

impl fmt::Debug for Candidate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Candidate")
            .field("id", &self.id)
            .field("priority", &self.priority)
            .field("converter", &self.converter.name())
            .finish()
    }
}

type PriorityTable = BTreeMap<i32, ConverterId>;

/// Immutable table of registered converters
#[derive(Default)]
pub struct ConverterRegistry {
    converters: Vec<Arc<dyn TypeConverter>>,
    table: HashMap<SourceType, HashMap<String, PriorityTable>>,
}

impl ConverterRegistry {
    /// Start registering converters
    pub fn builder() -> ConverterRegistryBuilder {
        ConverterRegistryBuilder::new()
    }

    /// Candidates for a source type and bare target name, highest priority first
    pub fn lookup(&self, source_type: SourceType, target_type: &str) -> Vec<Candidate<'_>> {
        self.table
            .get(&source_type)
            .and_then(|targets| targets.get(target_type))
            .map(|priorities| {
                priorities
                    .iter()
                    .rev()
                    .map(|(&priority, &id)| Candidate {
                        id,
                        priority,
                        converter: &self.converters[id.0],
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Candidates for a parsed, possibly parameterized target type
    pub fn lookup_target(&self, source_type: SourceType, target: &TargetType) -> Vec<Candidate<'_>> {
        self.lookup(source_type, target.name())
    }

    /// Whether anything is registered for the source type
    pub fn has_source_type(&self, source_type: SourceType) -> bool {
        self.table.contains_key(&source_type)
    }

    pub fn converter(&self, id: ConverterId) -> Option<&Arc<dyn TypeConverter>> {
        self.converters.get(id.0)
    }

    /// Registered converters in registration order
    pub fn converters(&self) -> impl Iterator<Item = (ConverterId, &Arc<dyn TypeConverter>)> {
        self.converters
            .iter()
            .enumerate()
            .map(|(index, converter)| (ConverterId(index), converter))
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.converters.iter().map(|c| c.name()).collect();
        f.debug_struct("ConverterRegistry")
            .field("converters", &names)
            .finish()
    }
}

/// Builder enforcing the registry invariants
#[derive(Default)]
pub struct ConverterRegistryBuilder {
    registry: ConverterRegistry,
}

impl ConverterRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a converter under its declared source types, target and priority
    pub fn register<C>(self, converter: C) -> Result<Self>
    where
        C: TypeConverter + 'static,
    {
        self.register_arc(Arc::new(converter))
    }

    /// Register a shared converter
    ///
    /// Fails when another converter already occupies the same priority for one
    /// of the declared source/target pairs.
    pub fn register_arc(mut self, converter: Arc<dyn TypeConverter>) -> Result<Self> {
        let target = TargetType::parse(converter.supported_target_type())?;
        if target.is_parameterized() {
            return Err(Error::configuration(format!(
                "converter \"{}\" must be registered for a bare target type, not \"{}\"",
                converter.name(),
                target
            )));
        }
        if converter.supported_source_types().is_empty() {
            return Err(Error::configuration(format!(
                "converter \"{}\" declares no source types",
                converter.name()
            )));
        }

        let priority = converter.priority();
        let id = ConverterId(self.registry.converters.len());

        for source_type in converter.supported_source_types() {
            let existing = self
                .registry
                .table
                .get(source_type)
                .and_then(|targets| targets.get(target.name()))
                .and_then(|priorities| priorities.get(&priority));
            if let Some(existing) = existing {
                return Err(Error::DuplicateTypeConverter {
                    target_type: target.name().to_string(),
                    priority,
                    converters: vec![
                        self.registry.converters[existing.0].name().to_string(),
                        converter.name().to_string(),
                    ],
                });
            }
        }

        for source_type in converter.supported_source_types() {
            self.registry
                .table
                .entry(*source_type)
                .or_default()
                .entry(target.name().to_string())
                .or_default()
                .insert(priority, id);
        }

        debug!(
            converter = converter.name(),
            target_type = target.name(),
            priority,
            "Registered type converter"
        );
        self.registry.converters.push(converter);
        Ok(self)
    }

    /// Register several converters in order
    pub fn register_all<I>(self, converters: I) -> Result<Self>
    where
        I: IntoIterator<Item = Arc<dyn TypeConverter>>,
    {
        converters
            .into_iter()
            .try_fold(self, |builder, converter| builder.register_arc(converter))
    }

    /// Freeze the registry
    pub fn build(self) -> ConverterRegistry {
        self.registry
    }
}
