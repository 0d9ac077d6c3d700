//! Converter selection
//!
//! Given a source value and a target type specification, pick the single
//! converter that performs the conversion:
//!
//! 1. a converter forced by the mapping configuration, if it accepts
//! 2. for simple targets, the highest-priority accepting converter
//! 3. for object targets, the first accepting converter walking the target
//!    class and its ancestors, nearest first
//! 4. otherwise the highest-priority accepting converter across all
//!    interfaces of the target, where a tie is an error
//! 5. otherwise the generic `object` converters
//!
//! Copyright (c) 2025 Propmap Team
//! Licensed under the Apache-2.0 license

use crate::configuration::PropertyMappingConfiguration;
use crate::converter::TypeConverter;
use crate::error::{Error, Result};
use crate::hierarchy::TypeHierarchy;
use crate::registry::{Candidate, ConverterRegistry};
use crate::types::{TargetType, OBJECT_TYPE};
use crate::value::{SourceType, Value};
use std::sync::Arc;
use tracing::{debug, trace};

/// Selects converters from a registry using a type hierarchy
#[derive(Debug, Clone)]
pub struct ConverterSelector {
    registry: Arc<ConverterRegistry>,
    hierarchy: Arc<TypeHierarchy>,
}

/// Outcome of searching one group of candidates
enum Search<'a> {
    Found(Candidate<'a>),
    Declined(usize),
}

impl ConverterSelector {
    pub fn new(registry: Arc<ConverterRegistry>, hierarchy: Arc<TypeHierarchy>) -> Self {
        Self { registry, hierarchy }
    }

    pub fn registry(&self) -> &ConverterRegistry {
        &self.registry
    }

    pub fn hierarchy(&self) -> &TypeHierarchy {
        &self.hierarchy
    }

    /// Source type category of `source`, failing for unclassifiable values
    pub fn determine_source_type(&self, source: &Value) -> Result<SourceType> {
        SourceType::classify(source).ok_or_else(|| Error::InvalidSource {
            message: format!(
                "the source is not of type string, integer, float, boolean or array, but of type {}",
                source.class_name().unwrap_or(source.kind_name())
            ),
            value_kind: source.kind_name().to_string(),
        })
    }

    /// Names consulted for an object target: classes, then interfaces, then `object`
    ///
    /// Fails with [`Error::InvalidTarget`] when the target is not declared.
    pub fn lookup_path(&self, target: &TargetType) -> Result<Vec<String>> {
        if target.name() == OBJECT_TYPE {
            return Ok(vec![OBJECT_TYPE.to_string()]);
        }
        let path = self
            .hierarchy
            .resolution_path(target.name())
            .ok_or_else(|| Error::InvalidTarget {
                target_type: target.to_string(),
                message: "the target type is neither a simple type nor a declared class or interface"
                    .to_string(),
            })?;
        let mut names = path.classes;
        names.extend(path.interfaces);
        names.push(OBJECT_TYPE.to_string());
        Ok(names)
    }

    /// Find the converter for `source` and `target_type`
    pub fn find_type_converter(
        &self,
        source: &Value,
        target_type: &str,
        configuration: &PropertyMappingConfiguration,
    ) -> Result<Arc<dyn TypeConverter>> {
        let target = TargetType::parse(target_type)?;
        let spec = target.to_string();

        if let Some(converter) = configuration.type_converter(&spec) {
            if converter.can_convert_from(source, &spec) {
                debug!(
                    converter = converter.name(),
                    target_type = %spec,
                    "Using configured type converter"
                );
                return Ok(Arc::clone(converter));
            }
            debug!(
                converter = converter.name(),
                target_type = %spec,
                "Configured type converter declined the source"
            );
        }

        let source_type = self.determine_source_type(source)?;

        if target.is_simple() {
            let candidates = self.registry.lookup_target(source_type, &target);
            if candidates.is_empty() {
                return Err(Error::TypeConverter {
                    source_type: source_type.to_string(),
                    target_type: spec,
                });
            }
            return match first_accepting(&candidates, source, &spec) {
                Search::Found(candidate) => Ok(self.selected(candidate, &spec)),
                Search::Declined(declined) => Err(Error::NoSuitableConverter {
                    source_type: source_type.to_string(),
                    target_type: spec,
                    candidates: declined,
                }),
            };
        }

        self.find_object_converter(source, source_type, &target, &spec)
    }

    fn find_object_converter(
        &self,
        source: &Value,
        source_type: SourceType,
        target: &TargetType,
        spec: &str,
    ) -> Result<Arc<dyn TypeConverter>> {
        let mut considered = 0;

        if target.name() != OBJECT_TYPE {
            let path = self
                .hierarchy
                .resolution_path(target.name())
                .ok_or_else(|| Error::InvalidTarget {
                    target_type: spec.to_string(),
                    message: "the target type is neither a simple type nor a declared class or interface"
                        .to_string(),
                })?;

            // The first class with an accepting converter wins; priorities are
            // never compared across ancestor distances.
            for class_name in &path.classes {
                let candidates = self.registry.lookup(source_type, class_name);
                match first_accepting(&candidates, source, spec) {
                    Search::Found(candidate) => return Ok(self.selected(candidate, spec)),
                    Search::Declined(declined) => considered += declined,
                }
            }

            let mut accepting = Vec::new();
            for interface in &path.interfaces {
                let candidates = self.registry.lookup(source_type, interface);
                considered += candidates.len();
                for candidate in candidates {
                    if candidate.converter.can_convert_from(source, spec)
                        && !accepting.iter().any(|c: &Candidate<'_>| c.id == candidate.id)
                    {
                        trace!(
                            converter = candidate.converter.name(),
                            interface = interface.as_str(),
                            priority = candidate.priority,
                            "Interface converter accepts"
                        );
                        accepting.push(candidate);
                    }
                }
            }
            if let Some(candidate) = highest_unique(accepting, spec)? {
                return Ok(self.selected(candidate, spec));
            }
        }

        let candidates = self.registry.lookup(source_type, OBJECT_TYPE);
        considered += candidates.len();
        let accepting: Vec<_> = candidates
            .into_iter()
            .filter(|candidate| candidate.converter.can_convert_from(source, spec))
            .collect();
        if let Some(candidate) = highest_unique(accepting, spec)? {
            return Ok(self.selected(candidate, spec));
        }

        if considered == 0 {
            Err(Error::TypeConverter {
                source_type: source_type.to_string(),
                target_type: spec.to_string(),
            })
        } else {
            Err(Error::NoSuitableConverter {
                source_type: source_type.to_string(),
                target_type: spec.to_string(),
                candidates: considered,
            })
        }
    }

    fn selected(&self, candidate: Candidate<'_>, spec: &str) -> Arc<dyn TypeConverter> {
        debug!(
            converter = candidate.converter.name(),
            priority = candidate.priority,
            target_type = spec,
            "Selected type converter"
        );
        Arc::clone(candidate.converter)
    }
}

/// First accepting candidate of a list ordered by descending priority
fn first_accepting<'a>(candidates: &[Candidate<'a>], source: &Value, spec: &str) -> Search<'a> {
    candidates
        .iter()
        .find(|candidate| candidate.converter.can_convert_from(source, spec))
        .map(|candidate| Search::Found(*candidate))
        .unwrap_or(Search::Declined(candidates.len()))
}

/// The single highest-priority candidate; ties are ambiguous
fn highest_unique<'a>(accepting: Vec<Candidate<'a>>, spec: &str) -> Result<Option<Candidate<'a>>> {
    let Some(best) = accepting.iter().map(|candidate| candidate.priority).max() else {
        return Ok(None);
    };
    let mut top: Vec<Candidate<'a>> = accepting
        .into_iter()
        .filter(|candidate| candidate.priority == best)
        .collect();
    if top.len() > 1 {
        return Err(Error::DuplicateTypeConverter {
            target_type: spec.to_string(),
            priority: best,
            converters: top
                .iter()
                .map(|candidate| candidate.converter.name().to_string())
                .collect(),
        });
    }
    Ok(top.pop())
}
