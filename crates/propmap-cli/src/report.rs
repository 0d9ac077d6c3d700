//! Serializable results of the `inspect` and `types` commands

use propmap_core::types::OBJECT_TYPE;
use propmap_core::{
    ConverterRegistry, ConverterSelector, ErrorKind, PropertyMappingConfiguration, SourceType,
    TargetType, TypeConverter, TypeDeclaration, TypeHierarchy, Value,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// How a target type is resolved and which converter wins
#[derive(Debug, Clone, Serialize)]
pub struct InspectionReport {
    /// Normalized target type specification
    pub target_type: String,
    /// Names consulted, in search order
    pub path: Vec<PathEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_type: Option<SourceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<Selection>,
}

/// One name of the resolution path with its registered converters
#[derive(Debug, Clone, Serialize)]
pub struct PathEntry {
    pub type_name: String,
    pub segment: Segment,
    pub candidates: Vec<CandidateInfo>,
}

/// Part of the resolution path a name belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    Simple,
    Class,
    Interface,
    Object,
}

/// A converter registered for a path entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateInfo {
    pub converter: String,
    pub priority: i32,
    /// Source types under which the converter is registered for this name
    pub source_types: Vec<SourceType>,
}

/// Outcome of selecting a converter for a concrete source
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Selection {
    Selected { converter: String },
    Failed { kind: ErrorKind, message: String },
}

/// Declared types and registered converters
#[derive(Debug, Clone, Serialize)]
pub struct TypeListing {
    pub types: Vec<TypeEntry>,
    pub converters: Vec<ConverterEntry>,
}

/// A declared type with its resolution path
#[derive(Debug, Clone, Serialize)]
pub struct TypeEntry {
    #[serde(flatten)]
    pub declaration: TypeDeclaration,
    pub resolution_path: Vec<String>,
}

/// A registered converter
#[derive(Debug, Clone, Serialize)]
pub struct ConverterEntry {
    pub name: String,
    pub target_type: String,
    pub priority: i32,
    pub source_types: Vec<SourceType>,
}

impl InspectionReport {
    /// Inspect `target`, optionally selecting a converter for `source`
    pub fn build(
        selector: &ConverterSelector,
        target: &TargetType,
        source: Option<&Value>,
        configuration: &PropertyMappingConfiguration,
    ) -> propmap_core::Result<Self> {
        let source_type = match source {
            Some(value) => Some(selector.determine_source_type(value)?),
            None => None,
        };
        let source_types = match source_type {
            Some(source_type) => vec![source_type],
            None => SourceType::ALL.to_vec(),
        };

        let names = if target.is_simple() {
            vec![target.name().to_string()]
        } else {
            selector.lookup_path(target)?
        };
        let resolution = selector.hierarchy().resolution_path(target.name());

        let path = names
            .into_iter()
            .map(|name| {
                let segment = if target.is_simple() {
                    Segment::Simple
                } else if name == OBJECT_TYPE {
                    Segment::Object
                } else if resolution
                    .as_ref()
                    .map(|path| path.interfaces.contains(&name))
                    .unwrap_or(false)
                {
                    Segment::Interface
                } else {
                    Segment::Class
                };
                let candidates = candidates_for(selector.registry(), &name, &source_types);
                PathEntry {
                    type_name: name,
                    segment,
                    candidates,
                }
            })
            .collect();

        let target_type = target.to_string();
        let selection = source.map(|value| {
            match selector.find_type_converter(value, &target_type, configuration) {
                Ok(converter) => Selection::Selected {
                    converter: converter.name().to_string(),
                },
                Err(err) => Selection::Failed {
                    kind: err.kind(),
                    message: err.to_string(),
                },
            }
        });

        Ok(Self {
            target_type,
            path,
            source_type,
            selection,
        })
    }
}

/// Converters registered for `name`, highest priority first
fn candidates_for(
    registry: &ConverterRegistry,
    name: &str,
    source_types: &[SourceType],
) -> Vec<CandidateInfo> {
    let mut by_id: BTreeMap<usize, CandidateInfo> = BTreeMap::new();
    for source_type in source_types {
        for candidate in registry.lookup(*source_type, name) {
            by_id
                .entry(candidate.id.index())
                .or_insert_with(|| CandidateInfo {
                    converter: candidate.converter.name().to_string(),
                    priority: candidate.priority,
                    source_types: Vec::new(),
                })
                .source_types
                .push(*source_type);
        }
    }

    let mut candidates: Vec<CandidateInfo> = by_id.into_values().collect();
    candidates.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.converter.cmp(&b.converter)));
    candidates
}

impl TypeListing {
    /// List every declaration, sorted by name, and every converter in registration order
    pub fn build(hierarchy: &TypeHierarchy, registry: &ConverterRegistry) -> Self {
        let mut declarations = hierarchy.declarations();
        declarations.sort_by(|a, b| a.name.cmp(&b.name));

        let types = declarations
            .into_iter()
            .map(|declaration| TypeEntry {
                declaration: declaration.clone(),
                resolution_path: hierarchy
                    .resolution_path(&declaration.name)
                    .map(|path| path.iter().map(str::to_string).collect())
                    .unwrap_or_default(),
            })
            .collect();

        let converters = registry
            .converters()
            .map(|(_, converter)| converter_entry(converter.as_ref()))
            .collect();

        Self { types, converters }
    }
}

fn converter_entry(converter: &dyn TypeConverter) -> ConverterEntry {
    ConverterEntry {
        name: converter.name().to_string(),
        target_type: converter.supported_target_type().to_string(),
        priority: converter.priority(),
        source_types: converter.supported_source_types().to_vec(),
    }
}
