//! Property-based testing strategies for generating test data
//!
//! This module provides proptest strategies for generating random values,
//! type specifications and hierarchies for property testing.

#![cfg(test)]

use crate::configuration::PropertyMappingConfiguration;
use crate::converter::built_in::{register_defaults, standard_types};
use crate::hierarchy::{TypeDeclaration, TypeHierarchy};
use crate::registry::ConverterRegistry;
use crate::types::{TargetType, SIMPLE_TYPES};
use crate::value::{SourceType, Value};
use crate::PropertyMapper;
use proptest::collection::{btree_map, vec};
use proptest::prelude::*;
use std::sync::Arc;

/// Strategy for generating scalar source values
pub fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,20}".prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        (-1.0e9f64..1.0e9).prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
    ]
}

/// Strategy for generating nested source values
pub fn value_strategy() -> impl Strategy<Value = Value> {
    scalar_strategy().prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            vec(inner.clone(), 0..6).prop_map(Value::Array),
            btree_map("[a-z]{1,8}", inner, 0..6).prop_map(Value::Map),
        ]
    })
}

/// Strategy for generating simple type names, aliases included
pub fn simple_type_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(SIMPLE_TYPES.to_vec()).prop_map(str::to_string),
        prop::sample::select(vec!["int", "bool", "double"]).prop_map(str::to_string),
    ]
}

/// Strategy for generating chains of single-inheritance classes
pub fn class_chain_strategy() -> impl Strategy<Value = Vec<TypeDeclaration>> {
    (1usize..6).prop_map(|depth| {
        (0..depth)
            .map(|level| {
                let declaration = TypeDeclaration::class(format!("Level{}", level));
                if level == 0 {
                    declaration
                } else {
                    declaration.extends(format!("Level{}", level - 1))
                }
            })
            .collect()
    })
}

fn default_mapper() -> PropertyMapper {
    let hierarchy = Arc::new(
        TypeHierarchy::builder()
            .declare_all(standard_types())
            .build()
            .unwrap(),
    );
    let registry = register_defaults(ConverterRegistry::builder(), hierarchy.clone())
        .unwrap()
        .build();
    PropertyMapper::new(Arc::new(registry), hierarchy)
}

proptest! {
    #[test]
    fn prop_every_simple_value_classifies(value in scalar_strategy()) {
        prop_assert!(SourceType::classify(&value).is_some());
    }

    #[test]
    fn prop_nested_values_classify_as_array(value in value_strategy()) {
        if matches!(value, Value::Array(_) | Value::Map(_)) {
            prop_assert_eq!(SourceType::classify(&value), Some(SourceType::Array));
        }
    }

    #[test]
    fn prop_simple_type_names_normalize(name in simple_type_strategy()) {
        let target = TargetType::parse(&name).unwrap();
        prop_assert!(target.is_simple());
        prop_assert!(SIMPLE_TYPES.contains(&target.name()));
        prop_assert_eq!(TargetType::parse(&target.to_string()).unwrap(), target);
    }

    #[test]
    fn prop_scalars_always_convert_to_string(value in scalar_strategy()) {
        let result = default_mapper().convert(&value, "string").unwrap();
        prop_assert!(result.as_str().is_some());
    }

    #[test]
    fn prop_class_chain_resolution_is_nearest_first(chain in class_chain_strategy()) {
        let depth = chain.len();
        let hierarchy = TypeHierarchy::builder().declare_all(chain).build().unwrap();
        let leaf = format!("Level{}", depth - 1);
        let path = hierarchy.resolution_path(&leaf).unwrap();

        prop_assert_eq!(path.classes.len(), depth);
        prop_assert_eq!(&path.classes[0], &leaf);
        prop_assert_eq!(path.classes.last().map(String::as_str), Some("Level0"));
        prop_assert!(path.interfaces.is_empty());
    }

    #[test]
    fn prop_skip_list_always_wins(name in "[a-z]{1,8}") {
        let configuration = PropertyMappingConfiguration::new()
            .allow_properties([name.clone()])
            .skip_properties([name.clone()]);
        prop_assert!(configuration.should_map(&name));
        prop_assert!(configuration.should_skip(&name));
    }
}
