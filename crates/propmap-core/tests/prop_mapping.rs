//! Property-based tests for the mapping engine
//!
//! These tests verify invariants that should hold for all generated inputs:
//! priority ordering, ambiguity detection, short-circuiting and the
//! allow/skip policy.

mod test_support;

use proptest::collection::{btree_set, vec};
use proptest::prelude::*;
use propmap_core::{Error, PropertyMappingConfiguration, TypeConverter, TypeDeclaration, Value};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use test_support::*;

// Strategy functions for property testing

/// Strategy for generating sets of distinct priorities
fn priorities_strategy() -> impl Strategy<Value = Vec<i32>> {
    btree_set(-100i32..100, 1..8).prop_map(|set| set.into_iter().collect())
}

/// Strategy for generating integer-like strings
fn integer_string_strategy() -> impl Strategy<Value = (i64, String)> {
    (-1_000_000i64..1_000_000, 0usize..3).prop_map(|(n, padding)| {
        (n, format!("{}{}{}", " ".repeat(padding), n, " ".repeat(padding)))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn highest_accepting_priority_is_selected(
        priorities in priorities_strategy(),
        declining in vec(any::<bool>(), 8),
    ) {
        let converters: Vec<Arc<dyn TypeConverter>> = priorities
            .iter()
            .zip(declining.iter())
            .map(|(priority, declines)| {
                let converter = MockConverter::new(&format!("P{}", priority), "string", *priority);
                if *declines { converter.declining().into_dyn() } else { converter.into_dyn() }
            })
            .collect();
        let expected = priorities
            .iter()
            .zip(declining.iter())
            .filter(|(_, declines)| !**declines)
            .map(|(priority, _)| *priority)
            .max();

        let mapper = mapper_with(converters);
        let selected = selected_name(&mapper, &Value::from("x"), "string");
        match expected {
            Some(priority) => prop_assert_eq!(selected.unwrap(), format!("P{}", priority)),
            None => {
                let is_no_suitable = matches!(selected, Err(Error::NoSuitableConverter { .. }));
                prop_assert!(is_no_suitable);
            }
        }
    }

    #[test]
    fn interface_ties_at_the_top_are_always_ambiguous(priority in -50i32..50) {
        let mapper = mapper_with(vec![
            MockConverter::new("ForI1", "I1", priority).into_dyn(),
            MockConverter::new("ForI2", "I2", priority).into_dyn(),
            MockConverter::new("ForI3", "I3", priority - 1).into_dyn(),
        ]);
        let selected = selected_name(&mapper, &Value::from(json!({})), "C3");
        let is_duplicate = matches!(selected, Err(Error::DuplicateTypeConverter { .. }));
        prop_assert!(is_duplicate);
    }

    #[test]
    fn integer_strings_convert_to_integers((n, text) in integer_string_strategy()) {
        let mapper = default_mapper(Vec::new());
        prop_assert_eq!(mapper.convert(&Value::from(text), "int").unwrap(), Value::from(n));
    }

    #[test]
    fn typed_arrays_keep_member_order(numbers in vec(-1000i64..1000, 0..30)) {
        let mapper = default_mapper(Vec::new());
        let source = Value::Array(numbers.iter().map(|n| Value::from(n.to_string())).collect());
        let expected = Value::Array(numbers.iter().copied().map(Value::from).collect());
        prop_assert_eq!(mapper.convert(&source, "array<integer>").unwrap(), expected);
    }

    #[test]
    fn converted_objects_short_circuit(name in "[a-zA-Z]{1,12}", age in 0i64..120) {
        let mapper = default_mapper(vec![
            TypeDeclaration::class("Person")
                .property("name", "string")
                .property("age", "integer"),
        ]);
        let person = mapper
            .convert(&Value::from(json!({"name": name, "age": age})), "Person")
            .unwrap();
        let again = mapper.convert(&person, "Person").unwrap();
        prop_assert_eq!(again, person);
    }

    #[test]
    fn only_allowed_properties_reach_the_result(
        allowed in btree_set("[a-e]", 0..5),
    ) {
        let mapper = default_mapper(vec![
            TypeDeclaration::class("Letters")
                .property("a", "string")
                .property("b", "string")
                .property("c", "string")
                .property("d", "string")
                .property("e", "string"),
        ]);
        let source = Value::from(json!({"a": "1", "b": "2", "c": "3", "d": "4", "e": "5"}));
        let configuration = PropertyMappingConfiguration::new()
            .allow_properties(allowed.iter().cloned())
            .skip_unknown_properties();

        let result = mapper.convert_with(&source, "Letters", &configuration).unwrap();
        let properties: BTreeMap<String, Value> = result.as_object().unwrap().properties().clone();
        prop_assert_eq!(
            properties.keys().cloned().collect::<std::collections::BTreeSet<_>>(),
            allowed
        );
    }
}
