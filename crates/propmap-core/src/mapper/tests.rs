//! Tests for the recursive conversion engine
//!
//! Copyright (c) 2025 Propmap Team
//! Licensed under the Apache-2.0 license

use super::*;
use crate::converter::built_in::{register_defaults, standard_types};
use crate::error::ErrorKind;
use crate::hierarchy::TypeDeclaration;
use crate::value::SourceType;
use pretty_assertions::assert_eq;
use serde_json::json;

/// Rejects every value with an authorization failure
struct Vault;

impl TypeConverter for Vault {
    fn name(&self) -> &str {
        "Vault"
    }
    fn supported_source_types(&self) -> &[SourceType] {
        &[SourceType::String]
    }
    fn supported_target_type(&self) -> &str {
        "Secret"
    }
    fn priority(&self) -> i32 {
        1
    }
    fn convert_from(
        &self,
        _source: &Value,
        _target_type: &str,
        _children: BTreeMap<String, Value>,
        _configuration: &PropertyMappingConfiguration,
    ) -> Result<Value> {
        Err(Error::access_denied("secrets may not be mapped"))
    }
}

/// Upper-cases strings; used as a configured override
struct Shout;

impl TypeConverter for Shout {
    fn name(&self) -> &str {
        "Shout"
    }
    fn supported_source_types(&self) -> &[SourceType] {
        &[SourceType::String]
    }
    fn supported_target_type(&self) -> &str {
        "string"
    }
    fn priority(&self) -> i32 {
        0
    }
    fn convert_from(
        &self,
        source: &Value,
        _target_type: &str,
        _children: BTreeMap<String, Value>,
        _configuration: &PropertyMappingConfiguration,
    ) -> Result<Value> {
        Ok(Value::from(source.as_str().unwrap_or_default().to_uppercase()))
    }
}

fn hierarchy() -> Arc<TypeHierarchy> {
    Arc::new(
        TypeHierarchy::builder()
            .declare_all(standard_types())
            .declare(TypeDeclaration::class("Secret"))
            .declare(
                TypeDeclaration::class("Address")
                    .property("street", "string")
                    .property("zip", "int"),
            )
            .declare(
                TypeDeclaration::class("Customer")
                    .property("name", "string")
                    .property("age", "integer")
                    .property("address", "Address")
                    .property("tags", "array<string>")
                    .property("secret", "Secret")
                    .property("since", "DateTime"),
            )
            .declare(TypeDeclaration::class("AddressBook"))
            .declare(
                TypeDeclaration::class("Node")
                    .property("label", "string")
                    .property("child", "Node"),
            )
            .build()
            .unwrap(),
    )
}

fn mapper() -> PropertyMapper {
    let hierarchy = hierarchy();
    let registry = register_defaults(ConverterRegistry::builder(), hierarchy.clone())
        .and_then(|builder| builder.register(Vault))
        .unwrap()
        .build();
    PropertyMapper::new(Arc::new(registry), hierarchy)
}

fn customer_source() -> Value {
    Value::from(json!({
        "name": "Ada",
        "age": "36",
        "address": {"street": "Main St", "zip": "12345"},
        "tags": ["a", 1, true]
    }))
}

#[test]
fn test_convert_nested_object() {
    let customer = mapper().convert(&customer_source(), "Customer").unwrap();

    assert_eq!(
        customer.to_json(),
        json!({
            "__type": "Customer",
            "name": "Ada",
            "age": 36,
            "address": {"__type": "Address", "street": "Main St", "zip": 12345},
            "tags": ["a", "1", "true"]
        })
    );
}

#[test]
fn test_already_converted_value_is_returned_unchanged() {
    let mapper = mapper();
    let address = mapper
        .convert(&Value::from(json!({"street": "Elm"})), "Address")
        .unwrap();

    let again = mapper.convert(&address, "Address").unwrap();
    match (&address, &again) {
        (Value::Object(before), Value::Object(after)) => assert!(Arc::ptr_eq(before, after)),
        other => panic!("expected objects, got {:?}", other),
    }
    assert!(mapper.convert(&address, "object").is_ok());
}

#[test]
fn test_already_converted_collection() {
    let mapper = mapper();
    let address = Value::object("Address", BTreeMap::new());
    let mut members = BTreeMap::new();
    members.insert("home".to_string(), address);
    let book = Value::object("AddressBook", members);

    let target = TargetType::parse("AddressBook<Address>").unwrap();
    assert!(mapper.is_already_converted(&book, &target));
    assert!(!mapper.is_already_converted(&book, &TargetType::parse("AddressBook<Node>").unwrap()));
    assert!(mapper.is_already_converted(
        &Value::object("AddressBook", BTreeMap::new()),
        &TargetType::parse("AddressBook<Node>").unwrap()
    ));

    let converted = mapper.convert(&book, "AddressBook<Address>").unwrap();
    assert_eq!(converted, book);
}

#[test]
fn test_collection_members_are_converted() {
    let source = Value::from(json!([{"street": "A"}, {"street": "B"}]));
    let book = mapper().convert(&source, "AddressBook<Address>").unwrap();

    let object = book.as_object().unwrap();
    assert_eq!(object.class_name(), "AddressBook");
    assert_eq!(object.get("1").and_then(Value::class_name), Some("Address"));
}

#[test]
fn test_typed_arrays_need_an_array_source() {
    let mapper = mapper();
    let numbers = mapper
        .convert(&Value::from(json!(["1", "2"])), "array<integer>")
        .unwrap();
    assert_eq!(numbers, Value::from(json!([1, 2])));

    let err = mapper.convert(&Value::from("1,2"), "array<integer>").unwrap_err();
    assert_eq!(err.root_cause().kind(), ErrorKind::NoSuitableConverter);

    let parts = mapper.convert(&Value::from("1,2"), "array").unwrap();
    assert_eq!(parts, Value::from(json!(["1", "2"])));
}

#[test]
fn test_empty_values_leave_the_property_unset() {
    let customer = mapper()
        .convert(&Value::from(json!({"name": "Ada", "age": ""})), "Customer")
        .unwrap();
    assert_eq!(customer.to_json(), json!({"__type": "Customer", "name": "Ada"}));
}

#[test]
fn test_failures_carry_the_property_path() {
    let source = Value::from(json!({"address": {"zip": "nine"}}));
    let err = mapper().convert(&source, "Customer").unwrap_err();

    match &err {
        Error::Mapping {
            target_type,
            property_path,
            source,
        } => {
            assert_eq!(target_type, "Customer");
            assert_eq!(property_path, "address.zip");
            assert_eq!(source.kind(), ErrorKind::ConversionFailed);
        }
        other => panic!("expected a mapping error, got {:?}", other),
    }
    assert!(err.to_string().contains("at property path \"address.zip\""));
}

#[test]
fn test_security_failures_are_not_wrapped() {
    let source = Value::from(json!({"name": "Ada", "secret": "hunter2"}));
    let err = mapper().convert(&source, "Customer").unwrap_err();

    assert!(err.is_security(), "expected a security failure, got {:?}", err);
    assert_eq!(err.to_string(), "Security violation (authorization): secrets may not be mapped");
}

#[test]
fn test_not_allowed_property_fails_unless_skipped() {
    let mapper = mapper();
    let source = Value::from(json!({"name": "Ada", "age": 36}));
    let only_name = PropertyMappingConfiguration::new().allow_properties(["name"]);

    let err = mapper.convert_with(&source, "Customer", &only_name).unwrap_err();
    assert_eq!(err.root_cause().kind(), ErrorKind::InvalidPropertyMappingConfiguration);

    let lenient = only_name.skip_unknown_properties();
    let customer = mapper.convert_with(&source, "Customer", &lenient).unwrap();
    assert_eq!(customer.to_json(), json!({"__type": "Customer", "name": "Ada"}));
}

#[test]
fn test_skipped_property_is_omitted() {
    let configuration = PropertyMappingConfiguration::new().skip_properties(["age"]);
    let customer = mapper()
        .convert_with(&Value::from(json!({"name": "Ada", "age": "x"})), "Customer", &configuration)
        .unwrap();
    assert!(customer.as_object().unwrap().get("age").is_none());
}

#[test]
fn test_unknown_property_fails_unless_skipped() {
    let mapper = mapper();
    let source = Value::from(json!({"name": "Ada", "shoeSize": 44}));

    let err = mapper.convert(&source, "Customer").unwrap_err();
    assert_eq!(err.root_cause().kind(), ErrorKind::UnknownProperty);

    let configuration = PropertyMappingConfiguration::new().skip_unknown_properties();
    let customer = mapper.convert_with(&source, "Customer", &configuration).unwrap();
    assert!(customer.as_object().unwrap().get("shoeSize").is_none());
}

#[test]
fn test_renamed_property() {
    let configuration = PropertyMappingConfiguration::new()
        .set_mapping("full_name", "name")
        .allow_properties(["name"]);
    let customer = mapper()
        .convert_with(&Value::from(json!({"full_name": "Ada"})), "Customer", &configuration)
        .unwrap();
    assert_eq!(customer.as_object().unwrap().get("name"), Some(&Value::from("Ada")));
}

#[test]
fn test_nested_configuration_applies_to_children() {
    let configuration = PropertyMappingConfiguration::new().for_property("address", |address| {
        address.allow_properties(["street"]).skip_unknown_properties()
    });
    let customer = mapper()
        .convert_with(&customer_source(), "Customer", &configuration)
        .unwrap();

    let address = customer.as_object().unwrap().get("address").unwrap();
    assert_eq!(address.to_json(), json!({"__type": "Address", "street": "Main St"}));
}

#[test]
fn test_configured_converter_overrides_registry() {
    let configuration = PropertyMappingConfiguration::new()
        .for_property("name", |name| name.set_type_converter("string", Arc::new(Shout)));
    let customer = mapper()
        .convert_with(&Value::from(json!({"name": "Ada"})), "Customer", &configuration)
        .unwrap();
    assert_eq!(customer.as_object().unwrap().get("name"), Some(&Value::from("ADA")));
}

#[test]
fn test_default_configuration_is_used() {
    let mapper = mapper().with_default_configuration(PropertyMappingConfiguration::new().skip_unknown_properties());
    let customer = mapper
        .convert(&Value::from(json!({"name": "Ada", "unknown": 1})), "Customer")
        .unwrap();
    assert_eq!(customer.to_json(), json!({"__type": "Customer", "name": "Ada"}));
}

#[test]
fn test_max_depth_is_enforced() {
    let source = Value::from(json!({"child": {"child": {"child": {"label": "deep"}}}}));

    let shallow = mapper().with_max_depth(2);
    let err = shallow.convert(&source, "Node").unwrap_err();
    assert_eq!(err.root_cause().kind(), ErrorKind::MaxDepthExceeded);

    assert!(mapper().with_max_depth(4).convert(&source, "Node").is_ok());
}

#[test]
fn test_date_time_property() {
    let customer = mapper()
        .convert(&Value::from(json!({"since": "2020-02-29T12:00:00Z"})), "Customer")
        .unwrap();
    let since = customer.as_object().unwrap().get("since").unwrap();
    assert!(matches!(since, Value::DateTime(_)));
    assert!(mapper().is_already_converted(since, &TargetType::named("DateTimeInterface")));
}

#[test]
fn test_invalid_source_is_wrapped() {
    let err = mapper().convert(&Value::Null, "string").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Mapping);
    assert_eq!(err.root_cause().kind(), ErrorKind::InvalidSource);
}
