// Tests for output formatting
//
// These tests cover the human renderings of converted values, resolution
// reports and type listings, and how the writer honors format and quiet mode.

use super::*;
use crate::report::{CandidateInfo, ConverterEntry, PathEntry, TypeEntry};
use propmap_core::{ErrorKind, SourceType, TypeDeclaration};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }
}

fn writer(format: OutputFormat, quiet: bool) -> (OutputWriter, SharedBuffer) {
    let buffer = SharedBuffer::default();
    let writer = OutputWriter::with_writer(format, false, quiet, 0, Box::new(buffer.clone()));
    (writer, buffer)
}

fn customer() -> Value {
    let mut properties = BTreeMap::new();
    properties.insert("name".to_string(), Value::from("Ada"));
    properties.insert("age".to_string(), Value::from(36));
    Value::object("Customer", properties)
}

fn report() -> InspectionReport {
    InspectionReport {
        target_type: "Customer".to_string(),
        path: vec![
            PathEntry {
                type_name: "Customer".to_string(),
                segment: Segment::Class,
                candidates: vec![],
            },
            PathEntry {
                type_name: "object".to_string(),
                segment: Segment::Object,
                candidates: vec![CandidateInfo {
                    converter: "ObjectConverter".to_string(),
                    priority: 0,
                    source_types: vec![SourceType::Array],
                }],
            },
        ],
        source_type: Some(SourceType::Array),
        selection: Some(Selection::Selected {
            converter: "ObjectConverter".to_string(),
        }),
    }
}

#[test]
fn test_human_value_formatting() {
    let formatted = OutputFormat::Human.format_value(&customer()).unwrap();
    assert!(formatted.contains("\"__type\": \"Customer\""));
    assert!(formatted.contains("\"name\": \"Ada\""));

    assert_eq!(OutputFormat::Human.format_value(&Value::from("plain")).unwrap(), "plain");
    assert_eq!(OutputFormat::Human.format_value(&Value::Null).unwrap(), "null");
    assert_eq!(OutputFormat::Human.format_value(&Value::from(7)).unwrap(), "7");
}

#[test]
fn test_machine_value_formatting() {
    let json = OutputFormat::Json.format_value(&customer()).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["__type"], "Customer");
    assert_eq!(parsed["age"], 36);

    let yaml = OutputFormat::Yaml.format_value(&customer()).unwrap();
    assert!(yaml.contains("__type: Customer"));
}

#[test]
fn test_human_inspection_formatting() {
    let formatted = OutputFormat::Human.format_inspection(&report()).unwrap();
    assert!(formatted.contains("Resolution of Customer"));
    assert!(formatted.contains("Source type: array"));
    assert!(formatted.contains("1. Customer (class)"));
    assert!(formatted.contains("no converters registered"));
    assert!(formatted.contains("2. object (fallback)"));
    assert!(formatted.contains("• ObjectConverter [priority 0] from array"));
    assert!(formatted.contains("Selected converter: ObjectConverter"));
}

#[test]
fn test_failed_selection_formatting() {
    let mut report = report();
    report.selection = Some(Selection::Failed {
        kind: ErrorKind::TypeConverter,
        message: "nothing registered".to_string(),
    });

    let human = OutputFormat::Human.format_inspection(&report).unwrap();
    assert!(human.contains("No converter selected: nothing registered"));

    let json: serde_json::Value =
        serde_json::from_str(&OutputFormat::Json.format_inspection(&report).unwrap()).unwrap();
    assert_eq!(json["selection"]["status"], "failed");
    assert_eq!(json["selection"]["kind"], "type_converter");
    assert_eq!(json["path"][1]["segment"], "object");
}

#[test]
fn test_human_type_listing_formatting() {
    let listing = TypeListing {
        types: vec![
            TypeEntry {
                declaration: TypeDeclaration::class("Customer")
                    .extends("Entity")
                    .implements("Identifiable")
                    .property("name", "string"),
                resolution_path: vec!["Customer".to_string(), "Entity".to_string()],
            },
            TypeEntry {
                declaration: TypeDeclaration::interface("Named").implements("Identifiable"),
                resolution_path: vec!["Named".to_string()],
            },
        ],
        converters: vec![ConverterEntry {
            name: "StringConverter".to_string(),
            target_type: "string".to_string(),
            priority: 1,
            source_types: vec![SourceType::String, SourceType::Integer],
        }],
    };

    let formatted = OutputFormat::Human.format_type_listing(&listing).unwrap();
    assert!(formatted.contains("Types (2)"));
    assert!(formatted.contains("class Customer extends Entity implements Identifiable"));
    assert!(formatted.contains("    name: string"));
    assert!(formatted.contains("interface Named extends Identifiable"));
    assert!(formatted.contains("StringConverter → string [priority 1] from string, integer"));
}

#[test]
fn test_messages_are_suppressed_for_machine_formats() {
    let (mut output, buffer) = writer(OutputFormat::Json, false);
    output.info("loading").unwrap();
    output.success("done").unwrap();
    output.warning("careful").unwrap();
    output.section("Result").unwrap();
    output.value(&Value::from(1)).unwrap();

    assert_eq!(buffer.contents(), "1\n");
}

#[test]
fn test_quiet_mode_keeps_data_and_warnings() {
    let (mut output, buffer) = writer(OutputFormat::Human, true);
    output.info("loading").unwrap();
    output.success("done").unwrap();
    output.warning("careful").unwrap();
    output.value(&Value::from("result")).unwrap();

    assert_eq!(buffer.contents(), "WARNING: careful\nresult\n");
}

#[test]
fn test_human_messages_without_color() {
    let (mut output, buffer) = writer(OutputFormat::Human, false);
    output.info("loading").unwrap();
    output.section("Result").unwrap();
    output.debug("hidden at verbosity 0").unwrap();

    assert_eq!(buffer.contents(), "INFO: loading\n\n=== Result ===\n");
}

#[test]
fn test_yaml_output_is_not_double_terminated() {
    let (mut output, buffer) = writer(OutputFormat::Yaml, false);
    output.value(&Value::from(serde_json::json!({"a": 1}))).unwrap();
    assert_eq!(buffer.contents(), "a: 1\n");
}
