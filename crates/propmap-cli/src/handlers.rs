//! Command handlers for CLI subcommands
//!
//! Each handler loads the type declarations it needs, registers the built-in
//! converters and writes its result through the [`OutputWriter`](crate::output::OutputWriter).

mod completions;
mod convert;
mod inspect;
mod types;
mod utils;

pub use completions::handle_completions;
pub use convert::handle_convert;
pub use inspect::handle_inspect;
pub use types::handle_types;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{ConvertArgs, InspectArgs, OutputFormat, TypesArgs};
    use crate::config::Config;
    use crate::error::Error;
    use crate::output::OutputWriter;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::cell::RefCell;
    use std::io::{self, Write};
    use std::path::PathBuf;
    use std::rc::Rc;
    use tempfile::TempDir;

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
        fn json(&self) -> serde_json::Value {
            serde_json::from_slice(&self.0.borrow()).unwrap()
        }
    }

    struct Workspace {
        dir: TempDir,
    }

    impl Workspace {
        fn new() -> Self {
            let workspace = Self {
                dir: TempDir::new().unwrap(),
            };
            workspace.file(
                "types.yaml",
                r#"
- name: Identifiable
  kind: interface
- name: Address
  properties:
    street: string
    zip: integer
- name: Customer
  interfaces: [Identifiable]
  properties:
    name: string
    active: boolean
    address: Address
    tags: array<string>
"#,
            );
            workspace
        }

        fn file(&self, name: &str, content: &str) -> PathBuf {
            let path = self.dir.path().join(name);
            std::fs::write(&path, content).unwrap();
            path
        }

        fn types(&self) -> Option<PathBuf> {
            Some(self.dir.path().join("types.yaml"))
        }
    }

    fn json_output() -> (OutputWriter, SharedBuffer) {
        let buffer = SharedBuffer::default();
        let writer = OutputWriter::with_writer(OutputFormat::Json, false, false, 0, Box::new(buffer.clone()));
        (writer, buffer)
    }

    fn convert_args(workspace: &Workspace, target: &str, input: PathBuf) -> ConvertArgs {
        ConvertArgs {
            types: workspace.types(),
            target: target.to_string(),
            mapping: None,
            max_depth: None,
            input: Some(input),
        }
    }

    #[test]
    fn test_convert_nested_customer() {
        let workspace = Workspace::new();
        let input = workspace.file(
            "customer.json",
            r#"{"name": "Ada", "active": "yes", "address": {"street": "Main", "zip": "10115"}, "tags": ["a", 1]}"#,
        );
        let (mut output, buffer) = json_output();

        handle_convert(convert_args(&workspace, "Customer", input), &Config::default(), &mut output).unwrap();

        assert_eq!(
            buffer.json(),
            json!({
                "__type": "Customer",
                "name": "Ada",
                "active": true,
                "address": {"__type": "Address", "street": "Main", "zip": 10115},
                "tags": ["a", "1"]
            })
        );
    }

    #[test]
    fn test_convert_with_mapping_file() {
        let workspace = Workspace::new();
        let input = workspace.file(
            "customer.json",
            r#"{"full_name": "Ada", "secret": "x", "nickname": "A"}"#,
        );
        let mapping = workspace.file(
            "mapping.json",
            r#"{"skip": ["secret"], "skip_unknown": true, "rename": {"full_name": "name"}}"#,
        );
        let mut args = convert_args(&workspace, "Customer", input);
        args.mapping = Some(mapping);
        let (mut output, buffer) = json_output();

        handle_convert(args, &Config::default(), &mut output).unwrap();

        assert_eq!(buffer.json(), json!({"__type": "Customer", "name": "Ada"}));
    }

    #[test]
    fn test_convert_failure_carries_property_path() {
        let workspace = Workspace::new();
        let input = workspace.file("customer.json", r#"{"address": {"zip": "not a number"}}"#);
        let (mut output, _) = json_output();

        let err = handle_convert(convert_args(&workspace, "Customer", input), &Config::default(), &mut output)
            .unwrap_err();

        match err {
            Error::Core(propmap_core::Error::Mapping { property_path, .. }) => {
                assert_eq!(property_path, "address.zip")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_convert_uses_configured_types_file() {
        let workspace = Workspace::new();
        let input = workspace.file("address.json", r#"{"street": "Main", "zip": 1}"#);
        let config = Config {
            types_file: workspace.types(),
            ..Config::default()
        };
        let mut args = convert_args(&workspace, "Address", input);
        args.types = None;
        let (mut output, buffer) = json_output();

        handle_convert(args, &config, &mut output).unwrap();

        assert_eq!(buffer.json()["__type"], "Address");
    }

    #[test]
    fn test_convert_rejects_zero_depth() {
        let workspace = Workspace::new();
        let input = workspace.file("value.json", "\"1\"");
        let mut args = convert_args(&workspace, "integer", input);
        args.max_depth = Some(0);
        let (mut output, _) = json_output();

        let err = handle_convert(args, &Config::default(), &mut output).unwrap_err();
        assert!(err.should_show_help());
    }

    #[test]
    fn test_inspect_reports_selection() {
        let workspace = Workspace::new();
        let args = InspectArgs {
            types: workspace.types(),
            target: "Customer".to_string(),
            source: Some(r#"{"name": "Ada"}"#.to_string()),
        };
        let (mut output, buffer) = json_output();

        handle_inspect(args, &Config::default(), &mut output).unwrap();

        let report = buffer.json();
        assert_eq!(report["source_type"], "array");
        assert_eq!(report["selection"]["status"], "selected");
        assert_eq!(report["selection"]["converter"], "ObjectConverter");
        assert_eq!(report["path"][0]["type_name"], "Customer");
        assert_eq!(report["path"][1]["segment"], "interface");
    }

    #[test]
    fn test_inspect_rejects_malformed_source() {
        let workspace = Workspace::new();
        let args = InspectArgs {
            types: workspace.types(),
            target: "Customer".to_string(),
            source: Some("{not json".to_string()),
        };
        let (mut output, _) = json_output();

        let err = handle_inspect(args, &Config::default(), &mut output).unwrap_err();
        assert!(matches!(err, Error::InvalidArgs(_)));
    }

    #[test]
    fn test_types_lists_declarations_and_converters() {
        let workspace = Workspace::new();
        let (mut output, buffer) = json_output();

        handle_types(TypesArgs { types: workspace.types() }, &Config::default(), &mut output).unwrap();

        let listing = buffer.json();
        let names: Vec<&str> = listing["types"]
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| entry["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec!["Address", "Customer", "DateTime", "DateTimeInterface", "Identifiable"]
        );
        assert_eq!(listing["converters"].as_array().unwrap().len(), 8);
    }

    #[test]
    fn test_invalid_hierarchy_is_a_core_error() {
        let workspace = Workspace::new();
        let types = workspace.file("broken.yaml", "- name: Orphan\n  parent: Missing\n");
        let (mut output, _) = json_output();

        let err = handle_types(TypesArgs { types: Some(types) }, &Config::default(), &mut output)
            .unwrap_err();
        assert!(matches!(err, Error::Core(propmap_core::Error::Configuration { .. })));
    }
}
