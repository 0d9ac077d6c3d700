//! Target type specifications
//!
//! A target type is written `Name` or `Name<Element>`, where the element may
//! itself be parameterized (`array<array<int>>`). Simple type aliases are
//! normalized before any lookup.

use crate::error::{Error, Result};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Names of the simple (non-object) target types
pub const SIMPLE_TYPES: [&str; 5] = ["string", "integer", "float", "boolean", "array"];

/// Generic object target type, consulted after classes and interfaces
pub const OBJECT_TYPE: &str = "object";

/// Deepest `<...>` nesting accepted in a specification
pub const MAX_TYPE_NESTING: usize = 32;

static TYPE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn type_pattern() -> &'static Regex {
    TYPE_PATTERN.get_or_init(|| {
        Regex::new(r"^\s*([A-Za-z_\\][A-Za-z0-9_\\.:]*)\s*(?:<(.*)>)?\s*$")
            .unwrap_or_else(|e| panic!("invalid built-in type pattern: {}", e))
    })
}

/// Map type aliases onto their canonical simple type name
pub fn normalize_type(name: &str) -> &str {
    match name {
        "int" => "integer",
        "bool" => "boolean",
        "double" => "float",
        other => other,
    }
}

/// Whether `name` is one of the simple types (after normalization)
pub fn is_simple_type(name: &str) -> bool {
    SIMPLE_TYPES.contains(&normalize_type(name))
}

/// Parsed target type specification
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetType {
    name: String,
    element: Option<Box<TargetType>>,
}

impl TargetType {
    /// Parse a specification such as `Collection<Item>`
    pub fn parse(spec: &str) -> Result<Self> {
        let invalid = |message: &str| Error::InvalidTarget {
            target_type: spec.to_string(),
            message: message.to_string(),
        };

        if spec.trim().is_empty() {
            return Err(invalid("the target type must not be empty"));
        }
        // Names cannot contain '<', so every bracket opens one more level.
        if spec.matches('<').count() > MAX_TYPE_NESTING {
            return Err(invalid("the element types are nested too deeply"));
        }

        let captures = type_pattern()
            .captures(spec)
            .ok_or_else(|| invalid("not a valid type specification"))?;

        let name = normalize_type(&captures[1]).to_string();
        let element = match captures.get(2) {
            Some(inner) if inner.as_str().trim().is_empty() => {
                return Err(invalid("the element type must not be empty"));
            }
            Some(inner) => {
                let element = TargetType::parse(inner.as_str()).map_err(|_| {
                    invalid("the element type is not a valid type specification")
                })?;
                Some(Box::new(element))
            }
            None => None,
        };

        Ok(Self { name, element })
    }

    /// Create a bare type without element parameter
    pub fn named(name: impl AsRef<str>) -> Self {
        Self {
            name: normalize_type(name.as_ref()).to_string(),
            element: None,
        }
    }

    /// Bare, normalized type name used for registry lookups
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Element type of a parameterized specification
    pub fn element(&self) -> Option<&TargetType> {
        self.element.as_deref()
    }

    pub fn is_simple(&self) -> bool {
        is_simple_type(&self.name)
    }

    pub fn is_parameterized(&self) -> bool {
        self.element.is_some()
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.element {
            Some(element) => write!(f, "{}<{}>", self.name, element),
            None => f.write_str(&self.name),
        }
    }
}
