//! Declared class and interface hierarchy
//!
//! Target classes cannot be introspected at runtime, so every convertible
//! object type declares its parent class, the interfaces it implements (or,
//! for interfaces, extends) and its typed properties. The hierarchy is built
//! once, validated, and read concurrently afterwards.
//!
//! Copyright (c) 2025 Propmap Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

/// Whether a declared type is a class or an interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    #[default]
    Class,
    Interface,
}

/// Declaration of a single class or interface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDeclaration {
    pub name: String,
    #[serde(default)]
    pub kind: TypeKind,
    /// Parent class; classes only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Implemented interfaces (classes) or extended interfaces (interfaces)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<String>,
    /// Property name to target type specification
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl TypeDeclaration {
    /// Declare a class
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Class,
            parent: None,
            interfaces: Vec::new(),
            properties: BTreeMap::new(),
        }
    }

    /// Declare an interface
    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            kind: TypeKind::Interface,
            ..Self::class(name)
        }
    }

    /// Set the parent class
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Add an implemented (or, for interfaces, extended) interface
    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    /// Declare a typed property
    pub fn property(mut self, name: impl Into<String>, type_spec: impl Into<String>) -> Self {
        self.properties.insert(name.into(), type_spec.into());
        self
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }
}

/// Ordered names consulted when selecting a converter for an object type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionPath {
    /// The type itself, then ancestor classes nearest first
    pub classes: Vec<String>,
    /// Every interface reachable from the type, each once at its first distance
    pub interfaces: Vec<String>,
}

impl ResolutionPath {
    /// Class segment followed by interface segment
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.classes
            .iter()
            .chain(self.interfaces.iter())
            .map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.iter().any(|n| n == name)
    }
}

/// Validated, immutable set of type declarations
#[derive(Debug, Clone, Default)]
pub struct TypeHierarchy {
    types: HashMap<String, TypeDeclaration>,
}

impl TypeHierarchy {
    /// Start declaring types
    pub fn builder() -> TypeHierarchyBuilder {
        TypeHierarchyBuilder::new()
    }

    /// A hierarchy without any declared types
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&TypeDeclaration> {
        self.types.get(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Declarations sorted by name
    pub fn declarations(&self) -> Vec<&TypeDeclaration> {
        let mut declarations: Vec<_> = self.types.values().collect();
        declarations.sort_by(|a, b| a.name.cmp(&b.name));
        declarations
    }

    /// Resolution path of a declared type, `None` for unknown names
    pub fn resolution_path(&self, name: &str) -> Option<ResolutionPath> {
        let declaration = self.types.get(name)?;

        let mut classes = vec![declaration.name.clone()];
        if !declaration.is_interface() {
            let mut current = declaration.parent.as_deref();
            while let Some(parent) = current {
                if classes.iter().any(|c| c == parent) {
                    break;
                }
                classes.push(parent.to_string());
                current = self.types.get(parent).and_then(|d| d.parent.as_deref());
            }
        }

        // Breadth-first over parent and interface edges so that every interface
        // is recorded at the first distance it is reached.
        let mut interfaces = Vec::new();
        let mut seen: HashSet<&str> = HashSet::from([declaration.name.as_str()]);
        let mut queue: VecDeque<&TypeDeclaration> = VecDeque::from([declaration]);
        while let Some(current) = queue.pop_front() {
            let neighbours = current.parent.iter().chain(current.interfaces.iter());
            for next in neighbours {
                if !seen.insert(next.as_str()) {
                    continue;
                }
                let Some(next_declaration) = self.types.get(next) else {
                    continue;
                };
                if next_declaration.is_interface() {
                    interfaces.push(next.clone());
                }
                queue.push_back(next_declaration);
            }
        }

        Some(ResolutionPath { classes, interfaces })
    }

    /// Whether an instance of `class_name` satisfies `target`
    pub fn is_instance_of(&self, class_name: &str, target: &str) -> bool {
        if class_name == target {
            return true;
        }
        self.resolution_path(class_name)
            .map(|path| path.contains(target))
            .unwrap_or(false)
    }

    /// Declared type of a property, searched along the resolution path
    pub fn property_type(&self, type_name: &str, property: &str) -> Option<&str> {
        let path = self.resolution_path(type_name)?;
        let declared = path
            .iter()
            .filter_map(|name| self.types.get(name))
            .find_map(|declaration| declaration.properties.get(property))
            .map(String::as_str);
        declared
    }

    /// All properties declared along the resolution path; nearer declarations win
    pub fn properties_of(&self, type_name: &str) -> BTreeMap<String, String> {
        let mut properties = BTreeMap::new();
        if let Some(path) = self.resolution_path(type_name) {
            for declaration in path.iter().filter_map(|name| self.types.get(name)) {
                for (name, type_spec) in &declaration.properties {
                    properties
                        .entry(name.clone())
                        .or_insert_with(|| type_spec.clone());
                }
            }
        }
        properties
    }
}

/// Builder collecting declarations before validation
#[derive(Debug, Default)]
pub struct TypeHierarchyBuilder {
    declarations: Vec<TypeDeclaration>,
}

impl TypeHierarchyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a declaration
    pub fn declare(mut self, declaration: TypeDeclaration) -> Self {
        self.declarations.push(declaration);
        self
    }

    /// Add several declarations
    pub fn declare_all<I>(mut self, declarations: I) -> Self
    where
        I: IntoIterator<Item = TypeDeclaration>,
    {
        self.declarations.extend(declarations);
        self
    }

    /// Validate and build the hierarchy
    pub fn build(self) -> Result<TypeHierarchy> {
        let mut types: HashMap<String, TypeDeclaration> = HashMap::new();
        for declaration in self.declarations {
            if declaration.name.trim().is_empty() {
                return Err(Error::configuration("type declarations need a name"));
            }
            if types.contains_key(&declaration.name) {
                return Err(Error::configuration(format!(
                    "type \"{}\" is declared more than once",
                    declaration.name
                )));
            }
            types.insert(declaration.name.clone(), declaration);
        }

        for declaration in types.values() {
            if let Some(parent) = &declaration.parent {
                if declaration.is_interface() {
                    return Err(Error::configuration(format!(
                        "interface \"{}\" cannot extend class \"{}\"; list parent interfaces under interfaces",
                        declaration.name, parent
                    )));
                }
                match types.get(parent) {
                    None => {
                        return Err(Error::configuration(format!(
                            "class \"{}\" extends undeclared type \"{}\"",
                            declaration.name, parent
                        )))
                    }
                    Some(p) if p.is_interface() => {
                        return Err(Error::configuration(format!(
                            "class \"{}\" cannot extend interface \"{}\"",
                            declaration.name, parent
                        )))
                    }
                    Some(_) => {}
                }
            }
            for interface in &declaration.interfaces {
                match types.get(interface) {
                    Some(i) if i.is_interface() => {}
                    Some(_) => {
                        return Err(Error::configuration(format!(
                            "\"{}\" lists class \"{}\" as an interface",
                            declaration.name, interface
                        )))
                    }
                    None => {
                        return Err(Error::configuration(format!(
                            "\"{}\" implements undeclared interface \"{}\"",
                            declaration.name, interface
                        )))
                    }
                }
            }
        }

        detect_cycles(&types)?;
        Ok(TypeHierarchy { types })
    }
}

fn detect_cycles(types: &HashMap<String, TypeDeclaration>) -> Result<()> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Visiting,
        Done,
    }

    fn visit<'a>(
        name: &'a str,
        types: &'a HashMap<String, TypeDeclaration>,
        marks: &mut HashMap<&'a str, Mark>,
    ) -> Result<()> {
        match marks.get(name) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::Visiting) => {
                return Err(Error::configuration(format!(
                    "inheritance cycle through \"{}\"",
                    name
                )))
            }
            None => {}
        }
        marks.insert(name, Mark::Visiting);
        if let Some(declaration) = types.get(name) {
            for next in declaration.parent.iter().chain(declaration.interfaces.iter()) {
                visit(next, types, marks)?;
            }
        }
        marks.insert(name, Mark::Done);
        Ok(())
    }

    let mut marks = HashMap::new();
    for name in types.keys() {
        visit(name, types, &mut marks)?;
    }
    Ok(())
}
