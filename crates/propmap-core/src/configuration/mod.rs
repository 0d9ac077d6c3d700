//! Property mapping configuration
//!
//! A [`PropertyMappingConfiguration`] controls a single conversion call: which
//! child properties are converted, how they are renamed, which converter is
//! forced for a target type, which options converters see, and which nested
//! configuration applies when recursing into a property.
//!
//! Configurations are assembled top-down with by-value builder methods and are
//! only read while a conversion runs.
//!
//! # Examples
//!
//! ```
//! use propmap_core::PropertyMappingConfiguration;
//!
//! let configuration = PropertyMappingConfiguration::new()
//!     .allow_properties(["name", "address"])
//!     .skip_properties(["password"])
//!     .for_property("address", |address| address.skip_unknown_properties());
//!
//! assert!(configuration.should_map("name"));
//! assert!(!configuration.should_map("email"));
//! assert!(configuration.configuration_for("address").should_skip_unknown_properties());
//! ```

use crate::converter::TypeConverter;
use crate::types::TargetType;
use crate::value::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::{Arc, OnceLock};


/// Property name whose configuration applies to every property without its own
pub const WILDCARD: &str = "*";

static EMPTY: OnceLock<PropertyMappingConfiguration> = OnceLock::new();

/// Which property names may be mapped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PropertyFilter {
    /// Every property
    #[default]
    All,
    /// Only the listed properties
    Only(BTreeSet<String>),
    /// Every property except the listed ones
    AllExcept(BTreeSet<String>),
}

/// Per-call conversion policy
#[derive(Clone, Default)]
pub struct PropertyMappingConfiguration {
    allowed: PropertyFilter,
    skipped: BTreeSet<String>,
    skip_unknown_properties: bool,
    mapping: BTreeMap<String, String>,
    type_converters: BTreeMap<String, Arc<dyn TypeConverter>>,
    type_converter_options: BTreeMap<String, BTreeMap<String, Value>>,
    sub_configurations: BTreeMap<String, PropertyMappingConfiguration>,
}

impl PropertyMappingConfiguration {
    /// Create a configuration that maps every property
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared empty configuration used when no nested configuration exists
    pub fn empty() -> &'static PropertyMappingConfiguration {
        EMPTY.get_or_init(PropertyMappingConfiguration::default)
    }

    /// Restrict mapping to the given properties (cumulative)
    pub fn allow_properties<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = names.into_iter().map(Into::into);
        self.allowed = match self.allowed {
            PropertyFilter::All => PropertyFilter::Only(names.collect()),
            PropertyFilter::Only(mut allowed) => {
                allowed.extend(names);
                PropertyFilter::Only(allowed)
            }
            PropertyFilter::AllExcept(mut denied) => {
                for name in names {
                    denied.remove(&name);
                }
                PropertyFilter::AllExcept(denied)
            }
        };
        self
    }

    /// Allow every property
    pub fn allow_all_properties(mut self) -> Self {
        self.allowed = PropertyFilter::All;
        self
    }

    /// Allow every property except the given ones
    pub fn allow_all_properties_except<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed = PropertyFilter::AllExcept(names.into_iter().map(Into::into).collect());
        self
    }

    /// Silently omit the given properties (cumulative)
    pub fn skip_properties<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skipped.extend(names.into_iter().map(Into::into));
        self
    }

    /// Omit properties that are not allowed or not known instead of failing
    pub fn skip_unknown_properties(mut self) -> Self {
        self.skip_unknown_properties = true;
        self
    }

    /// Map source property `source_name` onto target property `target_name`
    pub fn set_mapping(mut self, source_name: impl Into<String>, target_name: impl Into<String>) -> Self {
        self.mapping.insert(source_name.into(), target_name.into());
        self
    }

    /// Force `converter` for `target_type`, bypassing the registry search
    pub fn set_type_converter(
        mut self,
        target_type: impl AsRef<str>,
        converter: Arc<dyn TypeConverter>,
    ) -> Self {
        self.type_converters
            .insert(override_key(target_type.as_ref()), converter);
        self
    }

    /// Set an option read by the converter named `converter_name`
    pub fn set_type_converter_option(
        mut self,
        converter_name: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.type_converter_options
            .entry(converter_name.into())
            .or_default()
            .insert(key.into(), value.into());
        self
    }

    /// Configure the nested configuration at a dotted property path
    ///
    /// Each segment creates its level if missing; `*` configures every
    /// property that has no configuration of its own.
    pub fn for_property<F>(mut self, path: &str, configure: F) -> Self
    where
        F: FnOnce(PropertyMappingConfiguration) -> PropertyMappingConfiguration,
    {
        let (head, rest) = match path.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };
        let current = self.sub_configurations.remove(head).unwrap_or_default();
        let updated = match rest {
            Some(rest) => current.for_property(rest, configure),
            None => configure(current),
        };
        self.sub_configurations.insert(head.to_string(), updated);
        self
    }

    /// Whether `property` is allowed by the allow policy
    ///
    /// A property with its own nested configuration is always allowed unless
    /// explicitly excluded.
    pub fn should_map(&self, property: &str) -> bool {
        match &self.allowed {
            PropertyFilter::All => true,
            PropertyFilter::AllExcept(denied) => !denied.contains(property),
            PropertyFilter::Only(allowed) => {
                allowed.contains(property) || self.sub_configurations.contains_key(property)
            }
        }
    }

    /// Whether `property` is on the skip-list
    pub fn should_skip(&self, property: &str) -> bool {
        self.skipped.contains(property)
    }

    pub fn should_skip_unknown_properties(&self) -> bool {
        self.skip_unknown_properties
    }

    /// Target name of a source property
    pub fn target_property_name<'a>(&'a self, source_name: &'a str) -> &'a str {
        self.mapping
            .get(source_name)
            .map(String::as_str)
            .unwrap_or(source_name)
    }

    /// Nested configuration for `property`, falling back to `*` and then empty
    pub fn configuration_for(&self, property: &str) -> &PropertyMappingConfiguration {
        self.sub_configurations
            .get(property)
            .or_else(|| self.sub_configurations.get(WILDCARD))
            .unwrap_or_else(|| Self::empty())
    }

    /// Whether a nested configuration exists for exactly this property
    pub fn has_configuration_for(&self, property: &str) -> bool {
        self.sub_configurations.contains_key(property)
    }

    /// Forced converter for a target type specification
    ///
    /// The full specification is checked first, then its bare name.
    pub fn type_converter(&self, target_type: &str) -> Option<&Arc<dyn TypeConverter>> {
        if self.type_converters.is_empty() {
            return None;
        }
        let key = override_key(target_type);
        self.type_converters.get(&key).or_else(|| {
            TargetType::parse(target_type)
                .ok()
                .and_then(|target| self.type_converters.get(target.name()))
        })
    }

    /// Option `key` for the converter named `converter_name`
    pub fn type_converter_option(&self, converter_name: &str, key: &str) -> Option<&Value> {
        self.type_converter_options
            .get(converter_name)
            .and_then(|options| options.get(key))
    }

    pub fn allowed(&self) -> &PropertyFilter {
        &self.allowed
    }
}

/// Normalized key for converter overrides; unparsable specs are kept verbatim
fn override_key(target_type: &str) -> String {
    TargetType::parse(target_type)
        .map(|target| target.to_string())
        .unwrap_or_else(|_| target_type.to_string())
}

impl fmt::Debug for PropertyMappingConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let converters: BTreeMap<&str, &str> = self
            .type_converters
            .iter()
            .map(|(target, converter)| (target.as_str(), converter.name()))
            .collect();
        f.debug_struct("PropertyMappingConfiguration")
            .field("allowed", &self.allowed)
            .field("skipped", &self.skipped)
            .field("skip_unknown_properties", &self.skip_unknown_properties)
            .field("mapping", &self.mapping)
            .field("type_converters", &converters)
            .field("type_converter_options", &self.type_converter_options)
            .field("sub_configurations", &self.sub_configurations)
            .finish()
    }
}
