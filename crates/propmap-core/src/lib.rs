//! Propmap Core - Property mapping engine for typed value conversion
//!
//! This crate converts dynamically typed source values (strings, numbers,
//! booleans, arrays and maps) into typed targets by selecting, among a pool of
//! registered converters, the one that best matches the source and the target
//! type, and applying it recursively to nested properties.
//!
//! # Main Components
//!
//! - **Values**: [`Value`] and the [`SourceType`] classification
//! - **Type Hierarchy**: declared classes and interfaces with typed properties
//! - **Converter Registry**: converters indexed by source type, target type and priority
//! - **Converter Selector**: priority ranking and class/interface resolution
//! - **Property Mapper**: the recursive conversion engine
//! - **Mapping Configuration**: per-call allow/skip policy, renaming and overrides
//!
//! # Example
//!
//! ```
//! use propmap_core::converter::built_in::{register_defaults, standard_types};
//! use propmap_core::{ConverterRegistry, PropertyMapper, Result, TypeHierarchy, Value};
//! use std::sync::Arc;
//!
//! fn example() -> Result<()> {
//!     let hierarchy = Arc::new(TypeHierarchy::builder().declare_all(standard_types()).build()?);
//!     let registry = register_defaults(ConverterRegistry::builder(), hierarchy.clone())?.build();
//!     let mapper = PropertyMapper::new(Arc::new(registry), hierarchy);
//!
//!     assert_eq!(mapper.convert(&Value::from("42"), "int")?, Value::from(42));
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod configuration;
pub mod converter;
pub mod error;
pub mod hierarchy;
pub mod mapper;
pub mod registry;
pub mod selector;
pub mod types;
pub mod value;

mod proptest_strategies;

// Re-export main types for convenience
pub use configuration::{PropertyFilter, PropertyMappingConfiguration};
pub use converter::TypeConverter;
pub use error::{Error, ErrorKind, Result, SecurityError, SecurityErrorKind};
pub use hierarchy::{ResolutionPath, TypeDeclaration, TypeHierarchy, TypeKind};
pub use mapper::{PropertyMapper, DEFAULT_MAX_DEPTH};
pub use registry::{ConverterRegistry, ConverterRegistryBuilder};
pub use selector::ConverterSelector;
pub use types::TargetType;
pub use value::{ObjectValue, SourceType, Value};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_error_creation() {
        let err = Error::configuration("Test error");
        assert!(err.to_string().contains("Test error"));
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_default_max_depth() {
        let mapper = PropertyMapper::new(
            std::sync::Arc::new(ConverterRegistry::default()),
            std::sync::Arc::new(TypeHierarchy::empty()),
        );
        assert_eq!(mapper.max_depth(), DEFAULT_MAX_DEPTH);
    }
}
