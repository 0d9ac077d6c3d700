//! Error types for the Propmap core library
//!
//! This module defines the failure taxonomy of the conversion engine using
//! thiserror. Security failures are a distinct variant that the mapper never
//! wraps; every other failure reaching a caller of
//! [`PropertyMapper::convert`](crate::PropertyMapper::convert) is wrapped in
//! [`Error::Mapping`] together with the property path at which it occurred.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Main error type for Propmap operations
#[derive(Error, Debug)]
pub enum Error {
    /// The source value does not belong to any source type category
    #[error("Invalid source: {message}")]
    InvalidSource {
        message: String,
        value_kind: String,
    },

    /// The target type is neither a simple type nor a declared class or interface
    #[error("Invalid target type \"{target_type}\": {message}")]
    InvalidTarget {
        target_type: String,
        message: String,
    },

    /// Not a single converter is registered along the resolution path
    #[error("No converter found which can be used to convert from \"{source_type}\" to \"{target_type}\"")]
    TypeConverter {
        source_type: String,
        target_type: String,
    },

    /// Converters are registered, but all of them declined the source
    #[error("None of the {candidates} registered converter(s) accepted a conversion from \"{source_type}\" to \"{target_type}\"")]
    NoSuitableConverter {
        source_type: String,
        target_type: String,
        candidates: usize,
    },

    /// Two or more peer converters tie at the highest priority
    #[error("There exist at least two converters which handle the conversion to \"{target_type}\" with priority {priority}: {}", .converters.join(", "))]
    DuplicateTypeConverter {
        target_type: String,
        priority: i32,
        converters: Vec<String>,
    },

    /// A source property is not allowed by the mapping configuration
    #[error("It is not allowed to map property \"{property}\"; allow it in the mapping configuration or skip unknown properties")]
    InvalidPropertyMappingConfiguration {
        property: String,
    },

    /// A source property is not declared by the target type
    #[error("Property \"{property}\" is not known to target type \"{target_type}\"")]
    UnknownProperty {
        property: String,
        target_type: String,
    },

    /// Authentication or authorization failure raised by a converter
    #[error(transparent)]
    Security(#[from] SecurityError),

    /// A converter rejected the value it was asked to convert
    #[error("Conversion to \"{target_type}\" failed: {message}")]
    ConversionFailed {
        target_type: String,
        message: String,
    },

    /// The source data is nested deeper than the mapper allows
    #[error("Maximum mapping depth of {max_depth} exceeded")]
    MaxDepthExceeded {
        max_depth: usize,
    },

    /// Invalid registry or type hierarchy set-up
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
    },

    /// Top-level wrapper carrying the property path of the failure
    #[error("Exception while property mapping for target type \"{target_type}\", at property path \"{property_path}\": {source}")]
    Mapping {
        target_type: String,
        property_path: String,
        #[source]
        source: Box<Error>,
    },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// Generic internal error with context
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Security failure raised while converting
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Security violation ({kind}): {message}")]
pub struct SecurityError {
    pub kind: SecurityErrorKind,
    pub message: String,
}

/// Category of a security failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecurityErrorKind {
    /// The caller is not authenticated
    Authentication,
    /// The caller may not access the requested value
    Authorization,
}

/// Flat classification of [`Error`], suitable for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidSource,
    InvalidTarget,
    TypeConverter,
    NoSuitableConverter,
    DuplicateTypeConverter,
    InvalidPropertyMappingConfiguration,
    UnknownProperty,
    Security,
    ConversionFailed,
    MaxDepthExceeded,
    Configuration,
    Mapping,
    Json,
    Internal,
}

impl Error {
    /// Create a conversion failure for the given target type
    pub fn conversion_failed(target_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConversionFailed {
            target_type: target_type.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an authorization failure
    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::Security(SecurityError {
            kind: SecurityErrorKind::Authorization,
            message: message.into(),
        })
    }

    /// Create an authentication failure
    pub fn authentication_required(message: impl Into<String>) -> Self {
        Self::Security(SecurityError {
            kind: SecurityErrorKind::Authentication,
            message: message.into(),
        })
    }

    /// Whether this is a security failure
    pub fn is_security(&self) -> bool {
        matches!(self, Self::Security(_))
    }

    /// The innermost error, looking through [`Error::Mapping`] wrappers
    pub fn root_cause(&self) -> &Error {
        match self {
            Self::Mapping { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Flat kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidSource { .. } => ErrorKind::InvalidSource,
            Self::InvalidTarget { .. } => ErrorKind::InvalidTarget,
            Self::TypeConverter { .. } => ErrorKind::TypeConverter,
            Self::NoSuitableConverter { .. } => ErrorKind::NoSuitableConverter,
            Self::DuplicateTypeConverter { .. } => ErrorKind::DuplicateTypeConverter,
            Self::InvalidPropertyMappingConfiguration { .. } => {
                ErrorKind::InvalidPropertyMappingConfiguration
            }
            Self::UnknownProperty { .. } => ErrorKind::UnknownProperty,
            Self::Security(_) => ErrorKind::Security,
            Self::ConversionFailed { .. } => ErrorKind::ConversionFailed,
            Self::MaxDepthExceeded { .. } => ErrorKind::MaxDepthExceeded,
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::Mapping { .. } => ErrorKind::Mapping,
            Self::Json { .. } => ErrorKind::Json,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }
}

impl fmt::Display for SecurityErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecurityErrorKind::Authentication => write!(f, "authentication"),
            SecurityErrorKind::Authorization => write!(f, "authorization"),
        }
    }
}

// Conversion implementations
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal {
            message: err.to_string(),
            source: err,
        }
    }
}
