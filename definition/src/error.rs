//! Error types for definition files.
//!
//! Covers reading and writing files, both serialization formats, and the
//! configuration errors raised when a definition is turned into a tree.

use cmdar_core::ConfigurationError;
use thiserror::Error;

/// Errors that can occur while loading, saving or building a definition.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// The definition describes an invalid command tree.
    #[error("invalid definition: {0}")]
    Configuration(#[from] ConfigurationError),

    /// File extension is neither JSON nor YAML.
    #[error("unsupported definition format: {0}")]
    UnsupportedFormat(String),

    /// `value_type` names no known type.
    #[error("unknown value type {0:?}")]
    UnknownValueType(String),
}

/// Convenience alias for results with [`DefinitionError`].
pub type Result<T> = std::result::Result<T, DefinitionError>;
