//! Error and warning types.
//!
//! Declarations fail fast with a [`ConfigurationError`]: a command tree that
//! cannot be built has nothing to resolve against. Problems found while
//! resolving input are never fatal; they are accumulated as
//! [`ResolutionWarning`]s so a single malformed invocation yields a complete
//! diagnostic.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ValueType;

/// Invalid command or parameter declaration.
///
/// Each variant describes a specific structural problem. The `Display` impl
/// provides a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A parameter or command name is empty or whitespace-only.
    #[error("name cannot be empty")]
    EmptyName,
    /// A name or alias entry carries its own dash prefix or whitespace.
    #[error("invalid name {0:?}: names must not start with '-' or contain whitespace")]
    InvalidName(String),
    /// Short name is not exactly one character long.
    #[error("short name {0:?} must be exactly 1 character long")]
    InvalidShortName(String),
    /// Long name is shorter than two characters.
    #[error("long name {0:?} must be at least 2 characters long")]
    InvalidLongName(String),
    /// No alias could be derived for a flag or option.
    #[error(
        "no alias for {0:?}: enable short/long alias creation or provide other aliases"
    )]
    EmptyAliasSet(String),
    /// A command declares more than one positional parameter.
    #[error("command {command:?} already has positional parameter {existing:?}, cannot add {added:?}")]
    DuplicatePositional {
        command: String,
        existing: String,
        added: String,
    },
    /// Two parameters of the same command share an alias.
    #[error("duplicate alias in command {command:?}: {alias}")]
    DuplicateAlias { command: String, alias: String },
    /// Two parameters of the same command share a name.
    #[error("duplicate parameter in command {command:?}: {name}")]
    DuplicateParameter { command: String, name: String },
    /// Two sub-commands of the same command share a name or alias.
    #[error("duplicate sub-command in command {command:?}: {name}")]
    DuplicateSubcommand { command: String, name: String },
    /// A flag declares a default that is not a boolean.
    #[error("default value of flag {flag:?} must be true or false, found {found}")]
    InvalidFlagDefault { flag: String, found: String },
}

/// Convenience alias for results with [`ConfigurationError`].
pub type Result<T> = std::result::Result<T, ConfigurationError>;

/// Non-fatal problem noticed while declaring or resolving.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionWarning {
    /// An empty entry in `other_aliases` was skipped.
    #[error("skipped an empty alias of {parameter:?}")]
    EmptyAlias { parameter: String },
    /// An alias-shaped token matched nothing in scope.
    #[error("unrecognized option {token:?} for command {command:?}")]
    UnrecognizedAlias { command: String, token: String },
    /// A value token was given to a command without a positional parameter.
    #[error("unexpected argument {token:?} for command {command:?}")]
    UnexpectedValue { command: String, token: String },
    /// An option was given without any value.
    #[error("option {option:?} of command {command:?} expects a value")]
    MissingOptionValue { command: String, option: String },
    /// A bound value does not parse as the option's declared type.
    #[error("value {value:?} of option {option:?} is not a valid {expected}")]
    InvalidOptionValue {
        command: String,
        option: String,
        value: String,
        expected: ValueType,
    },
}
