//! The parsed view of one command's share of the input.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ResolutionWarning;

/// Immutable result of resolving the tokens addressed to one command.
///
/// Created by the resolver and handed to the command's
/// [`Action`](crate::Action); never mutated afterwards.
///
/// # Examples
///
/// ```
/// use cmdar_core::*;
///
/// let tree = Command::new("goto")
///     .with_subcommand(
///         Command::new("set")
///             .with_positional(Positional::new("key")?)
///             .with_option(NamedOption::new("path")?),
///     )
///     .build()?;
///
/// let resolution = tree.resolve(["set", "mykey", "-p", "/usr/bin"]);
/// let set = resolution.leaf();
/// assert_eq!(set.value(), Some("mykey"));
/// assert_eq!(set.value_of("path"), Some("/usr/bin"));
/// assert!(!set.is_flag_enabled("help"));
/// # Ok::<(), ConfigurationError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentContext {
    command: String,
    identifier: String,
    path: Vec<String>,
    enabled_flags: BTreeSet<String>,
    values: Vec<String>,
    options: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    unrecognized: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<ResolutionWarning>,
}

impl ArgumentContext {
    /// Name of the command this context belongs to.
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Command names from the root down to this command.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Whether the flag named `flag` was given, or defaults to enabled.
    pub fn is_flag_enabled(&self, flag: &str) -> bool {
        self.enabled_flags.contains(flag)
    }

    /// Names of the enabled flags, sorted.
    pub fn enabled_flags(&self) -> impl Iterator<Item = &str> {
        self.enabled_flags.iter().map(String::as_str)
    }

    /// First positional value.
    pub fn value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    /// Positional values in input order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Values bound to the option named `option`.
    ///
    /// `None` when the option was not given at all; an empty slice when it
    /// was given without values.
    pub fn values_of(&self, option: &str) -> Option<&[String]> {
        self.options.get(option).map(Vec::as_slice)
    }

    /// First value bound to the option named `option`.
    pub fn value_of(&self, option: &str) -> Option<&str> {
        self.values_of(option)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Parses the first value of `option`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmdar_core::*;
    ///
    /// let tree = Command::new("serve")
    ///     .with_option(NamedOption::new("port")?.with_value_type(ValueType::Integer))
    ///     .build()?;
    /// let context = tree.resolve(["--port", "8080"]).root().clone();
    /// assert_eq!(context.parse_value::<u16>("port"), Some(Ok(8080)));
    /// # Ok::<(), ConfigurationError>(())
    /// ```
    pub fn parse_value<T: FromStr>(&self, option: &str) -> Option<Result<T, T::Err>> {
        self.value_of(option).map(str::parse)
    }

    /// Names of the options that were given, sorted.
    pub fn option_names(&self) -> impl Iterator<Item = &str> {
        self.options.keys().map(String::as_str)
    }

    /// Tokens that could not be attributed to any parameter.
    pub fn unrecognized(&self) -> &[String] {
        &self.unrecognized
    }

    /// Warnings raised while resolving this command's tokens.
    pub fn warnings(&self) -> &[ResolutionWarning] {
        &self.warnings
    }

    /// Returns `true` when nothing at all was bound to this command.
    pub fn is_empty(&self) -> bool {
        self.enabled_flags.is_empty()
            && self.values.is_empty()
            && self.options.is_empty()
            && self.unrecognized.is_empty()
    }
}

/// Mutable accumulator the resolver fills before freezing it.
#[derive(Debug)]
pub(crate) struct ContextBuilder {
    inner: ArgumentContext,
}

impl ContextBuilder {
    pub(crate) fn new(command: &str, identifier: &str, path: Vec<String>) -> Self {
        Self {
            inner: ArgumentContext {
                command: command.to_string(),
                identifier: identifier.to_string(),
                path,
                enabled_flags: BTreeSet::new(),
                values: Vec::new(),
                options: BTreeMap::new(),
                unrecognized: Vec::new(),
                warnings: Vec::new(),
            },
        }
    }

    pub(crate) fn command(&self) -> &str {
        &self.inner.command
    }

    pub(crate) fn enable_flag(&mut self, flag: &str) {
        self.inner.enabled_flags.insert(flag.to_string());
    }

    pub(crate) fn push_value(&mut self, value: &str) {
        self.inner.values.push(value.to_string());
    }

    /// Registers an occurrence of `option`, creating an empty value list.
    pub(crate) fn open_option(&mut self, option: &str) {
        self.inner.options.entry(option.to_string()).or_default();
    }

    pub(crate) fn bind_value(&mut self, option: &str, value: &str) {
        self.inner
            .options
            .entry(option.to_string())
            .or_default()
            .push(value.to_string());
    }

    pub(crate) fn push_unrecognized(&mut self, token: &str) {
        self.inner.unrecognized.push(token.to_string());
    }

    pub(crate) fn warn(&mut self, warning: ResolutionWarning) {
        self.inner.warnings.push(warning);
    }

    pub(crate) fn finish(self) -> ArgumentContext {
        self.inner
    }
}
