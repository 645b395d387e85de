//! Token classification.
//!
//! Classification runs in two steps. [`TokenShape::of`] looks at the token
//! alone and decides whether it could be an alias; [`classify`] then resolves
//! alias candidates against the command in scope. Both are pure functions.

use crate::command::CommandNode;
use crate::parameter::{Flag, NamedOption, Parameter};

/// Syntactic form of a raw token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenShape {
    /// Starts with a single `-` followed by something (`-v`, `-verbose`).
    Short,
    /// Starts with `--` followed by something (`--verbose`).
    Long,
    /// `--` on its own: everything after it is a value.
    Separator,
    /// Anything else, including a bare `-`.
    Value,
}

impl TokenShape {
    /// # Examples
    ///
    /// ```
    /// use cmdar_core::TokenShape;
    ///
    /// assert_eq!(TokenShape::of("--path"), TokenShape::Long);
    /// assert_eq!(TokenShape::of("-p"), TokenShape::Short);
    /// assert_eq!(TokenShape::of("--"), TokenShape::Separator);
    /// assert_eq!(TokenShape::of("-"), TokenShape::Value);
    /// assert_eq!(TokenShape::of("/usr/bin"), TokenShape::Value);
    /// ```
    pub fn of(token: &str) -> Self {
        if token == "--" {
            Self::Separator
        } else if token.starts_with("--") {
            Self::Long
        } else if token.len() > 1 && token.starts_with('-') {
            Self::Short
        } else {
            Self::Value
        }
    }
}

/// Why a token could not be attributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unrecognized {
    /// Alias-shaped, but no flag or option of the command answers to it.
    Alias,
    /// A value, but the command has no positional parameter.
    Value,
}

/// Classification of one token within one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass<'a> {
    FlagAlias(&'a Flag),
    OptionAlias(&'a NamedOption),
    PositionalValue,
    /// The separator token itself.
    Separator,
    Unrecognized(Unrecognized),
}

impl TokenClass<'_> {
    /// Returns `true` for tokens that name a known flag or option.
    pub fn is_known_alias(&self) -> bool {
        matches!(self, Self::FlagAlias(_) | Self::OptionAlias(_))
    }
}

/// Classifies `token` against the flags and options of `scope`.
///
/// `expects_positional` is whether `scope` currently accepts positional
/// values; value-shaped tokens are unrecognized otherwise.
///
/// # Examples
///
/// ```
/// use cmdar_core::*;
///
/// let tree = Command::new("tool").with_flag(Flag::new("verbose")?).build()?;
/// let root = tree.node(tree.root());
///
/// assert!(matches!(classify("-v", root, false), TokenClass::FlagAlias(_)));
/// assert_eq!(classify("--quiet", root, false), TokenClass::Unrecognized(Unrecognized::Alias));
/// assert_eq!(classify("file.txt", root, true), TokenClass::PositionalValue);
/// assert_eq!(classify("file.txt", root, false), TokenClass::Unrecognized(Unrecognized::Value));
/// # Ok::<(), ConfigurationError>(())
/// ```
pub fn classify<'a>(token: &str, scope: &'a CommandNode, expects_positional: bool) -> TokenClass<'a> {
    match TokenShape::of(token) {
        TokenShape::Separator => TokenClass::Separator,
        TokenShape::Short | TokenShape::Long => match scope.lookup_alias(token) {
            Some(Parameter::Flag(flag)) => TokenClass::FlagAlias(flag),
            Some(Parameter::Option(option)) => TokenClass::OptionAlias(option),
            Some(Parameter::Positional(_)) | None => {
                TokenClass::Unrecognized(Unrecognized::Alias)
            }
        },
        TokenShape::Value if expects_positional => TokenClass::PositionalValue,
        TokenShape::Value => TokenClass::Unrecognized(Unrecognized::Value),
    }
}
