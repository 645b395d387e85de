//! Parameter declarations: positional parameters, named options and flags.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::alias::{AliasSet, AliasSpec, check_name};
use crate::context::ArgumentContext;
use crate::error::Result;

/// Value type of a named option.
///
/// Values are always kept as strings; the declared type is used to flag
/// values that do not parse, and by help rendering.
///
/// # Examples
///
/// ```
/// use cmdar_core::ValueType;
///
/// assert_eq!(ValueType::default(), ValueType::Any);
/// assert!(ValueType::Integer.accepts("-12"));
/// assert!(!ValueType::Integer.accepts("twelve"));
///
/// let format = ValueType::Choice(vec!["json".into(), "yaml".into()]);
/// assert!(format.accepts("yaml"));
/// assert!(!format.accepts("toml"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// Anything (the default).
    #[default]
    Any,
    /// Free text.
    String,
    /// Signed integer.
    Integer,
    /// Floating point number.
    Number,
    /// `true` or `false`.
    Bool,
    /// Filesystem path.
    Path,
    /// One of a fixed set of strings.
    Choice(Vec<String>),
}

impl ValueType {
    /// Returns `true` if `value` is acceptable for this type.
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            Self::Any | Self::String => true,
            Self::Integer => value.parse::<i64>().is_ok(),
            Self::Number => value.parse::<f64>().is_ok(),
            Self::Bool => value.parse::<bool>().is_ok(),
            Self::Path => !value.is_empty() && Path::new(value).components().next().is_some(),
            Self::Choice(choices) => choices.iter().any(|choice| choice == value),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("value"),
            Self::String => f.write_str("string"),
            Self::Integer => f.write_str("integer"),
            Self::Number => f.write_str("number"),
            Self::Bool => f.write_str("bool"),
            Self::Path => f.write_str("path"),
            Self::Choice(choices) => write!(f, "one of {}", choices.join("|")),
        }
    }
}

/// A value supplied by position rather than by alias.
///
/// A command has at most one positional parameter; every value token the
/// command receives is collected into it, in order.
///
/// # Examples
///
/// ```
/// use cmdar_core::Positional;
///
/// let key = Positional::new("key").unwrap().with_description("Record key");
/// assert_eq!(key.name(), "key");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Positional {
    name: String,
    description: Option<String>,
}

impl Positional {
    /// Declares a positional parameter.
    ///
    /// # Errors
    ///
    /// Fails when `name` is empty or starts with a dash.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        check_name(&name)?;
        Ok(Self {
            name,
            description: None,
        })
    }

    /// Adds a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// A named parameter that binds one or more values.
///
/// `command [-o|--option] <values..>`
///
/// # Examples
///
/// ```
/// use cmdar_core::{AliasSpec, NamedOption, ValueType};
///
/// let path = NamedOption::with_aliases("path", AliasSpec::new().short('p'))
///     .unwrap()
///     .with_value_type(ValueType::Path)
///     .single();
/// assert_eq!(path.aliases().as_slice(), ["-p", "--path"]);
/// assert!(!path.multiple());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedOption {
    name: String,
    description: Option<String>,
    aliases: AliasSet,
    value_type: ValueType,
    multiple: bool,
}

impl NamedOption {
    /// Declares an option whose aliases are derived from its name.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        Self::with_aliases(name, AliasSpec::default())
    }

    /// Declares an option with explicit alias rules.
    ///
    /// # Errors
    ///
    /// Propagates alias derivation failures from [`AliasSet::new`].
    pub fn with_aliases(name: impl Into<String>, spec: AliasSpec) -> Result<Self> {
        let name = name.into();
        let aliases = AliasSet::new(&name, &spec)?;
        Ok(Self {
            name,
            description: None,
            aliases,
            value_type: ValueType::default(),
            multiple: true,
        })
    }

    /// Adds a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the declared value type.
    pub fn with_value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    /// Binds at most one value per occurrence.
    pub fn single(mut self) -> Self {
        self.multiple = false;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn aliases(&self) -> &AliasSet {
        &self.aliases
    }

    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    /// Whether one occurrence may bind more than one value.
    pub fn multiple(&self) -> bool {
        self.multiple
    }
}

/// A boolean switch.
///
/// # Examples
///
/// ```
/// use cmdar_core::Flag;
///
/// let help = Flag::new("help").unwrap().with_description("Print help");
/// assert_eq!(help.aliases().as_slice(), ["-h", "--help"]);
/// assert!(!help.default_value());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flag {
    name: String,
    description: Option<String>,
    aliases: AliasSet,
    default: bool,
}

impl Flag {
    /// Declares a flag whose aliases are derived from its name.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        Self::with_aliases(name, AliasSpec::default())
    }

    /// Declares a flag with explicit alias rules.
    pub fn with_aliases(name: impl Into<String>, spec: AliasSpec) -> Result<Self> {
        let name = name.into();
        let aliases = AliasSet::new(&name, &spec)?;
        Ok(Self {
            name,
            description: None,
            aliases,
            default: false,
        })
    }

    /// Adds a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the value reported when the flag is absent from the input.
    pub fn with_default(mut self, default: bool) -> Self {
        self.default = default;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn aliases(&self) -> &AliasSet {
        &self.aliases
    }

    pub fn default_value(&self) -> bool {
        self.default
    }
}

/// Kind of a [`Parameter`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    Positional,
    Option,
    Flag,
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Positional => "positional",
            Self::Option => "option",
            Self::Flag => "flag",
        })
    }
}

/// Any parameter a command can declare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parameter {
    Positional(Positional),
    Option(NamedOption),
    Flag(Flag),
}

impl Parameter {
    pub fn name(&self) -> &str {
        match self {
            Self::Positional(p) => p.name(),
            Self::Option(o) => o.name(),
            Self::Flag(f) => f.name(),
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Positional(p) => p.description(),
            Self::Option(o) => o.description(),
            Self::Flag(f) => f.description(),
        }
    }

    pub fn kind(&self) -> ParameterKind {
        match self {
            Self::Positional(_) => ParameterKind::Positional,
            Self::Option(_) => ParameterKind::Option,
            Self::Flag(_) => ParameterKind::Flag,
        }
    }

    /// Aliases of a flag or option; positional parameters have none.
    pub fn aliases(&self) -> Option<&AliasSet> {
        match self {
            Self::Positional(_) => None,
            Self::Option(o) => Some(o.aliases()),
            Self::Flag(f) => Some(f.aliases()),
        }
    }

    pub fn primary_short_alias(&self) -> Option<&str> {
        self.aliases().and_then(AliasSet::primary_short)
    }

    pub fn primary_long_alias(&self) -> Option<&str> {
        self.aliases().and_then(AliasSet::primary_long)
    }

    /// Values bound to this parameter in `context`.
    ///
    /// Positional parameters read the positional values, options their bound
    /// values. Flags carry no values and always return `None`.
    pub fn values<'c>(&self, context: &'c ArgumentContext) -> Option<&'c [String]> {
        match self {
            Self::Positional(_) => {
                let values = context.values();
                (!values.is_empty()).then_some(values)
            }
            Self::Option(o) => context.values_of(o.name()),
            Self::Flag(_) => None,
        }
    }

    /// First value bound to this parameter in `context`.
    pub fn value<'c>(&self, context: &'c ArgumentContext) -> Option<&'c str> {
        self.values(context)
            .and_then(|values| values.first())
            .map(String::as_str)
    }
}

impl From<Positional> for Parameter {
    fn from(p: Positional) -> Self {
        Self::Positional(p)
    }
}

impl From<NamedOption> for Parameter {
    fn from(o: NamedOption) -> Self {
        Self::Option(o)
    }
}

impl From<Flag> for Parameter {
    fn from(f: Flag) -> Self {
        Self::Flag(f)
    }
}
