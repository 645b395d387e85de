//! Serializable command-tree definitions.
//!
//! A definition file describes the same tree the [`Command`] builder does,
//! as YAML or JSON. Parameters are a single ordered list tagged by `kind`.
//!
//! # Example YAML
//!
//! ```yaml
//! name: goto
//! description: Keeps a key-value record of paths.
//! parameters:
//!   - kind: flag
//!     name: help
//!     description: Print this usage information.
//!   - kind: flag
//!     name: version
//!     short: V
//! commands:
//!   - name: set
//!     parameters:
//!       - kind: positional
//!         name: key
//!       - kind: option
//!         name: path
//!         value_type: path
//!         multiple: false
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;

use cmdar_core::{
    Action, AliasSpec, Command, CommandTree, ConfigurationError, Flag, NamedOption, Parameter,
    Positional, ValueType,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DefinitionError, Result};

fn default_true() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

/// On-disk format of a definition file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// Picks the format from a file extension (`json`, `yaml`, `yml`).
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::UnsupportedFormat`] for any other extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            _ => Err(DefinitionError::UnsupportedFormat(
                path.display().to_string(),
            )),
        }
    }
}

/// Alias rules shared by flags and options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AliasDefinition {
    /// Short name without the dash.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
    /// Long name without the dashes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long: Option<String>,
    /// Extra names without dashes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Derive a short alias when `short` is absent (default `true`).
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub create_short: bool,
    /// Derive a long alias when `long` is absent (default `true`).
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub create_long: bool,
}

impl AliasDefinition {
    fn to_spec(&self) -> AliasSpec {
        AliasSpec {
            short_name: self.short.clone(),
            long_name: self.long.clone(),
            other_aliases: self.aliases.clone(),
            create_short_if_absent: self.create_short,
            create_long_if_absent: self.create_long,
        }
    }
}

/// A flag entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub aliases: AliasDefinition,
    /// Must be a boolean when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

/// An option entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub aliases: AliasDefinition,
    /// `any`, `string`, `integer`, `number`, `bool`, `path` or `choice`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    /// Allowed values; implies `value_type: choice`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
    /// Whether one occurrence binds more than one value (default `true`).
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub multiple: bool,
}

impl OptionDefinition {
    fn value_type(&self) -> Result<ValueType> {
        if !self.choices.is_empty() {
            return match self.value_type.as_deref() {
                None | Some("choice") => Ok(ValueType::Choice(self.choices.clone())),
                Some(other) => Err(DefinitionError::UnknownValueType(format!(
                    "{other} (choices require value_type: choice)"
                ))),
            };
        }
        match self.value_type.as_deref() {
            None | Some("any") => Ok(ValueType::Any),
            Some("string") => Ok(ValueType::String),
            Some("integer") => Ok(ValueType::Integer),
            Some("number") => Ok(ValueType::Number),
            Some("bool") => Ok(ValueType::Bool),
            Some("path") => Ok(ValueType::Path),
            Some(other) => Err(DefinitionError::UnknownValueType(other.to_string())),
        }
    }
}

/// A positional parameter entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionalDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One entry of a command's `parameters` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParameterDefinition {
    Positional(PositionalDefinition),
    Option(OptionDefinition),
    Flag(FlagDefinition),
}

impl ParameterDefinition {
    pub fn name(&self) -> &str {
        match self {
            Self::Positional(p) => &p.name,
            Self::Option(o) => &o.name,
            Self::Flag(f) => &f.name,
        }
    }

    fn to_parameter(&self) -> Result<Parameter> {
        let parameter = match self {
            Self::Positional(def) => {
                let mut positional = Positional::new(def.name.as_str())?;
                if let Some(description) = &def.description {
                    positional = positional.with_description(description.as_str());
                }
                Parameter::Positional(positional)
            }
            Self::Option(def) => {
                let mut option = NamedOption::with_aliases(def.name.as_str(), def.aliases.to_spec())?
                    .with_value_type(def.value_type()?);
                if !def.multiple {
                    option = option.single();
                }
                if let Some(description) = &def.description {
                    option = option.with_description(description.as_str());
                }
                Parameter::Option(option)
            }
            Self::Flag(def) => {
                let default = match &def.default {
                    None => false,
                    Some(serde_json::Value::Bool(value)) => *value,
                    Some(other) => {
                        return Err(ConfigurationError::InvalidFlagDefault {
                            flag: def.name.clone(),
                            found: other.to_string(),
                        }
                        .into());
                    }
                };
                let mut flag = Flag::with_aliases(def.name.as_str(), def.aliases.to_spec())?
                    .with_default(default);
                if let Some(description) = &def.description {
                    flag = flag.with_description(description.as_str());
                }
                Parameter::Flag(flag)
            }
        };
        Ok(parameter)
    }
}

/// A command and everything below it, as stored in a definition file.
///
/// # Examples
///
/// ```
/// use cmdar_definition::CommandDefinition;
///
/// let yaml = r#"
/// name: goto
/// commands:
///   - name: set
///     parameters:
///       - kind: positional
///         name: key
///       - kind: option
///         name: path
/// "#;
/// let definition = CommandDefinition::from_yaml_str(yaml).unwrap();
/// let tree = definition.build_tree().unwrap();
///
/// let resolution = tree.resolve(["set", "mykey", "-p", "/usr/bin"]);
/// assert_eq!(resolution.leaf().value(), Some("mykey"));
/// assert_eq!(resolution.leaf().value_of("path"), Some("/usr/bin"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandDefinition {
    pub name: String,
    /// Defaults to `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Replaces the derived usage text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    /// Printed before the usage lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_usage: Option<String>,
    /// Extra names the command answers to as a sub-command.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<CommandDefinition>,
}

impl CommandDefinition {
    /// Loads a definition, choosing the format from the file extension.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](DefinitionError::IoError) if the file cannot be
    /// read, [`UnsupportedFormat`](DefinitionError::UnsupportedFormat) for an
    /// unknown extension, or a JSON/YAML error if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = Format::from_path(path)?;
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let definition = match format {
            Format::Json => serde_json::from_reader(reader)?,
            Format::Yaml => serde_yaml::from_reader(reader)?,
        };
        debug!(path = %path.display(), "loaded command definition");
        Ok(definition)
    }

    /// Saves the definition, choosing the format from the file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let format = Format::from_path(path)?;
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        match format {
            Format::Json => serde_json::to_writer_pretty(writer, self)?,
            Format::Yaml => serde_yaml::to_writer(writer, self)?,
        }
        Ok(())
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Identifier of this command (its name unless set explicitly).
    pub fn identifier(&self) -> &str {
        self.identifier.as_deref().unwrap_or(&self.name)
    }

    /// Converts into a [`Command`] declaration without actions.
    pub fn to_command(&self) -> Result<Command> {
        self.to_command_with(&|_| None)
    }

    /// Converts into a [`Command`] declaration, asking `actions` for the
    /// action of every command.
    ///
    /// # Errors
    ///
    /// Fails on invalid names, aliases, value types or flag defaults.
    pub fn to_command_with<F>(&self, actions: &F) -> Result<Command>
    where
        F: Fn(&CommandDefinition) -> Option<Arc<dyn Action>>,
    {
        let mut command = Command::new(self.name.as_str());
        if let Some(identifier) = &self.identifier {
            command = command.with_identifier(identifier.as_str());
        }
        if let Some(description) = &self.description {
            command = command.with_description(description.as_str());
        }
        if let Some(usage) = &self.usage {
            command = command.with_usage(usage.as_str());
        }
        if let Some(info) = &self.additional_usage {
            command = command.with_additional_usage(info.as_str());
        }
        for alias in &self.aliases {
            command = command.with_alias(alias.as_str());
        }
        if let Some(action) = actions(self) {
            command = command.with_shared_action(action);
        }
        for parameter in &self.parameters {
            command = command.with_parameter(parameter.to_parameter()?);
        }
        for sub in &self.commands {
            command = command.with_subcommand(sub.to_command_with(actions)?);
        }
        Ok(command)
    }

    /// Builds the validated tree without actions.
    pub fn build_tree(&self) -> Result<CommandTree> {
        Ok(self.to_command()?.build()?)
    }

    /// Builds the validated tree with actions.
    pub fn build_tree_with<F>(&self, actions: &F) -> Result<CommandTree>
    where
        F: Fn(&CommandDefinition) -> Option<Arc<dyn Action>>,
    {
        Ok(self.to_command_with(actions)?.build()?)
    }
}

#[cfg(test)]
mod tests {
    use cmdar_core::{ArgumentContext, Outcome, ResolutionWarning};

    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
name: goto
description: Goto keeps a key-value record of paths.
additional_usage: Use "goto <key>" to redirect to <key>'s path
parameters:
  - kind: flag
    name: help
    description: Print this usage information.
  - kind: flag
    name: version
    short: V
    default: false
commands:
  - name: get
    parameters:
      - kind: option
        name: k
      - kind: option
        name: limit
        value_type: integer
        multiple: false
  - name: list
    aliases: [ls]
  - name: set
    identifier: goto-set
    parameters:
      - kind: positional
        name: key
      - kind: option
        name: path
        create_short: false
        aliases: [dir]
        value_type: path
  - name: format
    parameters:
      - kind: option
        name: style
        choices: [json, yaml]
"#
    }

    #[test]
    fn test_deserialize_complete() {
        let definition = CommandDefinition::from_yaml_str(sample_yaml()).unwrap();
        assert_eq!(definition.name, "goto");
        assert_eq!(definition.parameters.len(), 2);
        assert_eq!(definition.commands.len(), 4);
        assert_eq!(definition.commands[1].aliases, vec!["ls"]);

        let ParameterDefinition::Option(path) = &definition.commands[2].parameters[1] else {
            panic!("expected option");
        };
        assert!(!path.aliases.create_short);
        assert!(path.aliases.create_long);
        assert!(path.multiple);
        assert_eq!(path.aliases.aliases, vec!["dir"]);
    }

    #[test]
    fn test_deserialize_minimal() {
        let definition = CommandDefinition::from_yaml_str("name: tool").unwrap();
        assert_eq!(definition.identifier(), "tool");
        assert!(definition.parameters.is_empty());
        assert!(definition.commands.is_empty());
        assert!(definition.build_tree().is_ok());
    }

    #[test]
    fn test_build_tree_applies_alias_rules() {
        let tree = CommandDefinition::from_yaml_str(sample_yaml())
            .unwrap()
            .build_tree()
            .unwrap();

        let set = tree.node(tree.find_path(&["set"]).unwrap());
        assert_eq!(set.identifier(), "goto-set");
        let path = set.lookup_alias("--dir").unwrap();
        assert_eq!(path.name(), "path");
        assert_eq!(path.aliases().unwrap().as_slice(), ["--path", "--dir"]);

        assert!(tree.find_path(&["ls"]).is_some());
    }

    #[test]
    fn test_value_types_and_choices() {
        let tree = CommandDefinition::from_yaml_str(sample_yaml())
            .unwrap()
            .build_tree()
            .unwrap();

        let resolution = tree.resolve(["format", "--style", "toml"]);
        assert!(matches!(
            resolution.leaf().warnings(),
            [ResolutionWarning::InvalidOptionValue { value, .. }] if value == "toml"
        ));

        let resolution = tree.resolve(["get", "--limit", "5", "-k", "a", "b"]);
        assert_eq!(resolution.leaf().parse_value::<u32>("limit"), Some(Ok(5)));
        assert_eq!(resolution.leaf().values_of("k").unwrap(), ["a", "b"]);
    }

    #[test]
    fn test_rejects_non_boolean_flag_default() {
        let yaml = r#"
name: tool
parameters:
  - kind: flag
    name: color
    default: "yes"
"#;
        let err = CommandDefinition::from_yaml_str(yaml)
            .unwrap()
            .build_tree()
            .unwrap_err();
        assert!(matches!(
            err,
            DefinitionError::Configuration(ConfigurationError::InvalidFlagDefault { ref flag, .. }) if flag == "color"
        ));
    }

    #[test]
    fn test_rejects_unknown_value_type() {
        let yaml = r#"
name: tool
parameters:
  - kind: option
    name: level
    value_type: decimal
"#;
        let err = CommandDefinition::from_yaml_str(yaml)
            .unwrap()
            .build_tree()
            .unwrap_err();
        assert!(matches!(err, DefinitionError::UnknownValueType(ref t) if t == "decimal"));
    }

    #[test]
    fn test_true_flag_default_is_enabled() {
        let yaml = r#"
name: tool
parameters:
  - kind: flag
    name: color
    create_short: false
    default: true
"#;
        let tree = CommandDefinition::from_yaml_str(yaml)
            .unwrap()
            .build_tree()
            .unwrap();
        assert!(tree.resolve(Vec::<String>::new()).root().is_flag_enabled("color"));
    }

    #[test]
    fn test_json_definition() {
        let json = r#"{
            "name": "tool",
            "parameters": [
                {"kind": "flag", "name": "verbose"},
                {"kind": "positional", "name": "file"}
            ]
        }"#;
        let tree = CommandDefinition::from_json_str(json)
            .unwrap()
            .build_tree()
            .unwrap();
        let resolution = tree.resolve(["-v", "a.txt"]);
        assert!(resolution.root().is_flag_enabled("verbose"));
        assert_eq!(resolution.root().values(), ["a.txt"]);
    }

    #[test]
    fn test_actions_are_attached_by_identifier() {
        let definition = CommandDefinition::from_yaml_str(sample_yaml()).unwrap();
        let tree = definition
            .build_tree_with(&|def: &CommandDefinition| {
                (def.identifier() == "goto-set").then(|| {
                    Arc::new(|_: &ArgumentContext| Outcome::Stop) as Arc<dyn Action>
                })
            })
            .unwrap();

        let (_, dispatch) = tree.run(["set", "key"]);
        assert_eq!(dispatch.invoked, vec!["goto-set"]);
        assert_eq!(dispatch.stopped_by.as_deref(), Some("goto-set"));
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let original = CommandDefinition::from_yaml_str(sample_yaml()).unwrap();

        for file in ["goto.yaml", "goto.json"] {
            let path = dir.path().join(file);
            original.save(&path).unwrap();
            let loaded = CommandDefinition::load(&path).unwrap();
            assert_eq!(loaded, original);
        }
    }

    #[test]
    fn test_unsupported_extension() {
        let err = CommandDefinition::load("goto.toml").unwrap_err();
        assert!(matches!(err, DefinitionError::UnsupportedFormat(_)));
    }
}
