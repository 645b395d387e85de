//! Command declarations and the immutable command tree.
//!
//! Commands are declared with the [`Command`] builder and frozen into a
//! [`CommandTree`]. The tree is an arena: every [`CommandNode`] refers to its
//! parent and children by [`NodeId`], so there are no owning back-references.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::alias::check_name;
use crate::context::ArgumentContext;
use crate::error::{ConfigurationError, ResolutionWarning, Result};
use crate::parameter::{Flag, NamedOption, Parameter, Positional};

/// What an [`Action`] wants to happen after it ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Outcome {
    /// Invoke the Action of the next visited command.
    #[default]
    Continue,
    /// Skip the Actions of every command further down the invocation.
    Stop,
}

/// Callback invoked with the parsed arguments of the command it belongs to.
///
/// Implemented for every `Fn(&ArgumentContext) -> Outcome` closure.
///
/// # Examples
///
/// ```
/// use cmdar_core::{Action, ArgumentContext, Outcome};
///
/// struct Help;
///
/// impl Action for Help {
///     fn on_usage(&self, context: &ArgumentContext) -> Outcome {
///         if context.is_flag_enabled("help") {
///             Outcome::Stop
///         } else {
///             Outcome::Continue
///         }
///     }
/// }
/// ```
pub trait Action: Send + Sync {
    fn on_usage(&self, context: &ArgumentContext) -> Outcome;
}

impl<F> Action for F
where
    F: Fn(&ArgumentContext) -> Outcome + Send + Sync,
{
    fn on_usage(&self, context: &ArgumentContext) -> Outcome {
        self(context)
    }
}

/// Declaration of a command and everything below it.
///
/// If a command has no parent it is the root of the command line, invoked by
/// program name.
///
/// # Examples
///
/// ```
/// use cmdar_core::*;
///
/// let tree = Command::new("goto")
///     .with_description("Quick access to saved paths")
///     .with_flag(Flag::new("help")?)
///     .with_subcommand(
///         Command::new("set")
///             .with_positional(Positional::new("key")?)
///             .with_option(NamedOption::new("path")?),
///     )
///     .build()?;
///
/// let set = tree.find_subcommand(tree.root(), "set").unwrap();
/// assert_eq!(tree.path_names(set), vec!["goto", "set"]);
/// # Ok::<(), ConfigurationError>(())
/// ```
#[derive(Clone)]
pub struct Command {
    name: String,
    identifier: Option<String>,
    description: Option<String>,
    usage: Option<String>,
    additional_usage: Option<String>,
    aliases: Vec<String>,
    action: Option<Arc<dyn Action>>,
    parameters: Vec<Parameter>,
    subcommands: Vec<Command>,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("identifier", &self.identifier)
            .field("aliases", &self.aliases)
            .field("has_action", &self.action.is_some())
            .field("parameters", &self.parameters)
            .field("subcommands", &self.subcommands)
            .finish_non_exhaustive()
    }
}

impl Command {
    /// Starts a command declaration. The name is validated by [`build`](Self::build).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            identifier: None,
            description: None,
            usage: None,
            additional_usage: None,
            aliases: Vec::new(),
            action: None,
            parameters: Vec::new(),
            subcommands: Vec::new(),
        }
    }

    /// Sets the identifier (defaults to the name).
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replaces the derived usage text.
    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    /// Text printed before the usage lines.
    pub fn with_additional_usage(mut self, info: impl Into<String>) -> Self {
        self.additional_usage = Some(info.into());
        self
    }

    /// Adds another name the command answers to as a sub-command.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn with_action(mut self, action: impl Action + 'static) -> Self {
        self.action = Some(Arc::new(action));
        self
    }

    /// Shares an already boxed action.
    pub fn with_shared_action(mut self, action: Arc<dyn Action>) -> Self {
        self.action = Some(action);
        self
    }

    pub fn with_parameter(mut self, parameter: impl Into<Parameter>) -> Self {
        self.parameters.push(parameter.into());
        self
    }

    pub fn with_flag(self, flag: Flag) -> Self {
        self.with_parameter(flag)
    }

    pub fn with_option(self, option: NamedOption) -> Self {
        self.with_parameter(option)
    }

    pub fn with_positional(self, positional: Positional) -> Self {
        self.with_parameter(positional)
    }

    pub fn with_subcommand(mut self, command: Command) -> Self {
        self.subcommands.push(command);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Validates the declaration and freezes it into a tree.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigurationError`] found: an invalid command
    /// name, more than one positional parameter, duplicate parameter names
    /// or aliases within one command, or duplicate sub-command names.
    /// Aliases may repeat across different commands.
    pub fn build(self) -> Result<CommandTree> {
        let mut nodes = Vec::new();
        push_node(&mut nodes, self, None)?;
        Ok(CommandTree { nodes })
    }
}

/// Index of a node within its [`CommandTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// One validated command of a [`CommandTree`].
pub struct CommandNode {
    name: String,
    identifier: String,
    description: Option<String>,
    usage: Option<String>,
    additional_usage: Option<String>,
    aliases: Vec<String>,
    action: Option<Arc<dyn Action>>,
    parameters: Vec<Parameter>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    alias_index: HashMap<String, usize>,
    positional: Option<usize>,
    has_flags: bool,
    has_options: bool,
}

impl fmt::Debug for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandNode")
            .field("name", &self.name)
            .field("identifier", &self.identifier)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

impl CommandNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Explicit usage text, if one was declared.
    pub fn usage(&self) -> Option<&str> {
        self.usage.as_deref()
    }

    pub fn additional_usage(&self) -> Option<&str> {
        self.additional_usage.as_deref()
    }

    /// Extra sub-command names.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn action(&self) -> Option<&dyn Action> {
        self.action.as_deref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_sub_command(&self) -> bool {
        self.parent.is_some()
    }

    /// Parameters in declaration order.
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn flags(&self) -> impl Iterator<Item = &Flag> {
        self.parameters.iter().filter_map(|p| match p {
            Parameter::Flag(f) => Some(f),
            _ => None,
        })
    }

    pub fn options(&self) -> impl Iterator<Item = &NamedOption> {
        self.parameters.iter().filter_map(|p| match p {
            Parameter::Option(o) => Some(o),
            _ => None,
        })
    }

    pub fn positional(&self) -> Option<&Positional> {
        self.positional
            .and_then(|index| match &self.parameters[index] {
                Parameter::Positional(p) => Some(p),
                _ => None,
            })
    }

    /// Looks up the flag or option answering to `alias`.
    pub fn lookup_alias(&self, alias: &str) -> Option<&Parameter> {
        self.alias_index
            .get(alias)
            .map(|&index| &self.parameters[index])
    }

    pub fn has_flags(&self) -> bool {
        self.has_flags
    }

    pub fn has_options(&self) -> bool {
        self.has_options
    }

    pub fn has_subcommands(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn has_positional(&self) -> bool {
        self.positional.is_some()
    }

    /// Returns `true` if `token` is this command's name or one of its aliases.
    pub fn answers_to(&self, token: &str) -> bool {
        self.name == token || self.aliases.iter().any(|alias| alias == token)
    }
}

/// Immutable, validated command tree.
///
/// Built once by [`Command::build`]; safe to share between threads.
#[derive(Debug)]
pub struct CommandTree {
    nodes: Vec<CommandNode>,
}

impl CommandTree {
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Returns the node behind `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different tree.
    pub fn node(&self, id: NodeId) -> &CommandNode {
        &self.nodes[id.0]
    }

    /// All nodes with their ids, in depth-first declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &CommandNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId(index), node))
    }

    /// Finds the child of `parent` answering to `token`.
    pub fn find_subcommand(&self, parent: NodeId, token: &str) -> Option<NodeId> {
        self.node(parent)
            .children
            .iter()
            .copied()
            .find(|&child| self.node(child).answers_to(token))
    }

    /// Walks a path of sub-command names starting below the root.
    pub fn find_path<S: AsRef<str>>(&self, path: &[S]) -> Option<NodeId> {
        path.iter().try_fold(self.root(), |node, segment| {
            self.find_subcommand(node, segment.as_ref())
        })
    }

    /// Ids from the root down to `id`, inclusive.
    pub fn path(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = vec![id];
        let mut current = id;
        while let Some(parent) = self.node(current).parent {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        path
    }

    /// Names from the root down to `id`, inclusive.
    pub fn path_names(&self, id: NodeId) -> Vec<&str> {
        self.path(id)
            .into_iter()
            .map(|node| self.node(node).name())
            .collect()
    }

    /// Non-fatal warnings raised while declaring parameters.
    pub fn declaration_warnings(&self) -> Vec<ResolutionWarning> {
        self.nodes
            .iter()
            .flat_map(|node| node.parameters.iter())
            .filter_map(Parameter::aliases)
            .flat_map(|aliases| aliases.warnings().iter().cloned())
            .collect()
    }
}

fn push_node(nodes: &mut Vec<CommandNode>, command: Command, parent: Option<NodeId>) -> Result<NodeId> {
    check_name(&command.name)?;
    for alias in &command.aliases {
        check_name(alias)?;
    }

    let mut alias_index = HashMap::new();
    let mut names = HashSet::new();
    let mut positional: Option<usize> = None;
    let mut has_flags = false;
    let mut has_options = false;

    for (index, parameter) in command.parameters.iter().enumerate() {
        if !names.insert(parameter.name()) {
            return Err(ConfigurationError::DuplicateParameter {
                command: command.name.clone(),
                name: parameter.name().to_string(),
            });
        }
        match parameter {
            Parameter::Positional(p) => {
                if let Some(existing) = positional {
                    return Err(ConfigurationError::DuplicatePositional {
                        command: command.name.clone(),
                        existing: command.parameters[existing].name().to_string(),
                        added: p.name().to_string(),
                    });
                }
                positional = Some(index);
            }
            Parameter::Option(_) => has_options = true,
            Parameter::Flag(_) => has_flags = true,
        }
        for alias in parameter.aliases().into_iter().flat_map(|set| set.iter()) {
            if alias_index.insert(alias.to_string(), index).is_some() {
                return Err(ConfigurationError::DuplicateAlias {
                    command: command.name.clone(),
                    alias: alias.to_string(),
                });
            }
        }
    }

    let mut seen_subcommands = HashSet::new();
    for sub in &command.subcommands {
        for name in std::iter::once(&sub.name).chain(sub.aliases.iter()) {
            if !seen_subcommands.insert(name.as_str()) {
                return Err(ConfigurationError::DuplicateSubcommand {
                    command: command.name.clone(),
                    name: name.clone(),
                });
            }
        }
    }

    let id = NodeId(nodes.len());
    let Command {
        name,
        identifier,
        description,
        usage,
        additional_usage,
        aliases,
        action,
        parameters,
        subcommands,
    } = command;

    nodes.push(CommandNode {
        identifier: identifier.unwrap_or_else(|| name.clone()),
        name,
        description,
        usage,
        additional_usage,
        aliases,
        action,
        parameters,
        parent,
        children: Vec::new(),
        alias_index,
        positional,
        has_flags,
        has_options,
    });

    for sub in subcommands {
        let child = push_node(nodes, sub, Some(id))?;
        nodes[id.0].children.push(child);
    }

    Ok(id)
}
