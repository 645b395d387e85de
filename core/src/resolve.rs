//! Resolution of a flat token stream against a command tree.
//!
//! Tokens are consumed left to right. The resolver starts at the root,
//! descends into sub-commands as their names appear, binds option values and
//! collects positional values. Nothing in the input aborts resolution:
//! problems become [`ResolutionWarning`]s on the context they were found in.

use serde::Serialize;
use tracing::debug;

use crate::classify::{TokenClass, Unrecognized, classify};
use crate::command::{CommandTree, NodeId, Outcome};
use crate::context::{ArgumentContext, ContextBuilder};
use crate::error::ResolutionWarning;
use crate::parameter::NamedOption;

/// Resolver state between two tokens.
#[derive(Debug, Clone, Copy)]
enum State<'t> {
    AtNode,
    CollectingOptionValues {
        option: &'t NamedOption,
        collected: usize,
    },
    /// After `--`: every token is a positional value.
    Literal,
}

/// Ordered result of one resolution, root first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    #[serde(skip)]
    nodes: Vec<NodeId>,
    contexts: Vec<ArgumentContext>,
}

impl Resolution {
    /// Contexts of every visited command, root to leaf.
    pub fn contexts(&self) -> &[ArgumentContext] {
        &self.contexts
    }

    /// Visited nodes, root to leaf.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Context of the root command.
    pub fn root(&self) -> &ArgumentContext {
        &self.contexts[0]
    }

    /// Context of the deepest visited command.
    pub fn leaf(&self) -> &ArgumentContext {
        self.contexts.last().unwrap_or_else(|| self.root())
    }

    /// Node of the deepest visited command.
    pub fn leaf_node(&self) -> NodeId {
        self.nodes[self.nodes.len() - 1]
    }

    /// Context of the visited node `id`, if resolution reached it.
    pub fn context(&self, id: NodeId) -> Option<&ArgumentContext> {
        self.nodes
            .iter()
            .position(|&node| node == id)
            .map(|index| &self.contexts[index])
    }

    /// Every warning raised, root to leaf.
    pub fn warnings(&self) -> impl Iterator<Item = &ResolutionWarning> {
        self.contexts.iter().flat_map(|c| c.warnings().iter())
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings().next().is_some()
    }
}

/// What happened when the Actions of a resolution were invoked.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Dispatch {
    /// Identifiers of the commands whose Action ran, in order.
    pub invoked: Vec<String>,
    /// Identifier of the command whose Action returned [`Outcome::Stop`].
    pub stopped_by: Option<String>,
}

impl CommandTree {
    /// Resolves `tokens` (the arguments after the program name).
    ///
    /// Deterministic: the same tokens against the same tree always produce an
    /// equal [`Resolution`].
    ///
    /// # Examples
    ///
    /// ```
    /// use cmdar_core::*;
    ///
    /// let tree = Command::new("goto")
    ///     .with_subcommand(Command::new("list"))
    ///     .build()?;
    /// let resolution = tree.resolve(["--unknown", "list"]);
    /// assert_eq!(resolution.contexts().len(), 2);
    /// assert_eq!(resolution.root().unrecognized(), ["--unknown"]);
    /// # Ok::<(), ConfigurationError>(())
    /// ```
    pub fn resolve<I, S>(&self, tokens: I) -> Resolution
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens: Vec<S> = tokens.into_iter().collect();

        let mut nodes = vec![self.root()];
        let mut contexts = Vec::new();
        let mut current = self.root();
        let mut builder = self.context_builder(current);
        let mut state = State::AtNode;
        let mut index = 0;

        while index < tokens.len() {
            let token = tokens[index].as_ref();

            match state {
                State::Literal => {
                    self.accept_value(&mut builder, current, token);
                    index += 1;
                }
                State::CollectingOptionValues { option, collected } => {
                    let class = classify(token, self.node(current), false);
                    let ends_values = class.is_known_alias()
                        || matches!(class, TokenClass::Separator)
                        || self.find_subcommand(current, token).is_some();
                    if ends_values {
                        close_option(&mut builder, option, collected);
                        state = State::AtNode;
                        // the same token is processed again at the node
                        continue;
                    }

                    debug!(option = option.name(), value = token, "binding option value");
                    if !option.value_type().accepts(token) {
                        let warning = ResolutionWarning::InvalidOptionValue {
                            command: builder.command().to_string(),
                            option: option.name().to_string(),
                            value: token.to_string(),
                            expected: option.value_type().clone(),
                        };
                        builder.warn(warning);
                    }
                    builder.bind_value(option.name(), token);
                    index += 1;

                    state = if option.multiple() {
                        State::CollectingOptionValues {
                            option,
                            collected: collected + 1,
                        }
                    } else {
                        State::AtNode
                    };
                }
                State::AtNode => {
                    let node = self.node(current);
                    index += 1;

                    if let Some(child) = self.find_subcommand(current, token) {
                        debug!(command = self.node(child).name(), "descending into sub-command");
                        let parent_builder =
                            std::mem::replace(&mut builder, self.context_builder(child));
                        contexts.push(self.finish(parent_builder, current));
                        nodes.push(child);
                        current = child;
                        continue;
                    }

                    match classify(token, node, node.has_positional()) {
                        TokenClass::FlagAlias(flag) => builder.enable_flag(flag.name()),
                        TokenClass::OptionAlias(option) => {
                            builder.open_option(option.name());
                            state = State::CollectingOptionValues {
                                option,
                                collected: 0,
                            };
                        }
                        TokenClass::PositionalValue => builder.push_value(token),
                        TokenClass::Separator => state = State::Literal,
                        TokenClass::Unrecognized(Unrecognized::Alias) => {
                            builder.push_unrecognized(token);
                            let warning = ResolutionWarning::UnrecognizedAlias {
                                command: node.name().to_string(),
                                token: token.to_string(),
                            };
                            builder.warn(warning);
                        }
                        TokenClass::Unrecognized(Unrecognized::Value) => {
                            self.accept_value(&mut builder, current, token);
                        }
                    }
                }
            }
        }

        if let State::CollectingOptionValues { option, collected } = state {
            close_option(&mut builder, option, collected);
        }
        contexts.push(self.finish(builder, current));

        Resolution { nodes, contexts }
    }

    /// Resolves `tokens` and invokes the Actions of the visited commands.
    ///
    /// Actions run root to leaf, each with its own context. An Action that
    /// returns [`Outcome::Stop`] prevents the Actions below it from running.
    /// Commands without an Action are skipped.
    pub fn run<I, S>(&self, tokens: I) -> (Resolution, Dispatch)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let resolution = self.resolve(tokens);
        let dispatch = self.dispatch(&resolution);
        (resolution, dispatch)
    }

    /// Invokes the Actions of an existing resolution of this tree.
    ///
    /// # Panics
    ///
    /// Panics if `resolution` was produced by a different tree.
    pub fn dispatch(&self, resolution: &Resolution) -> Dispatch {
        let mut dispatch = Dispatch::default();

        for (&id, context) in resolution.nodes.iter().zip(&resolution.contexts) {
            let Some(action) = self.node(id).action() else {
                continue;
            };
            dispatch.invoked.push(context.identifier().to_string());
            if action.on_usage(context) == Outcome::Stop {
                debug!(command = context.command(), "action stopped the invocation");
                dispatch.stopped_by = Some(context.identifier().to_string());
                break;
            }
        }

        dispatch
    }

    fn context_builder(&self, id: NodeId) -> ContextBuilder {
        let node = self.node(id);
        let path = self
            .path_names(id)
            .into_iter()
            .map(str::to_string)
            .collect();
        ContextBuilder::new(node.name(), node.identifier(), path)
    }

    /// Stores a value token as positional value, or as unexpected input.
    fn accept_value(&self, builder: &mut ContextBuilder, id: NodeId, token: &str) {
        let node = self.node(id);
        if node.has_positional() {
            builder.push_value(token);
        } else {
            builder.push_unrecognized(token);
            builder.warn(ResolutionWarning::UnexpectedValue {
                command: node.name().to_string(),
                token: token.to_string(),
            });
        }
    }

    /// Applies flag defaults and freezes the context.
    fn finish(&self, mut builder: ContextBuilder, id: NodeId) -> ArgumentContext {
        for flag in self.node(id).flags().filter(|flag| flag.default_value()) {
            builder.enable_flag(flag.name());
        }
        builder.finish()
    }
}

fn close_option(builder: &mut ContextBuilder, option: &NamedOption, collected: usize) {
    if collected == 0 {
        let warning = ResolutionWarning::MissingOptionValue {
            command: builder.command().to_string(),
            option: option.name().to_string(),
        };
        builder.warn(warning);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::{AliasSpec, ArgumentContext, Command, Flag, NamedOption, Positional, ValueType};

    fn goto() -> CommandTree {
        Command::new("goto")
            .with_flag(Flag::new("help").unwrap())
            .with_flag(Flag::with_aliases("color", AliasSpec::new().no_derived_short()).unwrap().with_default(true))
            .with_subcommand(
                Command::new("set")
                    .with_positional(Positional::new("key").unwrap())
                    .with_option(NamedOption::new("path").unwrap()),
            )
            .with_subcommand(
                Command::new("get")
                    .with_option(NamedOption::with_aliases("k", AliasSpec::new()).unwrap())
                    .with_option(
                        NamedOption::new("limit")
                            .unwrap()
                            .with_value_type(ValueType::Integer)
                            .single(),
                    )
                    .with_positional(Positional::new("pattern").unwrap()),
            )
            .with_subcommand(Command::new("list"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_empty_input_yields_root_context() {
        let tree = goto();
        let resolution = tree.resolve(Vec::<String>::new());
        assert_eq!(resolution.contexts().len(), 1);
        assert_eq!(resolution.root().command(), "goto");
        assert!(resolution.root().is_flag_enabled("color"));
        assert!(!resolution.root().is_flag_enabled("help"));
        assert!(!resolution.has_warnings());
    }

    #[test]
    fn test_descend_and_bind() {
        let tree = goto();
        let resolution = tree.resolve(["set", "mykey", "-p", "/usr/bin"]);
        assert_eq!(resolution.contexts().len(), 2);
        assert!(resolution.root().values().is_empty());
        assert!(resolution.root().values_of("path").is_none());

        let set = resolution.leaf();
        assert_eq!(set.command(), "set");
        assert_eq!(set.path(), ["goto", "set"]);
        assert_eq!(set.values(), ["mykey"]);
        assert_eq!(set.values_of("path"), Some(&["/usr/bin".to_string()][..]));
        assert!(!resolution.has_warnings());
    }

    #[test]
    fn test_option_collects_until_next_alias() {
        let tree = goto();
        let resolution = tree.resolve(["set", "-p", "a", "b", "--path", "c"]);
        let set = resolution.leaf();
        assert_eq!(set.values_of("path").unwrap(), ["a", "b", "c"]);
        assert!(set.values().is_empty());
    }

    #[test]
    fn test_single_option_binds_one_value() {
        let tree = goto();
        let resolution = tree.resolve(["get", "--limit", "3", "needle"]);
        let get = resolution.leaf();
        assert_eq!(get.values_of("limit").unwrap(), ["3"]);
        assert_eq!(get.values(), ["needle"]);
    }

    #[test]
    fn test_option_without_values_warns() {
        let tree = goto();
        let resolution = tree.resolve(["get", "-k"]);
        let get = resolution.leaf();
        assert_eq!(get.values_of("k"), Some(&[][..]));
        assert_eq!(
            get.warnings(),
            [ResolutionWarning::MissingOptionValue {
                command: "get".to_string(),
                option: "k".to_string(),
            }]
        );
    }

    #[test]
    fn test_option_stops_at_subcommand_name() {
        let tree = Command::new("tool")
            .with_option(NamedOption::new("config").unwrap())
            .with_subcommand(Command::new("run"))
            .build()
            .unwrap();
        let resolution = tree.resolve(["--config", "a.toml", "run"]);
        assert_eq!(resolution.root().values_of("config").unwrap(), ["a.toml"]);
        assert_eq!(resolution.leaf().command(), "run");
    }

    #[test]
    fn test_option_binds_unknown_alias_shaped_values() {
        let tree = goto();
        let resolution = tree.resolve(["set", "key", "--path", "/tmp", "--bogus"]);
        let set = resolution.leaf();
        assert_eq!(set.values_of("path").unwrap(), ["/tmp", "--bogus"]);
        assert!(set.unrecognized().is_empty());
        assert_eq!(set.values(), ["key"]);
    }

    #[test]
    fn test_option_binds_negative_number() {
        let tree = Command::new("seek")
            .with_option(NamedOption::new("offset").unwrap().with_value_type(ValueType::Integer))
            .with_flag(Flag::new("verbose").unwrap())
            .build()
            .unwrap();

        let resolution = tree.resolve(["--offset", "-5", "-v"]);
        let root = resolution.root();
        assert_eq!(root.values_of("offset").unwrap(), ["-5"]);
        assert_eq!(root.parse_value::<i64>("offset"), Some(Ok(-5)));
        assert!(root.is_flag_enabled("verbose"));
        assert!(root.unrecognized().is_empty());
        assert!(root.warnings().is_empty());
    }

    #[test]
    fn test_option_stops_at_separator() {
        let tree = goto();
        let resolution = tree.resolve(["set", "--path", "/tmp", "--", "-p"]);
        let set = resolution.leaf();
        assert_eq!(set.values_of("path").unwrap(), ["/tmp"]);
        assert_eq!(set.values(), ["-p"]);
    }

    #[test]
    fn test_context_lookup_by_node() {
        let tree = Command::new("git")
            .with_subcommand(Command::new("remote").with_subcommand(Command::new("remote")))
            .build()
            .unwrap();
        let inner = tree.find_path(&["remote", "remote"]).unwrap();
        let outer = tree.find_path(&["remote"]).unwrap();

        let resolution = tree.resolve(["remote", "remote"]);
        assert_eq!(resolution.leaf_node(), inner);
        assert_eq!(resolution.context(inner).unwrap().path(), ["git", "remote", "remote"]);
        assert_eq!(resolution.context(outer).unwrap().path(), ["git", "remote"]);

        let shallow = tree.resolve(["remote"]);
        assert_eq!(shallow.leaf_node(), outer);
        assert!(shallow.context(inner).is_none());
    }

    #[test]
    fn test_invalid_value_is_kept_with_warning() {
        let tree = goto();
        let resolution = tree.resolve(["get", "--limit", "many"]);
        let get = resolution.leaf();
        assert_eq!(get.value_of("limit"), Some("many"));
        assert!(matches!(
            get.warnings(),
            [ResolutionWarning::InvalidOptionValue { value, .. }] if value == "many"
        ));
    }

    #[test]
    fn test_unrecognized_tokens_do_not_abort() {
        let tree = goto();
        let resolution = tree.resolve(["--unknown", "stray", "list", "-x"]);
        assert_eq!(resolution.root().unrecognized(), ["--unknown", "stray"]);
        assert_eq!(resolution.leaf().command(), "list");
        assert_eq!(resolution.leaf().unrecognized(), ["-x"]);
        assert_eq!(resolution.warnings().count(), 3);
    }

    #[test]
    fn test_flags_are_scoped_to_their_command() {
        let tree = goto();
        let resolution = tree.resolve(["-h", "list", "-h"]);
        assert!(resolution.root().is_flag_enabled("help"));
        let list = resolution.leaf();
        assert!(!list.is_flag_enabled("help"));
        assert_eq!(list.unrecognized(), ["-h"]);
    }

    #[test]
    fn test_separator_makes_everything_positional() {
        let tree = goto();
        let resolution = tree.resolve(["get", "-k", "a", "--", "-k", "list"]);
        let get = resolution.leaf();
        assert_eq!(get.values_of("k").unwrap(), ["a"]);
        assert_eq!(get.values(), ["-k", "list"]);
        assert!(!get.unrecognized().contains(&"--".to_string()));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let tree = goto();
        let tokens = ["-h", "get", "-k", "x", "y", "--limit", "2", "z", "--bogus"];
        assert_eq!(tree.resolve(tokens), tree.resolve(tokens));
    }

    #[test]
    fn test_run_invokes_actions_root_to_leaf() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let record = |name: &'static str, calls: &Arc<Mutex<Vec<&'static str>>>| {
            let calls = Arc::clone(calls);
            move |_: &ArgumentContext| {
                calls.lock().unwrap().push(name);
                Outcome::Continue
            }
        };

        let tree = Command::new("goto")
            .with_action(record("goto", &calls))
            .with_subcommand(Command::new("list").with_action(record("list", &calls)))
            .build()
            .unwrap();

        let (_, dispatch) = tree.run(["list"]);
        assert_eq!(*calls.lock().unwrap(), vec!["goto", "list"]);
        assert_eq!(dispatch.invoked, vec!["goto", "list"]);
        assert_eq!(dispatch.stopped_by, None);
    }

    #[test]
    fn test_stop_cancels_descendant_actions() {
        let leaf_ran = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&leaf_ran);

        let tree = Command::new("goto")
            .with_flag(Flag::new("help").unwrap())
            .with_action(|context: &ArgumentContext| {
                if context.is_flag_enabled("help") {
                    Outcome::Stop
                } else {
                    Outcome::Continue
                }
            })
            .with_subcommand(Command::new("list").with_action(move |_: &ArgumentContext| {
                *flag.lock().unwrap() = true;
                Outcome::Continue
            }))
            .build()
            .unwrap();

        let (_, dispatch) = tree.run(["--help", "list"]);
        assert!(!*leaf_ran.lock().unwrap());
        assert_eq!(dispatch.stopped_by.as_deref(), Some("goto"));

        let (_, dispatch) = tree.run(["list"]);
        assert!(*leaf_ran.lock().unwrap());
        assert_eq!(dispatch.invoked, vec!["goto", "list"]);
    }
}
