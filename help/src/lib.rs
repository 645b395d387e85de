//! Usage and help text for command trees.
//!
//! Rendering only reads what the tree exposes: primary aliases of each
//! parameter, the positional parameter name, the has-flags/has-options/
//! has-subcommands facts and the path from the root. The tree is never
//! modified.
//!
//! # Example
//!
//! ```
//! use cmdar_core::*;
//! use cmdar_help::{render_help, render_usage};
//!
//! let tree = Command::new("goto")
//!     .with_description("Quick access to saved paths")
//!     .with_flag(Flag::new("help")?.with_description("Print this usage information."))
//!     .with_subcommand(Command::new("list").with_description("List all saved records"))
//!     .build()?;
//!
//! assert_eq!(
//!     render_usage(&tree, tree.root()),
//!     "Usage: goto -[flags] <command> [arguments]"
//! );
//! assert!(render_help(&tree, tree.root()).contains("Available commands:"));
//! # Ok::<(), ConfigurationError>(())
//! ```

use cmdar_core::{CommandNode, CommandTree, NamedOption, NodeId, Parameter};

/// Continuation lines line up under the text following `Usage: `.
const USAGE_INDENT: &str = "       ";

/// Narrowest label column in option and command listings.
const MIN_LABEL_WIDTH: usize = 16;

/// Renders the usage lines of the command `id`.
///
/// An explicit usage declared on the command replaces the derived lines;
/// additional usage info is printed before either.
pub fn render_usage(tree: &CommandTree, id: NodeId) -> String {
    let node = tree.node(id);
    let path = tree.path_names(id).join(" ");
    let derives_usage = node.has_positional()
        || node.has_flags()
        || node.has_options()
        || node.has_subcommands();

    let mut message = String::from("Usage: ");

    if let Some(info) = node.additional_usage() {
        message.push_str(info);
        if node.usage().is_some() || derives_usage {
            message.push('\n');
        }
    }

    if let Some(usage) = node.usage() {
        message.push_str(usage);
    } else if derives_usage {
        if let Some(positional) = node.positional() {
            message.push_str(&format!("{path} <{}>", positional.name()));
        }
        if node.has_flags() || node.has_options() || node.has_subcommands() {
            if node.has_positional() {
                message.push('\n');
            }
            message.push_str(&path);
            if node.has_options() {
                message.push_str(" [options]");
            }
            if node.has_flags() {
                message.push_str(" -[flags]");
            }
            if node.has_subcommands() {
                message.push_str(" <command> [arguments]");
            }
        }
    } else if node.additional_usage().is_none() {
        message.push_str(&path);
    }

    message.replace('\n', &format!("\n{USAGE_INDENT}"))
}

/// Renders the full help page of the command `id`.
pub fn render_help(tree: &CommandTree, id: NodeId) -> String {
    let node = tree.node(id);
    let mut out = String::new();

    if let Some(description) = node.description() {
        out.push_str(&format!("{description}\n\n"));
    }
    out.push_str(&render_usage(tree, id));
    out.push('\n');

    let parameters: Vec<(String, Option<&str>)> = node
        .parameters()
        .iter()
        .filter(|p| !matches!(p, Parameter::Positional(_)))
        .map(|p| (parameter_label(p), p.description()))
        .collect();
    if !parameters.is_empty() {
        let heading = if node.is_sub_command() {
            "Options:"
        } else {
            "Global options:"
        };
        out.push_str(&format!("\n{heading}\n"));
        push_rows(&mut out, &parameters);
    }

    if let Some(positional) = node.positional() {
        out.push_str("\nArguments:\n");
        push_rows(
            &mut out,
            &[(format!("<{}>", positional.name()), positional.description())],
        );
    }

    if node.has_subcommands() {
        let heading = if node.is_sub_command() {
            "Available sub-commands:"
        } else {
            "Available commands:"
        };
        out.push_str(&format!("\n{heading}\n"));
        let rows: Vec<(String, Option<&str>)> = node
            .children()
            .iter()
            .map(|&child| {
                let child = tree.node(child);
                (command_label(child), child.description())
            })
            .collect();
        push_rows(&mut out, &rows);

        let names = tree.path_names(id);
        let mut hint = vec![names[0], "help"];
        hint.extend(&names[1..]);
        out.push_str(&format!(
            "\nRun \"{} <command>\" for more information about a command.\n",
            hint.join(" ")
        ));
    }

    out
}

/// `-s, --long` for flags, with a value placeholder for options.
fn parameter_label(parameter: &Parameter) -> String {
    let mut label = match (parameter.primary_short_alias(), parameter.primary_long_alias()) {
        (Some(short), Some(long)) => format!("{short}, {long}"),
        (Some(short), None) => short.to_string(),
        (None, Some(long)) => format!("    {long}"),
        (None, None) => parameter.name().to_string(),
    };
    if let Parameter::Option(option) = parameter {
        label.push(' ');
        label.push_str(&value_placeholder(option));
    }
    label
}

fn value_placeholder(option: &NamedOption) -> String {
    if option.multiple() {
        format!("<{}>...", option.name())
    } else {
        format!("<{}>", option.name())
    }
}

fn command_label(node: &CommandNode) -> String {
    std::iter::once(node.name())
        .chain(node.aliases().iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(", ")
}

fn push_rows(out: &mut String, rows: &[(String, Option<&str>)]) {
    let width = rows
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0)
        .max(MIN_LABEL_WIDTH);
    for (label, description) in rows {
        match description {
            Some(description) => out.push_str(&format!("  {label:<width$}  {description}\n")),
            None => out.push_str(&format!("  {label}\n")),
        }
    }
}

#[cfg(test)]
mod tests {
    use cmdar_core::{AliasSpec, Command, Flag, NamedOption, Positional};

    use super::*;

    fn goto() -> CommandTree {
        Command::new("goto")
            .with_description("Goto keeps a key-value record of paths.")
            .with_flag(
                Flag::new("help")
                    .unwrap()
                    .with_description("Print this usage information."),
            )
            .with_flag(
                Flag::with_aliases("version", AliasSpec::new().short('V'))
                    .unwrap()
                    .with_description("Output version information and exit"),
            )
            .with_subcommand(
                Command::new("list")
                    .with_alias("ls")
                    .with_description("List all saved records in a human readable format"),
            )
            .with_subcommand(
                Command::new("set")
                    .with_description("Saves a path with a key.")
                    .with_positional(Positional::new("key").unwrap().with_description("Record key"))
                    .with_option(
                        NamedOption::with_aliases("path", AliasSpec::new().no_derived_short())
                            .unwrap()
                            .single()
                            .with_description("Path to save"),
                    ),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_root_usage() {
        let tree = goto();
        assert_eq!(
            render_usage(&tree, tree.root()),
            "Usage: goto -[flags] <command> [arguments]"
        );
    }

    #[test]
    fn test_usage_with_positional_spans_two_lines() {
        let tree = goto();
        let set = tree.find_path(&["set"]).unwrap();
        assert_eq!(
            render_usage(&tree, set),
            "Usage: goto set <key>\n       goto set [options]"
        );
    }

    #[test]
    fn test_usage_of_bare_command() {
        let tree = goto();
        let list = tree.find_path(&["list"]).unwrap();
        assert_eq!(render_usage(&tree, list), "Usage: goto list");
    }

    #[test]
    fn test_explicit_and_additional_usage() {
        let tree = Command::new("goto")
            .with_additional_usage("Use \"goto <key>\" to redirect to <key>'s path")
            .with_usage("goto <command> [arguments]")
            .build()
            .unwrap();
        assert_eq!(
            render_usage(&tree, tree.root()),
            "Usage: Use \"goto <key>\" to redirect to <key>'s path\n       goto <command> [arguments]"
        );
    }

    #[test]
    fn test_root_help_lists_options_and_commands() {
        let tree = goto();
        let help = render_help(&tree, tree.root());

        assert!(help.starts_with("Goto keeps a key-value record of paths.\n\nUsage: goto"));
        assert!(help.contains("Global options:\n"));
        assert!(help.contains("  -h, --help        Print this usage information.\n"));
        assert!(help.contains("  -V, --version     Output version information and exit\n"));
        assert!(help.contains("Available commands:\n"));
        assert!(help.contains("  list, ls  "));
        assert!(help.contains("Run \"goto help <command>\" for more information about a command."));
    }

    #[test]
    fn test_subcommand_help() {
        let tree = goto();
        let set = tree.find_path(&["set"]).unwrap();
        let help = render_help(&tree, set);

        assert!(help.contains("Options:\n"));
        assert!(!help.contains("Global options:"));
        assert!(help.contains("      --path <path>  Path to save\n"));
        assert!(help.contains("Arguments:\n  <key>"));
        assert!(!help.contains("Available"));
    }
}
