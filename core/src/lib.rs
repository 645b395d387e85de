//! Declarative command-line argument parsing.
//!
//! Describe a tree of commands, options, flags and positional parameters;
//! this crate derives alias names, classifies raw arguments, resolves them
//! against the tree and dispatches to callbacks with a typed view of what
//! was parsed.
//!
//! - [`AliasSet`]: canonical, deduplicated `-x`/`--name` aliases of a
//!   parameter, with its primary short and long alias.
//! - [`Parameter`]: a [`Positional`], [`NamedOption`] or [`Flag`].
//! - [`Command`]: builder that validates into an immutable [`CommandTree`].
//! - [`classify()`]: pure classification of one token within one command.
//! - [`CommandTree::resolve`]: produces one [`ArgumentContext`] per visited
//!   command; [`CommandTree::run`] also invokes the [`Action`]s.
//!
//! Declaration problems are [`ConfigurationError`]s. Problems in the input
//! never fail resolution; they are reported as [`ResolutionWarning`]s.
//!
//! # Example
//!
//! ```
//! use cmdar_core::*;
//!
//! let tree = Command::new("goto")
//!     .with_description("Keeps a key-value record of paths")
//!     .with_flag(Flag::new("help")?.with_description("Print this usage information."))
//!     .with_subcommand(
//!         Command::new("set")
//!             .with_description("Saves a path with a key.")
//!             .with_positional(Positional::new("key")?)
//!             .with_option(NamedOption::new("path")?.with_value_type(ValueType::Path)),
//!     )
//!     .build()?;
//!
//! let resolution = tree.resolve(["set", "mykey", "-p", "/usr/bin"]);
//! assert!(resolution.root().is_empty());
//! assert_eq!(resolution.leaf().values(), ["mykey"]);
//! assert_eq!(resolution.leaf().values_of("path").unwrap(), ["/usr/bin"]);
//! # Ok::<(), ConfigurationError>(())
//! ```

mod alias;
mod classify;
mod command;
mod context;
mod error;
mod parameter;
mod resolve;

pub use alias::{AliasKind, AliasSet, AliasSpec};
pub use classify::{TokenClass, TokenShape, Unrecognized, classify};
pub use command::{Action, Command, CommandNode, CommandTree, NodeId, Outcome};
pub use context::ArgumentContext;
pub use error::{ConfigurationError, ResolutionWarning, Result};
pub use parameter::{Flag, NamedOption, Parameter, ParameterKind, Positional, ValueType};
pub use resolve::{Dispatch, Resolution};
