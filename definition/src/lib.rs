//! Command trees described in YAML or JSON files.
//!
//! A [`CommandDefinition`] mirrors the [`cmdar_core::Command`] builder and
//! converts into a validated [`cmdar_core::CommandTree`]. Actions cannot be
//! stored in a file; attach them while building with
//! [`CommandDefinition::build_tree_with`].
//!
//! # Example
//!
//! ```no_run
//! use cmdar_definition::CommandDefinition;
//!
//! let definition = CommandDefinition::load("goto.yaml")?;
//! let tree = definition.build_tree()?;
//! let resolution = tree.resolve(std::env::args().skip(1));
//! println!("{:?}", resolution.leaf().command());
//! # Ok::<(), cmdar_definition::DefinitionError>(())
//! ```

mod definition;
mod error;

pub use definition::{
    AliasDefinition, CommandDefinition, FlagDefinition, Format, OptionDefinition,
    ParameterDefinition, PositionalDefinition,
};
pub use error::{DefinitionError, Result};
