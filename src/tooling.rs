//! Command-line front end for scripting and maintenance of the storage roots.

pub mod cli;

pub use cli::{Cli, CliContext, Commands};
