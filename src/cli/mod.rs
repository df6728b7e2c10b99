//! CLI layer: argument parsing and command dispatch

pub mod args;
pub mod commands;
pub mod error;
pub mod output;
pub mod svg;

pub use args::{BoneCommands, Cli, Commands, ConfigCommands};
pub use error::{CliError, CliResult};
