//! CLI layer: argument parsing, command dispatch and exit mapping

pub mod args;
pub mod commands;
pub mod error;
pub mod output;

pub use args::{Cli, Commands, Format, Output, ServerCommands};
pub use commands::{build_runtime, execute_command, execute_server};
pub use error::{fatal, CliError, CliResult};
