//! CLI argument definitions using clap

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::render::RenderOptions;

/// Operator console for cloud servers
#[derive(Parser, Debug)]
#[command(name = "cloudctl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output on stderr (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub debug: u8,

    /// Print JSON instead of a table
    #[arg(long, global = true)]
    pub json: bool,

    /// Omit the table header
    #[arg(long, global = true)]
    pub noheader: bool,

    /// Config file (default: platform config dir)
    #[arg(long, global = true, env = "CLOUDCTL_CONFIG", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Account to use (default: first configured)
    #[arg(long, global = true, env = "CLOUDCTL_ACCOUNT")]
    pub account: Option<String>,

    /// Request timeout in seconds, 0 waits forever
    #[arg(long, global = true, default_value_t = 60)]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Output mode selected by the global flags.
    pub fn output(&self) -> Output {
        Output {
            format: if self.json {
                Format::Json
            } else {
                Format::Table
            },
            options: RenderOptions {
                no_header: self.noheader,
            },
        }
    }

    /// Request timeout, `None` when disabled.
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.timeout > 0).then(|| Duration::from_secs(self.timeout))
    }
}

/// Rendering format of command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Table,
    Json,
}

/// Output mode threaded from argument parsing into each handler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Output {
    pub format: Format,
    pub options: RenderOptions,
}

impl Output {
    pub fn json() -> Self {
        Self {
            format: Format::Json,
            ..Default::default()
        }
    }

    pub fn table() -> Self {
        Self::default()
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage servers
    Server {
        #[command(subcommand)]
        command: ServerCommands,
    },

    /// Print a config file template
    MakeConfig,

    /// Print version
    Version,

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ServerCommands {
    /// List servers
    Ls,

    /// Show server details
    Show {
        /// Server ID
        id: String,
    },

    /// Create a server
    Create {
        /// Server name
        #[arg(long)]
        name: String,
        /// Number of cores
        #[arg(long, default_value_t = 1)]
        cores: u32,
        /// Memory in GiB
        #[arg(long = "mem", default_value_t = 1)]
        memory: u32,
        /// Location ID
        #[arg(long)]
        location: Option<String>,
        /// Label (repeatable)
        #[arg(long = "label")]
        labels: Vec<String>,
    },

    /// Change server properties
    Set {
        /// Server ID
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New number of cores
        #[arg(long)]
        cores: Option<u32>,
        /// New memory in GiB
        #[arg(long = "mem")]
        memory: Option<u32>,
    },

    /// Remove a server
    Rm {
        /// Server ID
        id: String,
    },

    /// Power on
    On {
        /// Server ID
        id: String,
    },

    /// Power off: graceful shutdown unless --force
    Off {
        /// Server ID
        id: String,
        /// Hard power off instead of ACPI shutdown
        #[arg(long)]
        force: bool,
    },

    /// Show server events
    Events {
        /// Server ID
        id: String,
    },
}
