//! cloudctl: operator console for cloud servers
//!
//! Layers, leaves first: `render` and `config` stand alone, `infrastructure` binds
//! operators to a backend, `cli` parses arguments and dispatches commands.

pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod render;
pub mod util;
