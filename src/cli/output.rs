//! Terminal messages on stderr, colored
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically. Stdout stays reserved
//! for rendered command output.

use colored::Colorize;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print hint (cyan) to stderr
pub fn hint(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}", msg.to_string().cyan());
}
