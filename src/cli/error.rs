//! CLI-level errors (wraps infrastructure errors) and the fatal exit path

use std::error::Error as _;

use thiserror::Error;
use tracing::debug;

use crate::cli::output;
use crate::exitcode;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("cannot write output")]
    Io(#[from] std::io::Error),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) => exitcode::USAGE,
            CliError::Io(_) => exitcode::IOERR,
            CliError::Infra(e) if e.is_config() => exitcode::CONFIG,
            CliError::Infra(_) => exitcode::FAILURE,
        }
    }

    /// Message including the chain of underlying causes.
    pub fn chain_message(&self) -> String {
        let mut message = self.to_string();
        let mut source = self.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}

/// Report `err` on stderr and return the process exit code.
///
/// The only mapping from errors to exit status; `main` passes the result to
/// `std::process::exit`.
pub fn fatal(err: &CliError) -> i32 {
    debug!(error = ?err, "command failed");
    output::error(&err.chain_message());
    err.exit_code()
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn given_operator_error_then_exit_code_is_failure() {
        let err = CliError::from(InfraError::Operator("boom".into()));
        assert_eq!(fatal(&err), exitcode::FAILURE);
        assert_eq!(exitcode::FAILURE, 1);
    }

    #[test]
    fn given_config_error_then_exit_code_is_config() {
        let err = CliError::from(InfraError::ConfigNotFound(PathBuf::from("/nope.yaml")));
        assert_eq!(fatal(&err), exitcode::CONFIG);
    }

    #[test]
    fn given_invalid_args_then_exit_code_is_usage() {
        let err = CliError::InvalidArgs("missing id".into());
        assert_eq!(fatal(&err), exitcode::USAGE);
    }

    #[test]
    fn given_io_error_then_chain_message_includes_cause() {
        let err = CliError::from(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"));
        assert_eq!(err.chain_message(), "cannot write output: pipe closed");
        assert_eq!(err.exit_code(), exitcode::IOERR);
    }

    #[test]
    fn given_any_error_then_exit_code_is_non_zero() {
        let errors = [
            CliError::from(InfraError::NoAccounts),
            CliError::from(InfraError::Api {
                status: 500,
                message: "x".into(),
            }),
            CliError::InvalidArgs("x".into()),
        ];
        for err in &errors {
            assert_ne!(err.exit_code(), exitcode::OK, "{err}");
        }
    }
}
