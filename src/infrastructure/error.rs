//! Infrastructure-level errors: configuration loading and remote operator failures

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while resolving configuration or talking to a backend.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("cannot read config {path}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unparseable config {path}: {message}")]
    ConfigUnparseable { path: PathBuf, message: String },

    #[error("no accounts configured")]
    NoAccounts,

    #[error("account not found: {0}")]
    UnknownAccount(String),

    #[error("account '{name}' is missing required field: {field}")]
    IncompleteAccount { name: String, field: &'static str },

    #[error("account '{name}' has an invalid {field}")]
    InvalidCredential { name: String, field: &'static str },

    #[error("no {0} operator configured")]
    OperatorUnbound(&'static str),

    #[error("request failed: {context}")]
    Http {
        context: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("{0}")]
    Operator(String),
}

impl InfraError {
    /// Create an HTTP transport error with context.
    pub fn http(context: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Http {
            context: context.into(),
            source,
        }
    }

    /// True for errors raised before any command runs.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound(_)
                | Self::ConfigRead { .. }
                | Self::ConfigUnparseable { .. }
                | Self::NoAccounts
                | Self::UnknownAccount(_)
                | Self::IncompleteAccount { .. }
                | Self::InvalidCredential { .. }
                | Self::OperatorUnbound(_)
        )
    }
}

/// Result type for infrastructure layer operations.
pub type InfraResult<T> = Result<T, InfraError>;
