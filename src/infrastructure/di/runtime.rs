//! Runtime container for dependency injection
//!
//! Holds one operator per resource family for the lifetime of an invocation.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::config::Account;
use crate::infrastructure::client::{ApiClient, RemoteServerOperator};
use crate::infrastructure::traits::ServerOperator;
use crate::infrastructure::{InfraError, InfraResult};

/// Container binding each resource family to its current operator.
///
/// Operators are set once before a command runs and only read afterwards.
#[derive(Clone, Default)]
pub struct Runtime {
    /// Account the real operators were built from
    account: Option<Account>,

    /// Server family operator
    server_op: Option<Arc<dyn ServerOperator>>,
}

impl Runtime {
    /// Create a runtime with remote operators bound to `account`.
    ///
    /// Fails if the account lacks a url or token.
    pub fn new(account: Account, timeout: Option<Duration>) -> InfraResult<Self> {
        account.validate()?;
        let client = ApiClient::new(&account, timeout)?;
        debug!(account = %account.name, url = %account.url, "runtime bound to remote API");

        Ok(Self {
            account: Some(account),
            server_op: Some(Arc::new(RemoteServerOperator::new(client))),
        })
    }

    /// Create a runtime with no operators bound (config-bypass commands and tests).
    pub fn unbound() -> Self {
        Self::default()
    }

    /// Replace the server operator.
    pub fn set_server_operator(&mut self, op: Arc<dyn ServerOperator>) {
        self.server_op = Some(op);
    }

    /// Builder form of [`Runtime::set_server_operator`].
    pub fn with_server_operator(mut self, op: Arc<dyn ServerOperator>) -> Self {
        self.set_server_operator(op);
        self
    }

    /// The bound server operator, or a configuration error when none is bound.
    pub fn server_operator(&self) -> InfraResult<&dyn ServerOperator> {
        self.server_op
            .as_deref()
            .ok_or(InfraError::OperatorUnbound("server"))
    }

    /// Account the runtime was built from, if any.
    pub fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("account", &self.account.as_ref().map(|a| a.name.as_str()))
            .field("server_op", &self.server_op.is_some())
            .finish()
    }
}
