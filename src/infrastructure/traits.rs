//! Operator traits: the only way commands reach a backend
//!
//! One trait per resource family. The runtime binds either a remote client
//! adapter or a test double behind the same trait object.

use crate::domain::{
    Server, ServerCreateRequest, ServerCreateResponse, ServerEvent, ServerMetric,
    ServerUpdateRequest,
};
use crate::infrastructure::InfraResult;

/// Capability interface for the server resource family.
///
/// Implementations perform exactly one backend call per method.
/// Retries, caching and pooling belong to the underlying client, not here.
pub trait ServerOperator: Send + Sync {
    /// List all servers visible to the account.
    fn list_servers(&self) -> InfraResult<Vec<Server>>;

    /// Fetch a single server.
    fn get_server(&self, id: &str) -> InfraResult<Server>;

    /// Create a server.
    fn create_server(&self, request: &ServerCreateRequest) -> InfraResult<ServerCreateResponse>;

    /// Apply a partial update.
    fn update_server(&self, id: &str, request: &ServerUpdateRequest) -> InfraResult<()>;

    /// Delete a server.
    fn delete_server(&self, id: &str) -> InfraResult<()>;

    /// Power on.
    fn start_server(&self, id: &str) -> InfraResult<()>;

    /// Hard power off.
    fn stop_server(&self, id: &str) -> InfraResult<()>;

    /// Graceful ACPI shutdown.
    fn shutdown_server(&self, id: &str) -> InfraResult<()>;

    /// Event log of a server.
    fn list_server_events(&self, id: &str) -> InfraResult<Vec<ServerEvent>>;

    /// CPU usage samples of a server.
    fn list_server_metrics(&self, id: &str) -> InfraResult<Vec<ServerMetric>>;

    /// Whether the server is powered on.
    fn is_server_on(&self, id: &str) -> InfraResult<bool> {
        Ok(self.get_server(id)?.power)
    }
}
