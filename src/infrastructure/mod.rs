//! Infrastructure layer: operator traits, remote adapter and runtime container
//!
//! This layer implements the operator traits and wires them up per invocation.

pub mod client;
pub mod di;
pub mod error;
pub mod traits;

pub use di::Runtime;
pub use error::{InfraError, InfraResult};
pub use traits::ServerOperator;
