//! Dependency container binding operators to their implementation

pub mod runtime;

pub use runtime::Runtime;
