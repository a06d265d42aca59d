//! Driven port for the local store lifecycle and its shared error type.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by any local store repository.
    pub enum StoreError {
        /// The database could not be opened or the connection was lost.
        Connection { message: String } =>
            "local store connection failed: {message}",
        /// A query or mutation failed during execution.
        Query { message: String } =>
            "local store query failed: {message}",
        /// A stored value could not be converted back into a domain value.
        Serialization { message: String } =>
            "local store value invalid: {message}",
    }
}

/// Port for preparing the local store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Create every table that does not exist yet. Safe to call repeatedly.
    async fn initialize(&self) -> Result<(), StoreError>;
}

/// Fixture store with nothing to prepare.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureLocalStore;

#[async_trait]
impl LocalStore for FixtureLocalStore {
    async fn initialize(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
