//! Lazily opened SQLite connection shared by every repository.
//!
//! SQLite serializes writers, so the store keeps exactly one connection
//! behind an async mutex instead of a pool. An in-memory database would
//! also lose its contents when a pooled connection closed.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use diesel::SqliteConnection;
use diesel_async::sync_connection_wrapper::SyncConnectionWrapper;
use diesel_async::{AsyncConnection, SimpleAsyncConnection};
use tokio::sync::{Mutex, MutexGuard, OnceCell};
use tracing::{debug, info};

use super::diesel_helpers::map_diesel_error;
use super::schema::SCHEMA_SQL;
use crate::domain::ports::{LocalStore, StoreError};

/// Async wrapper around the synchronous Diesel SQLite connection.
pub(crate) type StoreConnection = SyncConnectionWrapper<SqliteConnection>;

const IN_MEMORY_URL: &str = ":memory:";

struct StoreInner {
    database_url: String,
    connection: OnceCell<Mutex<StoreConnection>>,
}

/// Handle to the local SQLite database. Clones share one connection.
#[derive(Clone)]
pub struct SqliteStore {
    inner: Arc<StoreInner>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("database_url", &self.inner.database_url)
            .field("connected", &self.inner.connection.initialized())
            .finish()
    }
}

impl SqliteStore {
    /// Store backed by the file at `path`. Nothing is opened until first
    /// use, and missing parent directories are not created.
    #[must_use]
    pub fn open(path: &Path) -> Self {
        Self::with_url(path.to_string_lossy().into_owned())
    }

    /// Private in-memory store, mainly for tests.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::with_url(IN_MEMORY_URL.to_owned())
    }

    fn with_url(database_url: String) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                database_url,
                connection: OnceCell::new(),
            }),
        }
    }

    /// Lock the shared connection, opening it and creating the schema on
    /// first use.
    pub(crate) async fn connection(&self) -> Result<MutexGuard<'_, StoreConnection>, StoreError> {
        let cell = self
            .inner
            .connection
            .get_or_try_init(|| self.establish())
            .await?;
        Ok(cell.lock().await)
    }

    async fn establish(&self) -> Result<Mutex<StoreConnection>, StoreError> {
        let url = self.inner.database_url.as_str();
        let mut conn = StoreConnection::establish(url).await.map_err(|error| {
            debug!(%error, database_url = url, "sqlite connection failed");
            StoreError::connection(format!("cannot open {url}: {error}"))
        })?;
        create_schema(&mut conn).await?;
        info!(database_url = url, "local store opened");
        Ok(Mutex::new(conn))
    }
}

async fn create_schema(conn: &mut StoreConnection) -> Result<(), StoreError> {
    conn.batch_execute(SCHEMA_SQL)
        .await
        .map_err(|error| map_diesel_error(error, "create schema"))
}

#[async_trait]
impl LocalStore for SqliteStore {
    async fn initialize(&self) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        create_schema(&mut conn).await
    }
}
