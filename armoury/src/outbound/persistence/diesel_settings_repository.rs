//! SQLite-backed key/value settings adapter.

use async_trait::async_trait;
use diesel::OptionalExtension;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use super::diesel_helpers::map_diesel_error;
use super::models::NewSettingRow;
use super::schema::app_settings;
use super::store::SqliteStore;
use crate::domain::ports::{SettingsRepository, StoreError};

/// Diesel implementation of [`SettingsRepository`].
#[derive(Debug, Clone)]
pub struct DieselSettingsRepository {
    store: SqliteStore,
}

impl DieselSettingsRepository {
    /// Create a repository over the shared store.
    #[must_use]
    pub fn new(store: SqliteStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SettingsRepository for DieselSettingsRepository {
    async fn find_setting(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.store.connection().await?;
        app_settings::table
            .filter(app_settings::key.eq(key))
            .select(app_settings::value)
            .first(&mut *conn)
            .await
            .optional()
            .map_err(|error| map_diesel_error(error, "find setting"))
    }

    async fn upsert_setting(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut conn = self.store.connection().await?;
        diesel::insert_into(app_settings::table)
            .values(&NewSettingRow { key, value })
            .on_conflict(app_settings::key)
            .do_update()
            .set(app_settings::value.eq(value))
            .execute(&mut *conn)
            .await
            .map_err(|error| map_diesel_error(error, "upsert setting"))?;
        debug!(key, "setting stored");
        Ok(())
    }
}
