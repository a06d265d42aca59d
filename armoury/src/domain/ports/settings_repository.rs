//! Driven port for the key-value settings table.

use async_trait::async_trait;

use super::StoreError;

/// Port for reading and upserting string settings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Value stored under `key`, if any.
    async fn find_setting(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Insert or overwrite the value stored under `key`.
    async fn upsert_setting(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Fixture repository that remembers nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureSettingsRepository;

#[async_trait]
impl SettingsRepository for FixtureSettingsRepository {
    async fn find_setting(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Ok(None)
    }

    async fn upsert_setting(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Ok(())
    }
}
