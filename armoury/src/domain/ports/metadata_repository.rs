//! Driven port for the global reference tables.

use async_trait::async_trait;

use super::StoreError;
use crate::domain::{Faction, MetadataCounts, MetadataSnapshot};

/// Port for replacing and reading metadata rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataRepository: Send + Sync {
    /// Replace every metadata table with the snapshot's rows.
    ///
    /// Implementations must run all deletes and inserts in one transaction
    /// so a failure leaves the previous metadata intact.
    async fn replace_metadata(
        &self,
        snapshot: &MetadataSnapshot,
    ) -> Result<MetadataCounts, StoreError>;

    /// Stored factions ordered by id.
    async fn list_factions(&self) -> Result<Vec<Faction>, StoreError>;

    /// Row counts per metadata table.
    async fn counts(&self) -> Result<MetadataCounts, StoreError>;
}

/// Fixture repository that stores nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureMetadataRepository;

#[async_trait]
impl MetadataRepository for FixtureMetadataRepository {
    async fn replace_metadata(
        &self,
        snapshot: &MetadataSnapshot,
    ) -> Result<MetadataCounts, StoreError> {
        Ok(snapshot.counts())
    }

    async fn list_factions(&self) -> Result<Vec<Faction>, StoreError> {
        Ok(Vec::new())
    }

    async fn counts(&self) -> Result<MetadataCounts, StoreError> {
        Ok(MetadataCounts::default())
    }
}
