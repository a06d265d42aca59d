//! Driven port for per-faction army snapshots and their derived rows.

use async_trait::async_trait;

use super::StoreError;
use crate::domain::{ArmyImport, ArmyResume, ArmySnapshot, ArmyUnit};

/// Filter for unit name searches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitSearch {
    /// Case-insensitive substring matched against unit names.
    pub term: Option<String>,
    /// Restrict results to one faction.
    pub faction_id: Option<i64>,
    /// Maximum number of rows to return.
    pub limit: Option<usize>,
}

/// Port for faction army persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArmyRepository: Send + Sync {
    /// Replace a faction's snapshot, units and resume rows.
    ///
    /// Implementations must delete the previous rows and insert the new ones
    /// within one transaction.
    async fn replace_faction_army(&self, import: &ArmyImport) -> Result<(), StoreError>;

    /// Faction ids that have a stored snapshot, ascending.
    async fn faction_ids(&self) -> Result<Vec<i64>, StoreError>;

    /// A faction's snapshot, if one was imported.
    async fn find_snapshot(&self, faction_id: i64) -> Result<Option<ArmySnapshot>, StoreError>;

    /// A faction's units in document order.
    async fn list_units(&self, faction_id: i64) -> Result<Vec<ArmyUnit>, StoreError>;

    /// The first unit of a faction with the given publisher id.
    async fn find_unit(
        &self,
        faction_id: i64,
        unit_id: i64,
    ) -> Result<Option<ArmyUnit>, StoreError>;

    /// Units matching a search, ordered by name.
    async fn search_units(&self, search: &UnitSearch) -> Result<Vec<ArmyUnit>, StoreError>;

    /// A faction's resume rows in document order.
    async fn list_resume(&self, faction_id: i64) -> Result<Vec<ArmyResume>, StoreError>;
}

/// Fixture repository with no stored armies.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureArmyRepository;

#[async_trait]
impl ArmyRepository for FixtureArmyRepository {
    async fn replace_faction_army(&self, _import: &ArmyImport) -> Result<(), StoreError> {
        Ok(())
    }

    async fn faction_ids(&self) -> Result<Vec<i64>, StoreError> {
        Ok(Vec::new())
    }

    async fn find_snapshot(&self, _faction_id: i64) -> Result<Option<ArmySnapshot>, StoreError> {
        Ok(None)
    }

    async fn list_units(&self, _faction_id: i64) -> Result<Vec<ArmyUnit>, StoreError> {
        Ok(Vec::new())
    }

    async fn find_unit(
        &self,
        _faction_id: i64,
        _unit_id: i64,
    ) -> Result<Option<ArmyUnit>, StoreError> {
        Ok(None)
    }

    async fn search_units(&self, _search: &UnitSearch) -> Result<Vec<ArmyUnit>, StoreError> {
        Ok(Vec::new())
    }

    async fn list_resume(&self, _faction_id: i64) -> Result<Vec<ArmyResume>, StoreError> {
        Ok(Vec::new())
    }
}
