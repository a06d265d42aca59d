//! Read side: stored factions, units and their derived views.

use std::sync::Arc;

use tracing::debug;

use crate::domain::derived::UnitView;
use crate::domain::ports::{ArmyRepository, MetadataRepository, SettingsRepository, UnitSearch};
use crate::domain::service_support::map_store_error;
use crate::domain::{
    ArmyResume, ArmySnapshot, ArmyUnit, DISPLAY_UNITS_KEY, DisplayUnits, DomainError, Faction,
    MetadataCounts,
};

/// Row cap for searches that are not both faction scoped and filtered by a
/// term.
pub const UNFILTERED_SEARCH_LIMIT: usize = 250;

/// Domain service answering browse and detail queries.
#[derive(Clone)]
pub struct ArmyQueryService<A, M> {
    armies: Arc<A>,
    metadata: Arc<M>,
    settings: Arc<dyn SettingsRepository>,
}

impl<A, M> ArmyQueryService<A, M>
where
    A: ArmyRepository,
    M: MetadataRepository,
{
    /// Create a query service over the stored data.
    #[must_use]
    pub fn new(armies: Arc<A>, metadata: Arc<M>, settings: Arc<dyn SettingsRepository>) -> Self {
        Self {
            armies,
            metadata,
            settings,
        }
    }

    /// Factions from the last metadata import, ordered by id.
    ///
    /// # Errors
    ///
    /// `ServiceUnavailable` when the store fails.
    pub async fn list_factions(&self) -> Result<Vec<Faction>, DomainError> {
        self.metadata.list_factions().await.map_err(map_store_error)
    }

    /// Row counts per metadata table.
    ///
    /// # Errors
    ///
    /// `ServiceUnavailable` when the store fails.
    pub async fn summary(&self) -> Result<MetadataCounts, DomainError> {
        self.metadata.counts().await.map_err(map_store_error)
    }

    /// Faction ids with a stored army snapshot.
    ///
    /// # Errors
    ///
    /// `ServiceUnavailable` when the store fails.
    pub async fn faction_ids(&self) -> Result<Vec<i64>, DomainError> {
        self.armies.faction_ids().await.map_err(map_store_error)
    }

    /// A faction's stored snapshot; `None` before its first import.
    ///
    /// # Errors
    ///
    /// `ServiceUnavailable` when the store fails.
    pub async fn snapshot(&self, faction_id: i64) -> Result<Option<ArmySnapshot>, DomainError> {
        self.armies
            .find_snapshot(faction_id)
            .await
            .map_err(map_store_error)
    }

    /// A faction's units in document order.
    ///
    /// # Errors
    ///
    /// `ServiceUnavailable` when the store fails.
    pub async fn list_units(&self, faction_id: i64) -> Result<Vec<ArmyUnit>, DomainError> {
        self.armies
            .list_units(faction_id)
            .await
            .map_err(map_store_error)
    }

    /// One unit of a faction.
    ///
    /// # Errors
    ///
    /// `ServiceUnavailable` when the store fails.
    pub async fn find_unit(
        &self,
        faction_id: i64,
        unit_id: i64,
    ) -> Result<Option<ArmyUnit>, DomainError> {
        self.armies
            .find_unit(faction_id, unit_id)
            .await
            .map_err(map_store_error)
    }

    /// Units whose name contains `term`, case-insensitively, optionally
    /// within one faction.
    ///
    /// A search that names a faction and a non-blank term is not capped.
    /// Every other search returns at most [`UNFILTERED_SEARCH_LIMIT`] rows.
    ///
    /// # Errors
    ///
    /// `ServiceUnavailable` when the store fails.
    pub async fn search_units(
        &self,
        term: Option<&str>,
        faction_id: Option<i64>,
    ) -> Result<Vec<ArmyUnit>, DomainError> {
        let term = term.map(str::trim).filter(|text| !text.is_empty());
        let search = UnitSearch {
            term: term.map(str::to_owned),
            faction_id,
            limit: (term.is_none() || faction_id.is_none()).then_some(UNFILTERED_SEARCH_LIMIT),
        };
        debug!(?search, "searching units");
        self.armies
            .search_units(&search)
            .await
            .map_err(map_store_error)
    }

    /// A faction's resume rows in document order.
    ///
    /// # Errors
    ///
    /// `ServiceUnavailable` when the store fails.
    pub async fn list_resume(&self, faction_id: i64) -> Result<Vec<ArmyResume>, DomainError> {
        self.armies
            .list_resume(faction_id)
            .await
            .map_err(map_store_error)
    }

    /// Resume rows of a faction that `is_mercenary` accepts.
    ///
    /// # Errors
    ///
    /// `ServiceUnavailable` when the store fails.
    pub async fn list_mercenaries<F>(
        &self,
        faction_id: i64,
        is_mercenary: F,
    ) -> Result<Vec<ArmyResume>, DomainError>
    where
        F: Fn(&ArmyResume) -> bool + Send,
    {
        let rows = self.list_resume(faction_id).await?;
        Ok(rows.into_iter().filter(|row| is_mercenary(row)).collect())
    }

    /// The stored display unit preference, inches when unset.
    ///
    /// # Errors
    ///
    /// `ServiceUnavailable` when the store fails.
    pub async fn display_units(&self) -> Result<DisplayUnits, DomainError> {
        let stored = self
            .settings
            .find_setting(DISPLAY_UNITS_KEY)
            .await
            .map_err(map_store_error)?;
        Ok(DisplayUnits::from_setting(stored.as_deref()))
    }

    /// Persist the display unit preference.
    ///
    /// # Errors
    ///
    /// `ServiceUnavailable` when the store fails.
    pub async fn set_display_units(&self, units: DisplayUnits) -> Result<(), DomainError> {
        self.settings
            .upsert_setting(DISPLAY_UNITS_KEY, units.as_str())
            .await
            .map_err(map_store_error)
    }

    /// Derived view of one unit in the stored display units.
    ///
    /// # Errors
    ///
    /// `NotFound` when the faction has no such unit, `ServiceUnavailable`
    /// when the store fails.
    pub async fn unit_view(&self, faction_id: i64, unit_id: i64) -> Result<UnitView, DomainError> {
        let unit = self.find_unit(faction_id, unit_id).await?.ok_or_else(|| {
            DomainError::not_found(format!("unit {unit_id} not found in faction {faction_id}"))
        })?;
        let snapshot = self.snapshot(faction_id).await?;
        let units = self.display_units().await?;
        Ok(UnitView::build(&unit, snapshot.as_ref(), units))
    }
}

#[cfg(test)]
mod tests {
    //! Query service behaviour over mocked repositories.

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ResumeKey;
    use crate::domain::ports::{
        FixtureMetadataRepository, FixtureSettingsRepository, MockArmyRepository,
        MockSettingsRepository,
    };
    use rstest::rstest;

    fn service(
        armies: MockArmyRepository,
    ) -> ArmyQueryService<MockArmyRepository, FixtureMetadataRepository> {
        ArmyQueryService::new(
            Arc::new(armies),
            Arc::new(FixtureMetadataRepository),
            Arc::new(FixtureSettingsRepository),
        )
    }

    #[rstest]
    #[case::scoped_without_term(None, Some(10), None, Some(UNFILTERED_SEARCH_LIMIT))]
    #[case::scoped_blank_term(Some("   "), Some(10), None, Some(UNFILTERED_SEARCH_LIMIT))]
    #[case::scoped_with_term(Some("fusil"), Some(10), Some("fusil"), None)]
    #[case::global_without_term(None, None, None, Some(UNFILTERED_SEARCH_LIMIT))]
    #[case::global_with_term(Some("fusil"), None, Some("fusil"), Some(UNFILTERED_SEARCH_LIMIT))]
    #[tokio::test]
    async fn only_scoped_filtered_searches_are_uncapped(
        #[case] term: Option<&'static str>,
        #[case] faction_id: Option<i64>,
        #[case] expected_term: Option<&'static str>,
        #[case] expected_limit: Option<usize>,
    ) {
        let mut armies = MockArmyRepository::new();
        armies
            .expect_search_units()
            .times(1)
            .withf(move |search| {
                search.term.as_deref() == expected_term
                    && search.faction_id == faction_id
                    && search.limit == expected_limit
            })
            .returning(|_| Ok(Vec::new()));

        let rows = service(armies)
            .search_units(term, faction_id)
            .await
            .expect("search succeeds");

        assert!(rows.is_empty());
    }

    fn resume(unit_id: i64, category: Option<i64>) -> ArmyResume {
        ArmyResume {
            key: ResumeKey {
                faction_id: 10,
                unit_id,
                slug: format!("unit-{unit_id}"),
            },
            id_army: None,
            isc: format!("Unit {unit_id}"),
            name: format!("UNIT {unit_id}"),
            logo: None,
            unit_type: Some(1),
            category,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn mercenaries_are_filtered_by_caller_predicate() {
        let mut armies = MockArmyRepository::new();
        armies
            .expect_list_resume()
            .returning(|_| Ok(vec![resume(1, Some(10)), resume(2, Some(11)), resume(3, None)]));

        let rows = service(armies)
            .list_mercenaries(10, |row| row.category == Some(11))
            .await
            .expect("listing succeeds");

        assert_eq!(rows, vec![resume(2, Some(11))]);
    }

    #[rstest]
    #[tokio::test]
    async fn missing_unit_view_is_not_found() {
        let mut armies = MockArmyRepository::new();
        armies.expect_find_unit().returning(|_, _| Ok(None));
        armies.expect_find_snapshot().never();

        let err = service(armies)
            .unit_view(10, 999)
            .await
            .expect_err("unit is missing");

        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[case(None, DisplayUnits::Inches)]
    #[case(Some("centimeters"), DisplayUnits::Centimeters)]
    #[tokio::test]
    async fn display_units_default_to_inches(
        #[case] stored: Option<&'static str>,
        #[case] expected: DisplayUnits,
    ) {
        let mut settings = MockSettingsRepository::new();
        settings
            .expect_find_setting()
            .withf(|key| key == DISPLAY_UNITS_KEY)
            .returning(move |_| Ok(stored.map(str::to_owned)));
        let service = ArmyQueryService::new(
            Arc::new(MockArmyRepository::new()),
            Arc::new(FixtureMetadataRepository),
            Arc::new(settings),
        );

        assert_eq!(service.display_units().await.expect("readable"), expected);
    }
}
