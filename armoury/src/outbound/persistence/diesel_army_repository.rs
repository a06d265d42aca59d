//! SQLite-backed faction army adapter.

use async_trait::async_trait;
use diesel::OptionalExtension;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use diesel_async::RunQueryDsl;
use tracing::{debug, info};

use super::diesel_helpers::{map_diesel_error, to_sql_integer};
use super::models::{
    ArmyResumeRow, ArmySnapshotRow, ArmyUnitRow, NewArmyResumeRow, NewArmySnapshotRow,
    NewArmyUnitRow,
};
use super::schema::{army_resume, army_snapshots, army_units};
use super::store::SqliteStore;
use crate::domain::ports::{ArmyRepository, StoreError, UnitSearch};
use crate::domain::{ArmyImport, ArmyResume, ArmySnapshot, ArmyUnit};

/// Diesel implementation of [`ArmyRepository`].
#[derive(Debug, Clone)]
pub struct DieselArmyRepository {
    store: SqliteStore,
}

impl DieselArmyRepository {
    /// Create a repository over the shared store.
    #[must_use]
    pub fn new(store: SqliteStore) -> Self {
        Self { store }
    }
}

/// Build a `LIKE` pattern matching `term` anywhere, with wildcards in the
/// term taken literally.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl ArmyRepository for DieselArmyRepository {
    async fn replace_faction_army(&self, import: &ArmyImport) -> Result<(), StoreError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let faction_id = import.snapshot.faction_id;
        let snapshot_row = NewArmySnapshotRow::from(&import.snapshot);
        let unit_rows = import
            .units
            .iter()
            .enumerate()
            .map(|(position, unit)| NewArmyUnitRow::new(unit, position))
            .collect::<Result<Vec<_>, _>>()?;
        let resume_rows = import
            .resume
            .iter()
            .enumerate()
            .map(|(position, row)| NewArmyResumeRow::new(row, position))
            .collect::<Result<Vec<_>, _>>()?;

        let mut conn = self.store.connection().await?;

        // A failed insert rolls back the deletes, so readers never see a
        // half-replaced faction.
        conn.transaction(|conn| {
            async move {
                diesel::delete(army_units::table.filter(army_units::faction_id.eq(faction_id)))
                    .execute(conn)
                    .await?;
                diesel::delete(army_resume::table.filter(army_resume::faction_id.eq(faction_id)))
                    .execute(conn)
                    .await?;
                diesel::delete(
                    army_snapshots::table.filter(army_snapshots::faction_id.eq(faction_id)),
                )
                .execute(conn)
                .await?;

                diesel::insert_into(army_snapshots::table)
                    .values(&snapshot_row)
                    .execute(conn)
                    .await?;
                for row in &unit_rows {
                    diesel::insert_into(army_units::table)
                        .values(row)
                        .execute(conn)
                        .await?;
                }
                for row in &resume_rows {
                    diesel::insert_into(army_resume::table)
                        .values(row)
                        .execute(conn)
                        .await?;
                }
                Ok::<_, diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|error| map_diesel_error(error, "replace faction army"))?;

        info!(
            faction_id,
            version = %import.snapshot.version,
            units = import.units.len(),
            resume = import.resume.len(),
            "faction army replaced"
        );
        Ok(())
    }

    async fn faction_ids(&self) -> Result<Vec<i64>, StoreError> {
        let mut conn = self.store.connection().await?;
        army_snapshots::table
            .select(army_snapshots::faction_id)
            .order(army_snapshots::faction_id.asc())
            .load(&mut *conn)
            .await
            .map_err(|error| map_diesel_error(error, "list army factions"))
    }

    async fn find_snapshot(&self, faction_id: i64) -> Result<Option<ArmySnapshot>, StoreError> {
        let mut conn = self.store.connection().await?;
        let row = army_snapshots::table
            .filter(army_snapshots::faction_id.eq(faction_id))
            .select(ArmySnapshotRow::as_select())
            .first(&mut *conn)
            .await
            .optional()
            .map_err(|error| map_diesel_error(error, "find army snapshot"))?;
        row.map(TryInto::try_into).transpose()
    }

    async fn list_units(&self, faction_id: i64) -> Result<Vec<ArmyUnit>, StoreError> {
        let mut conn = self.store.connection().await?;
        let rows = army_units::table
            .filter(army_units::faction_id.eq(faction_id))
            .order(army_units::position.asc())
            .select(ArmyUnitRow::as_select())
            .load(&mut *conn)
            .await
            .map_err(|error| map_diesel_error(error, "list army units"))?;
        Ok(rows.into_iter().map(ArmyUnit::from).collect())
    }

    async fn find_unit(
        &self,
        faction_id: i64,
        unit_id: i64,
    ) -> Result<Option<ArmyUnit>, StoreError> {
        let mut conn = self.store.connection().await?;
        let row = army_units::table
            .filter(army_units::faction_id.eq(faction_id))
            .filter(army_units::unit_id.eq(unit_id))
            .order(army_units::position.asc())
            .select(ArmyUnitRow::as_select())
            .first(&mut *conn)
            .await
            .optional()
            .map_err(|error| map_diesel_error(error, "find army unit"))?;
        Ok(row.map(ArmyUnit::from))
    }

    async fn search_units(&self, search: &UnitSearch) -> Result<Vec<ArmyUnit>, StoreError> {
        let mut query: army_units::BoxedQuery<'_, Sqlite> = army_units::table.into_boxed();
        if let Some(term) = search.term.as_deref() {
            query = query.filter(army_units::name.like(contains_pattern(term)).escape('\\'));
        }
        if let Some(faction_id) = search.faction_id {
            query = query.filter(army_units::faction_id.eq(faction_id));
        }
        if let Some(limit) = search.limit {
            query = query.limit(to_sql_integer(limit)?);
        }
        debug!(?search, "searching stored units");

        let mut conn = self.store.connection().await?;
        let rows = query
            .order((
                army_units::name.asc(),
                army_units::faction_id.asc(),
                army_units::position.asc(),
            ))
            .select(ArmyUnitRow::as_select())
            .load(&mut *conn)
            .await
            .map_err(|error| map_diesel_error(error, "search army units"))?;
        Ok(rows.into_iter().map(ArmyUnit::from).collect())
    }

    async fn list_resume(&self, faction_id: i64) -> Result<Vec<ArmyResume>, StoreError> {
        let mut conn = self.store.connection().await?;
        let rows = army_resume::table
            .filter(army_resume::faction_id.eq(faction_id))
            .order(army_resume::position.asc())
            .select(ArmyResumeRow::as_select())
            .load(&mut *conn)
            .await
            .map_err(|error| map_diesel_error(error, "list army resume"))?;
        Ok(rows.into_iter().map(ArmyResume::from).collect())
    }
}
