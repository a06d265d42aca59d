//! SQLite-backed metadata adapter.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::info;

use super::diesel_helpers::map_diesel_error;
use super::models::{
    FactionRow, NewAmmunitionRow, NewBootyRow, NewEquipRow, NewFactionRow, NewHackProgramRow,
    NewMartialArtRow, NewMetachemistryRow, NewSkillRow, NewWeaponRow,
};
use super::schema::{
    ammunitions, booty, equips, factions, hack_programs, martial_arts, metachemistry, skills,
    weapons,
};
use super::store::SqliteStore;
use crate::domain::ports::{MetadataRepository, StoreError};
use crate::domain::{Faction, MetadataCounts, MetadataSnapshot};

/// Diesel implementation of [`MetadataRepository`].
#[derive(Debug, Clone)]
pub struct DieselMetadataRepository {
    store: SqliteStore,
}

impl DieselMetadataRepository {
    /// Create a repository over the shared store.
    #[must_use]
    pub fn new(store: SqliteStore) -> Self {
        Self { store }
    }
}

/// Insert rows one at a time on the transaction's connection.
macro_rules! insert_each {
    ($conn:expr, $table:path, $rows:expr) => {
        for row in $rows {
            diesel::insert_into($table).values(row).execute($conn).await?;
        }
    };
}

/// Count a table's rows on an open connection.
macro_rules! count_rows {
    ($conn:expr, $table:ident) => {{
        let count: i64 = $table::table
            .count()
            .get_result($conn)
            .await
            .map_err(|error| map_diesel_error(error, concat!("count ", stringify!($table))))?;
        row_count(count, stringify!($table))?
    }};
}

fn row_count(count: i64, table: &str) -> Result<usize, StoreError> {
    usize::try_from(count)
        .map_err(|_| StoreError::query(format!("{table}: negative row count {count}")))
}

#[async_trait]
impl MetadataRepository for DieselMetadataRepository {
    async fn replace_metadata(
        &self,
        snapshot: &MetadataSnapshot,
    ) -> Result<MetadataCounts, StoreError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let faction_rows: Vec<NewFactionRow<'_>> =
            snapshot.factions.iter().map(Into::into).collect();
        let ammunition_rows: Vec<NewAmmunitionRow<'_>> =
            snapshot.ammunitions.iter().map(Into::into).collect();
        let weapon_rows: Vec<NewWeaponRow<'_>> = snapshot.weapons.iter().map(Into::into).collect();
        let skill_rows: Vec<NewSkillRow<'_>> = snapshot.skills.iter().map(Into::into).collect();
        let equip_rows: Vec<NewEquipRow<'_>> = snapshot.equips.iter().map(Into::into).collect();
        let hack_rows: Vec<NewHackProgramRow<'_>> =
            snapshot.hack_programs.iter().map(Into::into).collect();
        let martial_rows: Vec<NewMartialArtRow<'_>> =
            snapshot.martial_arts.iter().map(Into::into).collect();
        let metachemistry_rows: Vec<NewMetachemistryRow<'_>> =
            snapshot.metachemistry.iter().map(Into::into).collect();
        let booty_rows: Vec<NewBootyRow<'_>> = snapshot.booty.iter().map(Into::into).collect();

        let mut conn = self.store.connection().await?;

        // Every metadata table is replaced together or not at all.
        conn.transaction(|conn| {
            async move {
                diesel::delete(factions::table).execute(conn).await?;
                diesel::delete(ammunitions::table).execute(conn).await?;
                diesel::delete(weapons::table).execute(conn).await?;
                diesel::delete(skills::table).execute(conn).await?;
                diesel::delete(equips::table).execute(conn).await?;
                diesel::delete(hack_programs::table).execute(conn).await?;
                diesel::delete(martial_arts::table).execute(conn).await?;
                diesel::delete(metachemistry::table).execute(conn).await?;
                diesel::delete(booty::table).execute(conn).await?;

                insert_each!(conn, factions::table, &faction_rows);
                insert_each!(conn, ammunitions::table, &ammunition_rows);
                insert_each!(conn, weapons::table, &weapon_rows);
                insert_each!(conn, skills::table, &skill_rows);
                insert_each!(conn, equips::table, &equip_rows);
                insert_each!(conn, hack_programs::table, &hack_rows);
                insert_each!(conn, martial_arts::table, &martial_rows);
                insert_each!(conn, metachemistry::table, &metachemistry_rows);
                insert_each!(conn, booty::table, &booty_rows);
                Ok::<_, diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|error| map_diesel_error(error, "replace metadata"))?;

        let counts = snapshot.counts();
        info!(
            factions = counts.factions,
            weapons = counts.weapons,
            skills = counts.skills,
            "metadata replaced"
        );
        Ok(counts)
    }

    async fn list_factions(&self) -> Result<Vec<Faction>, StoreError> {
        let mut conn = self.store.connection().await?;
        let rows = factions::table
            .select(FactionRow::as_select())
            .order(factions::id.asc())
            .load(&mut *conn)
            .await
            .map_err(|error| map_diesel_error(error, "list factions"))?;
        Ok(rows.into_iter().map(Faction::from).collect())
    }

    async fn counts(&self) -> Result<MetadataCounts, StoreError> {
        let mut conn = self.store.connection().await?;
        let conn = &mut *conn;
        Ok(MetadataCounts {
            factions: count_rows!(conn, factions),
            ammunitions: count_rows!(conn, ammunitions),
            weapons: count_rows!(conn, weapons),
            skills: count_rows!(conn, skills),
            equips: count_rows!(conn, equips),
            hack_programs: count_rows!(conn, hack_programs),
            martial_arts: count_rows!(conn, martial_arts),
            metachemistry: count_rows!(conn, metachemistry),
            booty: count_rows!(conn, booty),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn repository() -> DieselMetadataRepository {
        DieselMetadataRepository::new(SqliteStore::in_memory())
    }

    fn snapshot(json: &str) -> MetadataSnapshot {
        MetadataSnapshot::from_json(json).expect("metadata decodes")
    }

    const FIRST: &str = r#"{
        "factions": [
            { "id": 2, "parent": 1, "name": "Military Orders", "slug": "military-orders" },
            { "id": 1, "parent": 1, "name": "PanOceania", "slug": "panoceania", "logo": "po.svg" }
        ],
        "ammunitions": [{ "id": 1, "name": "N" }],
        "weapons": [
            { "id": 12, "name": "Combi Rifle", "burst": "3" },
            { "id": 40, "name": "Spitfire", "mode": "Burst" },
            { "id": 40, "name": "Spitfire", "mode": "Suppressive" }
        ],
        "skills": [{ "id": 1, "name": "Camouflage" }],
        "equips": [{ "id": 100, "name": "Multispectral Visor L1" }],
        "hack": [{ "name": "Carbonite" }],
        "martialArts": [{ "name": "Level 1" }],
        "metachemistry": [{ "id": 1, "name": "Regeneration" }],
        "booty": [{ "id": 1, "name": "Light Armour", "value": "+1 ARM" }]
    }"#;

    #[rstest]
    #[tokio::test]
    async fn replace_persists_every_table(repository: DieselMetadataRepository) {
        let stored = repository
            .replace_metadata(&snapshot(FIRST))
            .await
            .expect("replace");

        assert_eq!(repository.counts().await.expect("counts"), stored);
        assert_eq!(stored.weapons, 3);
        assert_eq!(stored.hack_programs, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn factions_are_listed_by_id(repository: DieselMetadataRepository) {
        repository
            .replace_metadata(&snapshot(FIRST))
            .await
            .expect("replace");

        let listed = repository.list_factions().await.expect("list");

        let ids: Vec<i64> = listed.iter().map(|faction| faction.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(listed[0].logo.as_deref(), Some("po.svg"));
        assert_eq!(listed[1].parent_id, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn replacing_discards_previous_rows(repository: DieselMetadataRepository) {
        repository
            .replace_metadata(&snapshot(FIRST))
            .await
            .expect("first replace");
        repository
            .replace_metadata(&snapshot(
                r#"{ "factions": [{ "id": 9, "name": "Nomads", "slug": "nomads" }] }"#,
            ))
            .await
            .expect("second replace");

        let counts = repository.counts().await.expect("counts");
        assert_eq!(counts.factions, 1);
        assert_eq!(counts.weapons, 0);
        assert_eq!(counts.booty, 0);
        let listed = repository.list_factions().await.expect("list");
        assert_eq!(listed[0].parent_id, 9);
    }

    #[rstest]
    #[tokio::test]
    async fn empty_store_reports_zero_counts(repository: DieselMetadataRepository) {
        assert_eq!(
            repository.counts().await.expect("counts"),
            MetadataCounts::default()
        );
    }
}
