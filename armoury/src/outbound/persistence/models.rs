//! Internal Diesel row structs for the SQLite store.
//!
//! These types never leave the persistence layer. Inserts borrow from the
//! domain records; reads convert into them.

use diesel::prelude::*;

use super::diesel_helpers::{timestamp_from_text, timestamp_to_text, to_sql_integer};
use super::schema::{
    ammunitions, app_settings, army_resume, army_snapshots, army_units, booty, equips, factions,
    hack_programs, martial_arts, metachemistry, skills, weapons,
};
use crate::domain::ports::StoreError;
use crate::domain::{
    ArmyResume, ArmySnapshot, ArmyUnit, Faction, HackProgram, MartialArt, ReferenceEntry,
    ResumeKey, UnitKey, ValuedEntry, Weapon,
};

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = factions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct FactionRow {
    pub id: i64,
    pub parent_id: i64,
    pub name: String,
    pub slug: String,
    pub discontinued: bool,
    pub logo: Option<String>,
}

impl From<FactionRow> for Faction {
    fn from(row: FactionRow) -> Self {
        Self {
            id: row.id,
            parent_id: row.parent_id,
            name: row.name,
            slug: row.slug,
            discontinued: row.discontinued,
            logo: row.logo,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = factions)]
pub(crate) struct NewFactionRow<'a> {
    pub id: i64,
    pub parent_id: i64,
    pub name: &'a str,
    pub slug: &'a str,
    pub discontinued: bool,
    pub logo: Option<&'a str>,
}

impl<'a> From<&'a Faction> for NewFactionRow<'a> {
    fn from(faction: &'a Faction) -> Self {
        Self {
            id: faction.id,
            parent_id: faction.parent_id,
            name: &faction.name,
            slug: &faction.slug,
            discontinued: faction.discontinued,
            logo: faction.logo.as_deref(),
        }
    }
}

/// Generates the insert row for the three `(id, name, wiki)` tables.
macro_rules! reference_row {
    ($row:ident, $table:ident) => {
        #[derive(Debug, Insertable)]
        #[diesel(table_name = $table)]
        pub(crate) struct $row<'a> {
            pub id: i64,
            pub name: &'a str,
            pub wiki: Option<&'a str>,
        }

        impl<'a> From<&'a ReferenceEntry> for $row<'a> {
            fn from(entry: &'a ReferenceEntry) -> Self {
                Self {
                    id: entry.id,
                    name: &entry.name,
                    wiki: entry.wiki.as_deref(),
                }
            }
        }
    };
}

reference_row!(NewAmmunitionRow, ammunitions);
reference_row!(NewSkillRow, skills);
reference_row!(NewEquipRow, equips);

/// Generates the insert row for the two `(id, name, value)` tables.
macro_rules! valued_row {
    ($row:ident, $table:ident) => {
        #[derive(Debug, Insertable)]
        #[diesel(table_name = $table)]
        pub(crate) struct $row<'a> {
            pub id: i64,
            pub name: &'a str,
            pub value: Option<&'a str>,
        }

        impl<'a> From<&'a ValuedEntry> for $row<'a> {
            fn from(entry: &'a ValuedEntry) -> Self {
                Self {
                    id: entry.id,
                    name: &entry.name,
                    value: entry.value.as_deref(),
                }
            }
        }
    };
}

valued_row!(NewMetachemistryRow, metachemistry);
valued_row!(NewBootyRow, booty);

#[derive(Debug, Insertable)]
#[diesel(table_name = weapons)]
pub(crate) struct NewWeaponRow<'a> {
    pub weapon_key: String,
    pub id: i64,
    pub name: &'a str,
    pub mode: Option<&'a str>,
    pub weapon_type: Option<&'a str>,
    pub wiki: Option<&'a str>,
    pub ammunition: Option<i64>,
    pub burst: Option<&'a str>,
    pub damage: Option<&'a str>,
    pub saving: Option<&'a str>,
    pub saving_num: Option<&'a str>,
    pub profile: Option<&'a str>,
    pub properties_json: &'a str,
    pub distance_json: Option<&'a str>,
}

impl<'a> From<&'a Weapon> for NewWeaponRow<'a> {
    fn from(weapon: &'a Weapon) -> Self {
        Self {
            weapon_key: weapon.key.storage_key(),
            id: weapon.key.id,
            name: &weapon.key.name,
            mode: weapon.key.mode.as_deref(),
            weapon_type: weapon.weapon_type.as_deref(),
            wiki: weapon.wiki.as_deref(),
            ammunition: weapon.ammunition,
            burst: weapon.burst.as_deref(),
            damage: weapon.damage.as_deref(),
            saving: weapon.saving.as_deref(),
            saving_num: weapon.saving_num.as_deref(),
            profile: weapon.profile.as_deref(),
            properties_json: &weapon.properties_json,
            distance_json: weapon.distance_json.as_deref(),
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = hack_programs)]
pub(crate) struct NewHackProgramRow<'a> {
    pub name: &'a str,
    pub opponent: Option<&'a str>,
    pub special: Option<&'a str>,
    pub damage: Option<&'a str>,
    pub attack: Option<&'a str>,
    pub burst: Option<&'a str>,
    pub extra: Option<&'a str>,
    pub skill_type_json: &'a str,
    pub devices_json: &'a str,
    pub target_json: &'a str,
}

impl<'a> From<&'a HackProgram> for NewHackProgramRow<'a> {
    fn from(program: &'a HackProgram) -> Self {
        Self {
            name: &program.name,
            opponent: program.opponent.as_deref(),
            special: program.special.as_deref(),
            damage: program.damage.as_deref(),
            attack: program.attack.as_deref(),
            burst: program.burst.as_deref(),
            extra: program.extra.as_deref(),
            skill_type_json: &program.skill_type_json,
            devices_json: &program.devices_json,
            target_json: &program.target_json,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = martial_arts)]
pub(crate) struct NewMartialArtRow<'a> {
    pub name: &'a str,
    pub opponent: Option<&'a str>,
    pub damage: Option<&'a str>,
    pub attack: Option<&'a str>,
    pub burst: Option<&'a str>,
}

impl<'a> From<&'a MartialArt> for NewMartialArtRow<'a> {
    fn from(art: &'a MartialArt) -> Self {
        Self {
            name: &art.name,
            opponent: art.opponent.as_deref(),
            damage: art.damage.as_deref(),
            attack: art.attack.as_deref(),
            burst: art.burst.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Army snapshots
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = army_snapshots)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct ArmySnapshotRow {
    pub faction_id: i64,
    pub version: String,
    pub imported_at: String,
    pub raw_json: String,
    pub reinforcements_json: Option<String>,
    pub filters_json: Option<String>,
    pub fireteams_json: Option<String>,
    pub relations_json: Option<String>,
    pub specops_json: Option<String>,
    pub fireteam_chart_json: Option<String>,
}

impl TryFrom<ArmySnapshotRow> for ArmySnapshot {
    type Error = StoreError;

    fn try_from(row: ArmySnapshotRow) -> Result<Self, Self::Error> {
        Ok(Self {
            faction_id: row.faction_id,
            version: row.version,
            imported_at: timestamp_from_text(&row.imported_at)?,
            raw_json: row.raw_json,
            reinforcements_json: row.reinforcements_json,
            filters_json: row.filters_json,
            fireteams_json: row.fireteams_json,
            relations_json: row.relations_json,
            specops_json: row.specops_json,
            fireteam_chart_json: row.fireteam_chart_json,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = army_snapshots)]
pub(crate) struct NewArmySnapshotRow<'a> {
    pub faction_id: i64,
    pub version: &'a str,
    pub imported_at: String,
    pub raw_json: &'a str,
    pub reinforcements_json: Option<&'a str>,
    pub filters_json: Option<&'a str>,
    pub fireteams_json: Option<&'a str>,
    pub relations_json: Option<&'a str>,
    pub specops_json: Option<&'a str>,
    pub fireteam_chart_json: Option<&'a str>,
}

impl<'a> From<&'a ArmySnapshot> for NewArmySnapshotRow<'a> {
    fn from(snapshot: &'a ArmySnapshot) -> Self {
        Self {
            faction_id: snapshot.faction_id,
            version: &snapshot.version,
            imported_at: timestamp_to_text(snapshot.imported_at),
            raw_json: &snapshot.raw_json,
            reinforcements_json: snapshot.reinforcements_json.as_deref(),
            filters_json: snapshot.filters_json.as_deref(),
            fireteams_json: snapshot.fireteams_json.as_deref(),
            relations_json: snapshot.relations_json.as_deref(),
            specops_json: snapshot.specops_json.as_deref(),
            fireteam_chart_json: snapshot.fireteam_chart_json.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = army_units)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct ArmyUnitRow {
    pub faction_id: i64,
    pub unit_id: i64,
    pub id_army: Option<i64>,
    pub canonical: i64,
    pub isc: String,
    pub isc_abbr: Option<String>,
    pub name: String,
    pub slug: String,
    pub profile_groups_json: String,
    pub options_json: Option<String>,
    pub filters_json: Option<String>,
    pub factions_json: String,
}

impl From<ArmyUnitRow> for ArmyUnit {
    fn from(row: ArmyUnitRow) -> Self {
        Self {
            key: UnitKey {
                faction_id: row.faction_id,
                unit_id: row.unit_id,
                id_army: row.id_army,
                slug: row.slug,
            },
            canonical: row.canonical,
            isc: row.isc,
            isc_abbr: row.isc_abbr,
            name: row.name,
            profile_groups_json: row.profile_groups_json,
            options_json: row.options_json,
            filters_json: row.filters_json,
            factions_json: row.factions_json,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = army_units)]
pub(crate) struct NewArmyUnitRow<'a> {
    pub unit_key: String,
    pub faction_id: i64,
    pub unit_id: i64,
    pub id_army: Option<i64>,
    pub position: i64,
    pub canonical: i64,
    pub isc: &'a str,
    pub isc_abbr: Option<&'a str>,
    pub name: &'a str,
    pub slug: &'a str,
    pub profile_groups_json: &'a str,
    pub options_json: Option<&'a str>,
    pub filters_json: Option<&'a str>,
    pub factions_json: &'a str,
}

impl<'a> NewArmyUnitRow<'a> {
    pub(crate) fn new(unit: &'a ArmyUnit, position: usize) -> Result<Self, StoreError> {
        Ok(Self {
            unit_key: unit.key.storage_key(),
            faction_id: unit.key.faction_id,
            unit_id: unit.key.unit_id,
            id_army: unit.key.id_army,
            position: to_sql_integer(position)?,
            canonical: unit.canonical,
            isc: &unit.isc,
            isc_abbr: unit.isc_abbr.as_deref(),
            name: &unit.name,
            slug: &unit.key.slug,
            profile_groups_json: &unit.profile_groups_json,
            options_json: unit.options_json.as_deref(),
            filters_json: unit.filters_json.as_deref(),
            factions_json: &unit.factions_json,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = army_resume)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct ArmyResumeRow {
    pub faction_id: i64,
    pub unit_id: i64,
    pub id_army: Option<i64>,
    pub isc: String,
    pub name: String,
    pub slug: String,
    pub logo: Option<String>,
    pub unit_type: Option<i64>,
    pub category: Option<i64>,
}

impl From<ArmyResumeRow> for ArmyResume {
    fn from(row: ArmyResumeRow) -> Self {
        Self {
            key: ResumeKey {
                faction_id: row.faction_id,
                unit_id: row.unit_id,
                slug: row.slug,
            },
            id_army: row.id_army,
            isc: row.isc,
            name: row.name,
            logo: row.logo,
            unit_type: row.unit_type,
            category: row.category,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = army_resume)]
pub(crate) struct NewArmyResumeRow<'a> {
    pub resume_key: String,
    pub faction_id: i64,
    pub unit_id: i64,
    pub position: i64,
    pub id_army: Option<i64>,
    pub isc: &'a str,
    pub name: &'a str,
    pub slug: &'a str,
    pub logo: Option<&'a str>,
    pub unit_type: Option<i64>,
    pub category: Option<i64>,
}

impl<'a> NewArmyResumeRow<'a> {
    pub(crate) fn new(row: &'a ArmyResume, position: usize) -> Result<Self, StoreError> {
        Ok(Self {
            resume_key: row.key.storage_key(),
            faction_id: row.key.faction_id,
            unit_id: row.key.unit_id,
            position: to_sql_integer(position)?,
            id_army: row.id_army,
            isc: &row.isc,
            name: &row.name,
            slug: &row.key.slug,
            logo: row.logo.as_deref(),
            unit_type: row.unit_type,
            category: row.category,
        })
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Insertable)]
#[diesel(table_name = app_settings)]
pub(crate) struct NewSettingRow<'a> {
    pub key: &'a str,
    pub value: &'a str,
}
