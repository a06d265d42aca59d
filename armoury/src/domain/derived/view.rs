//! Display bundle for one unit.

use serde::Serialize;
use serde_json::Value;

use super::flags::{OrderFlags, TraitFlags};
use super::lookups::FilterTables;
use super::stats::UnitStatBlock;
use super::traits::{CommonTraits, TraitKind, entry_names};
use crate::domain::{ArmySnapshot, ArmyUnit, DisplayUnits};

/// Everything a unit screen shows, derived from stored JSON at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitView {
    /// Faction the unit was loaded from.
    pub faction_id: i64,
    /// Publisher unit id.
    pub unit_id: i64,
    /// Display name.
    pub name: String,
    /// ISC name.
    pub isc: String,
    /// Unit slug.
    pub slug: String,
    /// Raw stat block of the first profile.
    pub stats: Option<UnitStatBlock>,
    /// Movement rendered in `units`.
    pub movement: Option<String>,
    /// Availability with the unlimited marker rendered as `Total`.
    pub availability: Option<String>,
    /// Equipment on every loadout.
    pub common_equipment: Vec<String>,
    /// Skills on every loadout.
    pub common_skills: Vec<String>,
    /// Detected flags.
    pub flags: TraitFlags,
    /// Unit the distances are rendered in.
    pub units: DisplayUnits,
}

impl UnitView {
    /// Derive the view of `unit` using the lookups of its faction `snapshot`.
    #[must_use]
    pub fn build(unit: &ArmyUnit, snapshot: Option<&ArmySnapshot>, units: DisplayUnits) -> Self {
        let tables = FilterTables::from_json(
            snapshot.and_then(|stored| stored.filters_json.as_deref()),
        );
        let groups: Value = serde_json::from_str(&unit.profile_groups_json).unwrap_or(Value::Null);
        let stats = UnitStatBlock::from_profile_groups(&unit.profile_groups_json);
        let common = CommonTraits::from_profile_groups(&groups, &tables);
        let names = trait_names(&groups, &tables);
        let flags = TraitFlags::detect(
            names.iter().map(String::as_str),
            OrderFlags::from_profile_groups(&groups),
        );

        Self {
            faction_id: unit.key.faction_id,
            unit_id: unit.unit_id(),
            name: unit.name.clone(),
            isc: unit.isc.clone(),
            slug: unit.slug().to_owned(),
            movement: stats.as_ref().and_then(|block| block.movement_display(units)),
            availability: stats.as_ref().and_then(UnitStatBlock::availability_display),
            stats,
            common_equipment: common.equipment,
            common_skills: common.skills,
            flags,
            units,
        }
    }
}

/// Every equipment, skill and characteristic name on any profile or option.
fn trait_names(groups: &Value, tables: &FilterTables) -> Vec<String> {
    let holders = groups.as_array().into_iter().flatten().flat_map(|group| {
        ["profiles", "options"]
            .into_iter()
            .filter_map(move |field| group.get(field).and_then(Value::as_array))
            .flatten()
    });
    holders
        .flat_map(|holder| {
            [
                TraitKind::Equipment,
                TraitKind::Skills,
                TraitKind::Characteristics,
            ]
            .into_iter()
            .flat_map(move |kind| entry_names(holder, tables, kind))
        })
        .collect()
}
