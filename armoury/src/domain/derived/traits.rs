//! Equipment and skill names shared by every loadout of a unit.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use serde_json::Value;

use super::lookups::{FilterTables, NameLookup};
use crate::domain::coerce::int_from_value;

/// Which list of a profile or option to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraitKind {
    /// `equip` entries resolved through the `equip` table.
    Equipment,
    /// `skills` entries resolved through the `skills` table.
    Skills,
    /// `chars` entries resolved through the `chars` table.
    Characteristics,
}

impl TraitKind {
    fn field(self) -> &'static str {
        match self {
            Self::Equipment => "equip",
            Self::Skills => "skills",
            Self::Characteristics => "chars",
        }
    }

    fn table(self, tables: &FilterTables) -> &NameLookup {
        match self {
            Self::Equipment => &tables.equip,
            Self::Skills => &tables.skills,
            Self::Characteristics => &tables.chars,
        }
    }
}

/// Names every loadout of a unit is guaranteed to carry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommonTraits {
    /// Common equipment names.
    pub equipment: Vec<String>,
    /// Common skill names.
    pub skills: Vec<String>,
}

impl CommonTraits {
    /// Compute both intersections for a unit's profile groups.
    #[must_use]
    pub fn from_profile_groups(groups: &Value, tables: &FilterTables) -> Self {
        Self {
            equipment: common_names(groups, tables, TraitKind::Equipment),
            skills: common_names(groups, tables, TraitKind::Skills),
        }
    }
}

/// Display names of one list on a profile or option, in order, without
/// duplicates. Entries may be bare ids or `{ "id", "extra" }` objects; extras
/// resolve through the `extras` table and are appended in parentheses.
#[must_use]
pub fn entry_names(holder: &Value, tables: &FilterTables, kind: TraitKind) -> Vec<String> {
    let Some(entries) = holder.get(kind.field()).and_then(Value::as_array) else {
        return Vec::new();
    };
    let table = kind.table(tables);
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter_map(|entry| display_name(entry, table, &tables.extras))
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

fn display_name(entry: &Value, table: &NameLookup, extras: &NameLookup) -> Option<String> {
    let id = match entry {
        Value::Object(_) => entry.get("id").and_then(int_from_value),
        other => int_from_value(other),
    }?;
    let name = table.get(&id)?;
    let qualifiers: Vec<&str> = entry
        .get("extra")
        .and_then(Value::as_array)
        .map(|ids| {
            ids.iter()
                .filter_map(int_from_value)
                .filter_map(|extra| extras.get(&extra).map(String::as_str))
                .collect()
        })
        .unwrap_or_default();
    if qualifiers.is_empty() {
        Some(name.clone())
    } else {
        Some(format!("{name} ({})", qualifiers.join(", ")))
    }
}

/// Names present on every profile; when there are none and the unit's
/// options use `includes`, names present on every root option once its
/// includes are resolved.
///
/// # Examples
/// ```
/// use armoury::domain::derived::{FilterTables, TraitKind, common_names};
/// use serde_json::json;
///
/// let filters = json!({ "equip": [
///     { "id": 1, "name": "Combi Rifle" },
///     { "id": 2, "name": "Light Shotgun" },
///     { "id": 3, "name": "E/Mitter" }
/// ] })
/// .to_string();
/// let tables = FilterTables::from_json(Some(&filters));
/// let groups = json!([{ "profiles": [{ "equip": [1, 2] }, { "equip": [1, 3] }] }]);
///
/// assert_eq!(common_names(&groups, &tables, TraitKind::Equipment), vec!["Combi Rifle"]);
/// ```
#[must_use]
pub fn common_names(groups: &Value, tables: &FilterTables, kind: TraitKind) -> Vec<String> {
    let Some(groups) = groups.as_array() else {
        return Vec::new();
    };
    let profile_sets: Vec<Vec<String>> = groups
        .iter()
        .flat_map(|group| array_field(group, "profiles"))
        .map(|profile| entry_names(profile, tables, kind))
        .collect();
    let common = intersect(profile_sets);
    if !common.is_empty() {
        return common;
    }

    let index = OptionIndex::new(groups);
    if !index.has_includes() {
        return common;
    }
    let option_sets: Vec<Vec<String>> = index
        .roots()
        .into_iter()
        .map(|root| index.resolve(root, tables, kind))
        .collect();
    intersect(option_sets)
}

fn array_field<'a>(holder: &'a Value, field: &str) -> impl Iterator<Item = &'a Value> + use<'a> {
    holder
        .get(field)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

/// Intersection of ordered name lists, in the order of the first list.
fn intersect(sets: Vec<Vec<String>>) -> Vec<String> {
    let mut sets = sets.into_iter();
    let Some(first) = sets.next() else {
        return Vec::new();
    };
    let rest: Vec<HashSet<String>> = sets.map(|set| set.into_iter().collect()).collect();
    first
        .into_iter()
        .filter(|name| rest.iter().all(|set| set.contains(name)))
        .collect()
}

type OptionId = (i64, i64);

/// Options of every group addressed by `(group_id, option_id)`.
struct OptionIndex<'a> {
    order: Vec<OptionId>,
    options: HashMap<OptionId, &'a Value>,
}

impl<'a> OptionIndex<'a> {
    fn new(groups: &'a [Value]) -> Self {
        let mut order = Vec::new();
        let mut options = HashMap::new();
        for group in groups {
            let group_id = group.get("id").and_then(int_from_value).unwrap_or(0);
            for option in array_field(group, "options") {
                let option_id = option.get("id").and_then(int_from_value).unwrap_or(0);
                let id = (group_id, option_id);
                if options.insert(id, option).is_none() {
                    order.push(id);
                }
            }
        }
        Self { order, options }
    }

    fn includes(option: &Value) -> impl Iterator<Item = OptionId> + '_ {
        array_field(option, "includes").filter_map(|include| {
            let group = include.get("group").and_then(int_from_value)?;
            let option = include.get("option").and_then(int_from_value)?;
            Some((group, option))
        })
    }

    fn has_includes(&self) -> bool {
        self.options
            .values()
            .any(|option| Self::includes(option).next().is_some())
    }

    /// Options no other option includes.
    fn roots(&self) -> Vec<OptionId> {
        let included: HashSet<OptionId> = self
            .options
            .values()
            .flat_map(|&option| Self::includes(option))
            .collect();
        self.order
            .iter()
            .copied()
            .filter(|id| !included.contains(id))
            .collect()
    }

    /// Names of `root` plus everything it includes, transitively.
    fn resolve(&self, root: OptionId, tables: &FilterTables, kind: TraitKind) -> Vec<String> {
        let mut visited = HashSet::from([root]);
        let mut pending = vec![root];
        let mut names = Vec::new();
        let mut seen = HashSet::new();
        while let Some(id) = pending.pop() {
            let Some(option) = self.options.get(&id) else {
                continue;
            };
            for name in entry_names(option, tables, kind) {
                if seen.insert(name.clone()) {
                    names.push(name);
                }
            }
            let mut children: Vec<OptionId> = Self::includes(option)
                .filter(|child| visited.insert(*child))
                .collect();
            children.reverse();
            pending.extend(children);
        }
        names
    }
}
