//! Id to name tables read from an army document's `filters` section.

use std::collections::HashMap;

use serde_json::Value;

use crate::domain::coerce::{int_from_value, text_from_value};

/// Id to display name table for one filters section.
pub type NameLookup = HashMap<i64, String>;

/// Build the lookup for `section` (`equip`, `skills`, `chars`, `type`,
/// `category`, `extras`, ...) from the serialized filters object.
///
/// A missing, malformed or non-array section yields an empty table, and
/// entries without a usable id or name are skipped.
///
/// # Examples
/// ```
/// use armoury::domain::derived::id_name_map;
///
/// let filters = r#"{"equip":[{"id":1,"name":"Multispectral Visor L1"}]}"#;
/// let lookup = id_name_map(Some(filters), "equip");
/// assert_eq!(lookup.get(&1).map(String::as_str), Some("Multispectral Visor L1"));
/// assert!(id_name_map(Some("not json"), "equip").is_empty());
/// ```
#[must_use]
pub fn id_name_map(filters_json: Option<&str>, section: &str) -> NameLookup {
    filters_json
        .and_then(|json| serde_json::from_str::<Value>(json).ok())
        .map(|filters| section_lookup(&filters, section))
        .unwrap_or_default()
}

/// Same as [`id_name_map`] over an already parsed filters value.
#[must_use]
pub fn section_lookup(filters: &Value, section: &str) -> NameLookup {
    let Some(entries) = filters.get(section).and_then(Value::as_array) else {
        return NameLookup::new();
    };
    entries
        .iter()
        .filter_map(|entry| {
            let id = entry.get("id").and_then(int_from_value)?;
            let name = entry.get("name").and_then(text_from_value)?;
            let name = name.trim();
            (!name.is_empty()).then(|| (id, name.to_owned()))
        })
        .collect()
}

/// Lookups needed to render a unit, parsed once per snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterTables {
    /// Equipment names.
    pub equip: NameLookup,
    /// Skill names.
    pub skills: NameLookup,
    /// Characteristic names (`Cube`, `Hackable`, ...).
    pub chars: NameLookup,
    /// Unit type names.
    pub unit_types: NameLookup,
    /// Category names.
    pub categories: NameLookup,
    /// Extra qualifiers appended to skill or equipment names.
    pub extras: NameLookup,
}

impl FilterTables {
    /// Parse the tables from a snapshot's serialized filters.
    #[must_use]
    pub fn from_json(filters_json: Option<&str>) -> Self {
        let Some(filters) = filters_json.and_then(|json| serde_json::from_str::<Value>(json).ok())
        else {
            return Self::default();
        };
        Self {
            equip: section_lookup(&filters, "equip"),
            skills: section_lookup(&filters, "skills"),
            chars: section_lookup(&filters, "chars"),
            unit_types: section_lookup(&filters, "type"),
            categories: section_lookup(&filters, "category"),
            extras: section_lookup(&filters, "extras"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case::missing_filters(None)]
    #[case::malformed_json(Some("{"))]
    #[case::section_not_array(Some(r#"{"equip":{"id":1}}"#))]
    #[case::absent_section(Some(r#"{"skills":[]}"#))]
    fn unusable_sections_give_empty_tables(#[case] filters: Option<&str>) {
        assert!(id_name_map(filters, "equip").is_empty());
    }

    #[rstest]
    fn coerces_ids_and_skips_unnamed_entries() {
        let filters = json!({
            "skills": [
                { "id": "4", "name": "Dodge" },
                { "id": 5, "name": "  " },
                { "name": "No Id" },
                { "id": 6, "name": "Courage" }
            ]
        })
        .to_string();

        let lookup = id_name_map(Some(&filters), "skills");

        assert_eq!(lookup.len(), 2);
        assert_eq!(lookup.get(&4).map(String::as_str), Some("Dodge"));
        assert_eq!(lookup.get(&6).map(String::as_str), Some("Courage"));
    }

    #[rstest]
    fn tables_parse_every_section_once() {
        let filters = json!({
            "equip": [{ "id": 1, "name": "Combi Rifle" }],
            "chars": [{ "id": 2, "name": "Cube" }],
            "type": [{ "id": 3, "name": "LI" }],
            "category": [{ "id": 10, "name": "Garrison Troop" }]
        })
        .to_string();

        let tables = FilterTables::from_json(Some(&filters));

        assert_eq!(tables.equip.len(), 1);
        assert_eq!(tables.chars.get(&2).map(String::as_str), Some("Cube"));
        assert_eq!(tables.unit_types.get(&3).map(String::as_str), Some("LI"));
        assert_eq!(tables.categories.get(&10).map(String::as_str), Some("Garrison Troop"));
        assert!(tables.skills.is_empty());
    }
}
