//! Composite identities for rows whose publisher id is not unique on its own.
//!
//! Keys are tuple value objects. Persistence stores them as one text column
//! using a JSON array encoding, which is injective: two different tuples can
//! never encode to the same text, whatever characters a name or slug holds.

use serde_json::{Value, json};

/// Identity of a weapon fire-mode variant: the publisher reuses one weapon id
/// for several modes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WeaponKey {
    /// Publisher weapon id.
    pub id: i64,
    /// Weapon display name.
    pub name: String,
    /// Fire mode, when the weapon has several.
    pub mode: Option<String>,
}

impl WeaponKey {
    /// Encoded storage form, e.g. `[12,"Combi Rifle",null]`.
    #[must_use]
    pub fn storage_key(&self) -> String {
        json!([self.id, self.name, self.mode]).to_string()
    }
}

/// Identity of one unit row within a faction's army document.
///
/// `id_army` and `slug` guard against id collisions between army
/// sub-documents merged into one faction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitKey {
    /// Faction the document was imported for.
    pub faction_id: i64,
    /// Publisher unit id.
    pub unit_id: i64,
    /// Army sub-document id, when present.
    pub id_army: Option<i64>,
    /// Unit slug.
    pub slug: String,
}

impl UnitKey {
    /// Encoded storage form, e.g. `[10,101,null,"fusilier"]`.
    #[must_use]
    pub fn storage_key(&self) -> String {
        let id_army = self.id_army.map_or(Value::Null, Value::from);
        json!([self.faction_id, self.unit_id, id_army, self.slug]).to_string()
    }
}

/// Identity of one resume (listing summary) row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResumeKey {
    /// Faction the document was imported for.
    pub faction_id: i64,
    /// Publisher unit id.
    pub unit_id: i64,
    /// Unit slug.
    pub slug: String,
}

impl ResumeKey {
    /// Encoded storage form, e.g. `[10,101,"fusilier"]`.
    #[must_use]
    pub fn storage_key(&self) -> String {
        json!([self.faction_id, self.unit_id, self.slug]).to_string()
    }
}

/// Drop earlier items that share a key with a later one, keeping the
/// position of the first occurrence and the value of the last.
pub(crate) fn keep_last_by_key<T, K, F>(items: Vec<T>, key: F) -> Vec<T>
where
    K: Eq + std::hash::Hash,
    F: Fn(&T) -> K,
{
    let mut positions = std::collections::HashMap::with_capacity(items.len());
    let mut kept: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        match positions.get(&key(&item)) {
            Some(&index) => {
                if let Some(slot) = kept.get_mut(index) {
                    *slot = item;
                }
            }
            None => {
                positions.insert(key(&item), kept.len());
                kept.push(item);
            }
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    //! Encoding guarantees for composite keys.

    use super::*;
    use rstest::rstest;

    #[rstest]
    fn keep_last_by_key_replaces_in_place() {
        let items = vec![(1, "a"), (2, "b"), (1, "c")];
        let kept = keep_last_by_key(items, |(id, _)| *id);
        assert_eq!(kept, vec![(1, "c"), (2, "b")]);
    }

    fn unit(unit_id: i64, id_army: Option<i64>, slug: &str) -> UnitKey {
        UnitKey {
            faction_id: 10,
            unit_id,
            id_army,
            slug: slug.to_owned(),
        }
    }

    #[rstest]
    fn unit_key_encodes_all_components() {
        assert_eq!(
            unit(101, None, "fusilier").storage_key(),
            r#"[10,101,null,"fusilier"]"#
        );
        assert_eq!(
            unit(101, Some(3), "fusilier").storage_key(),
            r#"[10,101,3,"fusilier"]"#
        );
    }

    #[rstest]
    fn delimiter_characters_in_slugs_do_not_collide() {
        let left = ResumeKey {
            faction_id: 1,
            unit_id: 23,
            slug: "a".to_owned(),
        };
        let right = ResumeKey {
            faction_id: 12,
            unit_id: 3,
            slug: "a".to_owned(),
        };
        let sneaky = ResumeKey {
            faction_id: 1,
            unit_id: 2,
            slug: "3\",\"a".to_owned(),
        };
        assert_ne!(left.storage_key(), right.storage_key());
        assert_ne!(left.storage_key(), sneaky.storage_key());
    }

    #[rstest]
    #[case(Some("Single".to_owned()), r#"[5,"Boarding Shotgun","Single"]"#)]
    #[case(None, r#"[5,"Boarding Shotgun",null]"#)]
    fn weapon_key_includes_mode(#[case] mode: Option<String>, #[case] expected: &str) {
        let key = WeaponKey {
            id: 5,
            name: "Boarding Shotgun".to_owned(),
            mode,
        };
        assert_eq!(key.storage_key(), expected);
    }
}
