//! Metadata document shape and the normalized reference records built from it.
//!
//! The document is decoded into transport structs with tolerant field
//! helpers, then normalized in one pass into [`MetadataSnapshot`], which is
//! what the store replaces wholesale.

use serde::Deserialize;
use serde_json::Value;

use super::coerce::{
    flag_or_false, int_or_zero, opaque, optional_int, optional_text, parse_document, records,
    text_or_empty,
};
use super::keys::{WeaponKey, keep_last_by_key};

/// A playable army grouping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Faction {
    /// Publisher faction id.
    pub id: i64,
    /// Parent faction id; equals `id` for a vanilla faction.
    pub parent_id: i64,
    /// Display name.
    pub name: String,
    /// URL slug.
    pub slug: String,
    /// Whether the publisher retired the faction.
    pub discontinued: bool,
    /// Logo URL.
    pub logo: Option<String>,
}

impl Faction {
    /// A vanilla faction is its own parent; sectorials point elsewhere.
    #[must_use]
    pub fn is_vanilla(&self) -> bool {
        self.parent_id == self.id
    }
}

/// Reference entry with an id, a name and an optional wiki link. Used for
/// ammunition, skills and equipment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceEntry {
    /// Publisher id.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Wiki URL.
    pub wiki: Option<String>,
}

/// One weapon fire-mode variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Weapon {
    /// Composite identity.
    pub key: WeaponKey,
    /// Publisher weapon category.
    pub weapon_type: Option<String>,
    /// Wiki URL.
    pub wiki: Option<String>,
    /// Ammunition reference id.
    pub ammunition: Option<i64>,
    /// Burst value as published.
    pub burst: Option<String>,
    /// Damage value as published.
    pub damage: Option<String>,
    /// Saving roll attribute.
    pub saving: Option<String>,
    /// Number of saving rolls.
    pub saving_num: Option<String>,
    /// Profile code.
    pub profile: Option<String>,
    /// Serialized `properties` array.
    pub properties_json: String,
    /// Serialized `distance` object, when present.
    pub distance_json: Option<String>,
}

/// A hacking program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HackProgram {
    /// Display name.
    pub name: String,
    /// Opponent modifier.
    pub opponent: Option<String>,
    /// Special rules text.
    pub special: Option<String>,
    /// Damage value.
    pub damage: Option<String>,
    /// Attack modifier.
    pub attack: Option<String>,
    /// Burst value.
    pub burst: Option<String>,
    /// Extra notes.
    pub extra: Option<String>,
    /// Serialized `skillType` array.
    pub skill_type_json: String,
    /// Serialized `devices` array.
    pub devices_json: String,
    /// Serialized `target` array.
    pub target_json: String,
}

/// A martial arts level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MartialArt {
    /// Display name.
    pub name: String,
    /// Opponent modifier.
    pub opponent: Option<String>,
    /// Damage modifier.
    pub damage: Option<String>,
    /// Attack modifier.
    pub attack: Option<String>,
    /// Burst modifier.
    pub burst: Option<String>,
}

/// Entry with an id, a name and a value text. Used for metachemistry and
/// booty tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValuedEntry {
    /// Publisher id.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Result text.
    pub value: Option<String>,
}

/// Every metadata table, normalized and ready to replace the stored copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataSnapshot {
    /// Factions.
    pub factions: Vec<Faction>,
    /// Ammunition types.
    pub ammunitions: Vec<ReferenceEntry>,
    /// Weapons, one row per fire mode.
    pub weapons: Vec<Weapon>,
    /// Skills.
    pub skills: Vec<ReferenceEntry>,
    /// Equipment.
    pub equips: Vec<ReferenceEntry>,
    /// Hacking programs.
    pub hack_programs: Vec<HackProgram>,
    /// Martial arts levels.
    pub martial_arts: Vec<MartialArt>,
    /// Metachemistry table.
    pub metachemistry: Vec<ValuedEntry>,
    /// Booty table.
    pub booty: Vec<ValuedEntry>,
}

/// Row counts per metadata table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataCounts {
    /// Factions.
    pub factions: usize,
    /// Ammunition types.
    pub ammunitions: usize,
    /// Weapons.
    pub weapons: usize,
    /// Skills.
    pub skills: usize,
    /// Equipment.
    pub equips: usize,
    /// Hacking programs.
    pub hack_programs: usize,
    /// Martial arts levels.
    pub martial_arts: usize,
    /// Metachemistry entries.
    pub metachemistry: usize,
    /// Booty entries.
    pub booty: usize,
}

impl MetadataSnapshot {
    /// Decode and normalize a metadata document.
    ///
    /// # Errors
    ///
    /// Returns a message when the document envelope does not match.
    pub fn from_json(json: &str) -> Result<Self, String> {
        parse_document::<MetadataDocument>(json).map(MetadataDocument::normalize)
    }

    /// Row counts of this snapshot.
    #[must_use]
    pub fn counts(&self) -> MetadataCounts {
        MetadataCounts {
            factions: self.factions.len(),
            ammunitions: self.ammunitions.len(),
            weapons: self.weapons.len(),
            skills: self.skills.len(),
            equips: self.equips.len(),
            hack_programs: self.hack_programs.len(),
            martial_arts: self.martial_arts.len(),
            metachemistry: self.metachemistry.len(),
            booty: self.booty.len(),
        }
    }

    /// Distinct positive faction ids in document order.
    #[must_use]
    pub fn faction_ids(&self) -> Vec<i64> {
        distinct_positive(self.factions.iter().map(|faction| faction.id))
    }
}

fn distinct_positive(ids: impl Iterator<Item = i64>) -> Vec<i64> {
    let mut seen = std::collections::HashSet::new();
    ids.filter(|id| *id > 0 && seen.insert(*id)).collect()
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetadataDocument {
    #[serde(default, deserialize_with = "records")]
    factions: Vec<FactionDto>,
    #[serde(default, deserialize_with = "records")]
    ammunitions: Vec<ReferenceDto>,
    #[serde(default, deserialize_with = "records")]
    weapons: Vec<WeaponDto>,
    #[serde(default, deserialize_with = "records")]
    skills: Vec<ReferenceDto>,
    #[serde(default, deserialize_with = "records")]
    equips: Vec<ReferenceDto>,
    #[serde(default, deserialize_with = "records")]
    hack: Vec<HackDto>,
    #[serde(default, deserialize_with = "records")]
    martial_arts: Vec<MartialArtDto>,
    #[serde(default, deserialize_with = "records")]
    metachemistry: Vec<ValuedDto>,
    #[serde(default, deserialize_with = "records")]
    booty: Vec<ValuedDto>,
}

#[derive(Debug, Deserialize)]
struct FactionDto {
    #[serde(default, deserialize_with = "int_or_zero")]
    id: i64,
    #[serde(default, deserialize_with = "int_or_zero")]
    parent: i64,
    #[serde(default, deserialize_with = "text_or_empty")]
    name: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    slug: String,
    #[serde(default, deserialize_with = "flag_or_false")]
    discontinued: bool,
    #[serde(default, deserialize_with = "optional_text")]
    logo: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReferenceDto {
    #[serde(default, deserialize_with = "int_or_zero")]
    id: i64,
    #[serde(default, deserialize_with = "text_or_empty")]
    name: String,
    #[serde(default, deserialize_with = "optional_text")]
    wiki: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WeaponDto {
    #[serde(default, deserialize_with = "int_or_zero")]
    id: i64,
    #[serde(rename = "type", default, deserialize_with = "optional_text")]
    weapon_type: Option<String>,
    #[serde(default, deserialize_with = "text_or_empty")]
    name: String,
    #[serde(default, deserialize_with = "optional_text")]
    mode: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    wiki: Option<String>,
    #[serde(default, deserialize_with = "optional_int")]
    ammunition: Option<i64>,
    #[serde(default, deserialize_with = "optional_text")]
    burst: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    damage: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    saving: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    saving_num: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    profile: Option<String>,
    #[serde(default, deserialize_with = "opaque")]
    properties: Option<Value>,
    #[serde(default, deserialize_with = "opaque")]
    distance: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HackDto {
    #[serde(default, deserialize_with = "text_or_empty")]
    name: String,
    #[serde(default, deserialize_with = "optional_text")]
    opponent: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    special: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    damage: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    attack: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    burst: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    extra: Option<String>,
    #[serde(default, deserialize_with = "opaque")]
    skill_type: Option<Value>,
    #[serde(default, deserialize_with = "opaque")]
    devices: Option<Value>,
    #[serde(default, deserialize_with = "opaque")]
    target: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct MartialArtDto {
    #[serde(default, deserialize_with = "text_or_empty")]
    name: String,
    #[serde(default, deserialize_with = "optional_text")]
    opponent: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    damage: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    attack: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    burst: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ValuedDto {
    #[serde(default, deserialize_with = "int_or_zero")]
    id: i64,
    #[serde(default, deserialize_with = "text_or_empty")]
    name: String,
    #[serde(default, deserialize_with = "optional_text")]
    value: Option<String>,
}

fn array_text(value: Option<Value>) -> String {
    value.unwrap_or_else(|| Value::Array(Vec::new())).to_string()
}

impl MetadataDocument {
    fn normalize(self) -> MetadataSnapshot {
        let factions: Vec<Faction> = self
            .factions
            .into_iter()
            .map(|dto| Faction {
                id: dto.id,
                parent_id: if dto.parent == 0 { dto.id } else { dto.parent },
                name: dto.name,
                slug: dto.slug,
                discontinued: dto.discontinued,
                logo: dto.logo,
            })
            .collect();
        let weapons: Vec<Weapon> = self
            .weapons
            .into_iter()
            .map(|dto| Weapon {
                key: WeaponKey {
                    id: dto.id,
                    name: dto.name,
                    mode: dto.mode,
                },
                weapon_type: dto.weapon_type,
                wiki: dto.wiki,
                ammunition: dto.ammunition,
                burst: dto.burst,
                damage: dto.damage,
                saving: dto.saving,
                saving_num: dto.saving_num,
                profile: dto.profile,
                properties_json: array_text(dto.properties),
                distance_json: dto.distance.map(|distance| distance.to_string()),
            })
            .collect();
        let hack_programs = self
            .hack
            .into_iter()
            .map(|dto| HackProgram {
                name: dto.name,
                opponent: dto.opponent,
                special: dto.special,
                damage: dto.damage,
                attack: dto.attack,
                burst: dto.burst,
                extra: dto.extra,
                skill_type_json: array_text(dto.skill_type),
                devices_json: array_text(dto.devices),
                target_json: array_text(dto.target),
            })
            .collect();
        let martial_arts = self
            .martial_arts
            .into_iter()
            .map(|dto| MartialArt {
                name: dto.name,
                opponent: dto.opponent,
                damage: dto.damage,
                attack: dto.attack,
                burst: dto.burst,
            })
            .collect();

        MetadataSnapshot {
            factions: keep_last_by_key(factions, |faction: &Faction| faction.id),
            ammunitions: references(self.ammunitions),
            weapons: keep_last_by_key(weapons, |weapon: &Weapon| weapon.key.clone()),
            skills: references(self.skills),
            equips: references(self.equips),
            hack_programs,
            martial_arts,
            metachemistry: valued(self.metachemistry),
            booty: valued(self.booty),
        }
    }
}

fn references(dtos: Vec<ReferenceDto>) -> Vec<ReferenceEntry> {
    let entries: Vec<ReferenceEntry> = dtos
        .into_iter()
        .map(|dto| ReferenceEntry {
            id: dto.id,
            name: dto.name,
            wiki: dto.wiki,
        })
        .collect();
    keep_last_by_key(entries, |entry: &ReferenceEntry| entry.id)
}

fn valued(dtos: Vec<ValuedDto>) -> Vec<ValuedEntry> {
    let entries: Vec<ValuedEntry> = dtos
        .into_iter()
        .map(|dto| ValuedEntry {
            id: dto.id,
            name: dto.name,
            value: dto.value,
        })
        .collect();
    keep_last_by_key(entries, |entry: &ValuedEntry| entry.id)
}
