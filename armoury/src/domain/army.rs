//! Per-faction army document shape and the rows derived from it.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::coerce::{
    int_or_zero, opaque, optional_int, optional_text, parse_document, records, text_or_empty,
};
use super::keys::{ResumeKey, UnitKey, keep_last_by_key};
use super::version::DottedVersion;

/// Stored copy of one faction's most recently imported army document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArmySnapshot {
    /// Faction the document belongs to.
    pub faction_id: i64,
    /// Publisher version string.
    pub version: String,
    /// When the document was imported.
    pub imported_at: DateTime<Utc>,
    /// The untouched document text.
    pub raw_json: String,
    /// `reinforcements` section.
    pub reinforcements_json: Option<String>,
    /// `filters` section: id to name tables used by the derived views.
    pub filters_json: Option<String>,
    /// `fireteams` section.
    pub fireteams_json: Option<String>,
    /// `relations` section.
    pub relations_json: Option<String>,
    /// `specops` section.
    pub specops_json: Option<String>,
    /// `fireteamChart` section.
    pub fireteam_chart_json: Option<String>,
}

impl ArmySnapshot {
    /// Parsed version of this snapshot.
    #[must_use]
    pub fn dotted_version(&self) -> DottedVersion {
        DottedVersion::parse(&self.version)
    }
}

/// One unit of a faction, with its profile data kept as JSON text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArmyUnit {
    /// Composite identity.
    pub key: UnitKey,
    /// Canonical unit id shared across factions.
    pub canonical: i64,
    /// ISC name.
    pub isc: String,
    /// Abbreviated ISC.
    pub isc_abbr: Option<String>,
    /// Display name.
    pub name: String,
    /// Serialized `profileGroups` array.
    pub profile_groups_json: String,
    /// Serialized `options` section, when present.
    pub options_json: Option<String>,
    /// Serialized per-unit `filters`, when present.
    pub filters_json: Option<String>,
    /// Serialized `factions` availability list.
    pub factions_json: String,
}

impl ArmyUnit {
    /// Publisher unit id.
    #[must_use]
    pub fn unit_id(&self) -> i64 {
        self.key.unit_id
    }

    /// Unit slug.
    #[must_use]
    pub fn slug(&self) -> &str {
        &self.key.slug
    }
}

/// Lightweight listing row for one unit.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArmyResume {
    /// Composite identity.
    #[serde(skip)]
    pub key: ResumeKey,
    /// Army sub-document id.
    pub id_army: Option<i64>,
    /// ISC name.
    pub isc: String,
    /// Display name.
    pub name: String,
    /// Logo URL.
    pub logo: Option<String>,
    /// Unit type code, resolved through the `type` filter table.
    pub unit_type: Option<i64>,
    /// Category code, resolved through the `category` filter table.
    pub category: Option<i64>,
}

/// Everything one army import writes for a faction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArmyImport {
    /// The snapshot row.
    pub snapshot: ArmySnapshot,
    /// Derived unit rows.
    pub units: Vec<ArmyUnit>,
    /// Derived resume rows.
    pub resume: Vec<ArmyResume>,
}

impl ArmyImport {
    /// Decode an army document and derive the rows stored for `faction_id`.
    ///
    /// # Errors
    ///
    /// Returns a message when the document envelope does not match.
    pub fn from_json(
        faction_id: i64,
        json: &str,
        imported_at: DateTime<Utc>,
    ) -> Result<Self, String> {
        let document = parse_document::<ArmyDocument>(json)?;
        Ok(document.derive(faction_id, json, imported_at))
    }
}

/// Read only the `version` field of an army document.
///
/// # Errors
///
/// Returns a message when the text is not a JSON object.
pub fn version_from_json(json: &str) -> Result<DottedVersion, String> {
    parse_document::<VersionProbe>(json).map(|probe| DottedVersion::parse(&probe.version))
}

#[derive(Debug, Deserialize)]
struct VersionProbe {
    #[serde(default, deserialize_with = "text_or_empty")]
    version: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArmyDocument {
    #[serde(default, deserialize_with = "text_or_empty")]
    version: String,
    #[serde(default, deserialize_with = "records")]
    units: Vec<UnitDto>,
    #[serde(default, deserialize_with = "records")]
    resume: Vec<ResumeDto>,
    #[serde(default, deserialize_with = "opaque")]
    reinforcements: Option<Value>,
    #[serde(default, deserialize_with = "opaque")]
    filters: Option<Value>,
    #[serde(default, deserialize_with = "opaque")]
    fireteams: Option<Value>,
    #[serde(default, deserialize_with = "opaque")]
    relations: Option<Value>,
    #[serde(default, deserialize_with = "opaque")]
    specops: Option<Value>,
    #[serde(default, deserialize_with = "opaque")]
    fireteam_chart: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnitDto {
    #[serde(default, deserialize_with = "int_or_zero")]
    id: i64,
    #[serde(default, deserialize_with = "optional_int")]
    id_army: Option<i64>,
    #[serde(default, deserialize_with = "int_or_zero")]
    canonical: i64,
    #[serde(default, deserialize_with = "text_or_empty")]
    isc: String,
    #[serde(default, deserialize_with = "optional_text")]
    isc_abbr: Option<String>,
    #[serde(default, deserialize_with = "text_or_empty")]
    name: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    slug: String,
    #[serde(default, deserialize_with = "opaque")]
    profile_groups: Option<Value>,
    #[serde(default, deserialize_with = "opaque")]
    options: Option<Value>,
    #[serde(default, deserialize_with = "opaque")]
    filters: Option<Value>,
    #[serde(default, deserialize_with = "opaque")]
    factions: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResumeDto {
    #[serde(default, deserialize_with = "int_or_zero")]
    id: i64,
    #[serde(default, deserialize_with = "text_or_empty")]
    isc: String,
    #[serde(default, deserialize_with = "optional_int")]
    id_army: Option<i64>,
    #[serde(default, deserialize_with = "text_or_empty")]
    name: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    slug: String,
    #[serde(default, deserialize_with = "optional_text")]
    logo: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "optional_int")]
    unit_type: Option<i64>,
    #[serde(default, deserialize_with = "optional_int")]
    category: Option<i64>,
}

fn section_text(section: Option<Value>) -> Option<String> {
    section.map(|value| value.to_string())
}

fn array_text(section: Option<Value>) -> String {
    section
        .unwrap_or_else(|| Value::Array(Vec::new()))
        .to_string()
}

impl ArmyDocument {
    fn derive(self, faction_id: i64, raw_json: &str, imported_at: DateTime<Utc>) -> ArmyImport {
        let units: Vec<ArmyUnit> = self
            .units
            .into_iter()
            .map(|dto| ArmyUnit {
                key: UnitKey {
                    faction_id,
                    unit_id: dto.id,
                    id_army: dto.id_army,
                    slug: dto.slug,
                },
                canonical: dto.canonical,
                isc: dto.isc,
                isc_abbr: dto.isc_abbr,
                name: dto.name,
                profile_groups_json: array_text(dto.profile_groups),
                options_json: section_text(dto.options),
                filters_json: section_text(dto.filters),
                factions_json: array_text(dto.factions),
            })
            .collect();
        let resume: Vec<ArmyResume> = self
            .resume
            .into_iter()
            .map(|dto| ArmyResume {
                key: ResumeKey {
                    faction_id,
                    unit_id: dto.id,
                    slug: dto.slug,
                },
                id_army: dto.id_army,
                isc: dto.isc,
                name: dto.name,
                logo: dto.logo,
                unit_type: dto.unit_type,
                category: dto.category,
            })
            .collect();

        ArmyImport {
            snapshot: ArmySnapshot {
                faction_id,
                version: self.version.trim().to_owned(),
                imported_at,
                raw_json: raw_json.to_owned(),
                reinforcements_json: section_text(self.reinforcements),
                filters_json: section_text(self.filters),
                fireteams_json: section_text(self.fireteams),
                relations_json: section_text(self.relations),
                specops_json: section_text(self.specops),
                fireteam_chart_json: section_text(self.fireteam_chart),
            },
            units: keep_last_by_key(units, |unit: &ArmyUnit| unit.key.clone()),
            resume: keep_last_by_key(resume, |row: &ArmyResume| row.key.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Derivation of snapshot, unit and resume rows.

    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn imported_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
            .single()
            .expect("valid fixture timestamp")
    }

    #[fixture]
    fn document() -> String {
        json!({
            "version": " 1.0.0 ",
            "units": [
                { "id": 101, "canonical": 101, "isc": "Fusiliers", "name": "FUSILIERS", "slug": "fusiliers", "profileGroups": [{ "id": 1 }] },
                { "id": "101", "idArmy": 4, "isc": "Fusiliers", "name": "FUSILIERS", "slug": "fusiliers" },
                { "id": 102, "isc": "Bulleteer", "name": "BULLETEER", "slug": "bulleteer", "factions": [10, 20] }
            ],
            "resume": [
                { "id": 101, "isc": "Fusiliers", "idArmy": 4, "name": "FUSILIERS", "slug": "fusiliers", "type": 1, "category": "10" },
                { "id": 101, "isc": "Fusiliers", "name": "FUSILIERS", "slug": "fusiliers", "logo": "https://assets.example/101.svg" }
            ],
            "filters": { "equip": [{ "id": 1, "name": "Combi Rifle" }] },
            "fireteamChart": { "spec": {} },
            "specops": null
        })
        .to_string()
    }

    #[rstest]
    fn derives_rows_keyed_by_composite_identity(document: String, imported_at: DateTime<Utc>) {
        let import = ArmyImport::from_json(10, &document, imported_at).expect("document decodes");

        assert_eq!(import.units.len(), 3, "idArmy separates otherwise equal units");
        assert_eq!(import.resume.len(), 1, "resume keys ignore idArmy");
        assert_eq!(
            import.resume[0].logo.as_deref(),
            Some("https://assets.example/101.svg"),
            "last duplicate resume row wins"
        );
        assert_eq!(import.units[1].key.id_army, Some(4));
        assert_eq!(import.units[2].factions_json, "[10,20]");
        assert_eq!(import.units[2].profile_groups_json, "[]");
    }

    #[rstest]
    fn snapshot_preserves_raw_document_and_sections(document: String, imported_at: DateTime<Utc>) {
        let import = ArmyImport::from_json(10, &document, imported_at).expect("document decodes");
        let snapshot = import.snapshot;

        assert_eq!(snapshot.raw_json, document);
        assert_eq!(snapshot.version, "1.0.0");
        assert_eq!(snapshot.imported_at, imported_at);
        assert!(snapshot.filters_json.is_some());
        assert_eq!(snapshot.fireteam_chart_json.as_deref(), Some(r#"{"spec":{}}"#));
        assert_eq!(snapshot.specops_json, None, "null sections are absent");
        assert_eq!(snapshot.reinforcements_json, None);
    }

    #[rstest]
    #[case(r#"{ "version": "2.1" }"#, "2.1")]
    #[case(r#"{ "version": 3 }"#, "3")]
    #[case(r#"{ "units": [] }"#, "")]
    fn probes_version(#[case] json: &str, #[case] expected: &str) {
        assert_eq!(version_from_json(json).expect("probe decodes").as_str(), expected);
    }

    #[rstest]
    fn rejects_non_object_documents(imported_at: DateTime<Utc>) {
        assert!(ArmyImport::from_json(10, "\"units\"", imported_at).is_err());
        assert!(version_from_json("[]").is_err());
    }
}
