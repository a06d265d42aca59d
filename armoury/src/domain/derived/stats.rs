//! Stat block of a unit's first profile.

use serde::Serialize;
use serde_json::Value;

use super::distance::format_distance;
use crate::domain::DisplayUnits;
use crate::domain::coerce::int_from_value;

/// Availability value the publisher uses for "no limit".
pub const TOTAL_AVAILABILITY: i64 = 255;

/// Field names tried in order for the vitality attribute, with their labels.
const VITALITY_FIELDS: [(&str, &str); 3] = [("str", "STR"), ("w", "W"), ("vita", "VITA")];

/// Wounds or structure of a profile; the label follows the field present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vitality {
    /// `STR`, `W` or `VITA`.
    pub label: &'static str,
    /// Attribute value.
    pub value: i64,
}

/// Attributes read from one profile. Absent or malformed values are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitStatBlock {
    /// Movement pair in centimetres.
    pub movement: Option<(i64, i64)>,
    /// Close combat.
    pub cc: Option<i64>,
    /// Ballistic skill.
    pub bs: Option<i64>,
    /// Physique.
    pub ph: Option<i64>,
    /// Willpower.
    pub wip: Option<i64>,
    /// Armour.
    pub arm: Option<i64>,
    /// Biotechnological shield.
    pub bts: Option<i64>,
    /// Wounds or structure.
    pub vitality: Option<Vitality>,
    /// Silhouette.
    pub silhouette: Option<i64>,
    /// Availability.
    pub availability: Option<i64>,
}

impl UnitStatBlock {
    /// Read the stat block from a profile or option object.
    #[must_use]
    pub fn from_profile(profile: &Value) -> Self {
        let int = |field: &str| profile.get(field).and_then(int_from_value);
        Self {
            movement: movement_pair(profile.get("move")),
            cc: int("cc"),
            bs: int("bs"),
            ph: int("ph"),
            wip: int("wip"),
            arm: int("arm"),
            bts: int("bts"),
            vitality: VITALITY_FIELDS.iter().find_map(|&(field, label)| {
                int(field).map(|value| Vitality { label, value })
            }),
            silhouette: int("s"),
            availability: int("ava"),
        }
    }

    /// Stat block of the first profile in a unit's profile groups.
    ///
    /// Uses the first group's first `profiles` entry, falling back to its
    /// first `options` entry when the profile list is absent or empty. Returns `None` when
    /// neither exists or the JSON does not parse.
    #[must_use]
    pub fn from_profile_groups(profile_groups_json: &str) -> Option<Self> {
        let groups: Value = serde_json::from_str(profile_groups_json).ok()?;
        first_profile(&groups).map(Self::from_profile)
    }

    /// Availability for display: `Total` for the unlimited marker.
    ///
    /// # Examples
    /// ```
    /// use armoury::domain::derived::UnitStatBlock;
    ///
    /// let stats = UnitStatBlock { availability: Some(255), ..UnitStatBlock::default() };
    /// assert_eq!(stats.availability_display().as_deref(), Some("Total"));
    /// ```
    #[must_use]
    pub fn availability_display(&self) -> Option<String> {
        self.availability.map(|value| {
            if value == TOTAL_AVAILABILITY {
                "Total".to_owned()
            } else {
                value.to_string()
            }
        })
    }

    /// Movement pair such as `4-2`, converted to `units`.
    #[must_use]
    pub fn movement_display(&self, units: DisplayUnits) -> Option<String> {
        self.movement.map(|(first, second)| {
            format!(
                "{}-{}",
                format_distance(first, units),
                format_distance(second, units)
            )
        })
    }
}

/// First profile of the first group, or its first option as fallback.
pub(crate) fn first_profile(groups: &Value) -> Option<&Value> {
    let group = groups.as_array()?.first()?;
    let from = |key: &str| group.get(key).and_then(Value::as_array).and_then(|items| items.first());
    from("profiles").or_else(|| from("options"))
}

fn movement_pair(value: Option<&Value>) -> Option<(i64, i64)> {
    let components = value?.as_array()?;
    let first = components.first().and_then(int_from_value)?;
    let second = components.get(1).and_then(int_from_value)?;
    Some((first, second))
}
