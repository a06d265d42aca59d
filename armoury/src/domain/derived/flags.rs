//! Boolean trait flags detected from normalized names and order types.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use super::constant_regex;
use crate::domain::coerce::text_from_value;

struct Patterns {
    hackable: Regex,
    not_hackable: Regex,
    cube2: Regex,
    cube: Regex,
    no_cube: Regex,
    impetuous: Regex,
}

static PATTERNS: LazyLock<Patterns> = LazyLock::new(|| Patterns {
    hackable: constant_regex(r"\bhackable\b"),
    not_hackable: constant_regex(r"\b(non|not|un) ?hackable\b"),
    cube2: constant_regex(r"\bcube ?2\b"),
    cube: constant_regex(r"\bcube\b"),
    no_cube: constant_regex(r"\b(no|without) cube\b"),
    impetuous: constant_regex(r"\b(extremely )?impetuous\b"),
});

/// Lower-case `name`, replace every non-alphanumeric character with a
/// space and collapse runs of whitespace.
///
/// # Examples
/// ```
/// use armoury::domain::derived::normalize_name;
///
/// assert_eq!(normalize_name("Non-Hackable"), "non hackable");
/// assert_eq!(normalize_name("  CUBE 2.0 "), "cube 2 0");
/// ```
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .map(|character| if character.is_alphanumeric() { character } else { ' ' })
        .flat_map(char::to_lowercase)
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Order types granted by a unit option.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OrderFlags {
    /// `REGULAR`.
    pub regular: bool,
    /// `IRREGULAR`.
    pub irregular: bool,
    /// `IMPETUOUS`.
    pub impetuous: bool,
    /// `TACTICAL`.
    pub tactical: bool,
}

impl OrderFlags {
    /// Read `orders[].type` from one option.
    #[must_use]
    pub fn from_option(option: &Value) -> Self {
        let mut flags = Self::default();
        let orders = option.get("orders").and_then(Value::as_array);
        for order_type in orders
            .into_iter()
            .flatten()
            .filter_map(|order| order.get("type").and_then(text_from_value))
        {
            match order_type.trim().to_ascii_uppercase().as_str() {
                "REGULAR" => flags.regular = true,
                "IRREGULAR" => flags.irregular = true,
                "IMPETUOUS" => flags.impetuous = true,
                "TACTICAL" => flags.tactical = true,
                _ => {}
            }
        }
        flags
    }

    /// Flags of the first option, across all groups, that lists any orders.
    #[must_use]
    pub fn from_profile_groups(groups: &Value) -> Self {
        groups
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|group| group.get("options").and_then(Value::as_array))
            .flatten()
            .find(|option| {
                option
                    .get("orders")
                    .and_then(Value::as_array)
                    .is_some_and(|orders| !orders.is_empty())
            })
            .map(Self::from_option)
            .unwrap_or_default()
    }
}

/// Flags shown next to a unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraitFlags {
    /// Hackable, without a negation.
    pub hackable: bool,
    /// Cube 2.0.
    pub cube2: bool,
    /// Plain cube, unless a `no cube` / `without cube` name is present.
    pub cube: bool,
    /// Impetuous by order type or trait name.
    pub impetuous: bool,
    /// Order types.
    pub orders: OrderFlags,
}

impl TraitFlags {
    /// Detect flags from equipment, skill and characteristic names plus the
    /// unit's order types.
    #[must_use]
    pub fn detect<'a>(names: impl IntoIterator<Item = &'a str>, orders: OrderFlags) -> Self {
        let patterns = &*PATTERNS;
        let normalized: Vec<String> = names.into_iter().map(normalize_name).collect();
        let any = |predicate: &dyn Fn(&str) -> bool| normalized.iter().any(|name| predicate(name));

        let cube_negated = any(&|name| patterns.no_cube.is_match(name));
        Self {
            hackable: any(&|name| {
                patterns.hackable.is_match(name) && !patterns.not_hackable.is_match(name)
            }),
            cube2: any(&|name| patterns.cube2.is_match(name)),
            cube: !cube_negated
                && any(&|name| patterns.cube.is_match(name) && !patterns.cube2.is_match(name)),
            impetuous: orders.impetuous || any(&|name| patterns.impetuous.is_match(name)),
            orders,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("Non-Hackable", "non hackable")]
    #[case("  CUBE 2.0 ", "cube 2 0")]
    #[case("ÉLITE Ñandú", "élite ñandú")]
    #[case("Σκύλος", "σκύλος")]
    fn normalizes_names(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_name(raw), expected);
    }

    #[rstest]
    fn patterns_compile() {
        let patterns = LazyLock::force(&PATTERNS);
        assert!(patterns.impetuous.is_match("extremely impetuous"));
    }

    fn detect(names: &[&str]) -> TraitFlags {
        TraitFlags::detect(names.iter().copied(), OrderFlags::default())
    }

    #[rstest]
    #[case(&["Hackable"], true)]
    #[case(&["Non-Hackable"], false)]
    #[case(&["not hackable"], false)]
    #[case(&["Unhackable"], false)]
    #[case(&["Hacker"], false)]
    fn hackable_respects_negation(#[case] names: &[&str], #[case] expected: bool) {
        assert_eq!(detect(names).hackable, expected);
    }

    #[rstest]
    #[case(&["Cube"], false, true)]
    #[case(&["CUBE 2.0"], true, false)]
    #[case(&["Cube2"], true, false)]
    #[case(&["Cube", "No Cube"], false, false)]
    #[case(&["Cube", "Without Cube"], false, false)]
    #[case(&["Cubevo"], false, false)]
    fn cube_tiers(#[case] names: &[&str], #[case] cube2: bool, #[case] cube: bool) {
        let flags = detect(names);
        assert_eq!(flags.cube2, cube2);
        assert_eq!(flags.cube, cube);
    }

    #[rstest]
    #[case(&["Extremely Impetuous"], true)]
    #[case(&["Impetuous"], true)]
    #[case(&["Frenzy"], false)]
    fn impetuous_from_names(#[case] names: &[&str], #[case] expected: bool) {
        assert_eq!(detect(names).impetuous, expected);
    }

    #[rstest]
    fn orders_come_from_first_option_listing_them() {
        let groups = json!([{ "options": [
            { "id": 1, "orders": [] },
            { "id": 2, "orders": [{ "type": "IRREGULAR" }, { "type": "impetuous" }] },
            { "id": 3, "orders": [{ "type": "REGULAR" }] }
        ] }]);

        let orders = OrderFlags::from_profile_groups(&groups);

        assert!(orders.irregular);
        assert!(orders.impetuous);
        assert!(!orders.regular);
        assert!(TraitFlags::detect(std::iter::empty(), orders).impetuous);
    }

    #[rstest]
    fn missing_orders_give_no_flags() {
        assert_eq!(OrderFlags::from_profile_groups(&json!(null)), OrderFlags::default());
    }
}
