//! Tolerant coercion of loosely typed publisher JSON.
//!
//! The publisher mixes representations across releases: integers arrive as
//! numbers or numeric strings, flags as booleans or `0`/`1`, and any field
//! may be `null` or missing. Nothing in this module fails on a malformed
//! scalar; it degrades to the documented default instead. The only hard
//! failure is [`records`], which rejects a top-level collection that is
//! present but not an array, since that means the document envelope itself
//! is wrong.
//!
//! Field helpers are meant for `#[serde(default, deserialize_with = ...)]`.

use serde::de::{DeserializeOwned, Deserializer, Error as _};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Read an integer from a JSON value.
///
/// Accepts integers, floats with an integral value, and numeric strings
/// (surrounding whitespace ignored). Everything else yields `None`.
///
/// # Examples
/// ```
/// use armoury::domain::coerce::int_from_value;
/// use serde_json::json;
///
/// assert_eq!(int_from_value(&json!(" 42 ")), Some(42));
/// assert_eq!(int_from_value(&json!(7.0)), Some(7));
/// assert_eq!(int_from_value(&json!("x")), None);
/// ```
#[must_use]
pub fn int_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| integral_float(number.as_f64()?)),
        Value::String(text) => {
            let trimmed = text.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| integral_float(trimmed.parse::<f64>().ok()?))
        }
        _ => None,
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "value is integral and range-checked before the cast"
)]
fn integral_float(value: f64) -> Option<i64> {
    const LIMIT: f64 = 9_007_199_254_740_992.0;
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= LIMIT {
        Some(value as i64)
    } else {
        None
    }
}

/// Render a scalar JSON value as text.
///
/// Strings pass through, numbers and booleans are rendered, and
/// null/arrays/objects yield `None`.
#[must_use]
pub fn text_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Read a flag from a JSON value: booleans, `0`/`1`, or `"true"`/`"false"`.
#[must_use]
pub fn bool_from_value(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            other => other.parse::<i64>().ok().map(|number| number != 0),
        },
        other => int_from_value(other).map(|number| number != 0),
    }
}

/// Required integer: malformed, null, or missing becomes `0`.
///
/// # Errors
///
/// Never fails for well-formed JSON input.
pub fn int_or_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(int_from_value).unwrap_or(0))
}

/// Optional integer: malformed, null, or missing becomes `None`.
///
/// # Errors
///
/// Never fails for well-formed JSON input.
pub fn optional_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(int_from_value))
}

/// Required text: numbers and booleans are rendered, anything else is empty.
///
/// # Errors
///
/// Never fails for well-formed JSON input.
pub fn text_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(text_from_value).unwrap_or_default())
}

/// Optional text: blank strings collapse to `None`.
///
/// # Errors
///
/// Never fails for well-formed JSON input.
pub fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(text_from_value)
        .filter(|text| !text.trim().is_empty()))
}

/// Flag that defaults to `false`.
///
/// # Errors
///
/// Never fails for well-formed JSON input.
pub fn flag_or_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(bool_from_value).unwrap_or(false))
}

/// Opaque nested JSON: `null` is treated as absent.
///
/// # Errors
///
/// Never fails for well-formed JSON input.
pub fn opaque<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.filter(|inner| !inner.is_null()))
}

/// Top-level record collection.
///
/// `null` or missing becomes empty, elements that do not decode are skipped,
/// and a present non-array value is rejected.
///
/// # Errors
///
/// Returns a deserialization error when the collection is neither an array
/// nor `null`.
pub fn records<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<T>(item) {
                Ok(record) => Some(record),
                Err(error) => {
                    debug!(%error, "skipping undecodable record");
                    None
                }
            })
            .collect()),
        Some(other) => Err(D::Error::custom(format!(
            "expected an array of records, found {}",
            json_kind(&other)
        ))),
    }
}

/// Decode a whole document, requiring a JSON object at the top level.
///
/// # Errors
///
/// Returns a message when the text is not JSON, is not an object, or one of
/// its collections is not an array.
pub fn parse_document<T>(json: &str) -> Result<T, String>
where
    T: DeserializeOwned,
{
    let value: Value =
        serde_json::from_str(json).map_err(|error| format!("document is not valid JSON: {error}"))?;
    if !value.is_object() {
        return Err(format!(
            "document must be a JSON object, found {}",
            json_kind(&value)
        ));
    }
    serde_json::from_value(value).map_err(|error| format!("document envelope mismatch: {error}"))
}

/// Name a JSON value's kind for messages.
#[must_use]
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    //! Coverage for tolerant scalar decoding.

    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "int_or_zero")]
        required: i64,
        #[serde(default, deserialize_with = "optional_int")]
        optional: Option<i64>,
        #[serde(default, deserialize_with = "text_or_empty")]
        label: String,
        #[serde(default, deserialize_with = "flag_or_false")]
        flag: bool,
    }

    fn probe(value: Value) -> Probe {
        serde_json::from_value(value).expect("probe decodes")
    }

    #[rstest]
    #[case::integer(json!(12), Some(12))]
    #[case::numeric_string(json!("12"), Some(12))]
    #[case::padded_string(json!(" -3 "), Some(-3))]
    #[case::integral_float(json!(4.0), Some(4))]
    #[case::fractional_float(json!(4.5), None)]
    #[case::empty_string(json!(""), None)]
    #[case::word(json!("abc"), None)]
    #[case::null(Value::Null, None)]
    #[case::boolean(json!(true), None)]
    #[case::array(json!([1]), None)]
    fn int_from_value_cases(#[case] value: Value, #[case] expected: Option<i64>) {
        assert_eq!(int_from_value(&value), expected);
    }

    #[rstest]
    #[case::empty_string(json!({ "required": "", "optional": "" }))]
    #[case::non_numeric(json!({ "required": "n/a", "optional": "n/a" }))]
    #[case::null(json!({ "required": null, "optional": null }))]
    #[case::absent(json!({}))]
    fn malformed_integers_default_without_failing(#[case] value: Value) {
        let decoded = probe(value);
        assert_eq!(decoded.required, 0);
        assert_eq!(decoded.optional, None);
    }

    #[rstest]
    fn numeric_strings_decode_into_integers() {
        let decoded = probe(json!({ "required": "7", "optional": "9" }));
        assert_eq!(decoded.required, 7);
        assert_eq!(decoded.optional, Some(9));
    }

    #[rstest]
    #[case::number(json!({ "label": 13 }), "13")]
    #[case::string(json!({ "label": "PS" }), "PS")]
    #[case::object(json!({ "label": { "a": 1 } }), "")]
    fn text_is_rendered_or_defaulted(#[case] value: Value, #[case] expected: &str) {
        assert_eq!(probe(value).label, expected);
    }

    #[rstest]
    #[case::boolean(json!(true), true)]
    #[case::one(json!(1), true)]
    #[case::zero_string(json!("0"), false)]
    #[case::word(json!("TRUE"), true)]
    #[case::garbage(json!("maybe"), false)]
    fn flags_are_tolerant(#[case] flag: Value, #[case] expected: bool) {
        assert_eq!(probe(json!({ "flag": flag })).flag, expected);
    }

    #[derive(Debug, Deserialize)]
    struct Envelope {
        #[serde(default, deserialize_with = "records")]
        items: Vec<Probe>,
    }

    #[rstest]
    fn records_skip_undecodable_elements() {
        let envelope: Envelope =
            serde_json::from_value(json!({ "items": [{ "required": 1 }, 5, null] }))
                .expect("envelope decodes");
        assert_eq!(envelope.items.len(), 1);
    }

    #[rstest]
    fn records_reject_non_array_collections() {
        let result = serde_json::from_value::<Envelope>(json!({ "items": "nope" }));
        assert!(result.is_err());
    }

    #[rstest]
    fn records_default_to_empty_when_missing_or_null() {
        let missing: Envelope = serde_json::from_value(json!({})).expect("decodes");
        let null: Envelope = serde_json::from_value(json!({ "items": null })).expect("decodes");
        assert!(missing.items.is_empty());
        assert!(null.items.is_empty());
    }
}
