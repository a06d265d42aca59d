//! Application settings keys and the display unit preference.

use serde::{Deserialize, Serialize};

/// Setting holding the RFC 3339 UTC time of the last sync attempt.
pub const LAST_SYNC_ATTEMPT_KEY: &str = "startup_update_last_attempt_utc";

/// Setting holding the preferred distance unit.
pub const DISPLAY_UNITS_KEY: &str = "display_units";

/// Distance unit used when rendering derived views.
///
/// # Examples
/// ```
/// use armoury::domain::DisplayUnits;
///
/// assert_eq!(DisplayUnits::default(), DisplayUnits::Inches);
/// assert_eq!("centimeters".parse::<DisplayUnits>(), Ok(DisplayUnits::Centimeters));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DisplayUnits {
    /// Tabletop inches; publisher centimetres are divided by 2.5.
    #[default]
    Inches,
    /// Publisher centimetres, unchanged.
    Centimeters,
}

impl DisplayUnits {
    /// Stored string form.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inches => "inches",
            Self::Centimeters => "centimeters",
        }
    }

    /// Resolve a stored setting, falling back to inches when absent or
    /// unrecognised.
    #[must_use]
    pub fn from_setting(value: Option<&str>) -> Self {
        value
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or_default()
    }

    /// Suffix appended to rendered distances.
    #[must_use]
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Inches => "\"",
            Self::Centimeters => " cm",
        }
    }
}

impl std::fmt::Display for DisplayUnits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown display unit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown display units: {input}")]
pub struct ParseDisplayUnitsError {
    /// The unrecognised input value.
    pub input: String,
}

impl std::str::FromStr for DisplayUnits {
    type Err = ParseDisplayUnitsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inches" => Ok(Self::Inches),
            "centimeters" => Ok(Self::Centimeters),
            _ => Err(ParseDisplayUnitsError {
                input: s.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, DisplayUnits::Inches)]
    #[case(Some("centimeters"), DisplayUnits::Centimeters)]
    #[case(Some(" inches "), DisplayUnits::Inches)]
    #[case(Some("furlongs"), DisplayUnits::Inches)]
    fn resolves_stored_setting(#[case] stored: Option<&str>, #[case] expected: DisplayUnits) {
        assert_eq!(DisplayUnits::from_setting(stored), expected);
    }

    #[rstest]
    fn rejects_unknown_units() {
        let err = "metres".parse::<DisplayUnits>().expect_err("unknown unit");
        assert_eq!(err.to_string(), "unknown display units: metres");
    }
}
