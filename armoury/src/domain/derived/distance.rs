//! Centimetre to inch conversion for displayed distances.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::constant_regex;
use crate::domain::DisplayUnits;

static CENTIMETRES: LazyLock<Regex> =
    LazyLock::new(|| constant_regex(r"([+-]?)(\d+(?:\.\d+)?)\s*cm"));

/// Convert centimetres to whole inches: divide by 2.5 and round half away
/// from zero.
///
/// # Examples
/// ```
/// use armoury::domain::derived::cm_to_inches;
///
/// assert_eq!(cm_to_inches(10.0), 4);
/// assert_eq!(cm_to_inches(13.0), 5);
/// assert_eq!(cm_to_inches(-13.0), -5);
/// ```
#[expect(
    clippy::cast_possible_truncation,
    reason = "tabletop distances are far inside the i64 range"
)]
#[must_use]
pub fn cm_to_inches(centimetres: f64) -> i64 {
    (centimetres / 2.5).round() as i64
}

/// Render a centimetre distance in the chosen unit, without suffix.
#[must_use]
pub fn format_distance(centimetres: i64, units: DisplayUnits) -> String {
    match units {
        DisplayUnits::Centimeters => centimetres.to_string(),
        #[expect(clippy::cast_precision_loss, reason = "small tabletop distances")]
        DisplayUnits::Inches => cm_to_inches(centimetres as f64).to_string(),
    }
}

/// Rewrite every `<number> cm` token of `text` in the chosen unit.
///
/// Inches keep the sign and drop the unit, so `+5 cm` becomes `+2`.
/// Centimetres leave the text unchanged.
///
/// # Examples
/// ```
/// use armoury::domain::DisplayUnits;
/// use armoury::domain::derived::convert_distance_text;
///
/// assert_eq!(convert_distance_text("MOV +5 cm", DisplayUnits::Inches), "MOV +2");
/// assert_eq!(convert_distance_text("-13 cm", DisplayUnits::Inches), "-5");
/// ```
#[must_use]
pub fn convert_distance_text(text: &str, units: DisplayUnits) -> String {
    if units == DisplayUnits::Centimeters {
        return text.to_owned();
    }
    CENTIMETRES
        .replace_all(text, |captures: &Captures<'_>| {
            let sign = captures.get(1).map_or("", |matched| matched.as_str());
            let magnitude = captures
                .get(2)
                .and_then(|matched| matched.as_str().parse::<f64>().ok())
                .unwrap_or(0.0);
            format!("{sign}{}", cm_to_inches(magnitude))
        })
        .into_owned()
}
