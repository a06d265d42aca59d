//! Read-time views derived from stored army documents.
//!
//! Everything here is a pure function over JSON text kept by the army
//! importer. Malformed input degrades to empty results.

mod distance;
mod flags;
mod lookups;
mod stats;
mod traits;
mod view;

pub use distance::{cm_to_inches, convert_distance_text, format_distance};
pub use flags::{OrderFlags, TraitFlags, normalize_name};
pub use lookups::{FilterTables, NameLookup, id_name_map, section_lookup};
pub use stats::{TOTAL_AVAILABILITY, UnitStatBlock, Vitality};
pub use traits::{CommonTraits, TraitKind, common_names, entry_names};
pub use view::UnitView;

use regex::Regex;

/// Compile one of the module's constant patterns.
///
/// # Panics
///
/// Panics when `pattern` is not a valid regular expression.
#[expect(
    clippy::expect_used,
    reason = "patterns are string constants; a bad one must fail on first use"
)]
fn constant_regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid regex")
}
