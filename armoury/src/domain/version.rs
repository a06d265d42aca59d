//! Dotted version strings used to gate army imports.

use std::cmp::Ordering;
use std::fmt;

/// A publisher version such as `1.2.0`, compared segment by segment.
///
/// Segments are parsed as unsigned integers; a segment that is not numeric
/// counts as `0`, and missing trailing segments count as `0`, so `1.2` and
/// `1.2.0` are equal.
///
/// # Examples
/// ```
/// use armoury::domain::DottedVersion;
///
/// let stored = DottedVersion::parse("1.1.9");
/// let remote = DottedVersion::parse("1.2.0");
/// assert!(remote > stored);
/// ```
#[derive(Debug, Clone, Eq)]
pub struct DottedVersion {
    raw: String,
    segments: Vec<u64>,
}

impl DottedVersion {
    /// Parse a version string. Blank input yields an empty version.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let segments = if trimmed.is_empty() {
            Vec::new()
        } else {
            trimmed
                .split('.')
                .map(|segment| segment.trim().parse::<u64>().unwrap_or(0))
                .collect()
        };
        Self {
            raw: trimmed.to_owned(),
            segments,
        }
    }

    /// The trimmed source text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether the source text was blank.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.raw.is_empty()
    }

    /// Whether `self` is strictly newer than `other`.
    #[must_use]
    pub fn is_newer_than(&self, other: &Self) -> bool {
        self > other
    }
}

impl Ord for DottedVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let width = self.segments.len().max(other.segments.len());
        (0..width)
            .map(|index| {
                let left = self.segments.get(index).copied().unwrap_or(0);
                let right = other.segments.get(index).copied().unwrap_or(0);
                left.cmp(&right)
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for DottedVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for DottedVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl fmt::Display for DottedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Compare two version strings: positive when `a` is newer, negative when
/// `b` is newer, zero when equal.
///
/// # Examples
/// ```
/// use armoury::domain::compare_versions;
///
/// assert!(compare_versions("2.0", "1.9.9") > 0);
/// assert_eq!(compare_versions("1.0", "1.0.0"), 0);
/// ```
#[must_use]
pub fn compare_versions(a: &str, b: &str) -> i32 {
    match DottedVersion::parse(a).cmp(&DottedVersion::parse(b)) {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}

#[cfg(test)]
mod tests {
    //! Ordering rules for dotted versions.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.2.0", "1.1.9", 1)]
    #[case("1.1.9", "1.2.0", -1)]
    #[case("1.10", "1.9", 1)]
    #[case("2", "1.99.99", 1)]
    #[case("1.0", "1.0.0", 0)]
    #[case("1.0.1", "1.0", 1)]
    #[case("1.x.3", "1.0.3", 0)]
    #[case("", "0", 0)]
    #[case(" 3.1 ", "3.1", 0)]
    fn compares_segment_by_segment(#[case] a: &str, #[case] b: &str, #[case] expected: i32) {
        assert_eq!(compare_versions(a, b), expected);
        assert_eq!(compare_versions(b, a), -expected);
    }

    #[rstest]
    #[case("0.0.1")]
    #[case("4.12.7")]
    #[case("10")]
    fn versions_equal_themselves(#[case] version: &str) {
        assert_eq!(compare_versions(version, version), 0);
    }

    #[rstest]
    fn newer_requires_strict_increase() {
        let stored = DottedVersion::parse("2.0");
        assert!(!DottedVersion::parse("2.0.0").is_newer_than(&stored));
        assert!(DottedVersion::parse("2.0.1").is_newer_than(&stored));
    }

    #[rstest]
    fn blank_versions_are_reported() {
        assert!(DottedVersion::parse("   ").is_blank());
        assert!(!DottedVersion::parse("1").is_blank());
    }
}
