//! Version ordering and range matching.
//!
//! Package versions are opaque ordered strings: mmpack does not assume
//! semver. No version-comparison source survived in the retrieved
//! original C sources, so this module follows dpkg's segmented
//! numeric/alphabetic comparison, which is the closest well-known scheme
//! to the `.mpk`/`sha256sums` packaging conventions mmpack otherwise
//! follows. A run of digits compares numerically; a run of non-digits
//! compares byte-wise; runs alternate, and a shorter string sorts first
//! once one side runs out of segments.

use std::cmp::Ordering;
use std::fmt;

/// A package version, ordered by [`compare`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Version(String);

impl Version {
    /// Wrap a raw version string.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw, unparsed version string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Version {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Version {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        compare(&self.0, &other.0)
    }
}

/// Split a version string into alternating runs of digits and non-digits.
fn segments(raw: &str) -> Vec<&str> {
    let bytes = raw.as_bytes();
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_digits = bytes.first().is_some_and(u8::is_ascii_digit);
    for (i, b) in bytes.iter().enumerate() {
        let is_digit = b.is_ascii_digit();
        if is_digit != in_digits {
            out.push(&raw[start..i]);
            start = i;
            in_digits = is_digit;
        }
    }
    if start < raw.len() {
        out.push(&raw[start..]);
    }
    out
}

/// dpkg-style segmented comparison of two version strings.
#[must_use]
pub fn compare(a: &str, b: &str) -> Ordering {
    let sa = segments(a);
    let sb = segments(b);
    for pair in sa.iter().zip(sb.iter()) {
        let (seg_a, seg_b) = pair;
        let ord = if seg_a.as_bytes().first().is_some_and(u8::is_ascii_digit) {
            let na: u64 = seg_a.parse().unwrap_or(0);
            let nb: u64 = seg_b.parse().unwrap_or(0);
            na.cmp(&nb)
        } else {
            seg_a.cmp(seg_b)
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    sa.len().cmp(&sb.len())
}

/// One side of a version range: unrestricted, or bounded by a concrete
/// [`Version`]. Mirrors the raw dependency's `("any", "any")` convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bound {
    /// No restriction on this side of the range.
    Any,
    /// Bounded (inclusive) by this version.
    At(Version),
}

impl Bound {
    fn from_raw(raw: &str) -> Self {
        if raw == "any" {
            Self::Any
        } else {
            Self::At(Version::new(raw))
        }
    }
}

/// A `[min_version, max_version]` range, inclusive on both ends. Either
/// side may be unrestricted ("any").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConstraint {
    /// Lower bound, inclusive.
    pub min: Bound,
    /// Upper bound, inclusive.
    pub max: Bound,
}

impl VersionConstraint {
    /// The unrestricted range, matching every version.
    #[must_use]
    pub fn any() -> Self {
        Self {
            min: Bound::Any,
            max: Bound::Any,
        }
    }

    /// Build a range from the raw `(min_version, max_version)` strings
    /// carried by a dependency record, where `"any"` means unrestricted.
    #[must_use]
    pub fn from_raw(min_version: &str, max_version: &str) -> Self {
        Self {
            min: Bound::from_raw(min_version),
            max: Bound::from_raw(max_version),
        }
    }

    /// Whether `version` lies within this range.
    #[must_use]
    pub fn matches(&self, version: &Version) -> bool {
        let above_min = match &self.min {
            Bound::Any => true,
            Bound::At(min) => version >= min,
        };
        let below_max = match &self.max {
            Bound::Any => true,
            Bound::At(max) => version <= max,
        };
        above_min && below_max
    }

    /// True iff both bounds are unrestricted.
    #[must_use]
    pub fn is_any(&self) -> bool {
        matches!((&self.min, &self.max), (Bound::Any, Bound::Any))
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let min = match &self.min {
            Bound::Any => "any".to_string(),
            Bound::At(v) => v.to_string(),
        };
        let max = match &self.max {
            Bound::Any => "any".to_string(),
            Bound::At(v) => v.to_string(),
        };
        write!(f, "[{min}, {max}]")
    }
}
