//! Delegation capability flags
//!
//! A capability set describes what a data source (or one of its columns)
//! can evaluate remotely. Functions declare the capability they require,
//! e.g. `Filter` requires `FILTER` and `Sort` requires `SORT`.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// Set of delegation capabilities
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct DelegationCapability(u64);

impl DelegationCapability {
    pub const NONE: Self = Self(0);
    pub const SORT: Self = Self(1 << 0);
    pub const FILTER: Self = Self(1 << 1);
    pub const SORT_ASCENDING_ONLY: Self = Self(1 << 2);
    pub const AND: Self = Self(1 << 3);
    pub const OR: Self = Self(1 << 4);
    pub const NOT: Self = Self(1 << 5);
    pub const EQUAL: Self = Self(1 << 6);
    pub const NOT_EQUAL: Self = Self(1 << 7);
    pub const LESS_THAN: Self = Self(1 << 8);
    pub const LESS_THAN_OR_EQUAL: Self = Self(1 << 9);
    pub const GREATER_THAN: Self = Self(1 << 10);
    pub const GREATER_THAN_OR_EQUAL: Self = Self(1 << 11);
    pub const IN: Self = Self(1 << 12);
    pub const EXACT_IN: Self = Self(1 << 13);
    pub const CONTAINS: Self = Self(1 << 14);
    pub const STARTS_WITH: Self = Self(1 << 15);
    pub const ENDS_WITH: Self = Self(1 << 16);
    pub const NEGATE: Self = Self(1 << 17);
    pub const ADD: Self = Self(1 << 18);
    pub const SUB: Self = Self(1 << 19);
    pub const MUL: Self = Self(1 << 20);
    pub const DIV: Self = Self(1 << 21);
    pub const AS_TYPE: Self = Self(1 << 22);

    /// Capabilities that select the sort facet of delegation metadata
    pub const SORTING: Self = Self(Self::SORT.0 | Self::SORT_ASCENDING_ONLY.0);

    const NAMES: [(&'static str, Self); 23] = [
        ("sort", Self::SORT),
        ("filter", Self::FILTER),
        ("sort_ascending_only", Self::SORT_ASCENDING_ONLY),
        ("and", Self::AND),
        ("or", Self::OR),
        ("not", Self::NOT),
        ("equal", Self::EQUAL),
        ("not_equal", Self::NOT_EQUAL),
        ("less_than", Self::LESS_THAN),
        ("less_than_or_equal", Self::LESS_THAN_OR_EQUAL),
        ("greater_than", Self::GREATER_THAN),
        ("greater_than_or_equal", Self::GREATER_THAN_OR_EQUAL),
        ("in", Self::IN),
        ("exact_in", Self::EXACT_IN),
        ("contains", Self::CONTAINS),
        ("starts_with", Self::STARTS_WITH),
        ("ends_with", Self::ENDS_WITH),
        ("negate", Self::NEGATE),
        ("add", Self::ADD),
        ("sub", Self::SUB),
        ("mul", Self::MUL),
        ("div", Self::DIV),
        ("as_type", Self::AS_TYPE),
    ];

    /// Looks up a single capability by its snake_case name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::NAMES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, cap)| *cap)
    }

    /// Names of every capability in the set, in declaration order
    pub fn names(&self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .filter(|(_, cap)| self.has_capability(*cap))
            .map(|(n, _)| *n)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// True if every bit of `other` is present
    pub fn has_capability(&self, other: Self) -> bool {
        !other.is_empty() && self.0 & other.0 == other.0
    }

    /// True if at least one bit of `other` is present
    pub fn intersects(&self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Capability that selects the sort facet
    pub fn requires_sort(&self) -> bool {
        self.intersects(Self::SORTING)
    }
}

impl BitOr for DelegationCapability {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for DelegationCapability {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for DelegationCapability {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        self.intersection(rhs)
    }
}

impl fmt::Debug for DelegationCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DelegationCapability({})", self.names().join("|"))
    }
}

impl fmt::Display for DelegationCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        f.write_str(&self.names().join("|"))
    }
}

impl TryFrom<Vec<String>> for DelegationCapability {
    type Error = String;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        names.iter().try_fold(Self::NONE, |acc, name| {
            Self::from_name(name)
                .map(|cap| acc | cap)
                .ok_or_else(|| format!("unknown delegation capability '{}'", name))
        })
    }
}

impl From<DelegationCapability> for Vec<String> {
    fn from(cap: DelegationCapability) -> Self {
        cap.names().into_iter().map(str::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_capability_requires_all_bits() {
        let caps = DelegationCapability::FILTER | DelegationCapability::EQUAL;
        assert!(caps.has_capability(DelegationCapability::FILTER));
        assert!(caps.has_capability(DelegationCapability::FILTER | DelegationCapability::EQUAL));
        assert!(!caps.has_capability(DelegationCapability::FILTER | DelegationCapability::SORT));
        assert!(!caps.has_capability(DelegationCapability::NONE));
    }

    #[test]
    fn test_intersects() {
        let caps = DelegationCapability::SORT_ASCENDING_ONLY;
        assert!(caps.intersects(DelegationCapability::SORTING));
        assert!(caps.requires_sort());
        assert!(!DelegationCapability::FILTER.requires_sort());
    }

    #[test]
    fn test_serde_names() {
        let caps = DelegationCapability::FILTER | DelegationCapability::STARTS_WITH;
        let json = serde_json::to_string(&caps).unwrap();
        assert_eq!(json, r#"["filter","starts_with"]"#);

        let back: DelegationCapability = serde_json::from_str(&json).unwrap();
        assert_eq!(back, caps);
    }

    #[test]
    fn test_serde_unknown_name_rejected() {
        let parsed: Result<DelegationCapability, _> = serde_json::from_str(r#"["filter","teleport"]"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(DelegationCapability::NONE.to_string(), "none");
        assert_eq!(
            (DelegationCapability::SORT | DelegationCapability::FILTER).to_string(),
            "sort|filter"
        );
    }
}
