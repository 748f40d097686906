//! Column paths
//!
//! A path names a column, possibly through nested record access
//! (`Address.City`). Equality is segment-wise.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::syntax::{DName, NameError};

/// Ordered sequence of name segments identifying a column
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnPath {
    segments: Vec<DName>,
}

impl ColumnPath {
    /// The empty path (the row itself)
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns a new path with `name` appended
    pub fn append(&self, name: DName) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name);
        Self { segments }
    }

    /// Parses `a.b.c` dotted syntax
    pub fn parse(dotted: &str) -> Result<Self, NameError> {
        let segments = dotted
            .split('.')
            .map(DName::new)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[DName] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Last segment, if any
    pub fn name(&self) -> Option<&DName> {
        self.segments.last()
    }

    pub fn to_dotted_syntax(&self) -> String {
        self.segments
            .iter()
            .map(DName::as_str)
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl From<DName> for ColumnPath {
    fn from(name: DName) -> Self {
        Self {
            segments: vec![name],
        }
    }
}

impl fmt::Display for ColumnPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_dotted_syntax())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> DName {
        DName::new(s).unwrap()
    }

    #[test]
    fn test_append_and_dotted_syntax() {
        let path = ColumnPath::root().append(name("Address")).append(name("City"));
        assert_eq!(path.len(), 2);
        assert_eq!(path.to_dotted_syntax(), "Address.City");
        assert_eq!(path.name(), Some(&name("City")));
    }

    #[test]
    fn test_segment_wise_equality() {
        let parsed = ColumnPath::parse("Address.City").unwrap();
        let built = ColumnPath::root().append(name("Address")).append(name("City"));
        assert_eq!(parsed, built);
        assert_ne!(parsed, ColumnPath::parse("Address").unwrap());
    }

    #[test]
    fn test_parse_rejects_empty_segment() {
        assert!(ColumnPath::parse("Address..City").is_err());
    }

    #[test]
    fn test_root() {
        assert!(ColumnPath::root().is_root());
        assert_eq!(ColumnPath::root().to_dotted_syntax(), "");
    }
}
