//! Validated table/column names
//!
//! A `DName` is any string usable as the name of a table or column:
//! non-empty and not made up entirely of whitespace.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

const UNDERSCORE: char = '_';
const SPACE: char = ' ';

/// Errors produced when constructing names
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("Name must not be empty")]
    Empty,

    #[error("Name must not consist only of whitespace: {0:?}")]
    Whitespace(String),
}

/// A validated table or column name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DName(String);

impl DName {
    /// Creates a name, rejecting empty and all-whitespace input
    pub fn new(value: impl Into<String>) -> Result<Self, NameError> {
        let value = value.into();
        if value.is_empty() {
            return Err(NameError::Empty);
        }
        if value.chars().all(char::is_whitespace) {
            return Err(NameError::Whitespace(value));
        }
        Ok(Self(value))
    }

    /// Returns true if the string is a valid name
    pub fn is_valid(value: &str) -> bool {
        !value.is_empty() && !value.chars().all(char::is_whitespace)
    }

    /// Turns an arbitrary string into a valid name.
    ///
    /// Special whitespace (tabs, newlines, ...) is replaced by plain spaces and
    /// an underscore is prepended when nothing but whitespace is left. The
    /// returned flag reports whether the input had to change.
    pub fn make_valid(value: &str) -> (Self, bool) {
        if value.is_empty() {
            return (Self(UNDERSCORE.to_string()), true);
        }

        let mut modified = false;
        let mut all_spaces = true;
        let mut normalized = String::with_capacity(value.len());

        for c in value.chars() {
            if c.is_whitespace() {
                if c != SPACE {
                    modified = true;
                }
                normalized.push(SPACE);
            } else {
                all_spaces = false;
                normalized.push(c);
            }
        }

        if !all_spaces {
            return (Self(normalized), modified);
        }

        let mut prefixed = String::with_capacity(normalized.len() + 1);
        prefixed.push(UNDERSCORE);
        prefixed.push_str(&normalized);
        (Self(prefixed), true)
    }

    /// Returns the name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for DName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for DName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl TryFrom<&str> for DName {
    type Error = NameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<String> for DName {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl Serialize for DName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for DName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}
