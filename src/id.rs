//! Opaque stable identifiers for operators and tasks.

use std::borrow::Borrow;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A stable, opaque identifier.
///
/// Wrapping `String` in a newtype keeps operator ids, task ids, and plain
/// display strings from being interchanged by accident at call sites.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Id(String);

impl Id {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Id(value.to_string())
    }
}

impl From<String> for Id {
    fn from(value: String) -> Self {
        Id(value)
    }
}

impl Borrow<str> for Id {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_round_trips_the_string() {
        let id = Id::from("op-1");
        assert_eq!(id.to_string(), "op-1");
        assert_eq!(id.as_str(), "op-1");
    }

    #[test]
    fn ordering_is_lexicographic() {
        let mut ids = vec![Id::from("b"), Id::from("a"), Id::from("c")];
        ids.sort();
        assert_eq!(ids, vec![Id::from("a"), Id::from("b"), Id::from("c")]);
    }
}
