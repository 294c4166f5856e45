//! Validated identifier for a logical storage namespace.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{StoreError, StoreResult};

/// A non-empty name for a logical storage namespace.
///
/// Identifiers have value semantics: two identifiers built from equal
/// strings are equal, and the type is immutable and freely cloneable.
/// Deserialization goes through the same validation as [`Identifier::new`],
/// so an empty identifier cannot exist.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    /// Creates an identifier from a non-empty name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EmptyIdentifier`] if `name` is empty.
    pub fn new(name: impl Into<String>) -> StoreResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(StoreError::EmptyIdentifier);
        }
        Ok(Self(name))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Identifier {
    type Error = StoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Identifier> for String {
    fn from(identifier: Identifier) -> Self {
        identifier.0
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({})", self.0)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_identifier_is_rejected() {
        assert_eq!(Identifier::new(""), Err(StoreError::EmptyIdentifier));
    }

    #[test]
    fn test_equal_strings_produce_equal_identifiers() {
        let a = Identifier::new("com.example.app").unwrap();
        let b = Identifier::new("com.example.app").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "com.example.app");
    }

    #[test]
    fn test_serde_round_trip_preserves_validation() {
        let identifier: Identifier = serde_json::from_str("\"vault\"").unwrap();
        assert_eq!(identifier.as_str(), "vault");
        assert!(serde_json::from_str::<Identifier>("\"\"").is_err());
    }
}
