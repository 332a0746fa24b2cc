//! Line item identifier.

use core::borrow::Borrow;
use core::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a product line in the cart.
///
/// The identifier is an opaque string supplied by the product catalog. The
/// cart only compares identifiers for equality; it never parses them.
///
/// ## Examples
///
/// ```
/// use gomarketplace_core::LineItemId;
///
/// let id = LineItemId::new("sku-123");
/// assert_eq!(id.as_str(), "sku-123");
/// assert_eq!(id, "sku-123");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct LineItemId(String);

impl LineItemId {
    /// Create an identifier from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `LineItemId` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for LineItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LineItemId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for LineItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<LineItemId> for String {
    fn from(id: LineItemId) -> Self {
        id.0
    }
}

impl AsRef<str> for LineItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for LineItemId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for LineItemId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for LineItemId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let id = LineItemId::new("abc");
        assert_eq!(format!("{id}"), "abc");
    }

    #[test]
    fn test_compare_with_str() {
        let id = LineItemId::from("abc");
        assert_eq!(id, "abc");
        assert!(id != "abd");
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = LineItemId::new("1234");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"1234\"");

        let parsed: LineItemId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }
}
