//! Identifier newtypes for the retail schema.

use std::fmt;

/// A user name, the natural key of the USERS table.
///
/// The schema bounds it at 15 bytes (`VARCHAR(15)`); callers that synthesize
/// names are responsible for staying inside that bound.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Username(String);

impl Username {
    /// Create a username from any string-like value.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrow the underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the newtype, yielding the underlying string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Username {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<&str> for Username {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// Surrogate key of the PRODUCTS table (`SERIAL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductId(pub i32);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Surrogate key of the ORDERS table (`SERIAL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrderId(pub i32);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_round_trips() {
        let name = Username::new("user42");
        assert_eq!(name.as_str(), "user42");
        assert_eq!(name.to_string(), "user42");
        assert_eq!(name.into_string(), "user42");
    }

    #[test]
    fn ids_are_ordered_and_displayable() {
        assert!(ProductId(1) < ProductId(2));
        assert_eq!(ProductId(7).to_string(), "7");
        assert_eq!(OrderId(31).to_string(), "31");
    }
}
