//! Newtype IDs for type-safe entity references.
//!
//! Document ids in the backend store are strings. Clients are not consistent
//! about this: a product id may arrive as `"42"` or as `42`. Every id is
//! normalized to its string form at the boundary so that lookups and cart
//! merges compare like with like.

use serde::{Deserialize, Deserializer};

/// Errors that can occur when parsing a [`ProductId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductIdError {
    /// The input is empty (or only whitespace).
    #[error("product id cannot be empty")]
    Empty,
    /// The input is too long.
    #[error("product id must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside the allowed set.
    #[error("product id contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// Macro to define a string-backed ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - `as_str()`, `into_inner()`, `Display` and `AsRef<str>`
///
/// Deserialization is left to the caller so each id can pick its own
/// validation rules.
#[macro_export]
macro_rules! define_string_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, ::serde::Serialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Returns the id as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the id and returns its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(ProductId);
define_string_id!(CustomerId);

impl ProductId {
    /// Maximum length of a product id.
    pub const MAX_LENGTH: usize = 64;

    /// Parse a `ProductId` from a string.
    ///
    /// Surrounding whitespace is trimmed. The remaining id must be 1-64
    /// characters of ASCII letters, digits, `-`, `_` or `.`.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty, too long, or contains
    /// a disallowed character.
    ///
    /// # Examples
    ///
    /// ```
    /// use rxshop_core::ProductId;
    ///
    /// assert_eq!(ProductId::parse(" 42 ").unwrap().as_str(), "42");
    /// assert!(ProductId::parse("").is_err());
    /// assert!(ProductId::parse("a/b").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, ProductIdError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ProductIdError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(ProductIdError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if let Some(c) = s
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        {
            return Err(ProductIdError::InvalidCharacter(c));
        }
        Ok(Self(s.to_owned()))
    }
}

impl From<u64> for ProductId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl std::str::FromStr for ProductId {
    type Err = ProductIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Wire shapes a product id may take in client JSON.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawProductId {
    Text(String),
    Number(u64),
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RawProductId::deserialize(deserializer) {
            Ok(RawProductId::Text(s)) => Self::parse(&s).map_err(serde::de::Error::custom),
            Ok(RawProductId::Number(n)) => Ok(Self::from(n)),
            Err(_) => Err(serde::de::Error::custom(
                "product id must be a string or a non-negative integer",
            )),
        }
    }
}

impl CustomerId {
    /// Create a customer id from the identity provider's user id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl<'de> Deserialize<'de> for CustomerId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_whitespace() {
        let id = ProductId::parse("  vit-d3_1000.iu ").unwrap();
        assert_eq!(id.as_str(), "vit-d3_1000.iu");
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert_eq!(ProductId::parse("   "), Err(ProductIdError::Empty));
    }

    #[test]
    fn test_parse_rejects_too_long() {
        let long = "a".repeat(ProductId::MAX_LENGTH + 1);
        assert_eq!(
            ProductId::parse(&long),
            Err(ProductIdError::TooLong {
                max: ProductId::MAX_LENGTH
            })
        );
    }

    #[test]
    fn test_parse_rejects_path_characters() {
        assert_eq!(
            ProductId::parse("../admin"),
            Err(ProductIdError::InvalidCharacter('/'))
        );
    }

    #[test]
    fn test_numeric_and_string_ids_are_equal() {
        let from_number: ProductId = serde_json::from_str("42").unwrap();
        let from_string: ProductId = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(from_number, from_string);
    }

    #[test]
    fn test_serializes_as_string() {
        let id: ProductId = serde_json::from_str("7").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"7\"");
    }

    #[test]
    fn test_rejects_negative_and_float_ids() {
        assert!(serde_json::from_str::<ProductId>("-1").is_err());
        assert!(serde_json::from_str::<ProductId>("1.5").is_err());
        assert!(serde_json::from_str::<ProductId>("null").is_err());
    }
}
