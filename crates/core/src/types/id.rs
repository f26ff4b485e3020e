//! Opaque identifiers for backend entities.
//!
//! The backend issues every identifier. Some deployments send numeric ids,
//! others send strings, so [`IdValue`] keeps whichever form arrived and
//! serializes it back unchanged. Use the `define_id!` macro to create
//! type-safe wrappers that prevent mixing ids of different entities.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The raw value of a server-issued identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdValue {
    /// A JSON number.
    Number(u64),
    /// A JSON string.
    Text(String),
}

impl fmt::Display for IdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl FromStr for IdValue {
    type Err = std::convert::Infallible;

    /// Canonical decimal digits become [`IdValue::Number`]; anything else
    /// (including zero-padded digits) stays text.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<u64>() {
            Ok(n) if n.to_string() == s => Ok(Self::Number(n)),
            _ => Ok(Self::Text(s.to_owned())),
        }
    }
}

impl From<u64> for IdValue {
    fn from(n: u64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for IdValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for IdValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around [`IdValue`] with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - `new()`, `value()`, `Display`, `FromStr`
/// - `From<u64>`, `From<&str>` and `From<String>` implementations
///
/// # Example
///
/// ```rust
/// # use shopping_portal_core::define_id;
/// define_id!(UserId);
/// define_id!(OrderId);
///
/// let user_id = UserId::from(1);
/// let order_id = OrderId::from("O1");
///
/// // These are different types, so this won't compile:
/// // let _: UserId = order_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name($crate::IdValue);

        impl $name {
            /// Create a new ID from a raw value.
            #[must_use]
            pub const fn new(value: $crate::IdValue) -> Self {
                Self(value)
            }

            /// Get the underlying raw value.
            #[must_use]
            pub const fn value(&self) -> &$crate::IdValue {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::convert::Infallible;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self($crate::IdValue::Number(id))
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self($crate::IdValue::from(id))
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self($crate::IdValue::Text(id))
            }
        }
    };
}

// Define standard entity IDs
define_id!(UserId);
define_id!(ItemId);
define_id!(CartId);
define_id!(OrderId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_id_round_trips_as_number() {
        let id: ItemId = serde_json::from_str("42").expect("numeric id");
        assert_eq!(id, ItemId::from(42));
        assert_eq!(serde_json::to_string(&id).expect("serialize"), "42");
    }

    #[test]
    fn test_text_id_round_trips_as_string() {
        let id: CartId = serde_json::from_str("\"C1\"").expect("text id");
        assert_eq!(id, CartId::from("C1"));
        assert_eq!(serde_json::to_string(&id).expect("serialize"), "\"C1\"");
    }

    #[test]
    fn test_from_str_prefers_numbers() {
        let numeric: ItemId = "7".parse().expect("infallible");
        let text: ItemId = "sku-7".parse().expect("infallible");
        assert_eq!(numeric.value(), &IdValue::Number(7));
        assert_eq!(text.value(), &IdValue::Text("sku-7".to_string()));

        let padded: ItemId = "007".parse().expect("infallible");
        assert_eq!(padded.value(), &IdValue::Text("007".to_string()));
    }

    #[test]
    fn test_display_has_no_quotes() {
        assert_eq!(OrderId::from("O1").to_string(), "O1");
        assert_eq!(OrderId::from(9).to_string(), "9");
    }

    #[test]
    fn test_rejects_non_scalar_ids() {
        assert!(serde_json::from_str::<UserId>("{\"id\":1}").is_err());
        assert!(serde_json::from_str::<UserId>("null").is_err());
    }
}
