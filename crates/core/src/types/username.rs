//! Username type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Username`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UsernameError {
    /// The input string is empty.
    #[error("username cannot be empty")]
    Empty,
}

/// A login name.
///
/// The backend treats usernames as unique opaque strings and accepts any
/// non-empty value, so the client does too.
///
/// ## Examples
///
/// ```
/// use shopping_portal_core::Username;
///
/// assert!(Username::parse("alice").is_ok());
/// assert!(Username::parse("alice smith").is_ok());
/// assert!(Username::parse("").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Parse a `Username` from a string.
    ///
    /// # Errors
    ///
    /// Returns `UsernameError::Empty` if the input is empty.
    pub fn parse(s: &str) -> Result<Self, UsernameError> {
        if s.is_empty() {
            return Err(UsernameError::Empty);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Username` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Username {
    type Err = UsernameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
