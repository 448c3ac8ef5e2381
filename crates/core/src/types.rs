use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// An opaque, non-empty user name.
///
/// Users are created implicitly the first time a name is observed by the
/// quota gate or the points ledger; there is no registration step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and wrap a user name. Surrounding whitespace is trimmed.
    pub fn parse(value: impl AsRef<str>) -> Result<Self, CoreError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidUsername);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Return the inner string as a str slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Username {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<&str> for Username {
    type Error = CoreError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl std::ops::Deref for Username {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_whitespace() {
        let user = Username::parse("  alice ").unwrap();
        assert_eq!(user.as_str(), "alice");
        assert_eq!(&*user, "alice");
    }

    #[test]
    fn parse_rejects_blank() {
        assert_eq!(Username::parse(""), Err(CoreError::InvalidUsername));
        assert_eq!(Username::parse("   "), Err(CoreError::InvalidUsername));
    }

    #[test]
    fn serde_validates_on_deserialize() {
        let user: Username = serde_json::from_str("\"bob\"").unwrap();
        assert_eq!(user.to_string(), "bob");
        assert!(serde_json::from_str::<Username>("\"\"").is_err());
        assert_eq!(serde_json::to_string(&user).unwrap(), "\"bob\"");
    }
}
