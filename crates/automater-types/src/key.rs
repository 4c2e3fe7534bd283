use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Key-id assumed when the caller does not send one.
pub const DEFAULT_KEY_ID: &str = "K1";

/// Identifier selecting which secret verifies a request (`K1`, `K2`, ...).
///
/// Always stored normalized: trimmed, upper-case, matching `^K\d+$`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyId(String);

impl KeyId {
    /// Normalize and validate a raw key-id.
    ///
    /// Anything that does not match `K<digits>` after trimming and
    /// upper-casing is rejected with [`AuthError::BadKid`].
    pub fn parse(raw: &str) -> Result<Self, AuthError> {
        let normalized = raw.trim().to_ascii_uppercase();
        let digits = normalized.strip_prefix('K').unwrap_or_default();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AuthError::BadKid(raw.trim().to_string()));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for KeyId {
    fn default() -> Self {
        Self(DEFAULT_KEY_ID.to_string())
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for KeyId {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for KeyId {
    type Error = AuthError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<KeyId> for String {
    fn from(value: KeyId) -> Self {
        value.0
    }
}
