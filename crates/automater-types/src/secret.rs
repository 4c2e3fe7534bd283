use std::collections::BTreeMap;
use std::fmt;

use crate::key::KeyId;

/// Opaque secret bytes bound to a key-id.
///
/// Debug output never includes the value. The bytes are reachable only via
/// [`SecretMaterial::expose`].
#[derive(Clone, PartialEq, Eq)]
pub struct SecretMaterial(Vec<u8>);

impl SecretMaterial {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Access the underlying secret bytes.
    pub fn expose(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretMaterial(***, {} bytes)", self.0.len())
    }
}

/// A secret together with the name of the configuration source it came from
/// (e.g. `AUTOMATE_TRIGGER_SECRET_K2`).
#[derive(Debug, Clone)]
pub struct SourcedSecret {
    pub material: SecretMaterial,
    pub source: String,
}

impl SourcedSecret {
    pub fn new(material: SecretMaterial, source: impl Into<String>) -> Self {
        Self {
            material,
            source: source.into(),
        }
    }
}

/// All verification secrets known to the process.
///
/// Per-key secrets support rotation; the single legacy secret is the
/// fallback for any valid key-id without its own entry.
#[derive(Debug, Clone, Default)]
pub struct SecretSet {
    pub per_key: BTreeMap<KeyId, SourcedSecret>,
    pub legacy: Option<SourcedSecret>,
}

impl SecretSet {
    pub fn is_empty(&self) -> bool {
        self.per_key.is_empty() && self.legacy.is_none()
    }
}

/// A wrapper that redacts secret strings in Debug and Display output.
///
/// Used for the downstream credential token. The actual value is accessible
/// via `.expose()`.
#[derive(Clone)]
pub struct Redacted(String);

impl Redacted {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the underlying secret value.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Show masked representation: last 4 chars visible.
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 4 {
            "****".to_string()
        } else {
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("****{tail}")
        }
    }
}

impl fmt::Debug for Redacted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Redacted(\"***\")")
    }
}

impl fmt::Display for Redacted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***")
    }
}
