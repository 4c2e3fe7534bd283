//! Secret resolver: maps a key-id to the secret that verifies it.
//!
//! Lookup order: the per-key secret for the normalized key-id, then the single
//! legacy secret. Both steps are plain map/option reads so resolution time
//! does not depend on how many secrets are configured or what they contain.

use automater_types::error::AuthError;
use automater_types::key::KeyId;
use automater_types::secret::{SecretMaterial, SecretSet};

/// The secret selected for one request.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedSecret<'a> {
    pub kid: &'a KeyId,
    pub material: &'a SecretMaterial,
    /// Configuration source name, for diagnostics only.
    pub source: &'a str,
}

/// Read-only view over the configured secrets.
#[derive(Debug, Clone, Default)]
pub struct SecretResolver {
    secrets: SecretSet,
}

impl SecretResolver {
    pub fn new(secrets: SecretSet) -> Self {
        Self { secrets }
    }

    /// Resolve the secret for an already-validated key-id.
    ///
    /// Returns [`AuthError::SecretNotConfigured`] when neither a per-key nor
    /// a legacy secret exists. That is an operator error, not a caller error.
    pub fn resolve<'a>(&'a self, kid: &'a KeyId) -> Result<ResolvedSecret<'a>, AuthError> {
        let entry = self
            .secrets
            .per_key
            .get(kid)
            .filter(|entry| !entry.material.is_empty())
            .or(self.secrets.legacy.as_ref().filter(|entry| !entry.material.is_empty()))
            .ok_or_else(|| AuthError::SecretNotConfigured { kid: kid.clone() })?;

        Ok(ResolvedSecret {
            kid,
            material: &entry.material,
            source: &entry.source,
        })
    }
}
