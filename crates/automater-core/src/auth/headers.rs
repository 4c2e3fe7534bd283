//! Header extractor: pulls key-id, timestamp and signature from a request.
//!
//! Each field may arrive under any of several header names (naming-scheme
//! migration). Names are tried in configured order; the first non-empty value
//! wins. The extractor is transport-agnostic: callers pass a lookup closure
//! over whatever header map they hold.

use automater_types::config::HeaderAliases;
use automater_types::error::AuthError;
use automater_types::key::DEFAULT_KEY_ID;
use automater_types::request::AuthHeaders;

/// Resolves the authentication headers of one request.
#[derive(Debug, Clone)]
pub struct HeaderExtractor {
    aliases: HeaderAliases,
}

impl HeaderExtractor {
    pub fn new(aliases: HeaderAliases) -> Self {
        Self { aliases }
    }

    /// Produce `(kid, timestamp, signature)`.
    ///
    /// The key-id defaults to `K1` when absent. A missing timestamp or
    /// signature is [`AuthError::MissingAuth`]. No validation beyond presence
    /// happens here.
    pub fn extract<'a, F>(&self, lookup: F) -> Result<AuthHeaders, AuthError>
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        let kid = first_present(&self.aliases.kid, &lookup)
            .unwrap_or(DEFAULT_KEY_ID)
            .to_string();

        let timestamp = first_present(&self.aliases.timestamp, &lookup)
            .ok_or_else(|| missing("timestamp", &self.aliases.timestamp))?
            .to_string();

        let signature = first_present(&self.aliases.signature, &lookup)
            .ok_or_else(|| missing("signature", &self.aliases.signature))?
            .to_ascii_lowercase();

        Ok(AuthHeaders {
            kid,
            timestamp,
            signature,
        })
    }
}

fn first_present<'a, F>(names: &[String], lookup: &F) -> Option<&'a str>
where
    F: Fn(&str) -> Option<&'a str>,
{
    names
        .iter()
        .filter_map(|name| lookup(name.as_str()))
        .map(str::trim)
        .find(|value| !value.is_empty())
}

fn missing(field: &str, names: &[String]) -> AuthError {
    AuthError::MissingAuth(format!("{field} required (one of: {})", names.join(", ")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v.to_string()))
            .collect()
    }

    fn extract(map: &HashMap<String, String>) -> Result<AuthHeaders, AuthError> {
        HeaderExtractor::new(HeaderAliases::default())
            .extract(|name| map.get(&name.to_ascii_lowercase()).map(String::as_str))
    }

    #[test]
    fn test_extracts_primary_names() {
        let map = headers(&[
            ("X-AUTOMATE-Kid", "k2"),
            ("X-AUTOMATE-Ts", "1700000000"),
            ("X-AUTOMATE-Signature", "ABCDEF"),
        ]);
        let auth = extract(&map).unwrap();
        assert_eq!(auth.kid, "k2");
        assert_eq!(auth.timestamp, "1700000000");
        assert_eq!(auth.signature, "abcdef");
    }

    #[test]
    fn test_extracts_legacy_aliases() {
        let map = headers(&[
            ("X-AUTOMATER-Kid", "K3"),
            ("X-AUTOMATER-Timestamp", "1700000000"),
            ("X-AUTOMATER-Signature", "00"),
        ]);
        let auth = extract(&map).unwrap();
        assert_eq!(auth.kid, "K3");
        assert_eq!(auth.timestamp, "1700000000");
    }

    #[test]
    fn test_first_alias_wins() {
        let map = headers(&[
            ("X-AUTOMATE-Ts", "111"),
            ("X-AUTOMATER-Ts", "222"),
            ("X-AUTOMATER-Signature", "aa"),
            ("X-AUTOMATE-Signature", "bb"),
        ]);
        let auth = extract(&map).unwrap();
        assert_eq!(auth.timestamp, "111");
        assert_eq!(auth.signature, "bb");
    }

    #[test]
    fn test_empty_value_falls_through_to_next_alias() {
        let map = headers(&[
            ("X-AUTOMATE-Ts", "  "),
            ("X-AUTOMATER-Ts", "222"),
            ("X-AUTOMATE-Signature", "aa"),
        ]);
        assert_eq!(extract(&map).unwrap().timestamp, "222");
    }

    #[test]
    fn test_kid_defaults_to_k1() {
        let map = headers(&[("X-AUTOMATE-Ts", "1"), ("X-AUTOMATE-Signature", "aa")]);
        assert_eq!(extract(&map).unwrap().kid, "K1");
    }

    #[test]
    fn test_missing_timestamp_is_missing_auth() {
        let map = headers(&[("X-AUTOMATE-Kid", "K1"), ("X-AUTOMATE-Signature", "00")]);
        let err = extract(&map).unwrap_err();
        assert!(matches!(err, AuthError::MissingAuth(ref msg) if msg.starts_with("timestamp")));
    }

    #[test]
    fn test_missing_signature_is_missing_auth() {
        let map = headers(&[("X-AUTOMATE-Ts", "1")]);
        let err = extract(&map).unwrap_err();
        assert!(matches!(err, AuthError::MissingAuth(ref msg) if msg.starts_with("signature")));
    }

    #[test]
    fn test_custom_aliases() {
        let aliases = HeaderAliases {
            kid: vec!["kid".into()],
            timestamp: vec!["ts".into()],
            signature: vec!["sig".into()],
        };
        let map = headers(&[("ts", "5"), ("sig", "ff"), ("X-AUTOMATE-Ts", "9")]);
        let auth = HeaderExtractor::new(aliases)
            .extract(|name| map.get(name).map(String::as_str))
            .unwrap();
        assert_eq!(auth.timestamp, "5");
        assert_eq!(auth.kid, "K1");
    }
}
