//! Signature verifier: timestamp freshness plus constant-time HMAC check.
//!
//! Verification is a pure function of (body, timestamp, signature, secret,
//! now, skew):
//!
//! 1. Parse the timestamp as a positive integer (`BadTimestamp`).
//! 2. Reject when `|now - ts| > skew` (`TimestampSkew`).
//! 3. `digest = hex(H(body))` over the exact received bytes.
//! 4. `signed = "<ts>.<digest>"`.
//! 5. `expected = hex(MAC(secret, signed))`.
//! 6. Compare `expected` to the claimed signature in constant time.
//! 7. On mismatch, `BadSignature` with the key-id only, unless debug mode is on.
//!
//! The timestamp is part of the signed message, so a fresh timestamp cannot be
//! forged without forging the signature too. A captured request is replayable
//! only within the skew window and only with the identical body.

use automater_types::error::{AuthError, MismatchReport};
use automater_types::key::KeyId;

use super::resolver::ResolvedSecret;
use super::signer::{signed_message, MessageSigner};

/// Proof that a request passed verification.
///
/// Only [`SignatureVerifier::verify`] can build one; everything downstream
/// (task authorization, dispatch) requires it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedRequest {
    kid: KeyId,
    timestamp: i64,
    body_digest: String,
}

impl VerifiedRequest {
    pub fn kid(&self) -> &KeyId {
        &self.kid
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn body_digest(&self) -> &str {
        &self.body_digest
    }

    #[cfg(test)]
    pub(crate) fn for_tests(kid: KeyId) -> Self {
        Self {
            kid,
            timestamp: 1,
            body_digest: String::new(),
        }
    }
}

/// Recomputes and checks request signatures.
#[derive(Debug, Clone)]
pub struct SignatureVerifier<S> {
    signer: S,
    skew_secs: u64,
    debug: bool,
}

impl<S: MessageSigner> SignatureVerifier<S> {
    pub fn new(signer: S, skew_secs: u64) -> Self {
        Self {
            signer,
            skew_secs,
            debug: false,
        }
    }

    /// Echo intermediate values on mismatch. Never enable outside local testing.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Verify one request against the resolved secret at time `now` (unix seconds).
    pub fn verify(
        &self,
        body: &[u8],
        timestamp: &str,
        signature: &str,
        secret: ResolvedSecret<'_>,
        now: i64,
    ) -> Result<VerifiedRequest, AuthError> {
        let ts = parse_timestamp(timestamp)?;
        check_window(ts, now, self.skew_secs)?;

        let body_digest = self.signer.digest_hex(body);
        let signed = signed_message(ts, &body_digest);
        let expected = self
            .signer
            .mac_hex(secret.material.expose(), signed.as_bytes())
            .map_err(|e| {
                tracing::warn!(kid = %secret.kid, error = %e, "configured secret rejected as MAC key");
                AuthError::SecretNotConfigured {
                    kid: secret.kid.clone(),
                }
            })?;

        if !constant_time_eq(&expected, signature) {
            tracing::debug!(kid = %secret.kid, "signature mismatch");
            let report = self.debug.then(|| {
                Box::new(MismatchReport {
                    ts,
                    sig: signature.to_string(),
                    expected,
                    body_hash: body_digest,
                    signed,
                    secret_sha256: self.signer.digest_hex(secret.material.expose()),
                    raw_body: String::from_utf8_lossy(body).into_owned(),
                })
            });
            return Err(AuthError::BadSignature {
                kid: secret.kid.clone(),
                source_name: secret.source.to_string(),
                report,
            });
        }

        Ok(VerifiedRequest {
            kid: secret.kid.clone(),
            timestamp: ts,
            body_digest,
        })
    }
}

/// Parse a unix-seconds timestamp. Must be a positive base-10 integer.
pub fn parse_timestamp(raw: &str) -> Result<i64, AuthError> {
    match raw.trim().parse::<i64>() {
        Ok(ts) if ts > 0 => Ok(ts),
        _ => Err(AuthError::BadTimestamp(raw.trim().to_string())),
    }
}

fn check_window(ts: i64, now: i64, skew_secs: u64) -> Result<(), AuthError> {
    if now.abs_diff(ts) > skew_secs {
        return Err(AuthError::TimestampSkew { now, ts });
    }
    Ok(())
}

/// Constant-time string comparison.
///
/// Lengths are compared once up front (length is not secret). Equal-length
/// inputs are compared by OR-accumulating the XOR of every byte pair across
/// the whole length, regardless of where the first difference is.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }

    let mut diff: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    std::hint::black_box(diff) == 0
}
