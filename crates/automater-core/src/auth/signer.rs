//! MessageSigner trait for computing body digests and request MACs.
//!
//! Defined in automater-core so the verifier can recompute signatures without
//! coupling to a specific digest or MAC implementation. The HMAC-SHA256
//! adapter lives in automater-infra.

use automater_types::error::SignerError;

/// Abstraction over the digest and keyed-MAC primitives of the protocol.
pub trait MessageSigner: Send + Sync {
    /// Lower-case hex digest of `data`.
    fn digest_hex(&self, data: &[u8]) -> String;

    /// Lower-case hex keyed MAC of `message` under `secret`.
    fn mac_hex(&self, secret: &[u8], message: &[u8]) -> Result<String, SignerError>;
}

/// Canonical signed message: `"<timestamp>.<hex digest of raw body>"`.
pub fn signed_message(timestamp: i64, body_digest: &str) -> String {
    format!("{timestamp}.{body_digest}")
}

/// Compute the signature a caller must send for `body` at `timestamp`.
pub fn sign_body<S: MessageSigner + ?Sized>(
    signer: &S,
    secret: &[u8],
    timestamp: i64,
    body: &[u8],
) -> Result<String, SignerError> {
    let message = signed_message(timestamp, &signer.digest_hex(body));
    signer.mac_hex(secret, message.as_bytes())
}
