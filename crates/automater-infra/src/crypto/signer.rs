//! HMAC-SHA256 implementation of the `MessageSigner` port.
//!
//! Uses the RustCrypto `sha2` and `hmac` crates; output is lowercase hex.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use automater_core::auth::signer::MessageSigner;
use automater_types::error::SignerError;

type HmacSha256 = Hmac<Sha256>;

/// SHA-256 digests and HMAC-SHA256 MACs, hex-encoded.
#[derive(Debug, Clone, Copy, Default)]
pub struct HmacSha256Signer;

impl HmacSha256Signer {
    pub fn new() -> Self {
        Self
    }
}

impl MessageSigner for HmacSha256Signer {
    fn digest_hex(&self, data: &[u8]) -> String {
        hex::encode(Sha256::digest(data))
    }

    fn mac_hex(&self, secret: &[u8], message: &[u8]) -> Result<String, SignerError> {
        let mut mac =
            HmacSha256::new_from_slice(secret).map_err(|e| SignerError(e.to_string()))?;
        mac.update(message);
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}
