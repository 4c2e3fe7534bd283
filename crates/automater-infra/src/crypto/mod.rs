//! Cryptographic primitives for request signing.
//!
//! - `signer`: SHA-256 body digests and HMAC-SHA256 request signatures

pub mod signer;
