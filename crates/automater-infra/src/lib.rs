//! Infrastructure layer for the automater trigger service.
//!
//! Contains implementations of the ports defined in `automater-core`:
//! the HMAC-SHA256 message signer and the GitHub workflow-dispatch client,
//! plus the configuration loader (environment + optional TOML file).

pub mod config;
pub mod crypto;
pub mod github;
