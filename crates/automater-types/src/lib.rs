//! Shared domain types for the automater trigger service.
//!
//! This crate contains the types that flow through the request pipeline:
//! key-ids, secret material, the request envelope, the dispatch payload,
//! the process-wide configuration record, and the error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, serde_json, thiserror.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod key;
pub mod request;
pub mod secret;
