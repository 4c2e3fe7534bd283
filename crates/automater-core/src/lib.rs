//! Business logic and port definitions for the automater trigger service.
//!
//! This crate defines the request pipeline (header extraction, secret
//! resolution, signature verification, task authorization, dispatch) and the
//! "ports" (`MessageSigner`, `WorkflowDispatcher`) that the infrastructure
//! layer implements. It depends only on `automater-types` -- never on
//! `automater-infra` or any HTTP/crypto crate.

pub mod auth;
pub mod dispatch;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;
