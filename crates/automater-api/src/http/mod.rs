//! HTTP layer: `GET /health` and `POST /dispatch` with JSON envelopes.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
