//! Span field names recorded after a request completes.
//!
//! The request span is opened by the HTTP handler with these fields empty
//! (plus `kid` and `task`, which the pipeline records as soon as they are
//! known).

/// Machine-readable rejection code.
pub const CODE: &str = "code";

/// HTTP status returned to the caller.
pub const STATUS: &str = "status";
