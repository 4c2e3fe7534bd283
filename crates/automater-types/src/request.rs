//! The inbound request as the authentication pipeline sees it.

/// Authentication values pulled from the request headers.
///
/// Values are carried as received (after trimming); validation happens
/// later in the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthHeaders {
    /// Raw key-id, `K1` when the caller sent none.
    pub kid: String,
    /// Raw timestamp string (unix seconds).
    pub timestamp: String,
    /// Claimed signature, lower-cased hex.
    pub signature: String,
}

/// Immutable view of one inbound call.
///
/// The body is kept as the exact bytes received; it is never re-serialized
/// before verification.
#[derive(Debug, Clone)]
pub struct RequestEnvelope {
    body: Vec<u8>,
    headers: AuthHeaders,
}

impl RequestEnvelope {
    pub fn new(body: impl Into<Vec<u8>>, headers: AuthHeaders) -> Self {
        Self {
            body: body.into(),
            headers,
        }
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn headers(&self) -> &AuthHeaders {
        &self.headers
    }
}
