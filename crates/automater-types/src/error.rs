use serde::Serialize;
use thiserror::Error;

use crate::dispatch::DispatchContext;
use crate::key::KeyId;

/// Diagnostic values echoed on a signature mismatch when debug mode is on.
///
/// Only built when debug mode is enabled. Never contains the secret itself,
/// only its SHA-256.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MismatchReport {
    pub ts: i64,
    pub sig: String,
    pub expected: String,
    pub body_hash: String,
    pub signed: String,
    pub secret_sha256: String,
    pub raw_body: String,
}

/// Authentication failures (headers, key-id, secret, timestamp, signature).
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing authentication header: {0}")]
    MissingAuth(String),

    #[error("invalid key id '{0}' (expected K1, K2, ...)")]
    BadKid(String),

    #[error("invalid timestamp '{0}' (expected unix seconds)")]
    BadTimestamp(String),

    #[error("timestamp {ts} outside allowed window (now {now})")]
    TimestampSkew { now: i64, ts: i64 },

    #[error("signature mismatch for key {kid}")]
    BadSignature {
        kid: KeyId,
        source_name: String,
        report: Option<Box<MismatchReport>>,
    },

    #[error("secret for {kid} not configured")]
    SecretNotConfigured { kid: KeyId },
}

impl AuthError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingAuth(_) => "MissingAuth",
            AuthError::BadKid(_) => "BadKid",
            AuthError::BadTimestamp(_) => "BadTimestamp",
            AuthError::TimestampSkew { .. } => "TimestampSkew",
            AuthError::BadSignature { .. } => "BadSignature",
            AuthError::SecretNotConfigured { .. } => "Misconfig",
        }
    }
}

/// Failures decoding or authorizing the verified payload.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("body must be JSON: {0}")]
    BadJson(String),

    #[error("task is required")]
    MissingTask,

    #[error("task not allowed: {0}")]
    TaskNotAllowed(String),
}

impl RequestError {
    pub fn code(&self) -> &'static str {
        match self {
            RequestError::BadJson(_) => "BadJson",
            RequestError::MissingTask => "MissingTask",
            RequestError::TaskNotAllowed(_) => "TaskNotAllowed",
        }
    }
}

/// Failures forwarding the request downstream.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("server misconfiguration: {0}")]
    Misconfig(String),

    #[error("workflow dispatch returned HTTP {status}")]
    Rejected { status: u16, body: String },

    #[error("workflow dispatch request failed: {0}")]
    Unreachable(String),
}

impl DispatchError {
    pub fn code(&self) -> &'static str {
        match self {
            DispatchError::Misconfig(_) => "Misconfig",
            DispatchError::Rejected { .. } => "DispatchFailed",
            DispatchError::Unreachable(_) => "DispatchUnreachable",
        }
    }
}

/// The MAC primitive refused the secret as a key.
#[derive(Debug, Error)]
#[error("secret cannot be used as a MAC key: {0}")]
pub struct SignerError(pub String);

/// Any terminal rejection of a trigger request.
#[derive(Debug, Error)]
pub enum TriggerError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("{error}")]
    Dispatch {
        error: DispatchError,
        /// Present once the target and task are known.
        context: Option<DispatchContext>,
    },
}

impl TriggerError {
    pub fn code(&self) -> &'static str {
        match self {
            TriggerError::Auth(e) => e.code(),
            TriggerError::Request(e) => e.code(),
            TriggerError::Dispatch { error, .. } => error.code(),
        }
    }
}

impl From<DispatchError> for TriggerError {
    fn from(error: DispatchError) -> Self {
        TriggerError::Dispatch {
            error,
            context: None,
        }
    }
}
