//! Envelope response format for every endpoint.
//!
//! ```json
//! { "ok": false, "code": "BadSignature", "message": "...", "kid": "K1" }
//! ```
//!
//! `code` and `message` are omitted on success. Context fields are flattened
//! into the top-level object.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{Map, Value};

use automater_types::dispatch::DispatchOutcome;

#[derive(Debug, Serialize)]
pub struct Envelope {
    pub ok: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(flatten)]
    pub context: Map<String, Value>,

    #[serde(skip)]
    pub status: StatusCode,
}

impl Envelope {
    pub fn ok() -> Self {
        Self {
            ok: true,
            code: None,
            message: None,
            context: Map::new(),
            status: StatusCode::OK,
        }
    }

    pub fn error(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            code: Some(code.to_string()),
            message: Some(message.into()),
            context: Map::new(),
            status,
        }
    }

    /// Add one context field.
    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.context.insert(key.to_string(), value);
        self
    }

    /// Merge the fields of a serializable struct into the context.
    pub fn with_fields(mut self, fields: impl Serialize) -> Self {
        if let Ok(Value::Object(map)) = serde_json::to_value(fields) {
            self.context.extend(map);
        }
        self
    }

    pub fn from_outcome(outcome: DispatchOutcome) -> Self {
        let envelope = Self::ok().with("verified", true);
        match outcome {
            DispatchOutcome::Dispatched(context) => {
                envelope.with("dispatched", true).with_fields(context)
            }
            DispatchOutcome::VerifiedOnly { reason } => {
                envelope.with("dispatched", false).with("reason", reason)
            }
        }
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
