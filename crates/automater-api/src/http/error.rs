//! Application error type mapping pipeline rejections to HTTP responses.
//!
//! Status codes:
//!
//! | code | status |
//! |---|---|
//! | `MissingAuth`, `BadKid`, `TimestampSkew` | 401 |
//! | `BadTimestamp`, `BadJson`, `MissingTask` | 400 |
//! | `BadSignature`, `TaskNotAllowed` | 403 |
//! | `NotFound` | 404 |
//! | `MethodNotAllowed` | 405 |
//! | `Misconfig` | 500 |
//! | `DispatchFailed`, `DispatchUnreachable` | 502 |

use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use automater_types::error::{AuthError, DispatchError, RequestError, TriggerError};

use super::response::Envelope;

#[derive(Debug)]
pub enum AppError {
    /// Any rejection from the trigger pipeline.
    Trigger(TriggerError),
    /// Unknown route.
    NotFound,
    /// Known route, wrong method. Carries the method that is required.
    MethodNotAllowed(&'static str),
    /// The request body could not be read (too large, aborted).
    Body { status: StatusCode, message: String },
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Trigger(e) => trigger_status(e),
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Body { status, .. } => *status,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Trigger(e) => e.code(),
            AppError::NotFound => "NotFound",
            AppError::MethodNotAllowed(_) => "MethodNotAllowed",
            AppError::Body { status, .. } if *status == StatusCode::PAYLOAD_TOO_LARGE => {
                "PayloadTooLarge"
            }
            AppError::Body { .. } => "BadRequest",
        }
    }
}

fn trigger_status(error: &TriggerError) -> StatusCode {
    match error {
        TriggerError::Auth(e) => match e {
            AuthError::MissingAuth(_) | AuthError::BadKid(_) | AuthError::TimestampSkew { .. } => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::BadTimestamp(_) => StatusCode::BAD_REQUEST,
            AuthError::BadSignature { .. } => StatusCode::FORBIDDEN,
            AuthError::SecretNotConfigured { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        },
        TriggerError::Request(e) => match e {
            RequestError::BadJson(_) | RequestError::MissingTask => StatusCode::BAD_REQUEST,
            RequestError::TaskNotAllowed(_) => StatusCode::FORBIDDEN,
        },
        TriggerError::Dispatch { error, .. } => match error {
            DispatchError::Misconfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
            DispatchError::Rejected { .. } | DispatchError::Unreachable(_) => {
                StatusCode::BAD_GATEWAY
            }
        },
    }
}

impl From<TriggerError> for AppError {
    fn from(e: TriggerError) -> Self {
        AppError::Trigger(e)
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        AppError::Trigger(e.into())
    }
}

impl From<BytesRejection> for AppError {
    fn from(rejection: BytesRejection) -> Self {
        AppError::Body {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let envelope = match self {
            AppError::Trigger(error) => trigger_envelope(status, code, error),
            AppError::NotFound => Envelope::error(status, code, "Use /dispatch or /health"),
            AppError::MethodNotAllowed(method) => {
                Envelope::error(status, code, format!("{method} required"))
            }
            AppError::Body { message, .. } => Envelope::error(status, code, message),
        };

        envelope.into_response()
    }
}

fn trigger_envelope(status: StatusCode, code: &str, error: TriggerError) -> Envelope {
    let message = error.to_string();
    match error {
        TriggerError::Auth(AuthError::BadSignature {
            kid,
            source_name,
            report,
        }) => {
            let envelope = Envelope::error(status, code, message).with("kid", kid);
            match report {
                Some(report) => envelope
                    .with("secretSource", source_name)
                    .with("debug", report),
                None => envelope,
            }
        }
        TriggerError::Auth(AuthError::SecretNotConfigured { kid }) => {
            Envelope::error(status, code, message)
                .with("kid", kid)
                .with("secretSource", "")
        }
        TriggerError::Dispatch {
            error,
            context: Some(context),
        } => {
            let envelope = Envelope::error(status, code, message)
                .with("verified", true)
                .with("dispatched", false)
                .with_fields(context);
            match error {
                DispatchError::Rejected { status, body } => {
                    envelope.with("status", status).with("github", body)
                }
                _ => envelope,
            }
        }
        _ => Envelope::error(status, code, message),
    }
}
