//! Trigger endpoint.
//!
//! The body is taken as raw bytes and handed to the pipeline untouched; it is
//! only decoded as JSON after the signature over those exact bytes verifies.

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use tracing::Instrument;
use uuid::Uuid;

use automater_observe::fields;

use crate::http::error::AppError;
use crate::http::response::Envelope;
use crate::state::AppState;

/// POST /dispatch - Verify a signed request and forward it as a workflow dispatch.
pub async fn dispatch(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Envelope, AppError> {
    let request_id = Uuid::now_v7();
    let span = tracing::info_span!(
        "trigger.dispatch",
        request_id = %request_id,
        kid = tracing::field::Empty,
        task = tracing::field::Empty,
        code = tracing::field::Empty,
        status = tracing::field::Empty,
    );

    let result = async {
        let body = body?;
        let envelope = state.service.envelope(body.to_vec(), |name| {
            headers.get(name).and_then(|value| value.to_str().ok())
        })?;

        let now = chrono::Utc::now().timestamp();
        let outcome = state.service.handle(&envelope, now).await?;
        Ok::<_, AppError>(Envelope::from_outcome(outcome))
    }
    .instrument(span.clone())
    .await;

    match &result {
        Ok(envelope) => {
            span.record(fields::STATUS, envelope.status.as_u16());
        }
        Err(error) => {
            span.record(fields::STATUS, error.status().as_u16());
            span.record(fields::CODE, error.code());
            span.in_scope(|| tracing::info!(code = error.code(), "trigger rejected"));
        }
    }

    result
}
