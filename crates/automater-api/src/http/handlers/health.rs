use axum::extract::State;

use crate::http::response::Envelope;
use crate::state::AppState;

/// GET /health - Liveness check. Never touches secrets or the network.
pub async fn health(State(state): State<AppState>) -> Envelope {
    Envelope::ok().with("service", &*state.service_name)
}
