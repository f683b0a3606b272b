//! Readiness handler

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub store: &'static str,
}

/// GET /ready
/// Report whether the backing store is reachable
pub async fn ready(State(state): State<AppState>) -> Result<Json<ReadyResponse>, ApiError> {
    let store = state.store();
    store.ping().await.map_err(|e| {
        ApiError::ServiceUnavailable(format!("{} store unavailable: {}", store.kind(), e))
    })?;

    Ok(Json(ReadyResponse {
        status: "ready",
        store: store.kind(),
    }))
}
