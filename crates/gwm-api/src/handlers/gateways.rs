//! Gateway handlers

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use bytes::Bytes;

use gwm_core::{Gateway, GatewayDraft, GatewayPatch};

use crate::error::ApiError;
use crate::extract::{parse_optional_json, ApiJson};
use crate::state::AppState;

/// GET /gateways
/// List all gateways
pub async fn list_gateways(State(state): State<AppState>) -> Result<Json<Vec<Gateway>>, ApiError> {
    let gateways = state.service().list_gateways().await?;
    Ok(Json(gateways))
}

/// GET /gateways/{serial}
pub async fn get_gateway(
    State(state): State<AppState>,
    Path(serial): Path<String>,
) -> Result<Json<Gateway>, ApiError> {
    let gateway = state.service().get_gateway(&serial).await?;
    Ok(Json(gateway))
}

/// POST /gateways
/// Create a gateway from `{serialNumber, name, ipAddress}`
pub async fn create_gateway(
    State(state): State<AppState>,
    ApiJson(draft): ApiJson<GatewayDraft>,
) -> Result<(StatusCode, Json<Gateway>), ApiError> {
    let gateway = state.service().create_gateway(&draft).await?;
    Ok((StatusCode::CREATED, Json(gateway)))
}

/// PATCH /gateways/{serial}
/// Partially update a gateway
///
/// The body is optional: an empty body is an empty change set, so an unknown
/// serial still answers 404 rather than a body error.
pub async fn update_gateway(
    State(state): State<AppState>,
    Path(serial): Path<String>,
    body: Bytes,
) -> Result<Json<Gateway>, ApiError> {
    let patch: GatewayPatch = match parse_optional_json(&body) {
        Ok(patch) => patch,
        Err(e) => {
            state.service().get_gateway(&serial).await?;
            return Err(e);
        }
    };

    let gateway = state.service().update_gateway(&serial, &patch).await?;
    Ok(Json(gateway))
}

/// DELETE /gateways/{serial}
/// Delete a gateway and return it
pub async fn delete_gateway(
    State(state): State<AppState>,
    Path(serial): Path<String>,
) -> Result<Json<Gateway>, ApiError> {
    let gateway = state.service().delete_gateway(&serial).await?;
    Ok(Json(gateway))
}
