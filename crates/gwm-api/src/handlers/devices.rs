//! Device handlers (devices are nested under their gateway)

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use bytes::Bytes;

use gwm_core::{Device, DeviceDraft};

use crate::error::ApiError;
use crate::extract::parse_optional_json;
use crate::state::AppState;

/// POST /gateways/{serial}/devices
/// Attach a device to a gateway
pub async fn add_device(
    State(state): State<AppState>,
    Path(serial): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<Device>), ApiError> {
    let draft: DeviceDraft = match parse_optional_json(&body) {
        Ok(draft) => draft,
        Err(e) => {
            state.service().get_gateway(&serial).await?;
            return Err(e);
        }
    };

    let device = state.service().add_device(&serial, &draft).await?;
    Ok((StatusCode::CREATED, Json(device)))
}

/// DELETE /gateways/{serial}/devices/{uid}
/// Detach a device and return it
pub async fn remove_device(
    State(state): State<AppState>,
    Path((serial, uid)): Path<(String, String)>,
) -> Result<Json<Device>, ApiError> {
    let device = state.service().remove_device(&serial, &uid).await?;
    Ok(Json(device))
}
