//! Request extractors

use axum::extract::FromRequest;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// JSON body extractor whose rejections use the API error envelope
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Parse a body that may be absent; an empty or blank body yields `T::default()`.
///
/// Handlers addressing an existing gateway read the raw body with this so an
/// unknown serial can still be reported as 404 when the body is bad.
pub fn parse_optional_json<T>(body: &[u8]) -> Result<T, ApiError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        ApiError::BadRequest(format!("Failed to parse the request body as JSON: {}", e))
    })
}
