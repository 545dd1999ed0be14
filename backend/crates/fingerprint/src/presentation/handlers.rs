//! HTTP Handlers

use axum::Json;
use serde_json::Value;

use crate::presentation::dto::ApiResponse;
use crate::presentation::middleware::VerifiedPayload;

/// GET|POST /echo
///
/// Returns the recovered payload. JSON payloads come back as JSON,
/// anything else as a string.
pub async fn echo(payload: VerifiedPayload) -> Json<ApiResponse> {
    let data = payload
        .json::<Value>()
        .unwrap_or_else(|_| Value::String(payload.as_str().to_string()));

    Json(ApiResponse::ok(Some(data)).with_message("verified"))
}

/// GET /health
pub async fn health() -> Json<ApiResponse> {
    Json(ApiResponse::ok(None).with_message("ok"))
}
