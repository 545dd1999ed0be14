//! Signature Middleware
//!
//! Verifies the envelope on incoming requests. Methods with a body carry
//! it as flattened JSON keys; other methods carry it in the query string.

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::rejection::BytesRejection;
use axum::extract::{FromRequest, FromRequestParts, Query, Request, State};
use axum::http::{Method, StatusCode};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use kernel::error::app_error::{AppError, AppResult};
use serde::de::DeserializeOwned;

use crate::application::config::FingerprintConfig;
use crate::domain::envelope::SignedEnvelope;
use crate::domain::services::{now_ms, verify_detailed};
use crate::error::FingerprintError;

/// Middleware state
#[derive(Clone)]
pub struct SignatureState {
    pub config: Arc<FingerprintConfig>,
}

/// Plaintext recovered from a verified envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedPayload(pub String);

impl VerifiedPayload {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Deserialize the payload as JSON
    pub fn json<T: DeserializeOwned>(&self) -> AppResult<T> {
        Ok(serde_json::from_str(&self.0)?)
    }
}

impl<S> FromRequestParts<S> for VerifiedPayload
where
    S: Send + Sync,
{
    type Rejection = FingerprintError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<VerifiedPayload>()
            .cloned()
            .ok_or(FingerprintError::MissingEnvelope)
    }
}

/// Middleware that requires a valid signed envelope
///
/// On success the original request continues with a [`VerifiedPayload`]
/// in its extensions; the body is forwarded unchanged.
pub async fn require_signed_envelope(
    State(state): State<SignatureState>,
    req: Request,
    next: Next,
) -> Result<Response, Response> {
    let (parts, body) = req.into_parts();

    let (envelope, body) = if carries_body(&parts.method) {
        // Buffer with the route's body limit, which lives in the extensions
        let mut buffered = Request::new(body);
        *buffered.extensions_mut() = parts.extensions.clone();
        let bytes = Bytes::from_request(buffered, &state)
            .await
            .map_err(|rejection| body_read_failure(rejection).into_response())?;
        let envelope = serde_json::from_slice::<SignedEnvelope>(&bytes)
            .map_err(|_| FingerprintError::MissingEnvelope.into_response())?;
        (envelope, Body::from(bytes))
    } else {
        let Query(envelope) = Query::<SignedEnvelope>::try_from_uri(&parts.uri)
            .map_err(|_| FingerprintError::MissingEnvelope.into_response())?;
        (envelope, body)
    };

    let payload = verify_detailed(
        &envelope,
        &state.config.secret,
        state.config.allowed_delay,
        now_ms(),
    )
    .map_err(IntoResponse::into_response)?;

    tracing::debug!(path = %parts.uri.path(), "Envelope verified");

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(VerifiedPayload(payload));

    Ok(next.run(req).await)
}

fn body_read_failure(rejection: BytesRejection) -> AppError {
    tracing::debug!(error = %rejection, "Failed to read signed request body");
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::payload_too_large("Request body exceeds limit")
    } else {
        AppError::bad_request("Failed to read request body")
    }
}

fn carries_body(method: &Method) -> bool {
    *method == Method::POST || *method == Method::PUT || *method == Method::PATCH
}
