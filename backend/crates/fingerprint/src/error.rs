//! Fingerprint Error Types
//!
//! [`FingerprintError`] is the internal diagnostic kind for envelope
//! failures. It is logged server-side and never rendered to a peer: every
//! rejection answers 401 with `{"success": false}`.
//!
//! [`TransportError`] covers the signing HTTP client and is always
//! normalized into an [`ApiResponse`] before it leaves the client.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::presentation::dto::ApiResponse;

pub type FingerprintResult<T> = Result<T, FingerprintError>;

#[derive(Debug, Error)]
pub enum FingerprintError {
    /// timestamp, hash or signature absent from the request
    #[error("Envelope missing or incomplete")]
    MissingEnvelope,

    #[error("Envelope timestamp is not an integer millisecond value")]
    MalformedTimestamp,

    /// older than the allowed delay
    #[error("Envelope expired ({elapsed_ms} ms old)")]
    Expired { elapsed_ms: i64 },

    #[error("Envelope signature mismatch")]
    SignatureMismatch,

    #[error("Envelope ciphertext could not be decrypted")]
    Decryption,

    #[error("Recovered payload is not valid UTF-8")]
    InvalidPayload,

    /// Primitive failure while signing; a programming error, not a rejection
    #[error("Cryptographic primitive failed: {0}")]
    Crypto(#[from] platform::CryptoError),
}

impl FingerprintError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FingerprintError::Crypto(_) => ErrorKind::InternalServerError,
            _ => ErrorKind::Unauthorized,
        }
    }

    /// Whether this is a verification rejection (as opposed to an internal failure)
    pub fn is_rejection(&self) -> bool {
        !matches!(self, FingerprintError::Crypto(_))
    }

    fn log(&self) {
        match self {
            FingerprintError::Crypto(e) => {
                tracing::error!(error = %e, "Envelope primitive failure");
            }
            FingerprintError::SignatureMismatch | FingerprintError::Decryption => {
                tracing::warn!(reason = %self, "Envelope rejected");
            }
            FingerprintError::Expired { elapsed_ms } => {
                tracing::debug!(elapsed_ms = *elapsed_ms, "Envelope rejected as stale");
            }
            _ => {
                tracing::debug!(reason = %self, "Envelope rejected");
            }
        }
    }
}

impl From<FingerprintError> for AppError {
    fn from(err: FingerprintError) -> Self {
        if err.is_rejection() {
            // One message for every rejection so the reason cannot be probed
            AppError::unauthorized("Request signature rejected")
        } else {
            AppError::new(err.kind(), "Request signing failed").with_source(err)
        }
    }
}

impl IntoResponse for FingerprintError {
    fn into_response(self) -> Response {
        self.log();
        if self.is_rejection() {
            (StatusCode::UNAUTHORIZED, Json(ApiResponse::rejected())).into_response()
        } else {
            AppError::from(self).into_response()
        }
    }
}

/// Transport-level failures of [`crate::SignedClient`]
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {status}")]
    Status { status: u16, message: Option<String> },

    #[error("invalid JSON response")]
    MalformedResponse,

    #[error("failed to serialize request: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to sign request: {0}")]
    Signing(#[from] FingerprintError),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Network(err.without_url().to_string())
        }
    }
}

impl TransportError {
    /// Collapse into the uniform failure shape
    pub fn into_api_response(self) -> ApiResponse {
        let message = match &self {
            TransportError::Status { message, .. } => message.clone(),
            _ => None,
        };
        ApiResponse {
            success: false,
            data: None,
            message,
            error: Some(self.to_string()),
        }
    }
}
