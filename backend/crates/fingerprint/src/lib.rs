//! Auth Fingerprint - Request signing envelope
//!
//! Clean Architecture structure:
//! - `domain/` - Envelope types, shared secret, generator and verifier
//! - `application/` - Configuration
//! - `infra/` - Signing HTTP client (transport wrapper)
//! - `presentation/` - Verifying middleware, DTOs, sample router
//!
//! ## Security Model
//! - Every envelope carries a millisecond timestamp, a randomized AEAD
//!   ciphertext of the payload and an HMAC-SHA256 tag over both
//! - Freshness is checked first, then the tag, then decryption
//! - All verifier failures collapse to `success: false`; reasons are only logged
//! - The shared secret is never logged, serialized or sent

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::FingerprintConfig;
pub use domain::envelope::{SignedEnvelope, SignedRequest, VerificationOutcome};
pub use domain::secret::SharedSecret;
pub use domain::services::{DEFAULT_ALLOWED_DELAY, generate, verify};
pub use error::{FingerprintError, FingerprintResult, TransportError};
pub use infra::http_client::SignedClient;
pub use presentation::dto::ApiResponse;
pub use presentation::router::signed_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod middleware {
    pub use crate::presentation::middleware::*;
}

#[cfg(test)]
mod tests;
