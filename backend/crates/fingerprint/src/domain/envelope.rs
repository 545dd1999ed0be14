//! Envelope Value Types

use serde::{Deserialize, Serialize};

use crate::error::FingerprintResult;

/// Authentication envelope attached to a single request
///
/// Immutable once produced; a fresh one is generated for every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedEnvelope {
    /// Decimal milliseconds since the Unix epoch
    pub timestamp: String,
    /// Base64 ciphertext of the payload
    pub hash: String,
    /// Lowercase hex HMAC-SHA256 over `hash || timestamp`
    pub signature: String,
}

/// Result of verifying an envelope
///
/// Failures carry no reason; see [`crate::FingerprintError`] for the
/// server-side diagnostic kinds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl VerificationOutcome {
    pub fn verified(data: String) -> Self {
        Self {
            success: true,
            data: Some(data),
        }
    }

    pub fn rejected() -> Self {
        Self::default()
    }
}

impl From<FingerprintResult<String>> for VerificationOutcome {
    fn from(result: FingerprintResult<String>) -> Self {
        match result {
            Ok(data) => Self::verified(data),
            Err(_) => Self::rejected(),
        }
    }
}

/// Request body with the envelope flattened next to other fields
///
/// Serializes as `{ "timestamp", "hash", "signature", ...fields }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedRequest<T> {
    #[serde(flatten)]
    pub envelope: SignedEnvelope,
    #[serde(flatten)]
    pub fields: T,
}
