//! Domain Services
//!
//! Envelope generator and verifier. Both are synchronous and stateless;
//! the only ambient inputs are the wall clock and the OS RNG.

use std::time::Duration;

use chrono::Utc;
use platform::cipher::{decrypt_with_passphrase, encrypt_with_passphrase};
use platform::crypto::{from_hex, hmac_sha256, to_hex, verify_hmac_sha256};

use crate::domain::envelope::{SignedEnvelope, VerificationOutcome};
use crate::domain::secret::SharedSecret;
use crate::error::{FingerprintError, FingerprintResult};

/// Freshness window applied when the caller does not pass one
pub const DEFAULT_ALLOWED_DELAY: Duration = Duration::from_millis(5000);

/// Current wall-clock time in milliseconds since the Unix epoch
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Sign `data` under `secret` at the current time
pub fn generate(data: &str, secret: &SharedSecret) -> FingerprintResult<SignedEnvelope> {
    generate_at(data, secret, now_ms())
}

/// Sign `data` under `secret` with an explicit timestamp
pub fn generate_at(
    data: &str,
    secret: &SharedSecret,
    now_ms: i64,
) -> FingerprintResult<SignedEnvelope> {
    let timestamp = now_ms.to_string();
    let hash = encrypt_with_passphrase(data.as_bytes(), secret.as_bytes())?;
    let signature = compute_signature(&hash, &timestamp, secret)?;

    Ok(SignedEnvelope {
        timestamp,
        hash,
        signature,
    })
}

/// Hex HMAC-SHA256 over `hash || timestamp`
pub fn compute_signature(
    hash: &str,
    timestamp: &str,
    secret: &SharedSecret,
) -> FingerprintResult<String> {
    let tag = hmac_sha256(secret.as_bytes(), signed_message(hash, timestamp).as_bytes())?;
    Ok(to_hex(&tag))
}

fn signed_message(hash: &str, timestamp: &str) -> String {
    let mut message = String::with_capacity(hash.len() + timestamp.len());
    message.push_str(hash);
    message.push_str(timestamp);
    message
}

/// Verify an envelope against the current time
///
/// `allowed_delay` defaults to [`DEFAULT_ALLOWED_DELAY`]. Never fails;
/// every rejection is `success: false`.
pub fn verify(
    envelope: &SignedEnvelope,
    secret: &SharedSecret,
    allowed_delay: Option<Duration>,
) -> VerificationOutcome {
    verify_at(envelope, secret, allowed_delay, now_ms())
}

/// [`verify`] with an explicit clock reading
pub fn verify_at(
    envelope: &SignedEnvelope,
    secret: &SharedSecret,
    allowed_delay: Option<Duration>,
    now_ms: i64,
) -> VerificationOutcome {
    let allowed_delay = allowed_delay.unwrap_or(DEFAULT_ALLOWED_DELAY);
    verify_detailed(envelope, secret, allowed_delay, now_ms).into()
}

/// Verify and report why an envelope was rejected
///
/// Order is fixed: freshness, then tag, then decryption. Envelopes dated
/// in the future pass the freshness step.
pub fn verify_detailed(
    envelope: &SignedEnvelope,
    secret: &SharedSecret,
    allowed_delay: Duration,
    now_ms: i64,
) -> FingerprintResult<String> {
    // Strict integer parse: fractional ("1700000000000.0") and out-of-range
    // values are rejected rather than truncated.
    let issued_at: i64 = envelope
        .timestamp
        .parse()
        .map_err(|_| FingerprintError::MalformedTimestamp)?;

    let elapsed_ms = now_ms.saturating_sub(issued_at);
    let allowed_ms = i64::try_from(allowed_delay.as_millis()).unwrap_or(i64::MAX);
    if elapsed_ms > allowed_ms {
        return Err(FingerprintError::Expired { elapsed_ms });
    }

    if !signature_matches(envelope, secret)? {
        return Err(FingerprintError::SignatureMismatch);
    }

    let plaintext = decrypt_with_passphrase(&envelope.hash, secret.as_bytes())
        .map_err(|_| FingerprintError::Decryption)?;

    String::from_utf8(plaintext).map_err(|_| FingerprintError::InvalidPayload)
}

/// Compare the supplied tag against the expected one on the decoded bytes
///
/// Only the canonical lowercase hex encoding is accepted.
fn signature_matches(envelope: &SignedEnvelope, secret: &SharedSecret) -> FingerprintResult<bool> {
    if envelope.signature.bytes().any(|b| b.is_ascii_uppercase()) {
        return Ok(false);
    }
    let Ok(tag) = from_hex(&envelope.signature) else {
        return Ok(false);
    };

    let message = signed_message(&envelope.hash, &envelope.timestamp);
    Ok(verify_hmac_sha256(secret.as_bytes(), message.as_bytes(), &tag)?)
}
