//! Shared Secret Value Object

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Symmetric secret known to signer and verifier
///
/// Supplied by configuration. Not serializable, redacted in `Debug`,
/// zeroized on drop. An empty secret is accepted but yields weak envelopes.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret(String);

impl SharedSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Random base64 secret (for development)
    pub fn random() -> Self {
        Self(platform::crypto::to_base64(&platform::crypto::random_bytes(32)))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for SharedSecret {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl From<&str> for SharedSecret {
    fn from(secret: &str) -> Self {
        Self::new(secret)
    }
}

impl From<String> for SharedSecret {
    fn from(secret: String) -> Self {
        Self::new(secret)
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedSecret").field(&"[REDACTED]").finish()
    }
}
