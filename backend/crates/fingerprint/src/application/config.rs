//! Application Configuration
//!
//! Configuration for envelope verification and the signing client.

use std::str::FromStr;
use std::time::Duration;

use kernel::error::app_error::{AppResult, OptionExt, ResultExt};
use kernel::error::kind::ErrorKind;

use crate::domain::secret::SharedSecret;
use crate::domain::services::DEFAULT_ALLOWED_DELAY;

pub const ENV_SECRET: &str = "FINGERPRINT_SECRET";
pub const ENV_ALLOWED_DELAY_MS: &str = "FINGERPRINT_ALLOWED_DELAY_MS";
pub const ENV_MAX_BODY_BYTES: &str = "FINGERPRINT_MAX_BODY_BYTES";
pub const ENV_BASE_URL: &str = "API_BASE_URL";
pub const ENV_TIMEOUT_MS: &str = "API_TIMEOUT_MS";

/// Fingerprint configuration
#[derive(Debug, Clone)]
pub struct FingerprintConfig {
    /// Shared secret for signing and verification
    pub secret: SharedSecret,
    /// Freshness window for incoming envelopes
    pub allowed_delay: Duration,
    /// Body read limit for the verifying middleware
    pub max_body_bytes: usize,
    /// Base URL the signing client targets
    pub base_url: String,
    /// Per-request timeout for the signing client
    pub request_timeout: Duration,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            secret: SharedSecret::default(),
            allowed_delay: DEFAULT_ALLOWED_DELAY,
            max_body_bytes: 64 * 1024,
            base_url: "http://127.0.0.1:31113".to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl FingerprintConfig {
    /// Create config with a random secret (for development)
    pub fn with_random_secret() -> Self {
        Self {
            secret: SharedSecret::random(),
            ..Default::default()
        }
    }

    /// Create config for development (random secret, lenient window)
    pub fn development() -> Self {
        Self {
            allowed_delay: Duration::from_secs(30),
            ..Self::with_random_secret()
        }
    }

    /// Load from process environment
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable source
    ///
    /// `FINGERPRINT_SECRET` is required; everything else falls back to
    /// [`FingerprintConfig::default`].
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let secret = lookup(ENV_SECRET)
            .map(SharedSecret::new)
            .ok_or_app_err(ErrorKind::InternalServerError, "FINGERPRINT_SECRET must be set")?;
        if secret.is_empty() {
            tracing::warn!("FINGERPRINT_SECRET is empty; envelopes will be trivially forgeable");
        }

        let allowed_delay = parse_var::<u64, _>(&lookup, ENV_ALLOWED_DELAY_MS)?
            .map(Duration::from_millis)
            .unwrap_or(defaults.allowed_delay);
        let max_body_bytes =
            parse_var::<usize, _>(&lookup, ENV_MAX_BODY_BYTES)?.unwrap_or(defaults.max_body_bytes);
        let request_timeout = parse_var::<u64, _>(&lookup, ENV_TIMEOUT_MS)?
            .map(Duration::from_millis)
            .unwrap_or(defaults.request_timeout);
        let base_url = lookup(ENV_BASE_URL).unwrap_or(defaults.base_url);

        Ok(Self {
            secret,
            allowed_delay,
            max_body_bytes,
            base_url,
            request_timeout,
        })
    }

    /// Saturates at `i64::MAX`
    pub fn allowed_delay_ms(&self) -> i64 {
        i64::try_from(self.allowed_delay.as_millis()).unwrap_or(i64::MAX)
    }
}

fn parse_var<T, F>(lookup: &F, name: &'static str) -> AppResult<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_app_err(ErrorKind::InternalServerError, format!("{name} is not a valid number"))
        })
        .transpose()
}
