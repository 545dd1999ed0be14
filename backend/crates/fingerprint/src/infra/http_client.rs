//! Signing HTTP Client
//!
//! Transport wrapper around `reqwest`. Signs payloads before dispatch and
//! normalizes every outcome (success, HTTP error, bad JSON, timeout,
//! network failure) into an [`ApiResponse`]. Never verifies envelopes.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::application::config::FingerprintConfig;
use crate::domain::envelope::{SignedEnvelope, SignedRequest};
use crate::domain::secret::SharedSecret;
use crate::domain::services::generate;
use crate::error::TransportError;
use crate::presentation::dto::ApiResponse;

#[derive(Debug, Clone)]
pub struct SignedClient {
    http: reqwest::Client,
    base_url: String,
    secret: SharedSecret,
}

impl SignedClient {
    pub fn new(
        base_url: impl Into<String>,
        secret: SharedSecret,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            secret,
        })
    }

    pub fn from_config(config: &FingerprintConfig) -> Result<Self, TransportError> {
        Self::new(
            config.base_url.clone(),
            config.secret.clone(),
            config.request_timeout,
        )
    }

    /// Unsigned GET with query parameters
    pub async fn get<Q>(&self, path: &str, query: &Q) -> ApiResponse
    where
        Q: Serialize + ?Sized,
    {
        self.dispatch(path, self.http.get(self.url(path)).query(query))
            .await
    }

    /// Unsigned POST with a JSON body
    pub async fn post<B>(&self, path: &str, body: &B) -> ApiResponse
    where
        B: Serialize + ?Sized,
    {
        self.dispatch(path, self.http.post(self.url(path)).json(body))
            .await
    }

    /// GET with `payload` signed into the query string
    pub async fn get_signed<P>(&self, path: &str, payload: &P) -> ApiResponse
    where
        P: Serialize + ?Sized,
    {
        let envelope = match self.sign(payload) {
            Ok(envelope) => envelope,
            Err(e) => return self.fail(path, e),
        };
        self.dispatch(path, self.http.get(self.url(path)).query(&envelope))
            .await
    }

    /// POST `{ timestamp, hash, signature, ...extra }` with `payload` signed
    ///
    /// `extra` must serialize as a JSON object; its fields travel in clear.
    pub async fn post_signed<P, E>(&self, path: &str, payload: &P, extra: &E) -> ApiResponse
    where
        P: Serialize + ?Sized,
        E: Serialize,
    {
        let envelope = match self.sign(payload) {
            Ok(envelope) => envelope,
            Err(e) => return self.fail(path, e),
        };
        let body = SignedRequest {
            envelope,
            fields: extra,
        };
        self.dispatch(path, self.http.post(self.url(path)).json(&body))
            .await
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn sign<P>(&self, payload: &P) -> Result<SignedEnvelope, TransportError>
    where
        P: Serialize + ?Sized,
    {
        let data = serde_json::to_string(payload)?;
        Ok(generate(&data, &self.secret)?)
    }

    async fn dispatch(&self, path: &str, request: reqwest::RequestBuilder) -> ApiResponse {
        tracing::debug!(path = %path, "Dispatching API request");
        match send(request).await {
            Ok(response) => response,
            Err(e) => self.fail(path, e),
        }
    }

    fn fail(&self, path: &str, err: TransportError) -> ApiResponse {
        match &err {
            TransportError::Status { status, .. } => {
                tracing::info!(path = %path, status = *status, "API request returned error status");
            }
            TransportError::Signing(_) | TransportError::Serialize(_) => {
                tracing::error!(path = %path, error = %err, "Failed to prepare API request");
            }
            _ => {
                tracing::warn!(path = %path, error = %err, "API request failed");
            }
        }
        err.into_api_response()
    }
}

async fn send(request: reqwest::RequestBuilder) -> Result<ApiResponse, TransportError> {
    let response = request.send().await?;
    let status = response.status().as_u16();
    let body = response.text().await?;
    normalize(status, &body)
}

/// Map a raw HTTP status and body into the uniform shape
pub(crate) fn normalize(status: u16, body: &str) -> Result<ApiResponse, TransportError> {
    let parsed = if body.trim().is_empty() {
        None
    } else {
        serde_json::from_str::<Value>(body).ok()
    };

    if !(200..300).contains(&status) {
        let message = parsed.as_ref().and_then(extract_message);
        return Err(TransportError::Status { status, message });
    }

    if parsed.is_none() && !body.trim().is_empty() {
        return Err(TransportError::MalformedResponse);
    }

    match parsed {
        None => Ok(ApiResponse::ok(None)),
        Some(Value::Object(map)) if map.contains_key("success") => {
            serde_json::from_value(Value::Object(map)).map_err(|_| TransportError::MalformedResponse)
        }
        Some(value) => Ok(ApiResponse::ok(Some(value))),
    }
}

fn extract_message(value: &Value) -> Option<String> {
    ["message", "detail", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}
