//! Cross-module tests for the fingerprint crate
//! Middleware via `oneshot`, transport against a live in-process server.

#[cfg(test)]
mod support {
    use crate::application::config::FingerprintConfig;
    use crate::domain::secret::SharedSecret;
    use axum::Router;
    use std::net::SocketAddr;

    pub const SECRET: &str = "s3cr3t";

    pub fn config() -> FingerprintConfig {
        FingerprintConfig {
            secret: SharedSecret::new(SECRET),
            ..FingerprintConfig::default()
        }
    }

    pub fn encode_component(raw: &str) -> String {
        raw.replace('+', "%2B")
            .replace('/', "%2F")
            .replace('=', "%3D")
    }

    pub async fn spawn_server(router: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}

#[cfg(test)]
mod middleware_tests {
    use super::support::*;
    use crate::domain::envelope::SignedRequest;
    use crate::domain::secret::SharedSecret;
    use crate::domain::services::{generate, generate_at, now_ms};
    use crate::presentation::router::signed_router;
    use axum::body::{Body, Bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::json;
    use tower::ServiceExt;

    fn signed_post(payload: &str, secret: &str, issued_at: i64) -> Request<Body> {
        let envelope = generate_at(payload, &SharedSecret::new(secret), issued_at).unwrap();
        let body = SignedRequest {
            envelope,
            fields: json!({ "campaign": "daily" }),
        };
        Request::builder()
            .method("POST")
            .uri("/echo")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_post_with_valid_envelope() {
        let router = signed_router(config());
        let response = router
            .oneshot(signed_post(r#"{"userId":42}"#, SECRET, now_ms()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["data"], json!({ "userId": 42 }));
    }

    #[tokio::test]
    async fn test_post_with_plain_text_payload() {
        let router = signed_router(config());
        let response = router
            .oneshot(signed_post("userId=42", SECRET, now_ms()))
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["data"], json!("userId=42"));
    }

    #[tokio::test]
    async fn test_post_with_wrong_secret() {
        let router = signed_router(config());
        let response = router
            .oneshot(signed_post("userId=42", "wrong-secret", now_ms()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await, json!({ "success": false }));
    }

    #[tokio::test]
    async fn test_post_with_stale_envelope() {
        let router = signed_router(config());
        let response = router
            .oneshot(signed_post("userId=42", SECRET, now_ms() - 60_000))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await, json!({ "success": false }));
    }

    #[tokio::test]
    async fn test_post_without_envelope() {
        let router = signed_router(config());
        let request = Request::builder()
            .method("POST")
            .uri("/echo")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"userId":42}"#))
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_post_with_non_json_body() {
        let router = signed_router(config());
        let request = Request::builder()
            .method("POST")
            .uri("/echo")
            .body(Body::from("timestamp=1&hash=x&signature=y"))
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_post_over_body_limit() {
        let mut config = config();
        config.max_body_bytes = 32;
        let router = signed_router(config);

        let response = router
            .oneshot(signed_post("userId=42", SECRET, now_ms()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = body_json(response).await;
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["error"], json!("Payload Too Large"));
    }

    #[tokio::test]
    async fn test_post_with_broken_body_stream() {
        let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
            Ok(Bytes::from_static(br#"{"timestamp":"#)),
            Err(std::io::Error::other("connection reset")),
        ];
        let request = Request::builder()
            .method("POST")
            .uri("/echo")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from_stream(futures::stream::iter(chunks)))
            .unwrap();

        let response = signed_router(config()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["error"], json!("Bad Request"));
    }

    #[tokio::test]
    async fn test_get_with_query_envelope() {
        let envelope = generate(r#"{"taskId":"ad-7"}"#, &SharedSecret::new(SECRET)).unwrap();
        let uri = format!(
            "/echo?timestamp={}&hash={}&signature={}",
            envelope.timestamp,
            encode_component(&envelope.hash),
            envelope.signature
        );

        let router = signed_router(config());
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"], json!({ "taskId": "ad-7" }));
    }

    #[tokio::test]
    async fn test_get_without_query() {
        let router = signed_router(config());
        let request = Request::builder().uri("/echo").body(Body::empty()).unwrap();
        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_health_is_open() {
        let router = signed_router(config());
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["success"], json!(true));
    }
}

#[cfg(test)]
mod transport_tests {
    use super::support::*;
    use crate::domain::secret::SharedSecret;
    use crate::infra::http_client::SignedClient;
    use crate::presentation::router::signed_router;
    use axum::Json;
    use axum::http::StatusCode;
    use axum::routing::get;
    use serde_json::json;
    use std::time::Duration;

    const NO_QUERY: &[(&str, &str)] = &[];

    async fn start() -> String {
        let router = signed_router(config())
            .route("/plain", get(|| async { "not json" }))
            .route(
                "/teapot",
                get(|| async {
                    (
                        StatusCode::IM_A_TEAPOT,
                        Json(json!({ "success": false, "message": "short and stout" })),
                    )
                }),
            )
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(2)).await;
                    Json(json!({ "late": true }))
                }),
            );
        let addr = spawn_server(router).await;
        format!("http://{}", addr)
    }

    fn client(base_url: &str, secret: &str) -> SignedClient {
        SignedClient::new(base_url, SharedSecret::new(secret), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_post_signed_roundtrip() {
        let base_url = start().await;
        let response = client(&base_url, SECRET)
            .post_signed("/echo", &json!({ "userId": 42 }), &json!({ "campaign": "daily" }))
            .await;

        assert!(response.success, "{response:?}");
        assert_eq!(response.data, Some(json!({ "userId": 42 })));
        assert_eq!(response.message.as_deref(), Some("verified"));
    }

    #[tokio::test]
    async fn test_get_signed_roundtrip() {
        let base_url = start().await;
        let response = client(&base_url, SECRET)
            .get_signed("/echo", &json!({ "taskId": "ad-7" }))
            .await;

        assert!(response.success, "{response:?}");
        assert_eq!(response.data, Some(json!({ "taskId": "ad-7" })));
    }

    #[tokio::test]
    async fn test_wrong_secret_normalizes_to_failure() {
        let base_url = start().await;
        let response = client(&base_url, "wrong-secret")
            .post_signed("/echo", &json!({ "userId": 42 }), &json!({}))
            .await;

        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("HTTP 401"));
        assert!(response.data.is_none());
    }

    #[tokio::test]
    async fn test_unsigned_post_is_rejected() {
        let base_url = start().await;
        let response = client(&base_url, SECRET)
            .post("/echo", &json!({ "userId": 42 }))
            .await;

        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("HTTP 401"));
    }

    #[tokio::test]
    async fn test_unsigned_get() {
        let base_url = start().await;
        let response = client(&base_url, SECRET).get("/health", NO_QUERY).await;

        assert!(response.success);
        assert_eq!(response.message.as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn test_error_status_keeps_server_message() {
        let base_url = start().await;
        let response = client(&base_url, SECRET).get("/teapot", NO_QUERY).await;

        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("HTTP 418"));
        assert_eq!(response.message.as_deref(), Some("short and stout"));
    }

    #[tokio::test]
    async fn test_malformed_json_response() {
        let base_url = start().await;
        let response = client(&base_url, SECRET).get("/plain", NO_QUERY).await;

        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("invalid JSON response"));
    }

    #[tokio::test]
    async fn test_timeout() {
        let base_url = start().await;
        let client =
            SignedClient::new(&base_url, SharedSecret::new(SECRET), Duration::from_millis(100))
                .unwrap();
        let response = client.get("/slow", NO_QUERY).await;

        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("request timed out"));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let response = client(&format!("http://{}", addr), SECRET)
            .get("/health", NO_QUERY)
            .await;

        assert!(!response.success);
        assert!(
            response
                .error
                .as_deref()
                .is_some_and(|e| e.starts_with("network error"))
        );
    }

    #[tokio::test]
    async fn test_from_config() {
        let base_url = start().await;
        let mut config = config();
        config.base_url = base_url;

        let response = SignedClient::from_config(&config)
            .unwrap()
            .post_signed("echo", "userId=42", &json!({}))
            .await;

        assert!(response.success);
        // A JSON string payload comes back as that string
        assert_eq!(response.data, Some(json!("userId=42")));
    }
}

#[cfg(test)]
mod error_tests {
    use crate::error::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use kernel::error::{app_error::AppError, kind::ErrorKind};

    #[test]
    fn test_rejections_share_status_code() {
        let rejections = vec![
            FingerprintError::MissingEnvelope,
            FingerprintError::MalformedTimestamp,
            FingerprintError::Expired { elapsed_ms: 9000 },
            FingerprintError::SignatureMismatch,
            FingerprintError::Decryption,
            FingerprintError::InvalidPayload,
        ];

        for error in rejections {
            assert!(error.is_rejection());
            assert_eq!(error.kind(), ErrorKind::Unauthorized);
            assert_eq!(error.into_response().status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn test_crypto_failure_is_internal() {
        let error = FingerprintError::from(platform::CryptoError::InvalidKeyLength);
        assert!(!error.is_rejection());
        assert_eq!(
            error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_app_error_hides_rejection_reason() {
        let expired: AppError = FingerprintError::Expired { elapsed_ms: 9000 }.into();
        let forged: AppError = FingerprintError::SignatureMismatch.into();

        assert_eq!(expired.status_code(), 401);
        assert_eq!(expired.message(), forged.message());
    }

    #[test]
    fn test_transport_error_display() {
        assert_eq!(TransportError::Timeout.to_string(), "request timed out");
        assert_eq!(
            TransportError::Status {
                status: 503,
                message: None
            }
            .to_string(),
            "HTTP 503"
        );
    }
}
