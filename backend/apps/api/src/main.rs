//! API Server Entry Point
//!
//! Serves the signed sample routes. Uses `anyhow` for startup errors;
//! request-level errors go through `kernel::error::AppError`.

use std::env;
use std::net::SocketAddr;

use axum::{
    Router, http,
    http::{Method, header},
};
use fingerprint::{FingerprintConfig, signed_router};
use kernel::error::app_error::AppResult;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_PORT: u16 = 31113;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,fingerprint=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let loaded: AppResult<FingerprintConfig> = FingerprintConfig::from_env();
    let config = match loaded {
        Ok(config) => config,
        Err(e) if cfg!(debug_assertions) => {
            tracing::warn!(error = %e, "Using development fingerprint config with a random secret");
            FingerprintConfig::development()
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(
        allowed_delay_ms = config.allowed_delay_ms(),
        max_body_bytes = config.max_body_bytes,
        "Fingerprint verification configured"
    );

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:40922,http://127.0.0.1:40922".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([header::CONTENT_TYPE, header::ACCEPT]));

    let app = Router::new()
        .nest("/api/signed", signed_router(config))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let port = match env::var("API_PORT") {
        Ok(raw) => raw.parse::<u16>()?,
        Err(_) => DEFAULT_PORT,
    };
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
