//! Signed Router

use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit, middleware, routing::get};

use crate::application::config::FingerprintConfig;
use crate::presentation::handlers;
use crate::presentation::middleware::{SignatureState, require_signed_envelope};

/// Create the router: `/echo` behind envelope verification, `/health` open
///
/// Protected routes read at most `max_body_bytes` of body.
pub fn signed_router(config: FingerprintConfig) -> Router {
    let max_body_bytes = config.max_body_bytes;
    let state = SignatureState {
        config: Arc::new(config),
    };

    let protected = Router::new()
        .route("/echo", get(handlers::echo).post(handlers::echo))
        .route_layer(middleware::from_fn_with_state(
            state,
            require_signed_envelope,
        ))
        .layer(DefaultBodyLimit::max(max_body_bytes));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(protected)
}
