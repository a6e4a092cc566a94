use crate::AppState;
use axum::{Router, routing::get};

/// Public Router Module
///
/// Defines endpoints that are **unauthenticated** and accessible to any client.
/// Post data never flows through here: even public posts require a resolved
/// caller identity, because the feed is always filtered relative to a viewer.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers and uptime checks. Answers "ok"
        // without touching the store or the auth layer.
        .route("/health", get(|| async { "ok" }))
}
