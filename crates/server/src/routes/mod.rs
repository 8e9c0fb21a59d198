//! HTTP surface for the embedding proxy.
//!
//! Two routes do the real work: the wildcard proxy route that fetches and
//! rewrites target documents for the simulator iframe, and the
//! validate-url route the wizard calls while the user types.

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::AppState;

pub mod proxy;
pub mod validate_url;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/proxy", get(proxy::missing_target))
        .route("/api/proxy/{*path}", get(proxy::proxy_target))
        .route("/api/validate-url", post(validate_url::validate_url))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
