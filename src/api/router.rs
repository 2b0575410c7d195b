use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::health;
use super::middleware::logging_middleware;
use super::state::AppState;
use super::tokens;

/// Create the full router with application state
pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // Key discovery
        .route("/public_key", get(tokens::public_key))
        // Token endpoints
        .route("/tokens/validate", post(tokens::validate_token))
        .route("/tokens/service", post(tokens::issue_service_token))
        .route("/tokens/user", post(tokens::issue_user_token))
        // Add state and middleware
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}
