//! Application state for shared services

use std::sync::Arc;

use crate::infrastructure::auth::AuthService;

/// Shared, immutable state behind every request handler.
///
/// `AuthService` carries the process-wide key material; it is constructed
/// once at startup and only ever read afterwards, so no locking is needed.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    /// When set, only this microservice may request user tokens
    pub user_token_issuer: Option<String>,
}

impl AppState {
    pub fn new(auth_service: Arc<AuthService>, user_token_issuer: Option<String>) -> Self {
        Self {
            auth_service,
            user_token_issuer,
        }
    }
}
