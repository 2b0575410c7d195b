//! PMP Auth Service
//!
//! JWT token issuance and verification for the PMP microservice fleet:
//! - Asymmetric RS256/RS384/RS512 signing with PEM-configured key pairs
//! - User and microservice tokens with typed claims
//! - Strict verification with algorithm pinning and clock-skew tolerance
//! - Public key discovery so peers can verify tokens locally

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use api::state::AppState;
use infrastructure::auth::{AuthService, ServiceRegistry};

/// Create the application state with all services initialized
pub fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let registry = ServiceRegistry::from_secrets(config.services.clone());
    info!(
        registered_services = config.services.len(),
        "Loaded microservice registry"
    );

    let auth_service = AuthService::from_settings(&config.jwt, registry)
        .context("Failed to initialize the auth service")?;

    Ok(AppState::new(
        Arc::new(auth_service),
        config.jwt.user_token_issuer.clone(),
    ))
}
