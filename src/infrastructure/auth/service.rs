//! Token issuance and verification orchestration
//!
//! `AuthService` is the single entry point the API layer talks to. It owns
//! the immutable key material (injected at construction, never global) and
//! composes the claims builder, signer and verifier.

use std::fmt::Debug;
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::claims::{Claims, TokenKind};
use super::error::AuthError;
use super::keys::{KeyAlgorithm, KeyMaterial};
use super::registry::ServiceRegistry;
use super::signer::TokenSigner;
use super::verifier::TokenVerifier;
use crate::config::JwtSettings;
use crate::domain::user::UserIdentity;

/// Claim carrying the code name of the microservice a token was issued to
pub const SERVICE_NAME_CLAIM: &str = "service_name";

#[derive(Clone)]
pub struct AuthService {
    keys: Arc<KeyMaterial>,
    signer: TokenSigner,
    verifier: TokenVerifier,
    token_ttl: Duration,
    registry: ServiceRegistry,
}

impl Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("algorithm", &self.keys.algorithm())
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

impl AuthService {
    pub fn new(
        keys: Arc<KeyMaterial>,
        token_ttl: Duration,
        leeway: Duration,
        registry: ServiceRegistry,
    ) -> Self {
        Self {
            signer: TokenSigner::new(Arc::clone(&keys)),
            verifier: TokenVerifier::new(Arc::clone(&keys), leeway),
            keys,
            token_ttl,
            registry,
        }
    }

    /// Load key material from settings and wire up the service.
    ///
    /// A configuration error here must abort startup; there is no degraded
    /// mode without valid keys.
    pub fn from_settings(
        settings: &JwtSettings,
        registry: ServiceRegistry,
    ) -> Result<Self, AuthError> {
        let keys = Arc::new(KeyMaterial::load(settings)?);

        info!(
            algorithm = %keys.algorithm(),
            validity_hours = settings.validity_hours,
            "Loaded JWT key material"
        );

        Ok(Self::new(
            keys,
            Duration::hours(settings.validity_hours as i64),
            Duration::seconds(settings.leeway_seconds as i64),
            registry,
        ))
    }

    /// The public verification key, exposed so other services can verify
    /// tokens on their own
    pub fn public_key_pem(&self) -> &str {
        self.keys.public_key_pem()
    }

    pub fn key_algorithm(&self) -> KeyAlgorithm {
        self.keys.algorithm()
    }

    /// How long issued tokens stay valid
    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Issue a token for an arbitrary subject with extra claims
    pub fn issue_token(
        &self,
        subject: &str,
        extra: Map<String, Value>,
    ) -> Result<String, AuthError> {
        let claims = Claims::build(subject, Utc::now(), self.token_ttl, extra)?;
        self.signer.sign(&claims)
    }

    /// Issue a token for a user whose credentials were already verified by
    /// the external user-management collaborator
    pub fn issue_user_token(&self, user: &UserIdentity) -> Result<String, AuthError> {
        let mut extra = Map::new();
        extra.insert("email".to_string(), Value::from(user.email()));
        extra.insert("is_active".to_string(), Value::from(user.is_active()));

        let claims = Claims::build(
            &user.user_id().to_string(),
            Utc::now(),
            self.token_ttl,
            extra,
        )?
        .with_kind(TokenKind::RegisteredUser);

        let token = self.signer.sign(&claims)?;
        debug!(user_id = user.user_id(), "Issued user token");
        Ok(token)
    }

    /// Issue a token for a registered microservice after checking its shared
    /// secret. Wrong or unknown credentials fail with
    /// `AuthError::ServiceAuthentication`.
    pub fn issue_service_token(
        &self,
        service_name: &str,
        shared_secret: &str,
    ) -> Result<String, AuthError> {
        if !self.registry.authenticate(service_name, shared_secret) {
            return Err(AuthError::ServiceAuthentication(service_name.to_string()));
        }

        let mut extra = Map::new();
        extra.insert(SERVICE_NAME_CLAIM.to_string(), Value::from(service_name));

        let claims = Claims::build(service_name, Utc::now(), self.token_ttl, extra)?
            .with_kind(TokenKind::Microservice);

        let token = self.signer.sign(&claims)?;
        info!(service = %service_name, "Issued microservice token");
        Ok(token)
    }

    /// Verify a token at the current instant, returning the validated claims
    /// or the precise failure reason (for logging, not for untrusted callers)
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.verifier.verify(token, Utc::now())
    }
}
