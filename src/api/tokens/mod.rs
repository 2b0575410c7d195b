//! Token issuance, validation and key discovery endpoints

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::api::middleware::RequireService;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::user::UserIdentity;

/// Response for GET /public_key
#[derive(Debug, Serialize, Deserialize)]
pub struct PublicKeyResponse {
    pub public_key: String,
    pub key_format_algorithm: String,
}

/// Request body for POST /tokens/validate
#[derive(Debug, Deserialize)]
pub struct ValidateTokenRequest {
    pub jwt_token: String,
}

/// Response for POST /tokens/validate
#[derive(Debug, Serialize, Deserialize)]
pub struct ValidateTokenResponse {
    pub is_jwt_valid: bool,
}

/// Request body for POST /tokens/service
#[derive(Debug, Deserialize)]
pub struct ServiceTokenRequest {
    pub service_name: String,
    pub shared_secret: String,
}

/// Request body for POST /tokens/user
#[derive(Debug, Deserialize)]
pub struct UserTokenRequest {
    pub user_id: i64,
    pub email: String,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

fn default_is_active() -> bool {
    true
}

/// Response carrying a freshly issued token
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub jwt_token: String,
    pub expires_at: DateTime<Utc>,
}

/// GET /public_key
///
/// Exposes the verification key so other services can check token
/// signatures without calling back into this service.
pub async fn public_key(State(state): State<AppState>) -> Json<PublicKeyResponse> {
    Json(PublicKeyResponse {
        public_key: state.auth_service.public_key_pem().to_string(),
        key_format_algorithm: state.auth_service.key_algorithm().to_string(),
    })
}

/// POST /tokens/validate
///
/// The response body only says whether the token is valid; the precise
/// failure reason stays in the logs so the endpoint cannot be used as a
/// verification oracle.
pub async fn validate_token(
    State(state): State<AppState>,
    Json(request): Json<ValidateTokenRequest>,
) -> impl IntoResponse {
    match state.auth_service.verify_token(&request.jwt_token) {
        Ok(claims) => {
            debug!(sub = %claims.sub, "Token validated");
            (StatusCode::OK, Json(ValidateTokenResponse { is_jwt_valid: true }))
        }
        Err(e) => {
            warn!(error = %e, "Token validation failed");
            (
                StatusCode::UNAUTHORIZED,
                Json(ValidateTokenResponse { is_jwt_valid: false }),
            )
        }
    }
}

/// POST /tokens/service
///
/// Authenticates a registered microservice by its shared secret and hands
/// back a microservice token.
pub async fn issue_service_token(
    State(state): State<AppState>,
    Json(request): Json<ServiceTokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let jwt_token = state
        .auth_service
        .issue_service_token(&request.service_name, &request.shared_secret)
        .map_err(|e| {
            warn!(service = %request.service_name, error = %e, "Service token request rejected");
            ApiError::from(e)
        })?;

    Ok(Json(TokenResponse {
        jwt_token,
        expires_at: Utc::now() + state.auth_service.token_ttl(),
    }))
}

/// POST /tokens/user
///
/// Issues a user token on behalf of the user-management service. The caller
/// must present a microservice token; when `user_token_issuer` is configured
/// only that service may call this route.
pub async fn issue_user_token(
    State(state): State<AppState>,
    RequireService(service): RequireService,
    Json(request): Json<UserTokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    if let Some(issuer) = &state.user_token_issuer {
        if &service.name != issuer {
            warn!(
                service = %service.name,
                "Service is not allowed to request user tokens"
            );
            return Err(ApiError::forbidden(
                "This service is not allowed to request user tokens",
            ));
        }
    }

    let user = UserIdentity::new(request.user_id, &request.email, request.is_active)?;

    let jwt_token = state.auth_service.issue_user_token(&user)?;

    info!(
        user_id = user.user_id(),
        requested_by = %service.name,
        "Issued user token"
    );

    Ok(Json(TokenResponse {
        jwt_token,
        expires_at: Utc::now() + state.auth_service.token_ttl(),
    }))
}
