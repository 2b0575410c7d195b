//! Microservice authentication middleware using JWT bearer tokens

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use tracing::{debug, warn};

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::infrastructure::auth::{Claims, TokenKind, SERVICE_NAME_CLAIM};

/// The microservice identity carried by a verified bearer token
#[derive(Debug, Clone)]
pub struct ServiceIdentity {
    pub name: String,
    pub claims: Claims,
}

/// Extractor that requires a valid *microservice* JWT
///
/// The token comes from the `Authorization: Bearer <jwt_token>` header and
/// must carry `token_type=microservice` plus a `service_name` claim.
#[derive(Debug, Clone)]
pub struct RequireService(pub ServiceIdentity);

impl FromRequestParts<AppState> for RequireService {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)?;

        debug!("Validating microservice JWT token");

        let claims = state.auth_service.verify_token(&token).map_err(|e| {
            warn!(error = %e, "Rejected microservice token");
            ApiError::from(e)
        })?;

        if claims.kind() != Some(TokenKind::Microservice) {
            warn!(sub = %claims.sub, "Non-microservice token on a service-only route");
            return Err(ApiError::forbidden(
                "This route requires a microservice token",
            ));
        }

        let name = claims
            .extra_str(SERVICE_NAME_CLAIM)
            .ok_or_else(|| ApiError::unauthorized("Token is missing the service name"))?
            .to_string();

        Ok(RequireService(ServiceIdentity { name, claims }))
    }
}

/// Extract a bearer token from the Authorization header
pub fn extract_bearer_token(headers: &axum::http::HeaderMap) -> Result<String, ApiError> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| ApiError::bad_request("Invalid Authorization header encoding"))?;

        if let Some(token) = auth_str.strip_prefix("Bearer ") {
            return Ok(token.trim().to_string());
        }
    }

    Err(ApiError::unauthorized(
        "Authentication required. Provide a JWT via 'Authorization: Bearer <token>' header",
    ))
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, StatusCode};

    use super::*;

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            "Bearer eyJhbGciOiJSUzI1NiJ9.test".parse().unwrap(),
        );

        let result = extract_bearer_token(&headers);
        assert_eq!(result.unwrap(), "eyJhbGciOiJSUzI1NiJ9.test");
    }

    #[test]
    fn test_missing_token() {
        let headers = HeaderMap::new();

        let err = extract_bearer_token(&headers).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_wrong_auth_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Basic dXNlcjpwYXNz".parse().unwrap());

        assert!(extract_bearer_token(&headers).is_err());
    }

    #[test]
    fn test_trimmed_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            "Bearer   token-with-spaces   ".parse().unwrap(),
        );

        assert_eq!(extract_bearer_token(&headers).unwrap(), "token-with-spaces");
    }
}
