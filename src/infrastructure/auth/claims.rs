//! JWT claim set construction
//!
//! All tokens issued by this service share one claim layout: the reserved
//! `sub`/`iat`/`exp` (plus optional `nbf`) and a flattened map of extra
//! claims such as `email` or `service_name`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::AuthError;

/// Claim name carrying the token kind, evaluated by consuming microservices
pub const TOKEN_TYPE_CLAIM: &str = "token_type";

/// Claim names managed by the builder; extra claims may not collide with them
pub const RESERVED_CLAIMS: &[&str] = &["sub", "iat", "exp", "nbf", TOKEN_TYPE_CLAIM];

/// Kinds of tokens issued by the auth service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// A token for an end user who passed credential verification elsewhere
    RegisteredUser,
    /// A token for a registered microservice of the project
    Microservice,
}

impl TokenKind {
    /// The value stored under the `token_type` claim
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RegisteredUser => "registered_user",
            Self::Microservice => "microservice",
        }
    }
}

/// A validated JWT claim set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - the user or service identifier
    pub sub: String,
    /// Issued-at timestamp (Unix epoch seconds)
    pub iat: i64,
    /// Expiration timestamp (Unix epoch seconds)
    pub exp: i64,
    /// Not-before timestamp, optional
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    /// All non-reserved claims (email, is_active, token_type, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    /// Build a claim set for `subject`, valid from `now` for `ttl`.
    ///
    /// `now` is an explicit input rather than read ambiently so issuance is
    /// deterministic under test. Guarantees `exp > iat` since `ttl` must be
    /// positive.
    pub fn build(
        subject: &str,
        now: DateTime<Utc>,
        ttl: Duration,
        extra: Map<String, Value>,
    ) -> Result<Self, AuthError> {
        if subject.is_empty() {
            return Err(AuthError::invalid_claims("Subject must not be empty"));
        }
        if ttl <= Duration::zero() {
            return Err(AuthError::invalid_claims("Token TTL must be positive"));
        }
        if let Some(name) = extra.keys().find(|k| RESERVED_CLAIMS.contains(&k.as_str())) {
            return Err(AuthError::invalid_claims(format!(
                "Extra claim '{}' collides with a reserved claim name",
                name
            )));
        }

        let iat = now.timestamp();
        let exp = (now + ttl).timestamp();

        Ok(Self {
            sub: subject.to_string(),
            iat,
            exp,
            nbf: None,
            extra,
        })
    }

    /// Tag the claim set with a token kind under `token_type`.
    ///
    /// Kept out of `build` so the reserved-name collision check above also
    /// covers callers trying to smuggle their own `token_type`.
    pub fn with_kind(mut self, kind: TokenKind) -> Self {
        self.extra
            .insert(TOKEN_TYPE_CLAIM.to_string(), Value::from(kind.as_str()));
        self
    }

    /// The token kind, if the `token_type` claim is present and recognized
    pub fn kind(&self) -> Option<TokenKind> {
        match self.extra.get(TOKEN_TYPE_CLAIM)?.as_str()? {
            "registered_user" => Some(TokenKind::RegisteredUser),
            "microservice" => Some(TokenKind::Microservice),
            _ => None,
        }
    }

    /// A string-valued extra claim, if present
    pub fn extra_str(&self, name: &str) -> Option<&str> {
        self.extra.get(name).and_then(Value::as_str)
    }
}
