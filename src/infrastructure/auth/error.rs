//! Error taxonomy for token issuance and verification

use thiserror::Error;

/// Errors raised by the token signing/verification core.
///
/// Verification failures are returned as typed values, never panics, so the
/// API layer can log the precise reason while answering untrusted callers
/// with a single generic "token is invalid" outcome.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Key material or algorithm configuration is invalid. Fatal at startup.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The private key could not produce a signature.
    #[error("Signing failed: {0}")]
    Signing(String),

    /// Token string is not three non-empty base64url segments.
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    /// Token header declares a different algorithm than the configured one.
    /// Rejected before any signature check to defeat algorithm-confusion
    /// and downgrade attempts (`none`, HS*).
    #[error("Algorithm mismatch: token declares '{found}', service is configured for '{expected}'")]
    AlgorithmMismatch { expected: String, found: String },

    /// Signature does not verify against the public key.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Claims are missing required fields or are ill-typed.
    #[error("Invalid claims: {0}")]
    InvalidClaims(String),

    /// `exp` is in the past (beyond the allowed clock skew).
    #[error("Token expired")]
    TokenExpired,

    /// `nbf` is in the future (beyond the allowed clock skew).
    #[error("Token not yet valid")]
    TokenNotYetValid,

    /// A microservice presented a wrong or unknown shared secret.
    #[error("Service authentication failed for '{0}'")]
    ServiceAuthentication(String),
}

impl AuthError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn signing(message: impl Into<String>) -> Self {
        Self::Signing(message.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedToken(message.into())
    }

    pub fn invalid_claims(message: impl Into<String>) -> Self {
        Self::InvalidClaims(message.into())
    }

    /// Whether this error came out of `TokenVerifier::verify`.
    ///
    /// Used by the API layer to decide between a generic 401 (verification)
    /// and a 4xx/5xx with detail (issuance or configuration).
    pub fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            Self::MalformedToken(_)
                | Self::AlgorithmMismatch { .. }
                | Self::InvalidSignature
                | Self::InvalidClaims(_)
                | Self::TokenExpired
                | Self::TokenNotYetValid
        )
    }
}
