//! JWT issuance and verification core
//!
//! Asymmetric-key token signing and validation for the project's
//! microservices. Key material is loaded once at startup; issuance and
//! verification are pure functions of their inputs plus that immutable state.

pub mod claims;
pub mod error;
pub mod keys;
pub mod registry;
pub mod service;
pub mod signer;
pub mod verifier;

pub use claims::{Claims, TokenKind, RESERVED_CLAIMS, TOKEN_TYPE_CLAIM};
pub use error::AuthError;
pub use keys::{KeyAlgorithm, KeyMaterial};
pub use registry::ServiceRegistry;
pub use service::{AuthService, SERVICE_NAME_CLAIM};
pub use signer::TokenSigner;
pub use verifier::TokenVerifier;
