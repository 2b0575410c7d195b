//! Compact JWT serialization and signing

use std::sync::Arc;

use jsonwebtoken::{encode, Header};

use super::claims::Claims;
use super::error::AuthError;
use super::keys::KeyMaterial;

/// Serializes claim sets into signed compact tokens.
///
/// The header names exactly the configured algorithm; the signature covers
/// the `header.payload` bytes and is produced with the private key. RSA
/// signatures are not byte-deterministic across calls, but every produced
/// token verifies against the paired public key.
#[derive(Clone)]
pub struct TokenSigner {
    keys: Arc<KeyMaterial>,
}

impl TokenSigner {
    pub fn new(keys: Arc<KeyMaterial>) -> Self {
        Self { keys }
    }

    /// Sign a claim set into a three-segment compact token
    pub fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        let header = Header::new(self.keys.algorithm().to_jsonwebtoken());

        encode(&header, claims, self.keys.encoding_key())
            .map_err(|e| AuthError::signing(e.to_string()))
    }
}
