//! Process-wide asymmetric key material
//!
//! Loaded once at startup from configuration and shared immutably for the
//! process lifetime. Key contents are never logged and never serialized.

use std::fmt::Debug;
use std::str::FromStr;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};

use super::error::AuthError;
use crate::config::JwtSettings;

/// Supported asymmetric signing algorithms (RSA family only).
///
/// Symmetric algorithms and `none` are deliberately unrepresentable here;
/// a token declaring them can never match the configured algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyAlgorithm {
    RS256,
    RS384,
    RS512,
}

impl KeyAlgorithm {
    /// The exact identifier carried in JWT headers for this algorithm
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RS256 => "RS256",
            Self::RS384 => "RS384",
            Self::RS512 => "RS512",
        }
    }

    pub(crate) fn to_jsonwebtoken(self) -> Algorithm {
        match self {
            Self::RS256 => Algorithm::RS256,
            Self::RS384 => Algorithm::RS384,
            Self::RS512 => Algorithm::RS512,
        }
    }
}

impl FromStr for KeyAlgorithm {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RS256" => Ok(Self::RS256),
            "RS384" => Ok(Self::RS384),
            "RS512" => Ok(Self::RS512),
            other => Err(AuthError::configuration(format!(
                "Unsupported key algorithm '{}'. Supported: RS256, RS384, RS512",
                other
            ))),
        }
    }
}

impl std::fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The signing/verification key pair plus the configured algorithm
///
/// Immutable after `load`; no mutation operations exist.
pub struct KeyMaterial {
    algorithm: KeyAlgorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    public_key_pem: String,
}

impl Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("algorithm", &self.algorithm)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl KeyMaterial {
    /// Load and validate key material from settings
    ///
    /// Fails with `AuthError::Configuration` when either key is missing or not
    /// valid RSA PEM, when the algorithm identifier is unsupported, or when
    /// the public key is not the pair of the private key. The service must not
    /// start in a half-configured state, so callers abort on error.
    pub fn load(settings: &JwtSettings) -> Result<Self, AuthError> {
        let algorithm: KeyAlgorithm = settings.algorithm.parse()?;

        let private_pem = normalize_pem(&settings.private_key);
        let public_pem = normalize_pem(&settings.public_key);

        if private_pem.is_empty() {
            return Err(AuthError::configuration("JWT private key is not set"));
        }
        if public_pem.is_empty() {
            return Err(AuthError::configuration("JWT public key is not set"));
        }

        let private_key = parse_private_key(&private_pem)?;
        let public_key = parse_public_key(&public_pem)?;

        if private_key.to_public_key() != public_key {
            return Err(AuthError::configuration(
                "Public key does not match the private key",
            ));
        }

        let encoding_key = EncodingKey::from_rsa_pem(private_pem.as_bytes())
            .map_err(|e| AuthError::configuration(format!("Unusable private key: {}", e)))?;
        let decoding_key = DecodingKey::from_rsa_pem(public_pem.as_bytes())
            .map_err(|e| AuthError::configuration(format!("Unusable public key: {}", e)))?;

        Ok(Self {
            algorithm,
            encoding_key,
            decoding_key,
            public_key_pem: public_pem,
        })
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    /// The public verification key, safe to hand to other services
    pub fn public_key_pem(&self) -> &str {
        &self.public_key_pem
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

/// Environment values carry newlines escaped as literal `\n`
fn normalize_pem(value: &str) -> String {
    value.replace("\\n", "\n").trim().to_string()
}

fn parse_private_key(pem: &str) -> Result<RsaPrivateKey, AuthError> {
    RsaPrivateKey::from_pkcs8_pem(pem)
        .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
        .map_err(|e| AuthError::configuration(format!("Invalid RSA private key: {}", e)))
}

fn parse_public_key(pem: &str) -> Result<RsaPublicKey, AuthError> {
    RsaPublicKey::from_public_key_pem(pem)
        .or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
        .map_err(|e| AuthError::configuration(format!("Invalid RSA public key: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::auth::testutil::{test_keys, TestKeyPair};

    fn settings(private_key: &str, public_key: &str, algorithm: &str) -> JwtSettings {
        JwtSettings {
            private_key: private_key.to_string(),
            public_key: public_key.to_string(),
            algorithm: algorithm.to_string(),
            ..JwtSettings::default()
        }
    }

    #[test]
    fn test_load_valid_pair() {
        let TestKeyPair {
            private_pem,
            public_pem,
        } = test_keys();

        let keys = KeyMaterial::load(&settings(private_pem, public_pem, "RS256")).unwrap();
        assert_eq!(keys.algorithm(), KeyAlgorithm::RS256);
        assert!(keys.public_key_pem().contains("BEGIN PUBLIC KEY"));
    }

    #[test]
    fn test_load_missing_keys() {
        let TestKeyPair { public_pem, .. } = test_keys();

        let err = KeyMaterial::load(&settings("", public_pem, "RS256")).unwrap_err();
        assert!(matches!(err, AuthError::Configuration(_)));

        let TestKeyPair { private_pem, .. } = test_keys();
        let err = KeyMaterial::load(&settings(private_pem, "", "RS256")).unwrap_err();
        assert!(matches!(err, AuthError::Configuration(_)));
    }

    #[test]
    fn test_load_unsupported_algorithm() {
        let TestKeyPair {
            private_pem,
            public_pem,
        } = test_keys();

        let err = KeyMaterial::load(&settings(private_pem, public_pem, "HS256")).unwrap_err();
        assert!(matches!(err, AuthError::Configuration(_)));

        let err = KeyMaterial::load(&settings(private_pem, public_pem, "none")).unwrap_err();
        assert!(matches!(err, AuthError::Configuration(_)));
    }

    #[test]
    fn test_load_mismatched_pair() {
        let TestKeyPair { private_pem, .. } = test_keys();
        let other = crate::infrastructure::auth::testutil::other_keys();

        let err = KeyMaterial::load(&settings(private_pem, &other.public_pem, "RS256")).unwrap_err();
        assert!(matches!(err, AuthError::Configuration(_)));
    }

    #[test]
    fn test_load_garbage_pem() {
        let err =
            KeyMaterial::load(&settings("not a key", "also not a key", "RS256")).unwrap_err();
        assert!(matches!(err, AuthError::Configuration(_)));
    }

    #[test]
    fn test_load_escaped_newlines() {
        let TestKeyPair {
            private_pem,
            public_pem,
        } = test_keys();

        // Simulate env var provisioning where newlines arrive as literal \n
        let escaped_private = private_pem.replace('\n', "\\n");
        let escaped_public = public_pem.replace('\n', "\\n");

        let keys = KeyMaterial::load(&settings(&escaped_private, &escaped_public, "RS256")).unwrap();
        assert_eq!(keys.algorithm(), KeyAlgorithm::RS256);
    }

    #[test]
    fn test_debug_redacts_keys() {
        let TestKeyPair {
            private_pem,
            public_pem,
        } = test_keys();

        let keys = KeyMaterial::load(&settings(private_pem, public_pem, "RS256")).unwrap();
        let debug = format!("{:?}", keys);
        assert!(debug.contains("[hidden]"));
        assert!(!debug.contains("PRIVATE KEY"));
    }

    #[test]
    fn test_algorithm_parsing() {
        assert_eq!("RS256".parse::<KeyAlgorithm>().unwrap(), KeyAlgorithm::RS256);
        assert_eq!("RS384".parse::<KeyAlgorithm>().unwrap(), KeyAlgorithm::RS384);
        assert_eq!("RS512".parse::<KeyAlgorithm>().unwrap(), KeyAlgorithm::RS512);
        assert!("rs256".parse::<KeyAlgorithm>().is_err());
        assert!("ES256".parse::<KeyAlgorithm>().is_err());
    }
}
