//! Registered microservices and their shared secrets
//!
//! A microservice proves its identity to the auth service with a secret
//! shared out-of-band (injected into both environments). Secrets are stored
//! here only as SHA-256 digests and compared in constant time; plaintext
//! values are never logged.

use std::collections::HashMap;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};
use tracing::warn;

/// Mapping of microservice code names to shared-secret digests
#[derive(Debug, Clone, Default)]
pub struct ServiceRegistry {
    secret_hashes: HashMap<String, String>,
}

impl ServiceRegistry {
    /// Build a registry from plaintext shared secrets (typically straight
    /// from configuration). Secrets are hashed immediately.
    pub fn from_secrets<I, K, V>(secrets: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let secret_hashes = secrets
            .into_iter()
            .map(|(name, secret)| (name.into(), hash_secret(secret.as_ref())))
            .collect();

        Self { secret_hashes }
    }

    /// Whether `name` is a registered microservice
    pub fn contains(&self, name: &str) -> bool {
        self.secret_hashes.contains_key(name)
    }

    /// Check a presented shared secret against the registered one.
    ///
    /// Unknown service names and wrong secrets both return `false`; the
    /// distinction is only logged, never surfaced to the caller.
    pub fn authenticate(&self, name: &str, presented_secret: &str) -> bool {
        let Some(expected_hash) = self.secret_hashes.get(name) else {
            warn!(service = %name, "Authentication attempt for unknown service");
            return false;
        };

        let presented_hash = hash_secret(presented_secret);
        if constant_time_compare(&presented_hash, expected_hash) {
            true
        } else {
            warn!(service = %name, "Wrong shared secret presented");
            false
        }
    }
}

fn hash_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Compare two strings without short-circuiting on the first differing byte
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut diff = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        diff |= x ^ y;
    }
    diff == 0
}
