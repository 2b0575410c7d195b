//! Compact JWT parsing and verification
//!
//! Verification runs a strict fail-fast pipeline: structure, declared
//! algorithm, signature, claims, time windows. The first failure wins and
//! later stages never run, so e.g. a token declaring `none` is rejected
//! before its signature is ever looked at.

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use super::claims::Claims;
use super::error::AuthError;
use super::keys::KeyMaterial;

/// Only the declared algorithm matters here; any other header field is
/// irrelevant to acceptance.
#[derive(Debug, Deserialize)]
struct TokenHeader {
    alg: String,
}

/// Verifies compact tokens against the public key and the configured
/// algorithm. Holds no mutable state; safe to share across requests.
#[derive(Clone)]
pub struct TokenVerifier {
    keys: Arc<KeyMaterial>,
    leeway: Duration,
}

impl TokenVerifier {
    /// `leeway` is the clock-skew tolerance applied symmetrically to the
    /// `exp` and `nbf` checks.
    pub fn new(keys: Arc<KeyMaterial>, leeway: Duration) -> Self {
        Self { keys, leeway }
    }

    /// Verify a compact token at the given instant.
    ///
    /// `now` is an explicit input so expiry and skew behavior are unit
    /// testable; production callers pass `Utc::now()`.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let segments = Segments::split(token)?;

        // Declared algorithm must equal the configured one, case-sensitively,
        // before any cryptography happens.
        let header: TokenHeader = serde_json::from_slice(&segments.header)
            .map_err(|e| AuthError::malformed(format!("Invalid header JSON: {}", e)))?;
        let expected = self.keys.algorithm().as_str();
        if header.alg != expected {
            return Err(AuthError::AlgorithmMismatch {
                expected: expected.to_string(),
                found: header.alg,
            });
        }

        // Signature covers the raw `header.payload` bytes. Public key only.
        let verified = jsonwebtoken::crypto::verify(
            segments.signature_b64,
            segments.message.as_bytes(),
            self.keys.decoding_key(),
            self.keys.algorithm().to_jsonwebtoken(),
        )
        .map_err(|_| AuthError::InvalidSignature)?;
        if !verified {
            return Err(AuthError::InvalidSignature);
        }

        // Required claims present and well-typed
        let claims: Claims = serde_json::from_slice(&segments.payload)
            .map_err(|e| AuthError::invalid_claims(e.to_string()))?;

        let ts = now.timestamp();
        let leeway = self.leeway.num_seconds();
        if ts >= claims.exp.saturating_add(leeway) {
            return Err(AuthError::TokenExpired);
        }
        if let Some(nbf) = claims.nbf {
            if ts < nbf.saturating_sub(leeway) {
                return Err(AuthError::TokenNotYetValid);
            }
        }

        Ok(claims)
    }
}

/// Structural decomposition of a compact token
struct Segments<'a> {
    header: Vec<u8>,
    payload: Vec<u8>,
    signature_b64: &'a str,
    /// The signed `header.payload` prefix, as it appeared on the wire
    message: &'a str,
}

impl<'a> Segments<'a> {
    fn split(token: &'a str) -> Result<Self, AuthError> {
        let mut parts = token.split('.');
        let (Some(header_b64), Some(payload_b64), Some(signature_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(AuthError::malformed(
                "Expected exactly 3 dot-separated segments",
            ));
        };

        if header_b64.is_empty() || payload_b64.is_empty() || signature_b64.is_empty() {
            return Err(AuthError::malformed("Empty token segment"));
        }

        let header = URL_SAFE_NO_PAD
            .decode(header_b64)
            .map_err(|_| AuthError::malformed("Header is not valid base64url"))?;
        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| AuthError::malformed("Payload is not valid base64url"))?;
        URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| AuthError::malformed("Signature is not valid base64url"))?;

        let message = &token[..header_b64.len() + 1 + payload_b64.len()];

        Ok(Self {
            header,
            payload,
            signature_b64,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Map, Value};

    use super::*;
    use crate::infrastructure::auth::signer::TokenSigner;
    use crate::infrastructure::auth::testutil::{other_key_material, test_key_material};

    fn ts(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn fixtures(leeway_secs: i64) -> (TokenSigner, TokenVerifier) {
        let keys = Arc::new(test_key_material());
        (
            TokenSigner::new(Arc::clone(&keys)),
            TokenVerifier::new(keys, Duration::seconds(leeway_secs)),
        )
    }

    fn email_claims(now: i64, ttl: i64) -> Claims {
        let mut extra = Map::new();
        extra.insert("email".to_string(), Value::from("a@b.com"));
        Claims::build("42", ts(now), Duration::seconds(ttl), extra).unwrap()
    }

    /// Sign an arbitrary payload with the test private key, bypassing the
    /// claims builder, to exercise claim validation in the verifier.
    fn forge_token(payload_json: &str) -> String {
        let keys = test_key_material();
        let header_b64 = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
        let payload_b64 = URL_SAFE_NO_PAD.encode(payload_json.as_bytes());
        let message = format!("{}.{}", header_b64, payload_b64);
        let signature = jsonwebtoken::crypto::sign(
            message.as_bytes(),
            keys.encoding_key(),
            jsonwebtoken::Algorithm::RS256,
        )
        .unwrap();
        format!("{}.{}", message, signature)
    }

    #[test]
    fn test_round_trip_preserves_claims() {
        let (signer, verifier) = fixtures(0);
        let claims = email_claims(1000, 3600);

        let token = signer.sign(&claims).unwrap();
        let verified = verifier.verify(&token, ts(2000)).unwrap();

        assert_eq!(verified, claims);
    }

    #[test]
    fn test_expiry_boundary() {
        let (signer, verifier) = fixtures(0);
        let token = signer.sign(&email_claims(1000, 3600)).unwrap();

        // exp == 4600: valid strictly before, expired at the boundary
        assert!(verifier.verify(&token, ts(4599)).is_ok());
        assert_eq!(
            verifier.verify(&token, ts(4600)).unwrap_err(),
            AuthError::TokenExpired
        );
        assert_eq!(
            verifier.verify(&token, ts(9999)).unwrap_err(),
            AuthError::TokenExpired
        );
    }

    #[test]
    fn test_expiry_leeway() {
        let (signer, verifier) = fixtures(5);
        let token = signer.sign(&email_claims(1000, 3600)).unwrap();

        assert!(verifier.verify(&token, ts(4604)).is_ok());
        assert_eq!(
            verifier.verify(&token, ts(4605)).unwrap_err(),
            AuthError::TokenExpired
        );
    }

    #[test]
    fn test_not_before() {
        let (signer, verifier) = fixtures(0);
        let mut claims = email_claims(1000, 3600);
        claims.nbf = Some(2000);
        let token = signer.sign(&claims).unwrap();

        assert_eq!(
            verifier.verify(&token, ts(1999)).unwrap_err(),
            AuthError::TokenNotYetValid
        );
        assert!(verifier.verify(&token, ts(2000)).is_ok());
    }

    #[test]
    fn test_not_before_leeway() {
        let (signer, verifier) = fixtures(5);
        let mut claims = email_claims(1000, 3600);
        claims.nbf = Some(2000);
        let token = signer.sign(&claims).unwrap();

        assert!(verifier.verify(&token, ts(1995)).is_ok());
        assert_eq!(
            verifier.verify(&token, ts(1994)).unwrap_err(),
            AuthError::TokenNotYetValid
        );
    }

    #[test]
    fn test_algorithm_substitution_rejected() {
        let (signer, verifier) = fixtures(0);
        let token = signer.sign(&email_claims(1000, 3600)).unwrap();
        let (_, rest) = token.split_once('.').unwrap();

        for alg in ["HS256", "none", "rs256", "ES256"] {
            let header = URL_SAFE_NO_PAD.encode(format!(r#"{{"alg":"{}"}}"#, alg));
            let swapped = format!("{}.{}", header, rest);

            assert!(
                matches!(
                    verifier.verify(&swapped, ts(2000)).unwrap_err(),
                    AuthError::AlgorithmMismatch { .. }
                ),
                "alg '{}' must be rejected before signature verification",
                alg
            );
        }
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let (signer, verifier) = fixtures(0);
        let token = signer.sign(&email_claims(1000, 3600)).unwrap();

        let parts: Vec<&str> = token.split('.').collect();
        let mut payload = URL_SAFE_NO_PAD.decode(parts[1]).unwrap();
        payload[0] ^= 0x01;
        let tampered = format!(
            "{}.{}.{}",
            parts[0],
            URL_SAFE_NO_PAD.encode(&payload),
            parts[2]
        );

        assert_eq!(
            verifier.verify(&tampered, ts(2000)).unwrap_err(),
            AuthError::InvalidSignature
        );
    }

    #[test]
    fn test_signature_from_other_key_rejected() {
        let (_, verifier) = fixtures(0);
        let other_signer = TokenSigner::new(Arc::new(other_key_material()));
        let token = other_signer.sign(&email_claims(1000, 3600)).unwrap();

        assert_eq!(
            verifier.verify(&token, ts(2000)).unwrap_err(),
            AuthError::InvalidSignature
        );
    }

    #[test]
    fn test_malformed_structure_rejected() {
        let (_, verifier) = fixtures(0);

        for input in [
            "",
            "just-a-string",
            "two.segments",
            "four.seg.men.ts",
            "..",
            "a.b.",
            ".b.c",
            "!!!.@@@.###",
        ] {
            assert!(
                matches!(
                    verifier.verify(input, ts(2000)).unwrap_err(),
                    AuthError::MalformedToken(_)
                ),
                "input '{}' must be malformed",
                input
            );
        }
    }

    #[test]
    fn test_garbage_header_json_rejected() {
        let (signer, verifier) = fixtures(0);
        let token = signer.sign(&email_claims(1000, 3600)).unwrap();
        let (_, rest) = token.split_once('.').unwrap();

        let garbage = format!("{}.{}", URL_SAFE_NO_PAD.encode(b"not json"), rest);
        assert!(matches!(
            verifier.verify(&garbage, ts(2000)).unwrap_err(),
            AuthError::MalformedToken(_)
        ));
    }

    #[test]
    fn test_missing_required_claims_rejected() {
        let (_, verifier) = fixtures(0);

        for payload in [
            r#"{"sub":"42","iat":1000}"#,
            r#"{"sub":"42","exp":4600}"#,
            r#"{"iat":1000,"exp":4600}"#,
            r#"{"sub":42,"iat":1000,"exp":4600}"#,
            r#"{"sub":"42","iat":1000,"exp":"soon"}"#,
        ] {
            let token = forge_token(payload);
            assert!(
                matches!(
                    verifier.verify(&token, ts(2000)).unwrap_err(),
                    AuthError::InvalidClaims(_)
                ),
                "payload '{}' must fail claim validation",
                payload
            );
        }
    }

    #[test]
    fn test_extreme_timestamps_do_not_overflow() {
        let (_, verifier) = fixtures(5);

        // exp at the far end of the representable range must not wrap when
        // leeway is added; same for nbf in the other direction.
        let token = forge_token(&format!(
            r#"{{"sub":"42","iat":1000,"exp":{},"nbf":{}}}"#,
            i64::MAX,
            i64::MIN
        ));

        assert!(verifier.verify(&token, ts(2000)).is_ok());
    }

    #[test]
    fn test_token_lifecycle_timestamps() {
        let (signer, verifier) = fixtures(0);
        let mut extra = Map::new();
        extra.insert("email".to_string(), Value::from("a@b.com"));
        let claims = Claims::build("42", ts(1000), Duration::seconds(3600), extra).unwrap();
        assert_eq!((claims.iat, claims.exp), (1000, 4600));

        let token = signer.sign(&claims).unwrap();

        let verified = verifier.verify(&token, ts(4599)).unwrap();
        assert_eq!(verified, claims);

        assert_eq!(
            verifier.verify(&token, ts(4600)).unwrap_err(),
            AuthError::TokenExpired
        );
    }
}
