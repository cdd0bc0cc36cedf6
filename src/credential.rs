//! Credential verification.
//!
//! A credential is an HS256 JWT. [`CredentialVerifier`] is the seam the gate
//! depends on; [`Hs256Verifier`] is the implementation used in production and
//! by the login collaborator to issue tokens.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::config::{ConfigError, GateConfig, ENV_SECRET};
use crate::role::Role;
use crate::secret::Secret;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";

/// Decoded credential claims.
///
/// `role` is kept as the raw string carried by the token; the gate
/// normalizes it into a [`Role`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject identifier
    pub sub: String,
    /// Role name as issued
    pub role: String,
    /// Expiry, unix seconds
    pub exp: u64,
    /// Issue time, unix seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
}

#[derive(Serialize, Deserialize)]
struct Header {
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
}

/// Why a credential failed verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    /// Not three base64url segments of JSON
    Malformed(&'static str),
    /// Header names an algorithm other than HS256
    UnsupportedAlgorithm(String),
    /// Signature does not match
    BadSignature,
    /// `exp` is in the past
    Expired,
    /// The signing key is missing or unusable; a server fault
    KeyUnavailable,
}

impl VerifyError {
    /// Returns true when the failure is the server's, not the client's.
    pub fn is_fault(&self) -> bool {
        matches!(self, VerifyError::KeyUnavailable)
    }
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyError::Malformed(what) => write!(f, "malformed credential: {}", what),
            VerifyError::UnsupportedAlgorithm(alg) => write!(f, "unsupported algorithm '{}'", alg),
            VerifyError::BadSignature => write!(f, "signature mismatch"),
            VerifyError::Expired => write!(f, "credential expired"),
            VerifyError::KeyUnavailable => write!(f, "signing key unavailable"),
        }
    }
}

impl std::error::Error for VerifyError {}

/// Verifies a presented credential and returns its claims.
pub trait CredentialVerifier {
    /// Checks signature and expiry.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError`] for any token that is not fully valid.
    fn verify(&self, token: &Secret<String>) -> Result<Claims, VerifyError>;
}

/// HMAC-SHA256 credential verifier and issuer.
///
/// # Examples
///
/// ```
/// use wecare_core::{CredentialVerifier, GateConfig, Hs256Verifier, Role, Secret};
///
/// let verifier = Hs256Verifier::new(
///     Secret::new(b"0123456789abcdef0123456789abcdef".to_vec()),
///     &GateConfig::default(),
/// );
///
/// let token = verifier.issue("driver-7", Role::Driver).unwrap();
/// let claims = verifier.verify(&token).unwrap();
/// assert_eq!(claims.sub, "driver-7");
/// assert_eq!(claims.role, "DRIVER");
/// ```
pub struct Hs256Verifier {
    key: Secret<Vec<u8>>,
    leeway_secs: u64,
    ttl_secs: u64,
}

impl fmt::Debug for Hs256Verifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hs256Verifier")
            .field("key", &self.key)
            .field("leeway_secs", &self.leeway_secs)
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}

impl Hs256Verifier {
    /// Creates a verifier from key material and gate settings.
    pub fn new(key: Secret<Vec<u8>>, config: &GateConfig) -> Self {
        Self {
            key,
            leeway_secs: config.leeway_secs(),
            ttl_secs: config.token_ttl_secs(),
        }
    }

    /// Creates a verifier whose key is read from `WECARE_JWT_SECRET`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the variable is unset or empty.
    pub fn from_env(config: &GateConfig) -> Result<Self, ConfigError> {
        let raw = std::env::var(ENV_SECRET).map_err(|_| ConfigError::Missing { key: ENV_SECRET })?;
        if raw.is_empty() {
            return Err(ConfigError::invalid(ENV_SECRET, "must not be empty"));
        }
        Ok(Self::new(Secret::new(raw.into_bytes()), config))
    }

    /// Issues a credential for `subject` valid for the configured TTL.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::KeyUnavailable`] when no key is configured.
    pub fn issue(&self, subject: &str, role: Role) -> Result<Secret<String>, VerifyError> {
        self.issue_at(subject, role, unix_now())
    }

    /// Issues a credential as if the current time were `issued_at`.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::KeyUnavailable`] when no key is configured.
    pub fn issue_at(
        &self,
        subject: &str,
        role: Role,
        issued_at: u64,
    ) -> Result<Secret<String>, VerifyError> {
        self.sign(&Claims {
            sub: subject.to_string(),
            role: role.as_str().to_string(),
            exp: issued_at.saturating_add(self.ttl_secs),
            iat: Some(issued_at),
        })
    }

    /// Signs arbitrary claims.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::KeyUnavailable`] when no key is configured.
    pub fn sign(&self, claims: &Claims) -> Result<Secret<String>, VerifyError> {
        let header = Header {
            alg: ALGORITHM.to_string(),
            typ: Some("JWT".to_string()),
        };
        let header_b64 = URL_SAFE_NO_PAD.encode(to_json(&header)?);
        let claims_b64 = URL_SAFE_NO_PAD.encode(to_json(claims)?);
        let signing_input = format!("{}.{}", header_b64, claims_b64);

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(Secret::new(format!("{}.{}", signing_input, signature)))
    }

    /// Verifies `token` against an explicit clock reading.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError`] when any part of the token fails.
    pub fn verify_at(&self, token: &str, now: u64) -> Result<Claims, VerifyError> {
        let mut parts = token.split('.');
        let (Some(header_b64), Some(claims_b64), Some(signature_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(VerifyError::Malformed("expected three segments"));
        };

        let header: Header = from_segment(header_b64, "header")?;
        if header.alg != ALGORITHM {
            return Err(VerifyError::UnsupportedAlgorithm(header.alg));
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| VerifyError::Malformed("signature is not base64url"))?;

        let mut mac = self.mac()?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(claims_b64.as_bytes());
        // Constant-time comparison.
        mac.verify_slice(&signature)
            .map_err(|_| VerifyError::BadSignature)?;

        let claims: Claims = from_segment(claims_b64, "claims")?;
        if claims.exp.saturating_add(self.leeway_secs) < now {
            return Err(VerifyError::Expired);
        }

        Ok(claims)
    }

    fn mac(&self) -> Result<HmacSha256, VerifyError> {
        let key = self.key.expose_secret();
        if key.is_empty() {
            return Err(VerifyError::KeyUnavailable);
        }
        HmacSha256::new_from_slice(key).map_err(|_| VerifyError::KeyUnavailable)
    }
}

impl CredentialVerifier for Hs256Verifier {
    fn verify(&self, token: &Secret<String>) -> Result<Claims, VerifyError> {
        self.verify_at(token.expose_secret(), unix_now())
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Vec<u8>, VerifyError> {
    serde_json::to_vec(value).map_err(|_| VerifyError::Malformed("unserializable claims"))
}

fn from_segment<T: for<'de> Deserialize<'de>>(
    segment: &str,
    what: &'static str,
) -> Result<T, VerifyError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| VerifyError::Malformed(what))?;
    serde_json::from_slice(&bytes).map_err(|_| VerifyError::Malformed(what))
}

pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u64 = 1_700_000_000;

    fn verifier() -> Hs256Verifier {
        Hs256Verifier::new(
            Secret::new(b"test-signing-key-32-bytes-long!!".to_vec()),
            &GateConfig::default().with_token_ttl_secs(600),
        )
    }

    #[test]
    fn issued_token_verifies() {
        let v = verifier();
        let token = v.issue_at("u1", Role::Community, NOW).unwrap();

        let claims = v.verify_at(token.expose_secret(), NOW + 10).unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.role, "COMMUNITY");
        assert_eq!(claims.exp, NOW + 600);
        assert_eq!(claims.iat, Some(NOW));
    }

    #[test]
    fn expired_token_rejected() {
        let v = verifier();
        let token = v.issue_at("u1", Role::Driver, NOW).unwrap();

        assert_eq!(
            v.verify_at(token.expose_secret(), NOW + 601),
            Err(VerifyError::Expired)
        );
        // exp itself is still valid
        assert!(v.verify_at(token.expose_secret(), NOW + 600).is_ok());
    }

    #[test]
    fn leeway_extends_expiry() {
        let v = Hs256Verifier::new(
            Secret::new(b"k".to_vec()),
            &GateConfig::default().with_token_ttl_secs(60).with_leeway_secs(30),
        );
        let token = v.issue_at("u1", Role::Driver, NOW).unwrap();

        assert!(v.verify_at(token.expose_secret(), NOW + 90).is_ok());
        assert_eq!(
            v.verify_at(token.expose_secret(), NOW + 91),
            Err(VerifyError::Expired)
        );
    }

    #[test]
    fn wrong_key_rejected() {
        let token = verifier().issue_at("u1", Role::Admin, NOW).unwrap();
        let other =
            Hs256Verifier::new(Secret::new(b"another-key".to_vec()), &GateConfig::default());

        assert_eq!(
            other.verify_at(token.expose_secret(), NOW),
            Err(VerifyError::BadSignature)
        );
    }

    #[test]
    fn tampered_claims_rejected() {
        let v = verifier();
        let token = v.issue_at("u1", Role::Community, NOW).unwrap();
        let parts: Vec<&str> = token.expose_secret().split('.').collect();

        let forged_claims = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&Claims {
                sub: "u1".to_string(),
                role: "ADMIN".to_string(),
                exp: NOW + 600,
                iat: Some(NOW),
            })
            .unwrap(),
        );
        let forged = format!("{}.{}.{}", parts[0], forged_claims, parts[2]);

        assert_eq!(v.verify_at(&forged, NOW), Err(VerifyError::BadSignature));
    }

    #[test]
    fn none_algorithm_rejected() {
        let v = verifier();
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let claims = URL_SAFE_NO_PAD.encode(br#"{"sub":"u1","role":"ADMIN","exp":9999999999}"#);
        let token = format!("{}.{}.", header, claims);

        assert_eq!(
            v.verify_at(&token, NOW),
            Err(VerifyError::UnsupportedAlgorithm("none".to_string()))
        );
    }

    #[test]
    fn malformed_tokens_rejected() {
        let v = verifier();
        for token in ["", "abc", "a.b", "a.b.c.d", "!!!.e30.sig"] {
            assert!(
                matches!(v.verify_at(token, NOW), Err(VerifyError::Malformed(_))),
                "token {:?} should be malformed",
                token
            );
        }
    }

    #[test]
    fn empty_key_is_a_fault() {
        let v = Hs256Verifier::new(Secret::new(Vec::new()), &GateConfig::default());
        let token = verifier().issue_at("u1", Role::Driver, NOW).unwrap();

        let err = v.verify_at(token.expose_secret(), NOW).unwrap_err();
        assert_eq!(err, VerifyError::KeyUnavailable);
        assert!(err.is_fault());
        assert!(v.issue("u1", Role::Driver).is_err());
    }

    #[test]
    fn debug_does_not_leak_key() {
        let debug = format!("{:?}", verifier());
        assert!(!debug.contains("test-signing-key"));
        assert!(debug.contains("[REDACTED]"));
    }
}
