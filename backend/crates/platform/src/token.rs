//! Session tokens
//!
//! HS256-signed JWTs carrying the numeric user id as `sub` and a fixed
//! lifetime. The secret is supplied once at startup through [`TokenSigner::new`].

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default session lifetime
pub const SESSION_TTL_HOURS: i64 = 24;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("{0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    #[error("token subject is not a user id")]
    MalformedSubject,
}

/// JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id, as a decimal string
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    pub fn user_id(&self) -> Result<i64, TokenError> {
        self.sub
            .parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or(TokenError::MalformedSubject)
    }
}

/// A freshly issued token
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies session tokens with one shared secret.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, user_id: i64) -> Result<IssuedToken, TokenError> {
        self.issue_at(user_id, Utc::now())
    }

    fn issue_at(&self, user_id: i64, now: DateTime<Utc>) -> Result<IssuedToken, TokenError> {
        let expires_at = now + self.ttl;
        let claims = SessionClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Signing)?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Check signature, algorithm and expiry.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)
    }
}

impl fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSigner")
            .field("secret", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer(secret: &[u8]) -> TokenSigner {
        TokenSigner::new(secret, Duration::hours(SESSION_TTL_HOURS))
    }

    #[test]
    fn test_issue_then_verify() {
        let signer = signer(b"unit-test-secret");
        let issued = signer.issue(42).unwrap();

        let claims = signer.verify(&issued.token).unwrap();
        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.exp - claims.iat, SESSION_TTL_HOURS * 3600);
        assert_eq!(claims.exp, issued.expires_at.timestamp());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let issued = signer(b"secret-a").issue(1).unwrap();
        assert!(matches!(
            signer(b"secret-b").verify(&issued.token),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let signer = signer(b"unit-test-secret");
        let issued = signer
            .issue_at(1, Utc::now() - Duration::hours(SESSION_TTL_HOURS + 1))
            .unwrap();
        assert!(signer.verify(&issued.token).is_err());
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(signer(b"s").verify("not.a.jwt").is_err());
    }

    #[test]
    fn test_non_numeric_subject() {
        let claims = SessionClaims {
            sub: "alice".to_string(),
            iat: 0,
            exp: 0,
        };
        assert!(matches!(
            claims.user_id(),
            Err(TokenError::MalformedSubject)
        ));
    }

    #[test]
    fn test_debug_hides_secret() {
        let debug = format!("{:?}", signer(b"top-secret"));
        assert!(!debug.contains("top-secret"));
    }
}
