//! Application Configuration
//!
//! Configuration for the Auth application layer.

use chrono::Duration;
use platform::token::{SESSION_TTL_HOURS, TokenSigner};

use crate::domain::entity::role::GUEST;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Signs and verifies session tokens
    pub token_signer: TokenSigner,
    /// Role granted to newly registered accounts
    pub default_role: String,
}

impl AuthConfig {
    /// Config with the given signing secret and a 24 hour session lifetime
    pub fn new(secret: &[u8]) -> Self {
        Self {
            token_signer: TokenSigner::new(secret, Duration::hours(SESSION_TTL_HOURS)),
            default_role: GUEST.to_string(),
        }
    }

    /// Create config with a random signing secret (for tests and local runs)
    pub fn with_random_secret() -> Self {
        use rand::RngCore;
        let mut secret = [0u8; 32];
        rand::rng().fill_bytes(&mut secret);
        Self::new(&secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuthConfig::new(b"secret");
        assert_eq!(config.default_role, "Guest");
        assert_eq!(config.token_signer.ttl(), Duration::hours(24));
    }

    #[test]
    fn test_random_secrets_differ() {
        let a = AuthConfig::with_random_secret();
        let b = AuthConfig::with_random_secret();
        let token = a.token_signer.issue(7).unwrap();
        assert!(a.token_signer.verify(&token.token).is_ok());
        assert!(b.token_signer.verify(&token.token).is_err());
    }
}
