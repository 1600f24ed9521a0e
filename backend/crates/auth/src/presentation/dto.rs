//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use platform::token::IssuedToken;
use serde::{Deserialize, Serialize};

/// Login and register body
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsRequest {
    pub account: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl From<IssuedToken> for LoginResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            token: issued.token,
            expires_at: issued.expires_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemberUpdateRequest {
    pub role_id: i64,
}
