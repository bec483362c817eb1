/// JWT Claims structure
///
/// Represents the payload of a signed token: a unique token id plus
/// standard JWT claims (RFC 7519).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AuthError};

/// Claims carried by both access and refresh tokens.
///
/// `jti` is random per token and serialized first: the refresh-token hash
/// only covers the first 72 bytes of the compact token, and the per-token
/// randomness must land inside that prefix.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Unique token identifier
    pub jti: String,
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

impl Claims {
    /// Create new claims for a subject
    ///
    /// # Arguments
    /// * `user_id` - User's UUID
    /// * `expiry_seconds` - Token expiration in seconds from now
    /// * `issuer` - Issuer identifier
    pub fn new(user_id: Uuid, expiry_seconds: i64, issuer: String) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            jti: Uuid::new_v4().to_string(),
            sub: user_id.to_string(),
            exp: now + expiry_seconds,
            iat: now,
            iss: issuer,
        }
    }

    /// Extract user ID from claims
    ///
    /// # Errors
    /// Returns error if the subject is not a valid UUID
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub).map_err(|_| {
            tracing::warn!("Token subject is not a valid user id");
            AppError::Auth(AuthError::TokenInvalid)
        })
    }

    /// Check if token has expired
    pub fn is_expired(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        self.exp < now
    }
}
