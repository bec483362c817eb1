/// JWT Token Generation and Validation
///
/// Handles creation and verification of the signed tokens used as access
/// and refresh credentials. Both kinds share one signing key and claim
/// shape; they differ in lifetime.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::Claims;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

/// Port for token signing and verification.
///
/// The session orchestrators only see this trait; `JwtSigner` is the
/// production implementation.
pub trait TokenSigner: Send + Sync {
    /// Mint a signed token for a subject with the given lifetime.
    fn sign(&self, user_id: Uuid, expiry_seconds: i64) -> Result<String, AppError>;

    /// Verify a token's signature and expiry and return its claims.
    fn verify(&self, token: &str) -> Result<Claims, AppError>;
}

/// HS256 signer configured from `JwtSettings`.
#[derive(Clone)]
pub struct JwtSigner {
    settings: JwtSettings,
}

impl JwtSigner {
    pub fn new(settings: JwtSettings) -> Self {
        Self { settings }
    }
}

impl TokenSigner for JwtSigner {
    fn sign(&self, user_id: Uuid, expiry_seconds: i64) -> Result<String, AppError> {
        let claims = Claims::new(user_id, expiry_seconds, self.settings.issuer.clone());

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.settings.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }

    fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Verify issuer matches configuration
        validation.set_issuer(&[&self.settings.issuer]);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.settings.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::warn!("JWT validation error: {}", e);
            AppError::Auth(AuthError::TokenInvalid)
        })
    }
}
