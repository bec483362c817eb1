/// Secret Hashing and Verification
///
/// Handles password hashing with bcrypt, password strength validation,
/// and the one-way hashing of refresh tokens tracked by the session store.

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::{AppError, ValidationError};

const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;

/// bcrypt work factor for refresh-token hashes
pub const REFRESH_TOKEN_HASH_COST: u32 = 10;

/// Port for one-way hashing and verification of secrets.
pub trait SecretHasher: Send + Sync {
    /// Hash a plaintext value with the given work factor.
    fn hash(&self, value: &str, cost: u32) -> Result<String, AppError>;

    /// Verify a plaintext candidate against a stored hash.
    fn compare(&self, value: &str, hashed: &str) -> Result<bool, AppError>;
}

/// bcrypt-backed implementation of `SecretHasher`.
#[derive(Clone, Default)]
pub struct BcryptHasher;

impl SecretHasher for BcryptHasher {
    fn hash(&self, value: &str, cost: u32) -> Result<String, AppError> {
        hash(value, cost).map_err(|e| AppError::Internal(format!("Hashing failed: {}", e)))
    }

    fn compare(&self, value: &str, hashed: &str) -> Result<bool, AppError> {
        verify(value, hashed)
            .map_err(|e| AppError::Internal(format!("Hash verification failed: {}", e)))
    }
}

/// Hash a password using bcrypt
///
/// # Arguments
/// * `password` - Plain text password to hash
///
/// # Errors
/// Returns error if:
/// - Password fails validation (too short, weak, etc.)
/// - Bcrypt hashing fails
pub fn hash_password(password: &str) -> Result<String, AppError> {
    validate_password_strength(password)?;

    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against its hash
///
/// # Arguments
/// * `password` - Plain text password to verify
/// * `hash` - Bcrypt hash to verify against
///
/// # Errors
/// Returns error if verification fails
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    verify(password, hash)
        .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))
}

/// Validate password strength requirements
///
/// Requirements:
/// - Minimum 8 characters
/// - Maximum 128 characters
/// - At least one digit
/// - At least one lowercase letter
/// - At least one uppercase letter
fn validate_password_strength(password: &str) -> Result<(), AppError> {
    // Check minimum length
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::Validation(ValidationError::TooShort(
            "password".to_string(),
            MIN_PASSWORD_LENGTH,
        )));
    }

    // Check maximum length (bcrypt limitation and DoS prevention)
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(AppError::Validation(ValidationError::TooLong(
            "password".to_string(),
            MAX_PASSWORD_LENGTH,
        )));
    }

    // Check for at least one digit, one lowercase, and one uppercase
    let has_digit = password.chars().any(|c| c.is_numeric());
    let has_lowercase = password.chars().any(|c| c.is_lowercase());
    let has_uppercase = password.chars().any(|c| c.is_uppercase());

    if !has_digit || !has_lowercase || !has_uppercase {
        return Err(AppError::Validation(ValidationError::InvalidFormat(
            "password must contain at least one digit, one lowercase letter, and one uppercase letter"
                .to_string(),
        )));
    }

    Ok(())
}
