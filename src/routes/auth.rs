/// Authentication Routes
///
/// Handles login, refresh-token rotation, and logout. The handlers only
/// adapt HTTP to the session orchestrators; the lifecycle rules live in
/// `crate::session`.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::auth::{BcryptHasher, JwtSigner};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError, ErrorContext};
use crate::session::{SessionAuthenticator, SessionRevoker, SessionStore, TokenRefresher};
use crate::users::PublicUser;
use crate::validators::is_valid_email;

/// User login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token refresh request
#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Login response with the token pair and the public user view
#[derive(Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: PublicUser,
}

/// Refresh response with the rotated token pair
#[derive(Serialize)]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Logout response
#[derive(Serialize)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: String,
}

/// POST /auth/login
///
/// Authenticate with email and password; opens the user's single session.
///
/// # Errors
/// - 400: Invalid email format
/// - 401: Unknown email or wrong password (indistinguishable)
/// - 500: Internal server error
pub async fn login(
    form: web::Json<LoginRequest>,
    pool: web::Data<PgPool>,
    signer: web::Data<JwtSigner>,
    hasher: web::Data<BcryptHasher>,
    store: web::Data<dyn SessionStore>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_login");

    let email = is_valid_email(&form.email)?;

    let authenticator = SessionAuthenticator::new(
        pool.get_ref(),
        signer.get_ref(),
        hasher.get_ref(),
        store.get_ref(),
        jwt_config.get_ref(),
    );
    let session = authenticator.authenticate(&email, &form.password).await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %session.user.id,
        "User logged in successfully"
    );

    Ok(HttpResponse::Ok().json(LoginResponse {
        access_token: session.access_token,
        refresh_token: session.refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: jwt_config.access_token_expiry,
        user: session.user,
    }))
}

/// POST /auth/refresh
///
/// Exchange a refresh token for a new token pair. Every successful call
/// rotates the session; a token from before the latest rotation revokes
/// the session entirely.
///
/// # Errors
/// - 401: Invalid, expired, replayed, or unknown refresh token
pub async fn refresh(
    form: web::Json<RefreshRequest>,
    signer: web::Data<JwtSigner>,
    hasher: web::Data<BcryptHasher>,
    store: web::Data<dyn SessionStore>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("token_refresh");

    let refresher = TokenRefresher::new(
        signer.get_ref(),
        hasher.get_ref(),
        store.get_ref(),
        jwt_config.get_ref(),
    );
    let pair = refresher.refresh(&form.refresh_token).await?;

    tracing::info!(
        request_id = %context.request_id,
        "Token refreshed successfully"
    );

    Ok(HttpResponse::Ok().json(TokenPairResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: jwt_config.access_token_expiry,
    }))
}

/// POST /auth/logout
///
/// Revoke the session belonging to the refresh token carried in the
/// Authorization header. Logging out an already-absent session still
/// succeeds.
///
/// # Errors
/// - 401: Missing header, or invalid/expired token
pub async fn logout(
    req: HttpRequest,
    signer: web::Data<JwtSigner>,
    store: web::Data<dyn SessionStore>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_logout");

    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string)
        .ok_or(AppError::Auth(AuthError::MissingToken))?;

    let revoker = SessionRevoker::new(signer.get_ref(), store.get_ref());
    let outcome = revoker.revoke(&token).await?;

    tracing::info!(
        request_id = %context.request_id,
        "User logged out successfully"
    );

    Ok(HttpResponse::Ok().json(LogoutResponse {
        success: outcome.success,
        message: outcome.message,
    }))
}
