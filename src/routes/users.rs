/// User Routes
///
/// Registration is public; the remaining operations act on the account
/// identified by the access token.

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{hash_password, Claims};
use crate::error::{AppError, DatabaseError, ErrorContext};
use crate::users::{PublicUser, UserRecord, JOB_SEEKER_ROLE_ID};
use crate::validators::{is_valid_email, is_valid_name};

/// User registration request
#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub phone: Option<String>,
    pub role_id: Option<i32>,
}

/// Partial update of the current user
#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
}

const USER_COLUMNS: &str =
    "id, email, first_name, last_name, phone, password_hash, role_id, is_banned, created_at, updated_at";

async fn fetch_user(pool: &PgPool, id: Uuid) -> Result<Option<UserRecord>, AppError> {
    let user = sqlx::query_as::<_, UserRecord>(&format!(
        "SELECT {} FROM users WHERE id = $1",
        USER_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// POST /users
///
/// Register a new account.
///
/// # Errors
/// - 400: Validation errors (invalid email/name/password)
/// - 409: Email already registered
/// - 500: Internal server error
pub async fn create_user(
    form: web::Json<CreateUserRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_registration");

    // Validate inputs
    let email = is_valid_email(&form.email)?;
    let first_name = is_valid_name(&form.first_name)?;
    let last_name = is_valid_name(&form.last_name)?;
    let password_hash = hash_password(&form.password)?;

    let existing = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(pool.get_ref())
        .await?;
    if existing.is_some() {
        return Err(AppError::Database(DatabaseError::UniqueConstraintViolation(
            "Email already registered".to_string(),
        )));
    }

    let now = Utc::now();
    let user = sqlx::query_as::<_, UserRecord>(&format!(
        r#"
        INSERT INTO users (id, email, first_name, last_name, phone, password_hash, role_id, is_banned, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, FALSE, $8, $8)
        RETURNING {}
        "#,
        USER_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(&email)
    .bind(&first_name)
    .bind(&last_name)
    .bind(form.phone.clone().unwrap_or_default())
    .bind(&password_hash)
    .bind(form.role_id.unwrap_or(JOB_SEEKER_ROLE_ID))
    .bind(now)
    .fetch_one(pool.get_ref())
    .await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user.id,
        "User registered successfully"
    );

    Ok(HttpResponse::Created().json(PublicUser::from(user)))
}

/// GET /api/users/me
///
/// Current authenticated user's information.
///
/// # Errors
/// - 401: Missing or invalid token (handled by middleware)
/// - 404: User no longer exists
pub async fn current_user(
    claims: web::ReqData<Claims>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let user_id = claims.user_id()?;

    let user = fetch_user(pool.get_ref(), user_id).await?.ok_or_else(|| {
        AppError::Database(DatabaseError::NotFound("User not found".to_string()))
    })?;

    Ok(HttpResponse::Ok().json(PublicUser::from(user)))
}

/// PATCH /api/users/me
///
/// Partial update of the current user. Changing the email re-checks
/// uniqueness; a new password is validated and re-hashed.
///
/// # Errors
/// - 400: Validation errors
/// - 404: User no longer exists
/// - 409: New email already taken
pub async fn update_user(
    claims: web::ReqData<Claims>,
    form: web::Json<UpdateUserRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_update");
    let user_id = claims.user_id()?;

    let user = fetch_user(pool.get_ref(), user_id).await?.ok_or_else(|| {
        AppError::Database(DatabaseError::NotFound("User not found".to_string()))
    })?;

    let email = match &form.email {
        Some(new_email) => {
            let new_email = is_valid_email(new_email)?;
            if new_email != user.email {
                let taken = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE email = $1")
                    .bind(&new_email)
                    .fetch_optional(pool.get_ref())
                    .await?;
                if taken.is_some() {
                    return Err(AppError::Database(DatabaseError::UniqueConstraintViolation(
                        "Email already exists".to_string(),
                    )));
                }
            }
            new_email
        }
        None => user.email.clone(),
    };

    let first_name = match &form.first_name {
        Some(name) => is_valid_name(name)?,
        None => user.first_name.clone(),
    };
    let last_name = match &form.last_name {
        Some(name) => is_valid_name(name)?,
        None => user.last_name.clone(),
    };
    let phone = form.phone.clone().unwrap_or_else(|| user.phone.clone());
    let password_hash = match &form.password {
        Some(password) => hash_password(password)?,
        None => user.password_hash.clone(),
    };

    let updated = sqlx::query_as::<_, UserRecord>(&format!(
        r#"
        UPDATE users
        SET email = $2, first_name = $3, last_name = $4, phone = $5, password_hash = $6, updated_at = $7
        WHERE id = $1
        RETURNING {}
        "#,
        USER_COLUMNS
    ))
    .bind(user_id)
    .bind(&email)
    .bind(&first_name)
    .bind(&last_name)
    .bind(&phone)
    .bind(&password_hash)
    .bind(Utc::now())
    .fetch_one(pool.get_ref())
    .await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user_id,
        "User updated successfully"
    );

    Ok(HttpResponse::Ok().json(PublicUser::from(updated)))
}

/// DELETE /api/users/me
///
/// Delete the current user's account; returns the deleted public view.
///
/// # Errors
/// - 404: User no longer exists
pub async fn delete_user(
    claims: web::ReqData<Claims>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_deletion");
    let user_id = claims.user_id()?;

    let deleted = sqlx::query_as::<_, UserRecord>(&format!(
        "DELETE FROM users WHERE id = $1 RETURNING {}",
        USER_COLUMNS
    ))
    .bind(user_id)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| AppError::Database(DatabaseError::NotFound("User not found".to_string())))?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user_id,
        "User deleted successfully"
    );

    Ok(HttpResponse::Ok().json(PublicUser::from(deleted)))
}
