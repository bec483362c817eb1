/// User account model and lookup port
///
/// The session core only needs `find_by_email`; the user routes share the
/// same row type for their inline queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;

pub const JOB_SEEKER_ROLE_ID: i32 = 1;
pub const EMPLOYER_ROLE_ID: i32 = 2;

/// Full user row, including the stored password hash.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub password_hash: String,
    pub role_id: i32,
    pub is_banned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User view returned to clients; the password hash is stripped.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub role_id: i32,
    pub is_banned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRecord> for PublicUser {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            phone: user.phone,
            role_id: user.role_id,
            is_banned: user.is_banned,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Account lookup consumed by the login orchestrator.
#[async_trait]
pub trait UserFinder: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError>;
}

#[async_trait]
impl UserFinder for PgPool {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, email, first_name, last_name, phone, password_hash,
                   role_id, is_banned, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(self)
        .await?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> UserRecord {
        UserRecord {
            id: Uuid::new_v4(),
            email: "user@example.com".to_string(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            phone: "".to_string(),
            password_hash: "$2b$12$secret".to_string(),
            role_id: EMPLOYER_ROLE_ID,
            is_banned: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_public_view_strips_password_hash() {
        let user = sample_user();
        let public = PublicUser::from(user.clone());

        assert_eq!(public.id, user.id);
        assert_eq!(public.email, user.email);

        let serialized = serde_json::to_string(&public).expect("Failed to serialize");
        assert!(!serialized.contains("password"));
        assert!(!serialized.contains("$2b$12$secret"));
    }
}
