/// Session record model and codec
///
/// The server-tracked state of one refresh cycle: the bcrypt hash of the
/// refresh token currently considered valid for a user, plus an absolute
/// expiry that bounds the session independently of the token's own signed
/// expiry. Stored as JSON under `session:<user id>`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CacheError;

pub const SESSION_KEY_PREFIX: &str = "session:";

/// Cache key for a user's session record.
pub fn session_key(user_id: &Uuid) -> String {
    format!("{}{}", SESSION_KEY_PREFIX, user_id)
}

/// One user's current session. At most one record exists per user id;
/// creating or rotating a session overwrites the prior record at the same
/// key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub user_id: Uuid,
    /// bcrypt hash of the active refresh token, never the plaintext
    pub refresh_token: String,
    pub expire_date: DateTime<Utc>,
}

impl SessionRecord {
    /// Build a record expiring `lifetime_seconds` from now.
    pub fn new(user_id: Uuid, hashed_refresh_token: String, lifetime_seconds: i64) -> Self {
        Self {
            user_id,
            refresh_token: hashed_refresh_token,
            expire_date: Utc::now() + Duration::seconds(lifetime_seconds),
        }
    }

    pub fn key(&self) -> String {
        session_key(&self.user_id)
    }

    pub fn is_expired(&self) -> bool {
        self.expire_date < Utc::now()
    }

    pub fn to_json(&self) -> Result<String, CacheError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self, CacheError> {
        Ok(serde_json::from_str(raw)?)
    }
}
