/// Session store port and in-memory implementation
///
/// A key-value cache with per-key time-to-live. The production backend is
/// redis (`RedisSessionStore`); the in-memory store backs tests and local
/// development without a cache server.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::error::CacheError;

/// Key-value cache with per-key TTL.
///
/// `del` of an absent key must succeed; logout relies on that for
/// idempotency.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), CacheError>;
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    async fn del(&self, key: &str) -> Result<(), CacheError>;
}

struct StoredValue {
    value: String,
    expires_at: DateTime<Utc>,
}

/// TTL-aware in-memory store. Expired entries are dropped lazily on read.
#[derive(Default)]
pub struct InMemorySessionStore {
    entries: RwLock<HashMap<String, StoredValue>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), CacheError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| CacheError::Backend("session store lock poisoned".to_string()))?;

        entries.insert(
            key.to_string(),
            StoredValue {
                value: value.to_string(),
                expires_at: Utc::now() + Duration::seconds(ttl_seconds as i64),
            },
        );

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let expired = {
            let entries = self
                .entries
                .read()
                .map_err(|_| CacheError::Backend("session store lock poisoned".to_string()))?;

            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if entry.expires_at > Utc::now() => {
                    return Ok(Some(entry.value.clone()))
                }
                Some(_) => true,
            }
        };

        if expired {
            self.del(key).await?;
        }

        Ok(None)
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| CacheError::Backend("session store lock poisoned".to_string()))?;

        entries.remove(key);

        Ok(())
    }
}
