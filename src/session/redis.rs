/// Redis-backed session store
///
/// Thin adapter from the `SessionStore` port to a redis connection
/// manager. Values are opaque strings; expiry is delegated to redis via
/// `SET .. EX`.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::error::CacheError;
use crate::session::store::SessionStore;

#[derive(Clone)]
pub struct RedisSessionStore {
    connection: ConnectionManager,
}

impl RedisSessionStore {
    /// Connect to redis and build a store around a reconnecting
    /// connection manager.
    pub async fn connect(uri: &str) -> Result<Self, CacheError> {
        let client =
            redis::Client::open(uri).map_err(|e| CacheError::Backend(e.to_string()))?;
        let connection = client
            .get_connection_manager()
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;

        Ok(Self { connection })
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), CacheError> {
        let mut connection = self.connection.clone();
        connection
            .set_ex::<_, _, ()>(key, value, ttl_seconds)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut connection = self.connection.clone();
        connection
            .get::<_, Option<String>>(key)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        let mut connection = self.connection.clone();
        connection
            .del::<_, ()>(key)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))
    }
}
