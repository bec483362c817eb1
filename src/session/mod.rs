/// Session lifecycle state machine
///
/// Login creates a session, refresh rotates it with replay detection,
/// logout revokes it. The orchestrators talk to three ports: the token
/// signer, the secret hasher, and the TTL-bearing session store.

mod record;
mod store;
mod redis;
mod login;
mod refresh;
mod logout;

pub use record::session_key;
pub use record::SessionRecord;
pub use record::SESSION_KEY_PREFIX;
pub use store::InMemorySessionStore;
pub use store::SessionStore;
pub use self::redis::RedisSessionStore;
pub use login::AuthenticatedSession;
pub use login::SessionAuthenticator;
pub use refresh::TokenPair;
pub use refresh::TokenRefresher;
pub use logout::RevokedSession;
pub use logout::SessionRevoker;

#[cfg(test)]
pub(crate) mod testing {
    //! Hand-rolled collaborator doubles for the orchestrator tests.

    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;
    use uuid::Uuid;

    use crate::auth::{BcryptHasher, SecretHasher};
    use crate::configuration::JwtSettings;
    use crate::error::{AppError, CacheError};
    use crate::session::{InMemorySessionStore, SessionStore};
    use crate::users::{UserFinder, UserRecord, JOB_SEEKER_ROLE_ID};

    pub fn test_jwt_settings() -> JwtSettings {
        JwtSettings {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 604800,
            issuer: "test".to_string(),
        }
    }

    pub fn test_user(email: &str, password: &str) -> UserRecord {
        UserRecord {
            id: Uuid::new_v4(),
            email: email.to_string(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            phone: "".to_string(),
            password_hash: bcrypt::hash(password, 4).unwrap(),
            role_id: JOB_SEEKER_ROLE_ID,
            is_banned: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// In-memory account directory.
    pub struct StubUsers {
        users: HashMap<String, UserRecord>,
    }

    impl StubUsers {
        pub fn with_user(user: UserRecord) -> Self {
            let mut users = HashMap::new();
            users.insert(user.email.clone(), user);
            Self { users }
        }
    }

    #[async_trait]
    impl UserFinder for StubUsers {
        async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError> {
            Ok(self.users.get(email).cloned())
        }
    }

    /// Real bcrypt hasher that counts its invocations.
    pub struct CountingHasher {
        inner: BcryptHasher,
        hash_calls: AtomicUsize,
        compare_calls: AtomicUsize,
    }

    impl CountingHasher {
        pub fn new() -> Self {
            Self {
                inner: BcryptHasher,
                hash_calls: AtomicUsize::new(0),
                compare_calls: AtomicUsize::new(0),
            }
        }

        pub fn hash_calls(&self) -> usize {
            self.hash_calls.load(Ordering::SeqCst)
        }

        pub fn compare_calls(&self) -> usize {
            self.compare_calls.load(Ordering::SeqCst)
        }
    }

    impl SecretHasher for CountingHasher {
        fn hash(&self, value: &str, cost: u32) -> Result<String, AppError> {
            self.hash_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.hash(value, cost)
        }

        fn compare(&self, value: &str, hashed: &str) -> Result<bool, AppError> {
            self.compare_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.compare(value, hashed)
        }
    }

    /// In-memory store that counts its invocations.
    pub struct RecordingStore {
        inner: InMemorySessionStore,
        get_calls: AtomicUsize,
        set_calls: AtomicUsize,
        del_calls: AtomicUsize,
    }

    impl RecordingStore {
        pub fn new() -> Self {
            Self {
                inner: InMemorySessionStore::new(),
                get_calls: AtomicUsize::new(0),
                set_calls: AtomicUsize::new(0),
                del_calls: AtomicUsize::new(0),
            }
        }

        pub fn get_calls(&self) -> usize {
            self.get_calls.load(Ordering::SeqCst)
        }

        pub fn set_calls(&self) -> usize {
            self.set_calls.load(Ordering::SeqCst)
        }

        pub fn del_calls(&self) -> usize {
            self.del_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SessionStore for RecordingStore {
        async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), CacheError> {
            self.set_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.set(key, value, ttl_seconds).await
        }

        async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
            self.get_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.get(key).await
        }

        async fn del(&self, key: &str) -> Result<(), CacheError> {
            self.del_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.del(key).await
        }
    }

    /// Store whose every operation fails, for fail-closed tests.
    pub struct FailingStore;

    #[async_trait]
    impl SessionStore for FailingStore {
        async fn set(&self, _key: &str, _value: &str, _ttl: u64) -> Result<(), CacheError> {
            Err(CacheError::Backend("session store unavailable".to_string()))
        }

        async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::Backend("session store unavailable".to_string()))
        }

        async fn del(&self, _key: &str) -> Result<(), CacheError> {
            Err(CacheError::Backend("session store unavailable".to_string()))
        }
    }
}
