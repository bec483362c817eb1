/// Session rotation (refresh)
///
/// Verifies a presented refresh token, validates the server-side session
/// record, and rotates the token pair. A token whose hash no longer
/// matches the record is a replay: the session is destroyed before the
/// request fails, so a captured token forces re-login instead of staying
/// silently reusable.
///
/// The read-validate-write sequence is not compare-and-swap guarded; two
/// concurrent refreshes with the same still-valid token can both pass the
/// hash check, and the loser's new token dies at its next use. Accepted
/// for single-session deployments.

use crate::auth::{SecretHasher, TokenSigner, REFRESH_TOKEN_HASH_COST};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};
use crate::session::record::{session_key, SessionRecord};

/// A freshly minted access/refresh token pair.
#[derive(Debug)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Refresh orchestrator. Collaborators are injected at construction.
pub struct TokenRefresher<'a> {
    signer: &'a dyn TokenSigner,
    hasher: &'a dyn SecretHasher,
    store: &'a dyn super::SessionStore,
    jwt: &'a JwtSettings,
}

impl<'a> TokenRefresher<'a> {
    pub fn new(
        signer: &'a dyn TokenSigner,
        hasher: &'a dyn SecretHasher,
        store: &'a dyn super::SessionStore,
        jwt: &'a JwtSettings,
    ) -> Self {
        Self {
            signer,
            hasher,
            store,
            jwt,
        }
    }

    /// Exchange a valid refresh token for a new token pair, rotating the
    /// session record. Every failure surfaces as the same Unauthorized
    /// error.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AppError> {
        match self.rotate(refresh_token).await {
            Ok(pair) => Ok(pair),
            Err(err) => {
                tracing::warn!(error = %err, "Refresh rejected");
                Err(AppError::Auth(AuthError::TokenInvalid))
            }
        }
    }

    async fn rotate(&self, presented: &str) -> Result<TokenPair, AppError> {
        // Signature and signed expiry; no store I/O happens on failure.
        let claims = self.signer.verify(presented)?;
        let user_id = claims.user_id()?;
        let key = session_key(&user_id);

        let Some(raw) = self.store.get(&key).await? else {
            tracing::info!(user_id = %user_id, "Session expired or not found");
            return Err(AppError::Auth(AuthError::TokenInvalid));
        };
        let record = SessionRecord::from_json(&raw)?;

        // Server-side expiry, independent of the token's own `exp`; checked
        // before any hash comparison.
        if record.is_expired() {
            tracing::info!(user_id = %user_id, "Session expired");
            return Err(AppError::Auth(AuthError::TokenInvalid));
        }

        // Replay detection: a token that no longer matches the stored hash
        // destroys the session outright.
        if !self.hasher.compare(presented, &record.refresh_token)? {
            self.store.del(&key).await?;
            tracing::warn!(user_id = %user_id, "Invalid refresh token, session revoked");
            return Err(AppError::Auth(AuthError::TokenInvalid));
        }

        // Rotate: new pair, new hash, new expiry, same key.
        let access_token = self.signer.sign(user_id, self.jwt.access_token_expiry)?;
        let refresh_token = self.signer.sign(user_id, self.jwt.refresh_token_expiry)?;
        let hashed_refresh_token = self.hasher.hash(&refresh_token, REFRESH_TOKEN_HASH_COST)?;

        let next = SessionRecord::new(user_id, hashed_refresh_token, self.jwt.refresh_token_expiry);
        self.store
            .set(&key, &next.to_json()?, self.jwt.refresh_token_expiry as u64)
            .await?;

        tracing::info!(user_id = %user_id, "Session rotated");

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{BcryptHasher, JwtSigner};
    use crate::session::testing::{test_jwt_settings, CountingHasher, RecordingStore};
    use crate::session::SessionStore;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    /// Seed a session record directly, as login would have written it.
    async fn seed_session(
        store: &RecordingStore,
        jwt: &JwtSettings,
        user_id: Uuid,
        lifetime_seconds: i64,
    ) -> String {
        let signer = JwtSigner::new(jwt.clone());
        let hasher = BcryptHasher;

        let refresh_token = signer.sign(user_id, jwt.refresh_token_expiry).unwrap();
        let hashed = hasher
            .hash(&refresh_token, REFRESH_TOKEN_HASH_COST)
            .unwrap();
        let record = SessionRecord::new(user_id, hashed, lifetime_seconds);
        store
            .set(&record.key(), &record.to_json().unwrap(), 604800)
            .await
            .unwrap();

        refresh_token
    }

    #[tokio::test]
    async fn garbage_token_performs_no_store_io() {
        let jwt = test_jwt_settings();
        let signer = JwtSigner::new(jwt.clone());
        let hasher = CountingHasher::new();
        let store = RecordingStore::new();

        let refresher = TokenRefresher::new(&signer, &hasher, &store, &jwt);
        let err = refresher.refresh("garbage-token").await.unwrap_err();

        match err {
            AppError::Auth(AuthError::TokenInvalid) => (),
            other => panic!("Expected uniform unauthorized error, got {:?}", other),
        }
        assert_eq!(store.get_calls(), 0);
        assert_eq!(hasher.compare_calls(), 0);
    }

    #[tokio::test]
    async fn missing_session_is_rejected_before_hashing() {
        let jwt = test_jwt_settings();
        let signer = JwtSigner::new(jwt.clone());
        let hasher = CountingHasher::new();
        let store = RecordingStore::new();

        // Valid signature, but no record behind it
        let token = signer.sign(Uuid::new_v4(), jwt.refresh_token_expiry).unwrap();

        let refresher = TokenRefresher::new(&signer, &hasher, &store, &jwt);
        refresher.refresh(&token).await.unwrap_err();

        assert_eq!(store.get_calls(), 1);
        assert_eq!(hasher.compare_calls(), 0);
    }

    #[tokio::test]
    async fn expired_session_skips_the_hash_comparison() {
        let jwt = test_jwt_settings();
        let signer = JwtSigner::new(jwt.clone());
        let hasher = CountingHasher::new();
        let store = RecordingStore::new();
        let user_id = Uuid::new_v4();

        // Record already past its expireDate, hash otherwise valid
        let token = seed_session(&store, &jwt, user_id, -60).await;

        let refresher = TokenRefresher::new(&signer, &hasher, &store, &jwt);
        refresher.refresh(&token).await.unwrap_err();

        assert_eq!(hasher.compare_calls(), 0);
        assert_eq!(hasher.hash_calls(), 0);
        // An expired record is rejected, not revoked
        assert_eq!(store.del_calls(), 0);
    }

    #[tokio::test]
    async fn hash_mismatch_revokes_the_session() {
        let jwt = test_jwt_settings();
        let signer = JwtSigner::new(jwt.clone());
        let hasher = BcryptHasher;
        let store = RecordingStore::new();
        let user_id = Uuid::new_v4();

        // The stored hash belongs to this token...
        let _current = seed_session(&store, &jwt, user_id, jwt.refresh_token_expiry).await;
        // ...while the presented one is a different, validly signed token
        let stale = signer.sign(user_id, jwt.refresh_token_expiry).unwrap();

        let refresher = TokenRefresher::new(&signer, &hasher, &store, &jwt);
        refresher.refresh(&stale).await.unwrap_err();

        assert_eq!(
            store.get(&session_key(&user_id)).await.unwrap(),
            None,
            "Replay must destroy the session record"
        );
    }

    #[tokio::test]
    async fn successful_refresh_rotates_the_session() {
        let jwt = test_jwt_settings();
        let signer = JwtSigner::new(jwt.clone());
        let hasher = BcryptHasher;
        let store = RecordingStore::new();
        let user_id = Uuid::new_v4();

        let rt1 = seed_session(&store, &jwt, user_id, jwt.refresh_token_expiry).await;

        let refresher = TokenRefresher::new(&signer, &hasher, &store, &jwt);
        let pair = refresher.refresh(&rt1).await.expect("Refresh should succeed");

        assert_ne!(pair.refresh_token, rt1);

        let raw = store
            .get(&session_key(&user_id))
            .await
            .unwrap()
            .expect("Rotated record should exist");
        let record = SessionRecord::from_json(&raw).unwrap();

        // The record now verifies only against the new token
        assert!(hasher
            .compare(&pair.refresh_token, &record.refresh_token)
            .unwrap());
        assert!(!hasher.compare(&rt1, &record.refresh_token).unwrap());

        let expected_expiry = Utc::now() + Duration::seconds(jwt.refresh_token_expiry);
        let delta = (record.expire_date - expected_expiry).num_seconds().abs();
        assert!(delta < 60, "Rotation must reset expireDate to now + 7d");
    }

    #[tokio::test]
    async fn replayed_token_fails_and_kills_the_session() {
        let jwt = test_jwt_settings();
        let signer = JwtSigner::new(jwt.clone());
        let hasher = BcryptHasher;
        let store = RecordingStore::new();
        let user_id = Uuid::new_v4();

        let rt1 = seed_session(&store, &jwt, user_id, jwt.refresh_token_expiry).await;

        let refresher = TokenRefresher::new(&signer, &hasher, &store, &jwt);
        let pair2 = refresher.refresh(&rt1).await.unwrap();
        let pair3 = refresher.refresh(&pair2.refresh_token).await.unwrap();

        // Replaying the first token is detected and revokes the session
        refresher.refresh(&rt1).await.unwrap_err();
        assert_eq!(store.get(&session_key(&user_id)).await.unwrap(), None);

        // The latest legitimate token is now dead too; re-login is forced
        refresher.refresh(&pair3.refresh_token).await.unwrap_err();
    }
}
