/// Session creation (login)
///
/// Verifies a credential pair, mints an access/refresh token pair, and
/// persists the hashed refresh token as the user's single session record.
/// Every failure surfaces as the same Unauthorized error; whether the
/// email was unknown, the password wrong, or a collaborator down is never
/// observable from the outside.

use crate::auth::{SecretHasher, TokenSigner, REFRESH_TOKEN_HASH_COST};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};
use crate::session::record::SessionRecord;
use crate::users::{PublicUser, UserFinder};

/// Outcome of a successful login.
#[derive(Debug)]
pub struct AuthenticatedSession {
    pub access_token: String,
    pub refresh_token: String,
    pub user: PublicUser,
}

/// Login orchestrator. Collaborators are injected at construction.
pub struct SessionAuthenticator<'a> {
    users: &'a dyn UserFinder,
    signer: &'a dyn TokenSigner,
    hasher: &'a dyn SecretHasher,
    store: &'a dyn super::SessionStore,
    jwt: &'a JwtSettings,
}

impl<'a> SessionAuthenticator<'a> {
    pub fn new(
        users: &'a dyn UserFinder,
        signer: &'a dyn TokenSigner,
        hasher: &'a dyn SecretHasher,
        store: &'a dyn super::SessionStore,
        jwt: &'a JwtSettings,
    ) -> Self {
        Self {
            users,
            signer,
            hasher,
            store,
            jwt,
        }
    }

    /// Authenticate a credential pair and open a session.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedSession, AppError> {
        match self.try_authenticate(email, password).await {
            Ok(session) => Ok(session),
            Err(err) => {
                tracing::warn!(error = %err, "Login rejected");
                Err(AppError::Auth(AuthError::InvalidCredentials))
            }
        }
    }

    async fn try_authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedSession, AppError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AppError::Auth(AuthError::InvalidCredentials))?;

        if !self.hasher.compare(password, &user.password_hash)? {
            return Err(AppError::Auth(AuthError::InvalidCredentials));
        }

        let access_token = self.signer.sign(user.id, self.jwt.access_token_expiry)?;
        let refresh_token = self.signer.sign(user.id, self.jwt.refresh_token_expiry)?;
        let hashed_refresh_token = self.hasher.hash(&refresh_token, REFRESH_TOKEN_HASH_COST)?;

        let record = SessionRecord::new(user.id, hashed_refresh_token, self.jwt.refresh_token_expiry);
        self.store
            .set(
                &record.key(),
                &record.to_json()?,
                self.jwt.refresh_token_expiry as u64,
            )
            .await?;

        tracing::info!(user_id = %user.id, "Session created");

        Ok(AuthenticatedSession {
            access_token,
            refresh_token,
            user: user.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{BcryptHasher, JwtSigner};
    use crate::session::record::session_key;
    use crate::session::testing::{
        test_jwt_settings, test_user, CountingHasher, FailingStore, RecordingStore, StubUsers,
    };
    use crate::session::SessionStore;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn login_creates_a_verifying_session_record() {
        let jwt = test_jwt_settings();
        let signer = JwtSigner::new(jwt.clone());
        let hasher = BcryptHasher;
        let store = RecordingStore::new();
        let user = test_user("john@example.com", "Password123");
        let users = StubUsers::with_user(user.clone());

        let authenticator = SessionAuthenticator::new(&users, &signer, &hasher, &store, &jwt);
        let session = authenticator
            .authenticate("john@example.com", "Password123")
            .await
            .expect("Login should succeed");

        assert_eq!(session.user.email, "john@example.com");
        assert_ne!(session.access_token, session.refresh_token);

        let raw = store
            .get(&session_key(&user.id))
            .await
            .unwrap()
            .expect("Session record should exist");
        let record = SessionRecord::from_json(&raw).unwrap();

        assert_eq!(record.user_id, user.id);
        // The stored hash verifies against exactly the returned refresh token
        assert!(hasher
            .compare(&session.refresh_token, &record.refresh_token)
            .unwrap());
        assert!(!hasher
            .compare(&session.access_token, &record.refresh_token)
            .unwrap());

        let expected_expiry = Utc::now() + Duration::seconds(jwt.refresh_token_expiry);
        let delta = (record.expire_date - expected_expiry).num_seconds().abs();
        assert!(delta < 60, "expireDate should be about now + 7d");
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_are_indistinguishable() {
        let jwt = test_jwt_settings();
        let signer = JwtSigner::new(jwt.clone());
        let hasher = CountingHasher::new();
        let store = RecordingStore::new();
        let user = test_user("john@example.com", "Password123");
        let users = StubUsers::with_user(user);

        let authenticator = SessionAuthenticator::new(&users, &signer, &hasher, &store, &jwt);

        let unknown = authenticator
            .authenticate("nobody@example.com", "Password123")
            .await
            .expect_err("Unknown email must be rejected");
        // The password is never compared for an unknown account
        assert_eq!(hasher.compare_calls(), 0);

        let wrong = authenticator
            .authenticate("john@example.com", "WrongPassword1")
            .await
            .expect_err("Wrong password must be rejected");

        assert_eq!(unknown.to_string(), wrong.to_string());
        assert_eq!(store.set_calls(), 0, "No session record may be written");
    }

    #[tokio::test]
    async fn store_failure_fails_closed() {
        let jwt = test_jwt_settings();
        let signer = JwtSigner::new(jwt.clone());
        let hasher = BcryptHasher;
        let store = FailingStore;
        let user = test_user("john@example.com", "Password123");
        let users = StubUsers::with_user(user);

        let authenticator = SessionAuthenticator::new(&users, &signer, &hasher, &store, &jwt);
        let err = authenticator
            .authenticate("john@example.com", "Password123")
            .await
            .expect_err("Login must fail when the store is down");

        match err {
            AppError::Auth(AuthError::InvalidCredentials) => (),
            other => panic!("Expected uniform unauthorized error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn relogin_overwrites_the_previous_session() {
        let jwt = test_jwt_settings();
        let signer = JwtSigner::new(jwt.clone());
        let hasher = BcryptHasher;
        let store = RecordingStore::new();
        let user = test_user("john@example.com", "Password123");
        let users = StubUsers::with_user(user.clone());

        let authenticator = SessionAuthenticator::new(&users, &signer, &hasher, &store, &jwt);
        let first = authenticator
            .authenticate("john@example.com", "Password123")
            .await
            .unwrap();
        let second = authenticator
            .authenticate("john@example.com", "Password123")
            .await
            .unwrap();

        let raw = store
            .get(&session_key(&user.id))
            .await
            .unwrap()
            .expect("Session record should exist");
        let record = SessionRecord::from_json(&raw).unwrap();

        assert!(hasher
            .compare(&second.refresh_token, &record.refresh_token)
            .unwrap());
        assert!(!hasher
            .compare(&first.refresh_token, &record.refresh_token)
            .unwrap());
    }
}
