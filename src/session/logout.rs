/// Session revocation (logout)
///
/// Verifies the presented refresh token's signature and deletes the
/// session record. Deleting an already-absent record still reports
/// success; logging out twice is not an error.

use crate::auth::TokenSigner;
use crate::error::{AppError, AuthError};
use crate::session::record::session_key;

/// Outcome of a successful logout.
#[derive(Debug)]
pub struct RevokedSession {
    pub success: bool,
    pub message: String,
}

/// Logout orchestrator. Collaborators are injected at construction.
pub struct SessionRevoker<'a> {
    signer: &'a dyn TokenSigner,
    store: &'a dyn super::SessionStore,
}

impl<'a> SessionRevoker<'a> {
    pub fn new(signer: &'a dyn TokenSigner, store: &'a dyn super::SessionStore) -> Self {
        Self { signer, store }
    }

    /// Revoke the session belonging to the token's subject.
    pub async fn revoke(&self, token: &str) -> Result<RevokedSession, AppError> {
        match self.try_revoke(token).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                tracing::warn!(error = %err, "Logout rejected");
                Err(AppError::Auth(AuthError::TokenInvalid))
            }
        }
    }

    async fn try_revoke(&self, token: &str) -> Result<RevokedSession, AppError> {
        let claims = self.signer.verify(token)?;
        let user_id = claims.user_id()?;

        self.store.del(&session_key(&user_id)).await?;

        tracing::info!(user_id = %user_id, "Session revoked");

        Ok(RevokedSession {
            success: true,
            message: "User logged out successfully".to_string(),
        })
    }
}
