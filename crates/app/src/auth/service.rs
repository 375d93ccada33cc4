//! Auth service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::debug;
use uuid::Uuid;

use crate::auth::{
    ApiToken, AuthServiceError, Identity, IssuedApiToken, NewApiToken, NewUser, UserRecord,
    UserUuid, repository::AuthRepository, verifiers_match,
};

#[derive(Clone)]
pub struct DefaultAuthService {
    repository: Arc<dyn AuthRepository>,
}

impl DefaultAuthService {
    #[must_use]
    pub fn new(repository: Arc<dyn AuthRepository>) -> Self {
        Self { repository }
    }

    /// Register a user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthServiceError::AlreadyExists`] when the email is taken.
    pub async fn create_user(&self, user: NewUser) -> Result<UserRecord, AuthServiceError> {
        self.repository.create_user(user).await
    }

    /// Issue a new API token for the given user.
    ///
    /// # Errors
    ///
    /// Returns an error if the expiry is in the past, the user does not exist
    /// or persisting the token fails.
    pub async fn issue_api_token(
        &self,
        user_uuid: UserUuid,
        expires_at: Option<Timestamp>,
    ) -> Result<IssuedApiToken, AuthServiceError> {
        if expires_at.is_some_and(|expires_at| expires_at <= Timestamp::now()) {
            return Err(AuthServiceError::InvalidExpiry);
        }

        self.repository.get_user(user_uuid).await?;

        let token = ApiToken::generate();

        let metadata = self
            .repository
            .create_api_token(NewApiToken {
                uuid: token.uuid,
                user_uuid,
                version: token.version,
                token_hash: token.verifier(user_uuid),
                expires_at,
            })
            .await?;

        Ok(IssuedApiToken {
            token: token.to_string(),
            metadata,
        })
    }

    /// Revoke a token by UUID. Returns `true` if the token was active.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage update fails.
    pub async fn revoke_api_token(&self, token_uuid: Uuid) -> Result<bool, AuthServiceError> {
        self.repository.revoke_api_token(token_uuid).await
    }
}

#[async_trait]
impl AuthService for DefaultAuthService {
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<Identity, AuthServiceError> {
        let presented: ApiToken = bearer_token
            .parse()
            .map_err(|_malformed| AuthServiceError::NotFound)?;

        let stored = self
            .repository
            .find_active_api_token(presented.uuid, presented.version)
            .await?
            .ok_or(AuthServiceError::NotFound)?;

        if stored.version != presented.version
            || !verifiers_match(&presented.verifier(stored.user_uuid), &stored.token_hash)
        {
            return Err(AuthServiceError::NotFound);
        }

        if let Err(error) = self
            .repository
            .touch_api_token_last_used(presented.uuid)
            .await
        {
            debug!(error = %error, "failed to record api token use");
        }

        Ok(Identity {
            user: stored.user_uuid,
            role: stored.role,
        })
    }
}

#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Resolve a raw bearer token to the identity of its owner.
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<Identity, AuthServiceError>;
}
