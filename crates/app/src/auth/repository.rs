//! Auth repository.

use async_trait::async_trait;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::{
    auth::{
        ActiveApiToken, ApiTokenMetadata, ApiTokenVersion, AuthServiceError, NewApiToken, NewUser,
        Role, UserRecord, UserUuid,
    },
    database::Db,
};

const CREATE_USER_SQL: &str = include_str!("sql/create_user.sql");
const GET_USER_SQL: &str = include_str!("sql/get_user.sql");
const CREATE_API_TOKEN_SQL: &str = include_str!("sql/create_api_token.sql");
const FIND_ACTIVE_API_TOKEN_SQL: &str = include_str!("sql/find_active_api_token.sql");
const TOUCH_API_TOKEN_LAST_USED_SQL: &str = include_str!("sql/touch_api_token_last_used.sql");
const REVOKE_API_TOKEN_SQL: &str = include_str!("sql/revoke_api_token.sql");

/// Persistence for users and their API tokens.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, AuthServiceError>;

    async fn get_user(&self, user: UserUuid) -> Result<UserRecord, AuthServiceError>;

    async fn create_api_token(
        &self,
        token: NewApiToken,
    ) -> Result<ApiTokenMetadata, AuthServiceError>;

    /// Find a token that is neither revoked nor expired.
    async fn find_active_api_token(
        &self,
        token_uuid: Uuid,
        version: ApiTokenVersion,
    ) -> Result<Option<ActiveApiToken>, AuthServiceError>;

    async fn touch_api_token_last_used(&self, token_uuid: Uuid) -> Result<(), AuthServiceError>;

    /// Returns `true` when the token was active before this call.
    async fn revoke_api_token(&self, token_uuid: Uuid) -> Result<bool, AuthServiceError>;
}

#[derive(Debug, Clone)]
pub struct PgAuthRepository {
    db: Db,
}

impl PgAuthRepository {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuthRepository for PgAuthRepository {
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, AuthServiceError> {
        let created = query_as::<Postgres, UserRecord>(CREATE_USER_SQL)
            .bind(user.uuid.into_uuid())
            .bind(user.email.trim().to_lowercase())
            .bind(user.role.as_str())
            .fetch_one(self.db.pool())
            .await?;

        Ok(created)
    }

    async fn get_user(&self, user: UserUuid) -> Result<UserRecord, AuthServiceError> {
        query_as::<Postgres, UserRecord>(GET_USER_SQL)
            .bind(user.into_uuid())
            .fetch_optional(self.db.pool())
            .await?
            .ok_or(AuthServiceError::UserNotFound)
    }

    async fn create_api_token(
        &self,
        token: NewApiToken,
    ) -> Result<ApiTokenMetadata, AuthServiceError> {
        let created = query_as::<Postgres, ApiTokenMetadata>(CREATE_API_TOKEN_SQL)
            .bind(token.uuid)
            .bind(token.user_uuid.into_uuid())
            .bind(token.version.as_i16())
            .bind(token.token_hash)
            .bind(token.expires_at.map(SqlxTimestamp::from))
            .fetch_one(self.db.pool())
            .await?;

        Ok(created)
    }

    async fn find_active_api_token(
        &self,
        token_uuid: Uuid,
        version: ApiTokenVersion,
    ) -> Result<Option<ActiveApiToken>, AuthServiceError> {
        let token = query_as::<Postgres, ActiveApiToken>(FIND_ACTIVE_API_TOKEN_SQL)
            .bind(token_uuid)
            .bind(version.as_i16())
            .fetch_optional(self.db.pool())
            .await?;

        Ok(token)
    }

    async fn touch_api_token_last_used(&self, token_uuid: Uuid) -> Result<(), AuthServiceError> {
        query(TOUCH_API_TOKEN_LAST_USED_SQL)
            .bind(token_uuid)
            .execute(self.db.pool())
            .await?;

        Ok(())
    }

    async fn revoke_api_token(&self, token_uuid: Uuid) -> Result<bool, AuthServiceError> {
        let revoked = query(REVOKE_API_TOKEN_SQL)
            .bind(token_uuid)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(revoked.is_some())
    }
}

fn decode_role(row: &PgRow) -> sqlx::Result<Role> {
    let role: String = row.try_get("role")?;

    role.parse().map_err(|e| sqlx::Error::ColumnDecode {
        index: "role".to_string(),
        source: Box::new(e),
    })
}

fn decode_version(row: &PgRow) -> sqlx::Result<ApiTokenVersion> {
    let version: i16 = row.try_get("version")?;

    ApiTokenVersion::try_from(version).map_err(|e| sqlx::Error::ColumnDecode {
        index: "version".to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, PgRow> for UserRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: UserUuid::from_uuid(row.try_get("uuid")?),
            email: row.try_get("email")?,
            role: decode_role(row)?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for ActiveApiToken {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            role: decode_role(row)?,
            version: decode_version(row)?,
            token_hash: row.try_get("token_hash")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for ApiTokenMetadata {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: row.try_get("uuid")?,
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            version: decode_version(row)?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            last_used_at: row
                .try_get::<Option<SqlxTimestamp>, _>("last_used_at")?
                .map(SqlxTimestamp::to_jiff),
            expires_at: row
                .try_get::<Option<SqlxTimestamp>, _>("expires_at")?
                .map(SqlxTimestamp::to_jiff),
            revoked_at: row
                .try_get::<Option<SqlxTimestamp>, _>("revoked_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}
