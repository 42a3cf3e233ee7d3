/// Persistence contracts
///
/// Handlers and the session service only see these traits. `PgStore` backs
/// them with Postgres, `MemoryStore` with in-process maps.

mod memory;
mod models;
mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::{RefreshTokenRecord, RefreshTokenStatus};

pub use memory::MemoryStore;
pub use models::{Chirp, NewChirp, UserRecord};
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("conflicting record: {0}")]
    Conflict(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store query failed: {0}")]
    Query(String),
    #[error("store call timed out")]
    Timeout,
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db_err) => {
                // 23505: unique_violation
                if db_err.code().as_deref() == Some("23505") {
                    StoreError::Conflict(db_err.message().to_string())
                } else {
                    StoreError::Query(db_err.message().to_string())
                }
            }
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => StoreError::Unavailable(err.to_string()),
            other => StoreError::Query(other.to_string()),
        }
    }
}

/// Refresh-token persistence required by the session service
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn create_refresh_token(&self, record: &RefreshTokenRecord) -> Result<(), StoreError>;

    /// Exact-match lookup; `None` when no such token was ever stored
    async fn get_refresh_token_status(
        &self,
        token: &str,
    ) -> Result<Option<RefreshTokenStatus>, StoreError>;

    /// Mark the token revoked. Succeeds without effect if it is absent or
    /// already revoked.
    async fn revoke_refresh_token(&self, token: &str) -> Result<(), StoreError>;

    /// Administrative reset: drop every user and everything they own
    async fn delete_all_credentials(&self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, email: &str, hashed_password: &str)
        -> Result<UserRecord, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn update_user(
        &self,
        user_id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<UserRecord, StoreError>;

    /// Returns `false` if there is no such user
    async fn upgrade_to_chirpy_red(&self, user_id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait ChirpStore: Send + Sync {
    async fn create_chirp(&self, chirp: NewChirp) -> Result<Chirp, StoreError>;

    /// Oldest first, optionally restricted to one author
    async fn list_chirps(&self, author_id: Option<Uuid>) -> Result<Vec<Chirp>, StoreError>;

    async fn get_chirp(&self, chirp_id: Uuid) -> Result<Option<Chirp>, StoreError>;

    async fn delete_chirp(&self, chirp_id: Uuid) -> Result<(), StoreError>;
}
