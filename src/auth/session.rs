/// Session orchestration
///
/// Login, refresh, revoke and per-request authentication on top of the
/// hasher, the token codec, the refresh-token issuer and the extractor.
/// No state is held between requests apart from the immutable settings.

use actix_web::http::header::HeaderMap;
use chrono::{DateTime, Duration, Utc};
use lazy_static::lazy_static;
use std::future::Future;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::error::{AuthError, Unauthenticated};
use crate::auth::extract::{extract_api_key, extract_bearer};
use crate::auth::jwt::{default_access_token_ttl, generate_access_token, validate_access_token};
use crate::auth::password::{hash_password, verify_password, PasswordError};
use crate::auth::refresh_token::{generate_refresh_token, RefreshTokenRecord, RefreshTokenState};
use crate::auth::secret::{ApiKey, SigningSecret};
use crate::store::{RefreshTokenStore, StoreError, UserRecord, UserStore};

pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 5000;

lazy_static! {
    // Verified against when the e-mail is unknown, so both login failures cost
    // one bcrypt verification.
    static ref UNKNOWN_USER_DIGEST: Option<String> =
        hash_password("no such user; this digest never matches").ok();
}

/// Everything the session service needs from configuration
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub signing_secret: SigningSecret,
    pub api_key: ApiKey,
    pub access_token_ttl: Duration,
    pub store_timeout: std::time::Duration,
}

impl SessionSettings {
    pub fn new(signing_secret: SigningSecret, api_key: ApiKey) -> Self {
        Self {
            signing_secret,
            api_key,
            access_token_ttl: default_access_token_ttl(),
            store_timeout: std::time::Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS),
        }
    }
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub user: UserRecord,
    pub access_token: String,
    pub refresh_token: String,
}

pub struct AuthSessionService {
    users: Arc<dyn UserStore>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    settings: SessionSettings,
}

impl AuthSessionService {
    pub fn new(
        users: Arc<dyn UserStore>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            users,
            refresh_tokens,
            settings,
        }
    }

    pub fn access_token_ttl(&self) -> Duration {
        self.settings.access_token_ttl
    }

    /// Hash a password off the async workers
    pub async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?
            .map_err(|e| AuthError::Hashing(e.to_string()))
    }

    /// Check a password against a stored digest
    ///
    /// Mismatch and undecodable digests both come back as
    /// `Unauthenticated::InvalidCredentials`.
    pub async fn verify_password(&self, password: &str, digest: &str) -> Result<(), AuthError> {
        let password = password.to_string();
        let digest = digest.to_string();
        tokio::task::spawn_blocking(move || verify_password(&password, &digest))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?
            .map_err(|e| match e {
                PasswordError::Mismatch => {
                    AuthError::Unauthenticated(Unauthenticated::InvalidCredentials)
                }
                PasswordError::HashingFailure(msg) => AuthError::Hashing(msg),
            })
    }

    /// Sign an access token for `user_id`; `ttl` defaults to the configured lifetime
    pub fn issue_access_token(
        &self,
        user_id: Uuid,
        ttl: Option<Duration>,
    ) -> Result<String, AuthError> {
        let ttl = ttl.unwrap_or(self.settings.access_token_ttl);
        generate_access_token(user_id, &self.settings.signing_secret, ttl)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    pub fn validate_access_token(&self, token: &str) -> Result<Uuid, AuthError> {
        validate_access_token(token, &self.settings.signing_secret)
            .map_err(|e| AuthError::Unauthenticated(Unauthenticated::AccessToken(e)))
    }

    /// A fresh refresh token and the record to persist for it
    pub fn issue_refresh_token(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(String, RefreshTokenRecord), AuthError> {
        let token = generate_refresh_token().map_err(|e| AuthError::Entropy(e.to_string()))?;
        let record = RefreshTokenRecord::new(token.clone(), user_id, now);
        Ok((token, record))
    }

    /// Resolve the bearer access token on a request to the caller's identity
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Uuid, AuthError> {
        let token = extract_bearer(headers)?;
        let user_id = self.validate_access_token(&token)?;
        tracing::debug!(user_id = %user_id, "Access token validated");
        Ok(user_id)
    }

    /// Check `Authorization: ApiKey <key>` against the configured key
    pub fn authenticate_api_key(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        let key = extract_api_key(headers)?;
        if self.settings.api_key.matches(&key) {
            Ok(())
        } else {
            Err(AuthError::Unauthenticated(Unauthenticated::ApiKeyMismatch))
        }
    }

    /// Verify e-mail and password, then issue an access/refresh token pair
    ///
    /// The refresh record is persisted before anything is returned; if that
    /// write fails the whole login fails.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginSession, AuthError> {
        let user = self
            .with_timeout(self.users.find_user_by_email(email))
            .await?;

        let user = match user {
            Some(user) => {
                self.verify_password(password, &user.hashed_password).await?;
                user
            }
            None => {
                if let Some(digest) = UNKNOWN_USER_DIGEST.as_ref() {
                    let _ = self.verify_password(password, digest).await;
                }
                return Err(AuthError::Unauthenticated(
                    Unauthenticated::InvalidCredentials,
                ));
            }
        };

        let access_token = self.issue_access_token(user.id, None)?;
        let (refresh_token, record) = self.issue_refresh_token(user.id, Utc::now())?;
        self.with_timeout(self.refresh_tokens.create_refresh_token(&record))
            .await?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginSession {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Mint a new access token from the bearer refresh token on a request
    pub async fn refresh(&self, headers: &HeaderMap) -> Result<String, AuthError> {
        let token = extract_bearer(headers)?;
        self.refresh_access_token_at(&token, Utc::now()).await
    }

    /// Mint a new access token from a raw refresh token, judged at `now`
    ///
    /// Unknown, revoked and expired tokens all fail the same way. The refresh
    /// token itself is not rotated.
    pub async fn refresh_access_token_at(
        &self,
        refresh_token: &str,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let status = self
            .with_timeout(self.refresh_tokens.get_refresh_token_status(refresh_token))
            .await?
            .ok_or(AuthError::Unauthenticated(Unauthenticated::RefreshTokenUnknown))?;

        match status.state_at(now) {
            RefreshTokenState::Usable => {}
            RefreshTokenState::Revoked => {
                tracing::warn!(user_id = %status.user_id, "Revoked refresh token presented");
                return Err(AuthError::Unauthenticated(
                    Unauthenticated::RefreshTokenRevoked,
                ));
            }
            RefreshTokenState::Expired => {
                tracing::info!(user_id = %status.user_id, "Expired refresh token presented");
                return Err(AuthError::Unauthenticated(
                    Unauthenticated::RefreshTokenExpired,
                ));
            }
        }

        self.issue_access_token(status.user_id, None)
    }

    /// Revoke the bearer refresh token on a request
    ///
    /// Unknown and already-revoked tokens succeed too.
    pub async fn revoke(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        let token = extract_bearer(headers)?;
        self.revoke_refresh_token(&token).await
    }

    pub async fn revoke_refresh_token(&self, refresh_token: &str) -> Result<(), AuthError> {
        self.with_timeout(self.refresh_tokens.revoke_refresh_token(refresh_token))
            .await
    }

    /// Drop every user and credential (development reset)
    pub async fn reset_credentials(&self) -> Result<(), AuthError> {
        self.with_timeout(self.refresh_tokens.delete_all_credentials())
            .await?;
        tracing::warn!("All users and credentials deleted");
        Ok(())
    }

    async fn with_timeout<T>(
        &self,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, AuthError> {
        match tokio::time::timeout(self.settings.store_timeout, call).await {
            Ok(result) => result.map_err(AuthError::Store),
            Err(_) => Err(AuthError::Store(StoreError::Timeout)),
        }
    }
}
