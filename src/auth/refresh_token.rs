/// Refresh Token Management
///
/// Refresh tokens are opaque: 32 bytes from the operating system's CSPRNG,
/// hex-encoded to 64 characters. The server keeps a record per token which is
/// usable until it expires (60 days) or is revoked. Tokens are not rotated on
/// use.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const REFRESH_TOKEN_BYTES: usize = 32;
pub const REFRESH_TOKEN_LIFETIME_DAYS: i64 = 60;

/// The random source could not deliver bytes
#[derive(Debug, thiserror::Error)]
#[error("secure random source failed: {0}")]
pub struct EntropyError(String);

/// Generate a new refresh token
///
/// # Errors
/// Returns `EntropyError` only if the OS random source fails, which callers
/// treat as fatal for credential issuance.
pub fn generate_refresh_token() -> Result<String, EntropyError> {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| EntropyError(e.to_string()))?;
    Ok(hex::encode(bytes))
}

/// A persisted refresh token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshTokenRecord {
    /// Fresh, unrevoked record expiring 60 days after `now`
    pub fn new(token: String, user_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            token,
            user_id,
            created_at: now,
            expires_at: now + Duration::days(REFRESH_TOKEN_LIFETIME_DAYS),
            revoked_at: None,
        }
    }

    pub fn status(&self) -> RefreshTokenStatus {
        RefreshTokenStatus {
            user_id: self.user_id,
            expires_at: self.expires_at,
            revoked_at: self.revoked_at,
        }
    }
}

/// What the store reports back for a token lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTokenStatus {
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

/// Why a stored token cannot mint access tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTokenState {
    Usable,
    Revoked,
    Expired,
}

impl RefreshTokenStatus {
    pub fn state_at(&self, now: DateTime<Utc>) -> RefreshTokenState {
        if self.revoked_at.is_some() {
            RefreshTokenState::Revoked
        } else if self.expires_at <= now {
            RefreshTokenState::Expired
        } else {
            RefreshTokenState::Usable
        }
    }

    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.state_at(now) == RefreshTokenState::Usable
    }
}
