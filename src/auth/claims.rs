/// JWT Claims structure
///
/// The access-token payload. The claim set is exactly `{iss, sub, iat, exp}`;
/// any service that shares the signing secret must agree on it.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer written into, and required from, every access token
pub const ISSUER: &str = "Chirpy";

/// JWT Claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Issuer
    pub iss: String,
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp, seconds)
    pub iat: i64,
    /// Expiration time (Unix timestamp, seconds)
    pub exp: i64,
}

impl Claims {
    /// Build claims for `user_id`, issued at `now` and valid for `ttl`
    pub fn new(user_id: Uuid, now: DateTime<Utc>, ttl: Duration) -> Self {
        let iat = now.timestamp();
        Self {
            iss: ISSUER.to_string(),
            sub: user_id.to_string(),
            iat,
            exp: iat + ttl.num_seconds(),
        }
    }

    /// Parse the subject back into a user ID
    pub fn user_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sub)
    }

    /// True once `now` has reached the expiry second
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }

    /// True if the token claims to be issued after `now`
    pub fn is_issued_after(&self, now: DateTime<Utc>) -> bool {
        self.iat > now.timestamp()
    }
}
