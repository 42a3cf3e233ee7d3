/// In-process store
///
/// Same contracts as `PgStore`, kept in maps behind a mutex. Used by the test
/// suites and for running the service without a database.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use uuid::Uuid;

use super::{Chirp, ChirpStore, NewChirp, RefreshTokenStore, StoreError, UserRecord, UserStore};
use crate::auth::{RefreshTokenRecord, RefreshTokenStatus};

#[derive(Default)]
struct MemoryState {
    users: HashMap<Uuid, UserRecord>,
    chirps: Vec<Chirp>,
    refresh_tokens: HashMap<String, RefreshTokenRecord>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    latency: Option<Duration>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call by `latency`, to exercise caller timeouts
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    /// Stored refresh-token record, if any
    pub fn refresh_token(&self, token: &str) -> Option<RefreshTokenRecord> {
        self.state
            .lock()
            .ok()
            .and_then(|state| state.refresh_tokens.get(token).cloned())
    }

    /// Overwrite a stored record, e.g. to age it past its expiry
    pub fn put_refresh_token(&self, record: RefreshTokenRecord) {
        if let Ok(mut state) = self.state.lock() {
            state.refresh_tokens.insert(record.token.clone(), record);
        }
    }

    async fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryStore {
    async fn create_refresh_token(&self, record: &RefreshTokenRecord) -> Result<(), StoreError> {
        let mut state = self.lock().await?;
        if !state.users.contains_key(&record.user_id) {
            return Err(StoreError::Query("refresh token owner does not exist".to_string()));
        }
        if state.refresh_tokens.contains_key(&record.token) {
            return Err(StoreError::Conflict("refresh token already exists".to_string()));
        }
        state
            .refresh_tokens
            .insert(record.token.clone(), record.clone());
        Ok(())
    }

    async fn get_refresh_token_status(
        &self,
        token: &str,
    ) -> Result<Option<RefreshTokenStatus>, StoreError> {
        let state = self.lock().await?;
        Ok(state.refresh_tokens.get(token).map(RefreshTokenRecord::status))
    }

    async fn revoke_refresh_token(&self, token: &str) -> Result<(), StoreError> {
        let mut state = self.lock().await?;
        if let Some(record) = state.refresh_tokens.get_mut(token) {
            if record.revoked_at.is_none() {
                record.revoked_at = Some(Utc::now());
            }
        }
        Ok(())
    }

    async fn delete_all_credentials(&self) -> Result<(), StoreError> {
        let mut state = self.lock().await?;
        *state = MemoryState::default();
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> Result<UserRecord, StoreError> {
        let mut state = self.lock().await?;
        if state.users.values().any(|user| user.email == email) {
            return Err(StoreError::Conflict(format!("email {} already registered", email)));
        }

        let now = Utc::now();
        let user = UserRecord {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
            is_chirpy_red: false,
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let state = self.lock().await?;
        Ok(state.users.values().find(|user| user.email == email).cloned())
    }

    async fn update_user(
        &self,
        user_id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<UserRecord, StoreError> {
        let mut state = self.lock().await?;
        if state
            .users
            .values()
            .any(|user| user.email == email && user.id != user_id)
        {
            return Err(StoreError::Conflict(format!("email {} already registered", email)));
        }

        let user = state.users.get_mut(&user_id).ok_or(StoreError::NotFound)?;
        user.email = email.to_string();
        user.hashed_password = hashed_password.to_string();
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn upgrade_to_chirpy_red(&self, user_id: Uuid) -> Result<bool, StoreError> {
        let mut state = self.lock().await?;
        match state.users.get_mut(&user_id) {
            Some(user) => {
                user.is_chirpy_red = true;
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl ChirpStore for MemoryStore {
    async fn create_chirp(&self, chirp: NewChirp) -> Result<Chirp, StoreError> {
        let mut state = self.lock().await?;
        if !state.users.contains_key(&chirp.user_id) {
            return Err(StoreError::Query("chirp author does not exist".to_string()));
        }

        let now = Utc::now();
        let chirp = Chirp {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            body: chirp.body,
            user_id: chirp.user_id,
        };
        state.chirps.push(chirp.clone());
        Ok(chirp)
    }

    async fn list_chirps(&self, author_id: Option<Uuid>) -> Result<Vec<Chirp>, StoreError> {
        let state = self.lock().await?;
        let mut chirps: Vec<Chirp> = state
            .chirps
            .iter()
            .filter(|chirp| author_id.map_or(true, |author| chirp.user_id == author))
            .cloned()
            .collect();
        chirps.sort_by_key(|chirp| chirp.created_at);
        Ok(chirps)
    }

    async fn get_chirp(&self, chirp_id: Uuid) -> Result<Option<Chirp>, StoreError> {
        let state = self.lock().await?;
        Ok(state.chirps.iter().find(|chirp| chirp.id == chirp_id).cloned())
    }

    async fn delete_chirp(&self, chirp_id: Uuid) -> Result<(), StoreError> {
        let mut state = self.lock().await?;
        state.chirps.retain(|chirp| chirp.id != chirp_id);
        Ok(())
    }
}
