//! Login, refresh and revoke flows through the session service

use actix_web::http::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::Arc;

use chirper::auth::{
    hash_password, validate_access_token, ApiKey, AuthError, AuthErrorKind, AuthSessionService,
    CredentialError, RefreshTokenRecord, RefreshTokenStatus, SessionSettings, SigningSecret,
    Unauthenticated,
};
use chirper::store::{MemoryStore, RefreshTokenStore, StoreError, UserRecord, UserStore};

const SECRET: &str = "integration-test-signing-secret";

fn settings() -> SessionSettings {
    SessionSettings::new(
        SigningSecret::new(SECRET).unwrap(),
        ApiKey::new("integration-test-api-key").unwrap(),
    )
}

fn secret() -> SigningSecret {
    SigningSecret::new(SECRET).unwrap()
}

fn bearer(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );
    headers
}

struct TestSession {
    store: Arc<MemoryStore>,
    service: AuthSessionService,
    user: UserRecord,
}

async fn spawn_session() -> TestSession {
    let store = Arc::new(MemoryStore::new());
    let digest = hash_password("hello pass").expect("Failed to hash password");
    let user = store
        .create_user("user@x.com", &digest)
        .await
        .expect("Failed to create user");
    let service = AuthSessionService::new(store.clone(), store.clone(), settings());

    TestSession {
        store,
        service,
        user,
    }
}

#[tokio::test]
async fn login_issues_access_and_refresh_tokens() {
    let app = spawn_session().await;

    let session = app
        .service
        .login("user@x.com", "hello pass")
        .await
        .expect("Login failed");

    assert!(!session.access_token.is_empty());
    assert_eq!(session.refresh_token.len(), 64);
    assert!(session.refresh_token.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(session.user.id, app.user.id);

    let identity = validate_access_token(&session.access_token, &secret()).unwrap();
    assert_eq!(identity, app.user.id);

    let record = app
        .store
        .refresh_token(&session.refresh_token)
        .expect("Refresh token was not persisted");
    assert_eq!(record.user_id, app.user.id);
    assert!(record.revoked_at.is_none());
    let drift = (record.expires_at - (Utc::now() + Duration::days(60)))
        .num_seconds()
        .abs();
    assert!(drift < 60, "expires_at should be about 60 days out");
}

#[tokio::test]
async fn each_login_creates_an_independent_session() {
    let app = spawn_session().await;

    let first = app.service.login("user@x.com", "hello pass").await.unwrap();
    let second = app.service.login("user@x.com", "hello pass").await.unwrap();
    assert_ne!(first.refresh_token, second.refresh_token);

    app.service
        .revoke_refresh_token(&first.refresh_token)
        .await
        .unwrap();

    assert!(app
        .service
        .refresh(&bearer(&first.refresh_token))
        .await
        .is_err());
    assert!(app
        .service
        .refresh(&bearer(&second.refresh_token))
        .await
        .is_ok());
}

#[tokio::test]
async fn wrong_password_and_unknown_email_fail_the_same_way() {
    let app = spawn_session().await;

    let wrong_password = app
        .service
        .login("user@x.com", "not the pass")
        .await
        .unwrap_err();
    let unknown_email = app
        .service
        .login("nobody@x.com", "hello pass")
        .await
        .unwrap_err();

    for err in [wrong_password, unknown_email] {
        assert!(matches!(
            err,
            AuthError::Unauthenticated(Unauthenticated::InvalidCredentials)
        ));
    }
}

#[tokio::test]
async fn refresh_returns_token_bound_to_owner() {
    let app = spawn_session().await;
    let session = app.service.login("user@x.com", "hello pass").await.unwrap();

    let token = app
        .service
        .refresh(&bearer(&session.refresh_token))
        .await
        .expect("Refresh failed");

    assert_eq!(validate_access_token(&token, &secret()).unwrap(), app.user.id);
    // Not rotated: the same refresh token keeps working
    assert!(app
        .service
        .refresh(&bearer(&session.refresh_token))
        .await
        .is_ok());
}

#[tokio::test]
async fn refresh_rejects_revoked_token() {
    let app = spawn_session().await;
    let session = app.service.login("user@x.com", "hello pass").await.unwrap();

    let mut record = app.store.refresh_token(&session.refresh_token).unwrap();
    record.revoked_at = Some(Utc::now());
    app.store.put_refresh_token(record);

    let err = app
        .service
        .refresh(&bearer(&session.refresh_token))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AuthError::Unauthenticated(Unauthenticated::RefreshTokenRevoked)
    ));
    assert_eq!(err.kind(), AuthErrorKind::CredentialInvalid);
}

#[tokio::test]
async fn refresh_rejects_expired_and_unknown_tokens() {
    let app = spawn_session().await;
    let session = app.service.login("user@x.com", "hello pass").await.unwrap();

    let mut record = app.store.refresh_token(&session.refresh_token).unwrap();
    record.expires_at = Utc::now() - Duration::seconds(1);
    app.store.put_refresh_token(record);

    let expired = app
        .service
        .refresh(&bearer(&session.refresh_token))
        .await
        .unwrap_err();
    let unknown = app
        .service
        .refresh(&bearer(&"0".repeat(64)))
        .await
        .unwrap_err();

    assert_eq!(expired.kind(), AuthErrorKind::CredentialInvalid);
    assert_eq!(unknown.kind(), AuthErrorKind::CredentialInvalid);
}

#[tokio::test]
async fn refresh_requires_bearer_header() {
    let app = spawn_session().await;

    let err = app.service.refresh(&HeaderMap::new()).await.unwrap_err();

    assert!(matches!(
        err,
        AuthError::Credential(CredentialError::MissingHeader(_))
    ));
}

#[tokio::test]
async fn revoke_makes_later_refresh_fail() {
    let app = spawn_session().await;
    let session = app.service.login("user@x.com", "hello pass").await.unwrap();

    app.service
        .revoke(&bearer(&session.refresh_token))
        .await
        .expect("Revoke should succeed");

    assert!(app
        .store
        .refresh_token(&session.refresh_token)
        .unwrap()
        .revoked_at
        .is_some());
    let err = app
        .service
        .refresh(&bearer(&session.refresh_token))
        .await
        .unwrap_err();
    assert!(err.is_unauthenticated());
}

#[tokio::test]
async fn revoke_of_unknown_or_revoked_token_still_succeeds() {
    let app = spawn_session().await;
    let session = app.service.login("user@x.com", "hello pass").await.unwrap();

    assert!(app.service.revoke(&bearer("does-not-exist")).await.is_ok());
    assert!(app.service.revoke(&bearer(&session.refresh_token)).await.is_ok());
    assert!(app.service.revoke(&bearer(&session.refresh_token)).await.is_ok());
}

/// Stores users normally but cannot persist refresh tokens
struct BrokenRefreshStore {
    inner: MemoryStore,
}

#[async_trait]
impl RefreshTokenStore for BrokenRefreshStore {
    async fn create_refresh_token(&self, _record: &RefreshTokenRecord) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection reset".to_string()))
    }

    async fn get_refresh_token_status(
        &self,
        token: &str,
    ) -> Result<Option<RefreshTokenStatus>, StoreError> {
        self.inner.get_refresh_token_status(token).await
    }

    async fn revoke_refresh_token(&self, token: &str) -> Result<(), StoreError> {
        self.inner.revoke_refresh_token(token).await
    }

    async fn delete_all_credentials(&self) -> Result<(), StoreError> {
        self.inner.delete_all_credentials().await
    }
}

#[tokio::test]
async fn login_fails_when_refresh_token_cannot_be_stored() {
    let users = Arc::new(MemoryStore::new());
    let digest = hash_password("hello pass").unwrap();
    users.create_user("user@x.com", &digest).await.unwrap();
    let refresh_tokens = Arc::new(BrokenRefreshStore {
        inner: MemoryStore::new(),
    });
    let service = AuthSessionService::new(users, refresh_tokens, settings());

    let err = service.login("user@x.com", "hello pass").await.unwrap_err();

    assert!(matches!(err, AuthError::Store(StoreError::Unavailable(_))));
    assert_eq!(err.kind(), AuthErrorKind::ResourceFailure);
}
