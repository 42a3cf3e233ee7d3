use crate::auth::extract::CredentialError;
use crate::auth::jwt::TokenError;
use crate::store::StoreError;

/// Why a caller was refused. Logged, never shown to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Unauthenticated {
    #[error("incorrect email or password")]
    InvalidCredentials,
    #[error("access token rejected: {0}")]
    AccessToken(TokenError),
    #[error("refresh token not found")]
    RefreshTokenUnknown,
    #[error("refresh token revoked")]
    RefreshTokenRevoked,
    #[error("refresh token expired")]
    RefreshTokenExpired,
    #[error("api key does not match")]
    ApiKeyMismatch,
}

/// Errors of the session service
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("unauthenticated: {0}")]
    Unauthenticated(Unauthenticated),
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error("secure random source failed: {0}")]
    Entropy(String),
    #[error("access token signing failed: {0}")]
    Signing(String),
    #[error(transparent)]
    Store(StoreError),
}

/// Coarse error classes used to pick a response at the HTTP boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    CredentialInvalid,
    MalformedInput,
    ResourceFailure,
    ConfigurationFault,
}

impl AuthError {
    pub fn kind(&self) -> AuthErrorKind {
        match self {
            AuthError::Unauthenticated(Unauthenticated::AccessToken(
                TokenError::MalformedToken | TokenError::InvalidSubject,
            )) => AuthErrorKind::MalformedInput,
            AuthError::Unauthenticated(_) => AuthErrorKind::CredentialInvalid,
            AuthError::Credential(_) => AuthErrorKind::MalformedInput,
            AuthError::Signing(_) => AuthErrorKind::ConfigurationFault,
            AuthError::Hashing(_) | AuthError::Entropy(_) | AuthError::Store(_) => {
                AuthErrorKind::ResourceFailure
            }
        }
    }

    /// True for every failure that must surface as 401
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self.kind(),
            AuthErrorKind::CredentialInvalid | AuthErrorKind::MalformedInput
        )
    }
}
