/// Authentication module
///
/// Password hashing, JWT access tokens, opaque refresh tokens, credential
/// extraction, and the session service that ties them together.

mod claims;
mod error;
mod extract;
mod jwt;
mod password;
mod refresh_token;
mod secret;
mod session;

pub use claims::{Claims, ISSUER};
pub use error::{AuthError, AuthErrorKind, Unauthenticated};
pub use extract::{extract_api_key, extract_bearer, AuthScheme, CredentialError};
pub use jwt::{
    default_access_token_ttl, generate_access_token, generate_access_token_at,
    validate_access_token, validate_access_token_at, TokenError,
    DEFAULT_ACCESS_TOKEN_TTL_SECONDS,
};
pub use password::{hash_password, verify_password, PasswordError};
pub use refresh_token::{
    generate_refresh_token, EntropyError, RefreshTokenRecord, RefreshTokenState,
    RefreshTokenStatus, REFRESH_TOKEN_LIFETIME_DAYS,
};
pub use secret::{ApiKey, SigningSecret};
pub use session::{AuthSessionService, LoginSession, SessionSettings, DEFAULT_STORE_TIMEOUT_MS};
