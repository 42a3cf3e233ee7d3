/// JWT Token Generation and Validation
///
/// Access tokens are HS256-signed compact JWTs (`header.payload.signature`).
/// Validation is local and stateless: signature, then `exp`/`iat` against the
/// supplied clock, then the subject.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::{Claims, ISSUER};
use crate::auth::secret::SigningSecret;

/// Lifetime used when the caller does not configure one
pub const DEFAULT_ACCESS_TOKEN_TTL_SECONDS: i64 = 3600;

pub fn default_access_token_ttl() -> Duration {
    Duration::seconds(DEFAULT_ACCESS_TOKEN_TTL_SECONDS)
}

/// Reasons an access token is refused (or could not be produced)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token signature does not verify")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("token is malformed")]
    MalformedToken,
    #[error("token subject is not a valid user id")]
    InvalidSubject,
    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Generate a new access token for a user, valid for `ttl` from now
pub fn generate_access_token(
    user_id: Uuid,
    secret: &SigningSecret,
    ttl: Duration,
) -> Result<String, TokenError> {
    generate_access_token_at(user_id, secret, ttl, Utc::now())
}

/// Same as [`generate_access_token`] with an explicit clock value
///
/// Identical inputs produce byte-identical tokens.
pub fn generate_access_token_at(
    user_id: Uuid,
    secret: &SigningSecret,
    ttl: Duration,
    now: DateTime<Utc>,
) -> Result<String, TokenError> {
    let claims = Claims::new(user_id, now, ttl);

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| TokenError::Signing(e.to_string()))
}

/// Validate an access token and return the user it was issued to
///
/// # Errors
/// `InvalidSignature`, `Expired`, `MalformedToken` or `InvalidSubject`
pub fn validate_access_token(token: &str, secret: &SigningSecret) -> Result<Uuid, TokenError> {
    validate_access_token_at(token, secret, Utc::now())
}

/// Same as [`validate_access_token`] with an explicit clock value
pub fn validate_access_token_at(
    token: &str,
    secret: &SigningSecret,
    now: DateTime<Utc>,
) -> Result<Uuid, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);
    // Time checks run below against `now`, not the library's own clock
    validation.validate_exp = false;
    validation.leeway = 0;

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::MalformedToken,
    })?;

    if claims.is_expired_at(now) {
        return Err(TokenError::Expired);
    }
    if claims.is_issued_after(now) {
        return Err(TokenError::MalformedToken);
    }

    claims.user_id().map_err(|_| TokenError::InvalidSubject)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_secret() -> SigningSecret {
        SigningSecret::new("test-secret-key-at-least-32-characters-long").unwrap()
    }

    #[test]
    fn test_generate_and_validate_token() {
        let secret = test_secret();
        let user_id = Uuid::new_v4();

        let token = generate_access_token(user_id, &secret, default_access_token_ttl())
            .expect("Failed to generate token");
        let validated = validate_access_token(&token, &secret).expect("Failed to validate token");

        assert_eq!(validated, user_id);
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_token_is_deterministic_for_fixed_clock() {
        let secret = test_secret();
        let user_id = Uuid::new_v4();
        let now = Utc::now();

        let first = generate_access_token_at(user_id, &secret, Duration::hours(1), now).unwrap();
        let second = generate_access_token_at(user_id, &secret, Duration::hours(1), now).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_token_expires_after_ttl() {
        let secret = test_secret();
        let issued = Utc::now();
        let token =
            generate_access_token_at(Uuid::new_v4(), &secret, Duration::seconds(5), issued).unwrap();

        assert!(validate_access_token_at(&token, &secret, issued + Duration::seconds(4)).is_ok());
        assert_eq!(
            validate_access_token_at(&token, &secret, issued + Duration::seconds(5)),
            Err(TokenError::Expired)
        );
        assert_eq!(
            validate_access_token_at(&token, &secret, issued + Duration::hours(2)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_already_expired_token() {
        let secret = test_secret();
        let token =
            generate_access_token(Uuid::new_v4(), &secret, Duration::seconds(-1)).unwrap();

        assert_eq!(validate_access_token(&token, &secret), Err(TokenError::Expired));
    }

    #[test]
    fn test_wrong_secret() {
        let token = generate_access_token(Uuid::new_v4(), &test_secret(), Duration::hours(1))
            .expect("Failed to generate token");
        let other = SigningSecret::new("a-completely-different-signing-secret").unwrap();

        assert_eq!(
            validate_access_token(&token, &other),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_invalid_token() {
        let secret = test_secret();

        assert_eq!(
            validate_access_token("invalid.token.here", &secret),
            Err(TokenError::MalformedToken)
        );
        assert_eq!(
            validate_access_token("", &secret),
            Err(TokenError::MalformedToken)
        );
    }

    #[test]
    fn test_tampered_token() {
        let secret = test_secret();
        let token = generate_access_token(Uuid::new_v4(), &secret, Duration::hours(1))
            .expect("Failed to generate token");

        // Someone else's payload under this token's signature
        let forged = generate_access_token(Uuid::new_v4(), &secret, Duration::hours(1)).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged.split('.').collect();
        let tampered = format!("{}.{}.{}", parts[0], forged_parts[1], parts[2]);

        assert_eq!(
            validate_access_token(&tampered, &secret),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_token_from_the_future_is_rejected() {
        let secret = test_secret();
        let now = Utc::now();
        let token = generate_access_token_at(
            Uuid::new_v4(),
            &secret,
            Duration::hours(1),
            now + Duration::minutes(10),
        )
        .unwrap();

        assert_eq!(
            validate_access_token_at(&token, &secret, now),
            Err(TokenError::MalformedToken)
        );
    }

    #[test]
    fn test_non_uuid_subject() {
        let secret = test_secret();
        let now = Utc::now();
        let claims = Claims {
            iss: ISSUER.to_string(),
            sub: "not-a-uuid".to_string(),
            iat: now.timestamp(),
            exp: now.timestamp() + 60,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        assert_eq!(
            validate_access_token_at(&token, &secret, now),
            Err(TokenError::InvalidSubject)
        );
    }

    #[test]
    fn test_accepts_token_signed_by_another_chirpy_service() {
        let secret = test_secret();
        let now = Utc::now();
        let user_id = Uuid::new_v4();
        let claims = Claims {
            iss: "Chirpy".to_string(),
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: now.timestamp() + 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        assert_eq!(validate_access_token_at(&token, &secret, now), Ok(user_id));
    }

    #[test]
    fn test_wrong_issuer() {
        let secret = test_secret();
        let now = Utc::now();
        let claims = Claims {
            iss: "someone-else".to_string(),
            sub: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: now.timestamp() + 60,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        assert_eq!(
            validate_access_token_at(&token, &secret, now),
            Err(TokenError::MalformedToken)
        );
    }
}
