/// Password Hashing and Verification
///
/// One-way bcrypt hashing with the library's default cost. The salt and cost
/// are embedded in the digest, so verification needs nothing but the digest.

use bcrypt::{hash, verify, DEFAULT_COST};

/// Failures of the credential hasher
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// The hashing primitive itself failed (entropy or resource exhaustion)
    #[error("password hashing failed: {0}")]
    HashingFailure(String),
    /// Wrong password, or a digest that could not be decoded
    #[error("password does not match")]
    Mismatch,
}

/// Hash a password using bcrypt
///
/// # Errors
/// Returns `HashingFailure` only if bcrypt cannot produce a digest
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    hash(password, DEFAULT_COST).map_err(|e| PasswordError::HashingFailure(e.to_string()))
}

/// Verify a password against its bcrypt digest
///
/// A malformed digest and a wrong password both yield `Mismatch`; callers
/// cannot tell them apart.
pub fn verify_password(password: &str, digest: &str) -> Result<(), PasswordError> {
    match verify(password, digest) {
        Ok(true) => Ok(()),
        Ok(false) | Err(_) => Err(PasswordError::Mismatch),
    }
}
