/// Credential extraction from request headers
///
/// Parses `Authorization: <Scheme> <value>` into the raw credential string.
/// Nothing here checks whether the credential is any good.

use actix_web::http::header::{HeaderMap, AUTHORIZATION};
use std::fmt;

/// Authorization schemes understood by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    Bearer,
    ApiKey,
}

impl AuthScheme {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthScheme::Bearer => "Bearer",
            AuthScheme::ApiKey => "ApiKey",
        }
    }
}

impl fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("no authorization header found ({0})")]
    MissingHeader(AuthScheme),
    #[error("authorization header value is invalid ({0})")]
    MalformedHeader(AuthScheme),
    #[error("authorization scheme is not {0}")]
    WrongScheme(AuthScheme),
}

/// Extract the token from `Authorization: Bearer <token>`
pub fn extract_bearer(headers: &HeaderMap) -> Result<String, CredentialError> {
    extract_credential(headers, AuthScheme::Bearer)
}

/// Extract the key from `Authorization: ApiKey <key>`
pub fn extract_api_key(headers: &HeaderMap) -> Result<String, CredentialError> {
    extract_credential(headers, AuthScheme::ApiKey)
}

fn extract_credential(headers: &HeaderMap, scheme: AuthScheme) -> Result<String, CredentialError> {
    let mut values = headers.get_all(AUTHORIZATION);
    let value = match (values.next(), values.next()) {
        (None, _) => return Err(CredentialError::MissingHeader(scheme)),
        (Some(_), Some(_)) => return Err(CredentialError::MalformedHeader(scheme)),
        (Some(value), None) => value,
    };

    let value = value
        .to_str()
        .map_err(|_| CredentialError::MalformedHeader(scheme))?;
    if value.is_empty() {
        return Err(CredentialError::MissingHeader(scheme));
    }

    let parts: Vec<&str> = value.split(' ').collect();
    if parts.len() != 2 || parts[1].is_empty() {
        return Err(CredentialError::MalformedHeader(scheme));
    }
    if parts[0] != scheme.as_str() {
        return Err(CredentialError::WrongScheme(scheme));
    }

    Ok(parts[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::HeaderValue;

    fn headers_with(values: &[&'static str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for value in values {
            headers.append(AUTHORIZATION, HeaderValue::from_static(value));
        }
        headers
    }

    #[test]
    fn test_extract_bearer() {
        let headers = headers_with(&["Bearer ABC123"]);
        assert_eq!(extract_bearer(&headers).unwrap(), "ABC123");
    }

    #[test]
    fn test_missing_header() {
        let headers = HeaderMap::new();
        assert_eq!(
            extract_bearer(&headers),
            Err(CredentialError::MissingHeader(AuthScheme::Bearer))
        );
        assert_eq!(
            extract_bearer(&headers_with(&[""])),
            Err(CredentialError::MissingHeader(AuthScheme::Bearer))
        );
    }

    #[test]
    fn test_wrong_scheme() {
        let headers = headers_with(&["Token X"]);
        assert_eq!(
            extract_bearer(&headers),
            Err(CredentialError::WrongScheme(AuthScheme::Bearer))
        );
        // Scheme match is exact
        assert_eq!(
            extract_bearer(&headers_with(&["bearer X"])),
            Err(CredentialError::WrongScheme(AuthScheme::Bearer))
        );
    }

    #[test]
    fn test_malformed_header() {
        let cases = ["Bearer", "Bearer a b", "Bearer  ABC", "Bearer "];
        for case in cases {
            assert_eq!(
                extract_bearer(&headers_with(&[case])),
                Err(CredentialError::MalformedHeader(AuthScheme::Bearer)),
                "Should reject header: {:?}",
                case
            );
        }
    }

    #[test]
    fn test_duplicate_authorization_headers() {
        let headers = headers_with(&["Bearer A", "Bearer B"]);
        assert_eq!(
            extract_bearer(&headers),
            Err(CredentialError::MalformedHeader(AuthScheme::Bearer))
        );
    }

    #[test]
    fn test_extract_api_key() {
        let headers = headers_with(&["ApiKey f271c81ff7084ee5b99a5091b42d486e"]);
        assert_eq!(
            extract_api_key(&headers).unwrap(),
            "f271c81ff7084ee5b99a5091b42d486e"
        );
        assert_eq!(
            extract_api_key(&headers_with(&["Bearer abc"])),
            Err(CredentialError::WrongScheme(AuthScheme::ApiKey))
        );
        assert_eq!(
            extract_api_key(&HeaderMap::new()),
            Err(CredentialError::MissingHeader(AuthScheme::ApiKey))
        );
    }
}
