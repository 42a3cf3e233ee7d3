/// Application error handling
///
/// Every handler returns `Result<_, AppError>`. The response body is always
/// `{"error": "<message>"}` with a message safe to show a client; the
/// underlying cause is logged under an error id and never returned.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};

use crate::auth::{AuthError, AuthErrorKind, Unauthenticated};
use crate::store::StoreError;

/// Input validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is empty")]
    EmptyField(&'static str),
    #[error("{0} is too long (maximum {1} characters)")]
    TooLong(&'static str, usize),
    #[error("{0} has invalid format")]
    InvalidFormat(&'static str),
    #[error("Chirp is too long")]
    ChirpTooLong,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("forbidden")]
    Forbidden,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl AppError {
    /// Message returned to the client
    fn public_message(&self) -> String {
        match self {
            AppError::Auth(AuthError::Unauthenticated(Unauthenticated::InvalidCredentials)) => {
                "Incorrect email or password".to_string()
            }
            AppError::Auth(e) if e.is_unauthenticated() => "Unauthorized".to_string(),
            AppError::Store(StoreError::Conflict(_)) => "Already exists".to_string(),
            AppError::Store(StoreError::NotFound) | AppError::NotFound(_) => {
                "Not found".to_string()
            }
            AppError::Validation(e) => e.to_string(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Forbidden => "Forbidden".to_string(),
            _ => "Something went wrong".to_string(),
        }
    }

    fn log_error(&self, error_id: &str) {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error_id = error_id, error = %self, "Request failed");
        } else if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(error_id = error_id, error = %self, "Authentication failed");
        } else {
            tracing::debug!(error_id = error_id, error = %self, "Request rejected");
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Auth(e) => match e.kind() {
                AuthErrorKind::CredentialInvalid | AuthErrorKind::MalformedInput => {
                    StatusCode::UNAUTHORIZED
                }
                AuthErrorKind::ResourceFailure => match e {
                    AuthError::Store(StoreError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                },
                AuthErrorKind::ConfigurationFault => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Store(e) => match e {
                StoreError::NotFound => StatusCode::NOT_FOUND,
                StoreError::Conflict(_) => StatusCode::CONFLICT,
                StoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                StoreError::Query(_) | StoreError::Timeout => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_id = uuid::Uuid::new_v4().to_string();
        self.log_error(&error_id);

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.public_message(),
        })
    }
}
