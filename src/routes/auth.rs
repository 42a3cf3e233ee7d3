/// Authentication Routes
///
/// Login, access-token refresh and refresh-token revocation.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthSessionService, LoginSession};
use crate::error::AppError;
use crate::routes::users::UserResponse;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub token: String,
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub token: String,
}

/// POST /api/login
///
/// Returns the user plus an access token and a refresh token.
///
/// # Errors
/// - 401: unknown e-mail or wrong password (same response for both)
/// - 500: the refresh token could not be stored
pub async fn login(
    form: web::Json<LoginRequest>,
    session: web::Data<AuthSessionService>,
) -> Result<HttpResponse, AppError> {
    let LoginSession {
        user,
        access_token,
        refresh_token,
    } = session.login(form.email.trim(), &form.password).await?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        user: UserResponse::from(&user),
        token: access_token,
        refresh_token,
    }))
}

/// POST /api/refresh
///
/// Expects `Authorization: Bearer <refresh token>`.
///
/// # Errors
/// - 401: missing, unknown, revoked or expired refresh token
pub async fn refresh(
    req: HttpRequest,
    session: web::Data<AuthSessionService>,
) -> Result<HttpResponse, AppError> {
    let token = session.refresh(req.headers()).await?;
    Ok(HttpResponse::Ok().json(RefreshResponse { token }))
}

/// POST /api/revoke
///
/// Expects `Authorization: Bearer <refresh token>`. Answers 204 whether or not
/// the token existed.
pub async fn revoke(
    req: HttpRequest,
    session: web::Data<AuthSessionService>,
) -> Result<HttpResponse, AppError> {
    session.revoke(req.headers()).await?;
    Ok(HttpResponse::NoContent().finish())
}
