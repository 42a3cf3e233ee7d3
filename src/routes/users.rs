/// User Routes
///
/// Account creation and self-service updates.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthSessionService;
use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::store::{UserRecord, UserStore};
use crate::validators::{is_valid_email, is_valid_password};

#[derive(Deserialize)]
pub struct UserRequest {
    pub email: String,
    pub password: String,
}

/// Public view of a user; never includes the password digest
#[derive(Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    pub is_chirpy_red: bool,
}

impl From<&UserRecord> for UserResponse {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            created_at: user.created_at,
            updated_at: user.updated_at,
            email: user.email.clone(),
            is_chirpy_red: user.is_chirpy_red,
        }
    }
}

/// POST /api/users
///
/// # Errors
/// - 400: invalid e-mail or empty password
/// - 409: e-mail already registered
pub async fn create_user(
    form: web::Json<UserRequest>,
    session: web::Data<AuthSessionService>,
    users: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    let email = is_valid_email(&form.email)?;
    is_valid_password(&form.password)?;

    let hashed_password = session.hash_password(&form.password).await?;
    let user = users.create_user(&email, &hashed_password).await?;

    tracing::info!(user_id = %user.id, "User created");

    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}

/// PUT /api/users
///
/// Replaces the caller's e-mail and password. Requires a bearer access token.
pub async fn update_user(
    caller: AuthenticatedUser,
    form: web::Json<UserRequest>,
    session: web::Data<AuthSessionService>,
    users: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    let email = is_valid_email(&form.email)?;
    is_valid_password(&form.password)?;

    let hashed_password = session.hash_password(&form.password).await?;
    let user = users
        .update_user(caller.user_id, &email, &hashed_password)
        .await?;

    tracing::info!(user_id = %user.id, "User updated");

    Ok(HttpResponse::Ok().json(UserResponse::from(&user)))
}
