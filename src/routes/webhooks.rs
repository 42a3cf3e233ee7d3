/// Payment provider webhooks
///
/// Authenticated with `Authorization: ApiKey <key>`.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthSessionService;
use crate::error::AppError;
use crate::store::UserStore;

const USER_UPGRADED: &str = "user.upgraded";

#[derive(Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    #[serde(default)]
    pub data: WebhookData,
}

/// Only `user.upgraded` carries a user; other events may omit it
#[derive(Deserialize, Default)]
pub struct WebhookData {
    pub user_id: Option<Uuid>,
}

/// POST /api/polka/webhooks
///
/// `user.upgraded` marks the user as Chirpy Red; other events are
/// acknowledged and ignored.
///
/// # Errors
/// - 401: missing or wrong API key
/// - 400: unparsable payload
/// - 404: upgraded user missing from the payload or the store
pub async fn polka_webhook(
    req: HttpRequest,
    body: web::Bytes,
    session: web::Data<AuthSessionService>,
    users: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    session.authenticate_api_key(req.headers())?;

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("invalid webhook payload: {}", e)))?;

    if event.event != USER_UPGRADED {
        return Ok(HttpResponse::NoContent().finish());
    }

    let user_id = event.data.user_id.ok_or(AppError::NotFound("user"))?;
    if !users.upgrade_to_chirpy_red(user_id).await? {
        return Err(AppError::NotFound("user"));
    }

    tracing::info!(user_id = %user_id, "User upgraded to Chirpy Red");

    Ok(HttpResponse::NoContent().finish())
}
