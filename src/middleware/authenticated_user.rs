/// Authenticated caller extracted from `Authorization: Bearer <access token>`.
///
/// Add it as a handler argument to require a valid access token:
///
/// ```ignore
/// async fn handler(user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
///     tracing::info!(user_id = %user.user_id, "handling request");
///     Ok(HttpResponse::Ok().finish())
/// }
/// ```

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::auth::AuthSessionService;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = match req.app_data::<web::Data<AuthSessionService>>() {
            Some(session) => session
                .authenticate(req.headers())
                .map(|user_id| AuthenticatedUser { user_id })
                .map_err(AppError::from),
            None => Err(AppError::Internal(
                "session service is not registered".to_string(),
            )),
        };
        ready(result)
    }
}
