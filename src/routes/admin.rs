/// Admin Routes
///
/// File-server hit metrics and the development reset.

use actix_web::{web, HttpResponse};

use crate::auth::AuthSessionService;
use crate::configuration::ApplicationSettings;
use crate::error::AppError;
use crate::metrics::HitCounter;

/// GET /admin/metrics
pub async fn metrics(hits: web::Data<HitCounter>) -> HttpResponse {
    let body = format!(
        "<html><body><h1>Welcome, Chirpy Admin</h1><p>Chirpy has been visited {} times!</p></body></html>",
        hits.get()
    );
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

/// POST /admin/reset
///
/// Development only: zeroes the hit counter and deletes every user along with
/// their chirps and refresh tokens.
pub async fn reset(
    application: web::Data<ApplicationSettings>,
    hits: web::Data<HitCounter>,
    session: web::Data<AuthSessionService>,
) -> Result<HttpResponse, AppError> {
    if !application.is_dev() {
        return Err(AppError::Forbidden);
    }

    hits.reset();
    session.reset_credentials().await?;

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("OK"))
}
