/// Chirp Routes
///
/// Creating, listing, reading and deleting chirps.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::store::{ChirpStore, NewChirp};
use crate::validators::clean_chirp_body;

#[derive(Deserialize)]
pub struct ChirpRequest {
    pub body: String,
}

#[derive(Deserialize)]
pub struct ListChirpsQuery {
    pub author_id: Option<String>,
    pub sort: Option<String>,
}

/// POST /api/chirps
///
/// # Errors
/// - 400: longer than 140 characters
/// - 401: missing or invalid access token
pub async fn create_chirp(
    caller: AuthenticatedUser,
    form: web::Json<ChirpRequest>,
    chirps: web::Data<dyn ChirpStore>,
) -> Result<HttpResponse, AppError> {
    let body = clean_chirp_body(&form.body)?;

    let chirp = chirps
        .create_chirp(NewChirp {
            body,
            user_id: caller.user_id,
        })
        .await?;

    tracing::info!(chirp_id = %chirp.id, user_id = %caller.user_id, "Chirp created");

    Ok(HttpResponse::Created().json(chirp))
}

/// GET /api/chirps?author_id=<uuid>&sort=asc|desc
///
/// Oldest first unless `sort=desc`. An unparsable `author_id` is ignored.
pub async fn list_chirps(
    query: web::Query<ListChirpsQuery>,
    chirps: web::Data<dyn ChirpStore>,
) -> Result<HttpResponse, AppError> {
    let author_id = query
        .author_id
        .as_deref()
        .and_then(|id| Uuid::parse_str(id).ok());

    let mut chirps = chirps.list_chirps(author_id).await?;
    if query.sort.as_deref() == Some("desc") {
        chirps.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }

    Ok(HttpResponse::Ok().json(chirps))
}

/// GET /api/chirps/{chirp_id}
pub async fn get_chirp(
    path: web::Path<String>,
    chirps: web::Data<dyn ChirpStore>,
) -> Result<HttpResponse, AppError> {
    let chirp_id = Uuid::parse_str(&path).map_err(|_| {
        AppError::BadRequest("Please make sure the chirp ID is of type UUID".to_string())
    })?;

    let chirp = chirps
        .get_chirp(chirp_id)
        .await?
        .ok_or(AppError::NotFound("chirp"))?;

    Ok(HttpResponse::Ok().json(chirp))
}

/// DELETE /api/chirps/{chirp_id}
///
/// Only the author may delete a chirp.
///
/// # Errors
/// - 401: missing or invalid access token
/// - 403: not the author, or not a chirp ID
/// - 404: no such chirp
pub async fn delete_chirp(
    caller: AuthenticatedUser,
    path: web::Path<String>,
    chirps: web::Data<dyn ChirpStore>,
) -> Result<HttpResponse, AppError> {
    let chirp_id = Uuid::parse_str(&path).map_err(|_| AppError::Forbidden)?;

    let chirp = chirps
        .get_chirp(chirp_id)
        .await?
        .ok_or(AppError::NotFound("chirp"))?;

    if chirp.user_id != caller.user_id {
        tracing::warn!(
            chirp_id = %chirp.id,
            user_id = %caller.user_id,
            "Attempt to delete another user's chirp"
        );
        return Err(AppError::Forbidden);
    }

    chirps.delete_chirp(chirp.id).await?;

    Ok(HttpResponse::NoContent().finish())
}
