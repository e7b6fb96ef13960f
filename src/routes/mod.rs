pub mod club_settings;
pub mod crud;
pub mod join_requests;
pub mod seed;

use axum::{extract::rejection::JsonRejection, Json, Router};
use uuid::Uuid;

use crate::{
    auth,
    error::ApiError,
    models::{Administration, ContactMessage, Founder, Member, Project, Validate},
    state::AppState,
};

/// Everything served under `/api`.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(crud::routes::<Founder>("/founders"))
        .merge(crud::routes::<Administration>("/administration"))
        .merge(crud::routes::<Member>("/members"))
        .merge(crud::routes::<Project>("/projects"))
        .merge(crud::routes::<ContactMessage>("/contact-messages"))
        .merge(join_requests::routes())
        .merge(club_settings::routes())
        .merge(auth::router())
        .merge(seed::routes())
}

/// Malformed JSON, wrong field types and missing required fields all become 400.
pub(crate) fn parse_body<T: Validate>(
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::BadRequest(format!("Invalid data: {}", e.body_text())))?;
    body.validate().map_err(ApiError::BadRequest)?;
    Ok(body)
}

/// Ids are opaque to clients; anything that is not one of ours cannot exist.
pub(crate) fn parse_id(raw: &str, label: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(format!("{label} not found")))
}
