use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tracing::{info, instrument};

use super::parse_body;
use crate::{error::ApiError, models::SettingsPatch, state::AppState};

const LABEL: &str = "Club settings";

pub fn routes() -> Router<AppState> {
    Router::new().route("/club-settings", get(fetch).put(upsert))
}

/// The settings object, or `{}` before anything has been saved.
#[instrument(skip(state))]
pub async fn fetch(State(state): State<AppState>) -> Result<Response, ApiError> {
    let settings = state
        .store
        .club_settings()
        .await
        .map_err(|e| ApiError::from_repo(e, LABEL, "fetch club settings"))?;
    Ok(match settings {
        Some(settings) => Json(settings).into_response(),
        None => Json(json!({})).into_response(),
    })
}

#[instrument(skip(state, payload))]
pub async fn upsert(
    State(state): State<AppState>,
    payload: Result<Json<SettingsPatch>, JsonRejection>,
) -> Result<Response, ApiError> {
    let patch = parse_body(payload)?;
    let settings = state
        .store
        .upsert_club_settings(patch)
        .await
        .map_err(|e| ApiError::from_repo(e, LABEL, "update club settings"))?;
    info!(id = %settings.id, "club settings saved");
    Ok(Json(settings).into_response())
}
