//! The five handlers every entity shares: list, create, fetch, update, delete.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{info, instrument};

use super::{parse_body, parse_id};
use crate::{error::ApiError, models::Validate, repo::Entity, state::AppState};

pub fn routes<E>(path: &str) -> Router<AppState>
where
    E: Entity + Serialize,
    E::New: DeserializeOwned + Validate,
    E::Patch: DeserializeOwned + Validate,
{
    Router::new()
        .route(path, get(list::<E>).post(create::<E>))
        .route(
            &format!("{path}/:id"),
            get(fetch::<E>).put(update::<E>).delete(remove::<E>),
        )
}

fn failed<E: Entity>(verb: &str) -> String {
    format!("{verb} {}", E::LABEL.to_lowercase())
}

#[instrument(skip_all, fields(table = E::TABLE))]
pub async fn list<E>(State(state): State<AppState>) -> Result<Json<Vec<E>>, ApiError>
where
    E: Entity + Serialize,
{
    let rows = state
        .store
        .list::<E>()
        .await
        .map_err(|e| ApiError::from_repo(e, E::LABEL, &format!("fetch {}", E::PLURAL)))?;
    Ok(Json(rows))
}

#[instrument(skip_all, fields(table = E::TABLE, %id))]
pub async fn fetch<E>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<E>, ApiError>
where
    E: Entity + Serialize,
{
    let id = parse_id(&id, E::LABEL)?;
    let row = state
        .store
        .get::<E>(id)
        .await
        .map_err(|e| ApiError::from_repo(e, E::LABEL, &failed::<E>("fetch")))?;
    Ok(Json(row))
}

#[instrument(skip_all, fields(table = E::TABLE))]
pub async fn create<E>(
    State(state): State<AppState>,
    payload: Result<Json<E::New>, JsonRejection>,
) -> Result<(StatusCode, Json<E>), ApiError>
where
    E: Entity + Serialize,
    E::New: DeserializeOwned + Validate,
{
    let new = parse_body(payload)?;
    let row = state
        .store
        .create::<E>(new)
        .await
        .map_err(|e| ApiError::from_repo(e, E::LABEL, &failed::<E>("create")))?;
    info!(id = %row.id(), "created");
    Ok((StatusCode::CREATED, Json(row)))
}

#[instrument(skip_all, fields(table = E::TABLE, %id))]
pub async fn update<E>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<E::Patch>, JsonRejection>,
) -> Result<Json<E>, ApiError>
where
    E: Entity + Serialize,
    E::Patch: DeserializeOwned + Validate,
{
    let id = parse_id(&id, E::LABEL)?;
    let patch = parse_body(payload)?;
    let row = state
        .store
        .update::<E>(id, patch)
        .await
        .map_err(|e| ApiError::from_repo(e, E::LABEL, &failed::<E>("update")))?;
    Ok(Json(row))
}

#[instrument(skip_all, fields(table = E::TABLE, %id))]
pub async fn remove<E>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
    E: Entity,
{
    let id = parse_id(&id, E::LABEL)?;
    state
        .store
        .delete::<E>(id)
        .await
        .map_err(|e| ApiError::from_repo(e, E::LABEL, &failed::<E>("delete")))?;
    info!("deleted");
    Ok(StatusCode::NO_CONTENT)
}
