use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Serialize;
use tracing::{error, instrument};

use crate::{seed::seed_database, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/seed", post(run_seed))
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SeedResponse {
    Done { success: bool, message: &'static str },
    Failed { success: bool, error: String },
}

#[instrument(skip(state))]
pub async fn run_seed(State(state): State<AppState>) -> (StatusCode, Json<SeedResponse>) {
    match seed_database(&state.store, &state.config.seed).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(SeedResponse::Done {
                success: true,
                message: outcome.message(),
            }),
        ),
        Err(e) => {
            error!(error = ?e, "seed failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SeedResponse::Failed {
                    success: false,
                    error: "Failed to seed database".into(),
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::test_util::{send, test_app};

    #[tokio::test]
    async fn seed_endpoint_is_idempotent() {
        let app = test_app();
        let (status, body) = send(&app, "POST", "/api/seed", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true, "message": "Database seeded successfully" }));

        let (status, body) = send(&app, "POST", "/api/seed", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Database already seeded");

        let (_, founders) = send(&app, "GET", "/api/founders", None).await;
        assert_eq!(founders.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn seeded_admin_can_log_in() {
        let app = test_app();
        send(&app, "POST", "/api/seed", None).await;
        let (status, _) = send(
            &app,
            "POST",
            "/api/login",
            Some(json!({ "username": "admin", "password": "test-password" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
}
