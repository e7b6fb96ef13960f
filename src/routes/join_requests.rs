use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{post, put},
    Json, Router,
};
use serde::Deserialize;
use tracing::{info, instrument};

use super::{crud, parse_body, parse_id};
use crate::{
    error::ApiError,
    models::{Approval, JoinRequest, JoinStatus, Validate},
    repo::Entity,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    crud::routes::<JoinRequest>("/join-requests")
        .route("/join-requests/:id/status", put(set_status))
        .route("/join-requests/:id/approve", post(approve))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: JoinStatus,
}

impl Validate for StatusUpdate {}

#[instrument(skip(state, payload))]
pub async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<StatusUpdate>, JsonRejection>,
) -> Result<Json<JoinRequest>, ApiError> {
    let id = parse_id(&id, JoinRequest::LABEL)?;
    let StatusUpdate { status } = parse_body(payload)?;
    let request = state
        .store
        .set_join_request_status(id, status)
        .await
        .map_err(|e| ApiError::from_repo(e, JoinRequest::LABEL, "update join request status"))?;
    info!(status = status.as_str(), "join request status set");
    Ok(Json(request))
}

/// Flips the request to approved and creates the member in one transaction.
#[instrument(skip(state))]
pub async fn approve(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Approval>, ApiError> {
    let id = parse_id(&id, JoinRequest::LABEL)?;
    let approval = state
        .store
        .approve_join_request(id)
        .await
        .map_err(|e| ApiError::from_repo(e, JoinRequest::LABEL, "approve join request"))?;
    info!(member_id = %approval.member.id, "join request approved");
    Ok(Json(approval))
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, Router};
    use serde_json::{json, Value};
    use uuid::Uuid;

    use crate::test_util::{send, test_app};

    async fn submit(app: &Router, study_year: &str) -> Value {
        let (status, body) = send(
            app,
            "POST",
            "/api/join-requests",
            Some(json!({
                "fullName": "Grace Hopper",
                "email": "grace@example.com",
                "phone": "0600000000",
                "fieldOfStudy": "Compilers",
                "studyYear": study_year,
                "motivation": "COBOL"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }

    #[tokio::test]
    async fn new_requests_are_pending() {
        let app = test_app();
        let request = submit(&app, "3").await;
        assert_eq!(request["status"], "pending");
    }

    #[tokio::test]
    async fn set_status_to_approved() {
        let app = test_app();
        let request = submit(&app, "3").await;
        let id = request["id"].as_str().unwrap();

        let (status, body) = send(
            &app,
            "PUT",
            &format!("/api/join-requests/{id}/status"),
            Some(json!({ "status": "approved" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "approved");
        assert_eq!(body["fullName"], "Grace Hopper");
    }

    #[tokio::test]
    async fn set_status_on_missing_request() {
        let app = test_app();
        let (status, body) = send(
            &app,
            "PUT",
            &format!("/api/join-requests/{}/status", Uuid::new_v4()),
            Some(json!({ "status": "approved" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Join request not found");
    }

    #[tokio::test]
    async fn unknown_status_is_bad_request() {
        let app = test_app();
        let request = submit(&app, "3").await;
        let id = request["id"].as_str().unwrap();

        let (status, _) = send(
            &app,
            "PUT",
            &format!("/api/join-requests/{id}/status"),
            Some(json!({ "status": "rejected" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn approval_creates_one_member() {
        let app = test_app();
        let request = submit(&app, " 2 ").await;
        let id = request["id"].as_str().unwrap();
        let uri = format!("/api/join-requests/{id}/approve");

        let (status, body) = send(&app, "POST", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["joinRequest"]["status"], "approved");
        assert_eq!(body["member"]["fullName"], "Grace Hopper");
        assert_eq!(body["member"]["specialty"], "Compilers");
        assert_eq!(body["member"]["studyYear"], 2);

        let (status, body) = send(&app, "POST", &uri, None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Join request already approved");

        let (_, members) = send(&app, "GET", "/api/members", None).await;
        assert_eq!(members.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn free_text_study_year_becomes_null() {
        let app = test_app();
        let request = submit(&app, "Master 1").await;
        let id = request["id"].as_str().unwrap();

        let (status, body) = send(&app, "POST", &format!("/api/join-requests/{id}/approve"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["member"]["studyYear"].is_null());
    }

    #[tokio::test]
    async fn approving_missing_request() {
        let app = test_app();
        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/join-requests/{}/approve", Uuid::new_v4()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, members) = send(&app, "GET", "/api/members", None).await;
        assert_eq!(members, json!([]));
    }

    #[tokio::test]
    async fn rejection_is_a_delete() {
        let app = test_app();
        let request = submit(&app, "1").await;
        let id = request["id"].as_str().unwrap();

        let (status, _) = send(&app, "DELETE", &format!("/api/join-requests/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, list) = send(&app, "GET", "/api/join-requests", None).await;
        assert_eq!(list, json!([]));
    }
}
