use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::{
    auth::password::{check_credentials, hash_password, MIN_PASSWORD_LEN},
    error::{ApiError, RepoError},
    models::{NewUser, User, UserPatch, Validate},
    repo::Entity,
    routes::{crud, parse_body, parse_id},
    state::AppState,
};

pub fn login_routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(crud::list::<User>).post(create_user))
        .route(
            "/users/:id",
            get(crud::fetch::<User>)
                .put(update_user)
                .delete(crud::remove::<User>),
        )
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
}

impl Validate for CreateUserRequest {
    fn validate(&self) -> Result<(), String> {
        check_username(&self.username)?;
        check_password(&self.password)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Validate for UpdateUserRequest {
    fn validate(&self) -> Result<(), String> {
        if let Some(username) = &self.username {
            check_username(username)?;
        }
        match &self.password {
            Some(password) => check_password(password),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserCreated {
    pub success: bool,
    pub user: User,
}

fn check_username(username: &str) -> Result<(), String> {
    if username.trim().is_empty() {
        return Err("Username is required".into());
    }
    Ok(())
}

fn check_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        ));
    }
    Ok(())
}

fn credentials_required() -> ApiError {
    ApiError::BadRequest("Username and password are required".into())
}

fn invalid_credentials() -> ApiError {
    ApiError::Unauthorized("Invalid credentials".into())
}

/// Any unique violation on `users` is the username.
fn user_error(err: RepoError, action: &str) -> ApiError {
    match err {
        RepoError::Conflict(_) => ApiError::Conflict("Username already exists".into()),
        other => ApiError::from_repo(other, User::LABEL, action),
    }
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(payload) = payload.map_err(|_| credentials_required())?;
    let (username, password) = match (payload.username, payload.password) {
        (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => (u, p),
        _ => return Err(credentials_required()),
    };

    let user = state
        .store
        .find_user_by_username(&username)
        .await
        .map_err(|e| ApiError::from_repo(e, User::LABEL, "log in"))?;
    let ok = check_credentials(&password, user.as_ref().map(|u| u.password_hash.as_str()))
        .map_err(|e| ApiError::internal("Failed to log in", e))?;
    let user = match user {
        Some(user) if ok => user,
        Some(user) => {
            warn!(%username, user_id = %user.id, "login invalid password");
            return Err(invalid_credentials());
        }
        None => {
            warn!(%username, "login unknown username");
            return Err(invalid_credentials());
        }
    };

    info!(user_id = %user.id, %username, "user logged in");
    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful",
    }))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserCreated>), ApiError> {
    let payload = parse_body(payload)?;
    let password_hash = hash_password(&payload.password)
        .map_err(|e| ApiError::internal("Failed to create user", e))?;

    let user = state
        .store
        .create::<User>(NewUser {
            username: payload.username,
            password_hash,
        })
        .await
        .map_err(|e| user_error(e, "create user"))?;

    info!(user_id = %user.id, username = %user.username, "user created");
    Ok((
        StatusCode::CREATED,
        Json(UserCreated {
            success: true,
            user,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let id = parse_id(&id, User::LABEL)?;
    let payload = parse_body(payload)?;
    let password_hash = payload
        .password
        .as_deref()
        .map(hash_password)
        .transpose()
        .map_err(|e| ApiError::internal("Failed to update user", e))?;

    let user = state
        .store
        .update::<User>(
            id,
            UserPatch {
                username: payload.username,
                password_hash,
            },
        )
        .await
        .map_err(|e| user_error(e, "update user"))?;

    info!(user_id = %user.id, "user updated");
    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::test_util::{send, test_app};

    async fn with_admin() -> axum::Router {
        let app = test_app();
        let (status, _) = send(
            &app,
            "POST",
            "/api/users",
            Some(json!({ "username": "admin", "password": "masters-admin" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        app
    }

    #[tokio::test]
    async fn login_with_correct_credentials() {
        let app = with_admin().await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/login",
            Some(json!({ "username": "admin", "password": "masters-admin" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true, "message": "Login successful" }));
    }

    #[tokio::test]
    async fn login_with_wrong_password_or_user() {
        let app = with_admin().await;
        for creds in [
            json!({ "username": "admin", "password": "wrong-password" }),
            json!({ "username": "ghost", "password": "masters-admin" }),
        ] {
            let (status, body) = send(&app, "POST", "/api/login", Some(creds)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body["error"], "Invalid credentials");
        }
    }

    #[tokio::test]
    async fn login_requires_both_fields() {
        let app = with_admin().await;
        for creds in [
            json!({ "username": "admin" }),
            json!({ "password": "masters-admin" }),
            json!({ "username": "", "password": "masters-admin" }),
            json!({}),
        ] {
            let (status, body) = send(&app, "POST", "/api/login", Some(creds)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "Username and password are required");
        }
    }

    #[tokio::test]
    async fn created_user_hides_password() {
        let app = test_app();
        let (status, body) = send(
            &app,
            "POST",
            "/api/users",
            Some(json!({ "username": "editor", "password": "long-enough" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert_eq!(body["user"]["username"], "editor");
        assert!(body["user"].get("passwordHash").is_none());
        assert!(body["user"].get("password").is_none());

        let (_, list) = send(&app, "GET", "/api/users", None).await;
        assert_eq!(list.as_array().unwrap().len(), 1);
        assert!(list[0].get("passwordHash").is_none());
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let app = with_admin().await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/users",
            Some(json!({ "username": "admin", "password": "another-one" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Username already exists");
    }

    #[tokio::test]
    async fn short_password_is_rejected() {
        let app = test_app();
        let (status, _) = send(
            &app,
            "POST",
            "/api/users",
            Some(json!({ "username": "admin", "password": "short" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, list) = send(&app, "GET", "/api/users", None).await;
        assert_eq!(list, json!([]));
    }

    #[tokio::test]
    async fn password_change_takes_effect() {
        let app = with_admin().await;
        let (_, list) = send(&app, "GET", "/api/users", None).await;
        let id = list[0]["id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &app,
            "PUT",
            &format!("/api/users/{id}"),
            Some(json!({ "password": "rotated-secret" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &app,
            "POST",
            "/api/login",
            Some(json!({ "username": "admin", "password": "masters-admin" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(
            &app,
            "POST",
            "/api/login",
            Some(json!({ "username": "admin", "password": "rotated-secret" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn deleted_user_cannot_log_in() {
        let app = with_admin().await;
        let (_, list) = send(&app, "GET", "/api/users", None).await;
        let id = list[0]["id"].as_str().unwrap().to_string();

        let (status, _) = send(&app, "DELETE", &format!("/api/users/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(
            &app,
            "POST",
            "/api/login",
            Some(json!({ "username": "admin", "password": "masters-admin" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
