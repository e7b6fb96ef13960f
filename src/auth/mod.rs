use crate::state::AppState;
use axum::Router;

pub mod handlers;
pub mod password;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::login_routes())
        .merge(handlers::user_routes())
}
