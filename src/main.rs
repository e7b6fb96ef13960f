mod app;
mod auth;
mod config;
mod db;
mod error;
mod models;
mod repo;
mod routes;
mod seed;
mod state;
#[cfg(test)]
mod test_util;

use crate::seed::seed_database;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "club_portal=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = AppState::init().await?;

    // Seeding problems never block startup.
    if app_state.config.seed.on_startup {
        match seed_database(&app_state.store, &app_state.config.seed).await {
            Ok(outcome) => tracing::info!(message = outcome.message(), "seed finished"),
            Err(e) => tracing::warn!(error = ?e, "database seeding skipped"),
        }
    }

    let addr = app_state.config.addr();
    app::serve(app::build_app(app_state), &addr).await
}
