use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::{config::AppConfig, repo::Store};

/// Opens the configured store. Postgres gets the embedded migrations applied;
/// without `DATABASE_URL` the process runs on volatile in-memory tables.
pub async fn connect(config: &AppConfig) -> anyhow::Result<Store> {
    let Some(url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set; using in-memory store, data is lost on restart");
        return Ok(Store::memory());
    };

    let db = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(url)
        .await
        .context("connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .context("run migrations")?;
    tracing::info!(max_connections = config.max_connections, "database ready");

    Ok(Store::Postgres(db))
}
