use crate::config::AppConfig;
use crate::db;
use crate::repo::Store;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let store = db::connect(&config).await?;
        Ok(Self::from_parts(store, config))
    }

    pub fn from_parts(store: Store, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    /// Memory-backed state with a fixed config, for tests.
    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::config::SeedConfig;

        let config = Arc::new(AppConfig {
            database_url: None,
            max_connections: 1,
            host: "127.0.0.1".into(),
            port: 0,
            seed: SeedConfig {
                on_startup: false,
                admin_username: "admin".into(),
                admin_password: "test-password".into(),
            },
        });
        Self::from_parts(Store::memory(), config)
    }
}
