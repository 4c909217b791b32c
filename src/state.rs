use std::sync::Arc;

use reqwest::Client;

use crate::{config::Config, database::init_redis, error::AppError, store::DataStore};

/// Composition root state shared by every handler. The store handle is
/// connected once here, reused for the process lifetime, and dropped on
/// shutdown; no other component owns connection state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn DataStore>,
    pub http: Client,
}

impl AppState {
    pub async fn new() -> Result<Arc<Self>, AppError> {
        let config = Config::load();
        let store = init_redis(&config).await?;

        Ok(Arc::new(Self {
            config,
            store: Arc::new(store),
            http: Client::new(),
        }))
    }

    /// Builds state around an already-constructed store backend.
    pub fn with_store(config: Config, store: Arc<dyn DataStore>) -> Arc<Self> {
        Arc::new(Self {
            config,
            store,
            http: Client::new(),
        })
    }
}
