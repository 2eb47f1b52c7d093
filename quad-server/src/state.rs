use std::sync::Arc;

use quad_store::{ConnectionManager, Store};

use crate::config::Config;

/// Shared server state. `ConnectionManager` is a cheap-to-clone handle over
/// one multiplexed connection, so handlers clone it per request.
pub struct AppState {
    pub config: Config,
    pub store: Store,
    pub redis: ConnectionManager,
}

impl AppState {
    pub async fn new() -> Result<Arc<Self>, quad_store::StoreError> {
        let config = Config::load();
        let redis = quad_store::connect(&config.redis_url).await?;
        let store = Store::new(config.key_prefix.clone());
        Ok(Arc::new(Self {
            config,
            store,
            redis,
        }))
    }
}
