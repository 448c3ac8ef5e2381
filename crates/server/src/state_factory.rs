use std::sync::Arc;

use ecoquest_state::CounterStore;
use ecoquest_state_memory::MemoryCounterStore;
#[cfg(feature = "postgres")]
use ecoquest_state_postgres::{PostgresConfig, PostgresCounterStore};
use tracing::info;

use crate::config::StateConfig;
use crate::error::ServerError;

/// Create a counter store from the given configuration.
#[allow(clippy::unused_async)]
pub async fn create_store(config: &StateConfig) -> Result<Arc<dyn CounterStore>, ServerError> {
    let store: Arc<dyn CounterStore> = match config.backend.as_str() {
        "memory" => Arc::new(MemoryCounterStore::new()),
        #[cfg(feature = "postgres")]
        "postgres" => {
            let url = config.url.as_deref().ok_or_else(|| {
                ServerError::Config("postgres backend requires [state] url".into())
            })?;

            let defaults = PostgresConfig::default();
            let pg_config = PostgresConfig {
                url: url.to_owned(),
                pool_size: config.pool_size.unwrap_or(defaults.pool_size),
                table_prefix: config.prefix.clone().unwrap_or(defaults.table_prefix),
                schema: defaults.schema,
            };

            let store = PostgresCounterStore::new(pg_config)
                .await
                .map_err(|e| ServerError::Config(format!("postgres: {e}")))?;

            Arc::new(store)
        }
        other => {
            return Err(ServerError::Config(format!(
                "unsupported state backend: {other} (enable the matching cargo feature)"
            )));
        }
    };

    info!(backend = %config.backend, "counter store initialized");
    Ok(store)
}
