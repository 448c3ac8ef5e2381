mod providers;
mod server;
mod state;


pub use providers::*;
pub use server::*;
pub use state::*;

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use ecoquest_core::{DailyLimits, PointRewards};

use crate::error::ServerError;

/// Top-level configuration for the EcoQuest server, loaded from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct EcoQuestConfig {
    /// HTTP server bind configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Counter store backend configuration.
    #[serde(default)]
    pub state: StateConfig,
    /// Daily per-user limits for each gated action.
    #[serde(default)]
    pub quotas: DailyLimits,
    /// Points credited for each completed action.
    #[serde(default)]
    pub rewards: PointRewards,
    /// External data provider endpoints and credentials.
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl EcoQuestConfig {
    /// Load configuration from `path`, falling back to defaults when the
    /// file does not exist. API keys from the environment override the file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ServerError> {
        let path = path.as_ref();
        let mut config: Self = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Self::parse(&contents)?
        } else {
            info!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };
        config
            .providers
            .apply_env_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Self, ServerError> {
        toml::from_str(contents).map_err(|e| ServerError::Config(format!("invalid config: {e}")))
    }
}
