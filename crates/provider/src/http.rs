use std::time::Duration;

use reqwest::Client;

use crate::error::ProviderError;

/// Default per-request timeout for outgoing provider calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default `User-Agent` sent to providers that require one (Nominatim).
pub const DEFAULT_USER_AGENT: &str = "EcoQuestApp";

/// Build the shared HTTP client used by every live provider.
pub fn build_client(user_agent: &str, timeout: Duration) -> Result<Client, ProviderError> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::Configuration(format!("failed to build HTTP client: {e}")))
}
