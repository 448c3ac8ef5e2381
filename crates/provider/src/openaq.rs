use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::{ProviderError, check_status};
use crate::http::DEFAULT_TIMEOUT;
use crate::source::PollutantSource;
use crate::types::Pollutants;

/// Configuration for the `OpenAQ` latest-measurements API.
#[derive(Debug, Clone)]
pub struct OpenAqConfig {
    /// Optional; sent as `x-api-key` when present.
    pub api_key: Option<String>,

    /// Base URL for the `OpenAQ` API. Override this for testing against a
    /// mock server.
    pub api_base_url: String,
}

impl Default for OpenAqConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: "https://api.openaq.org".to_owned(),
        }
    }
}

impl OpenAqConfig {
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Override the API base URL (useful for testing).
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    #[serde(default)]
    results: Vec<LatestResult>,
}

#[derive(Debug, Deserialize)]
struct LatestResult {
    #[serde(default)]
    measurements: Vec<Measurement>,
}

#[derive(Debug, Deserialize)]
struct Measurement {
    parameter: String,
    value: f64,
}

/// Normalize `OpenAQ` parameter names to the keys the API exposes.
fn normalize_parameter(name: &str) -> String {
    match name {
        "pm25" => "pm2_5".to_owned(),
        other => other.to_owned(),
    }
}

fn parse_latest(response: LatestResponse) -> Pollutants {
    response
        .results
        .into_iter()
        .next()
        .map(|result| {
            result
                .measurements
                .into_iter()
                .map(|m| (normalize_parameter(&m.parameter), m.value))
                .collect()
        })
        .unwrap_or_default()
}

/// Pollutant source backed by the `OpenAQ` v2 `latest` endpoint.
pub struct OpenAqClient {
    config: OpenAqConfig,
    client: Client,
    timeout: Duration,
}

impl OpenAqClient {
    pub fn with_client(config: OpenAqConfig, client: Client) -> Self {
        Self {
            config,
            client,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Timeout reported when the client's own request timeout fires.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl PollutantSource for OpenAqClient {
    #[instrument(skip(self))]
    async fn latest(&self, city: &str, country: &str) -> Result<Pollutants, ProviderError> {
        let url = format!("{}/v2/latest", self.config.api_base_url);
        let mut request = self
            .client
            .get(&url)
            .query(&[("city", city), ("country", country), ("limit", "1")]);
        if let Some(key) = &self.config.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(&e, self.timeout))?;
        let response = check_status(response, "openaq").await?;
        let latest: LatestResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Serialization(e.to_string()))?;

        let pollutants = parse_latest(latest);
        debug!(count = pollutants.len(), "openaq measurements");
        Ok(pollutants)
    }
}
