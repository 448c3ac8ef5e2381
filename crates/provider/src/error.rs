use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while talking to an external data provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The location could not be resolved to coordinates.
    #[error("could not geocode {0}")]
    GeocodeFailed(String),

    /// The provider answered with a non-success status or an error body.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// The provider did not respond within the allowed duration.
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    /// A network or transport-level error occurred.
    #[error("connection error: {0}")]
    Connection(String),

    /// The provider was given invalid configuration.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The provider rejected the request due to rate limiting.
    #[error("rate limited")]
    RateLimited,

    /// A serialization or deserialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ProviderError {
    /// Returns `true` if the error is transient and the operation may succeed
    /// on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::Connection(_) | Self::RateLimited
        )
    }

    /// Map a transport error, keeping timeouts distinct.
    pub(crate) fn from_reqwest(err: &reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else if err.is_decode() {
            Self::Serialization(err.to_string())
        } else {
            Self::Connection(err.to_string())
        }
    }
}

/// Check the status of a provider response, turning 429 and non-2xx answers
/// into errors.
pub(crate) async fn check_status(
    response: reqwest::Response,
    provider: &str,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        tracing::warn!(provider, "provider rate limit hit");
        return Err(ProviderError::RateLimited);
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Upstream(format!(
            "{provider} HTTP {status}: {body}"
        )));
    }
    Ok(response)
}
