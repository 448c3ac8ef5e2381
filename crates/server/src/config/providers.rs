use serde::Deserialize;

/// External data provider configuration.
///
/// # Example
///
/// ```toml
/// [providers]
/// timeout_seconds = 5
/// iqair_api_key = "..."
/// climatiq_url = "http://localhost:9999"
/// ```
///
/// `IQAIR_API_KEY`, `CLIMATIQ_API_KEY` and `OPENAQ_API_KEY` in the
/// environment take precedence over keys in the file.
#[derive(Debug, Deserialize)]
pub struct ProvidersConfig {
    /// Per-call timeout in seconds, applied to both the HTTP client and the
    /// orchestrator's fetch bound.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// `User-Agent` header sent on every outgoing request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Nominatim geocoder base URL.
    #[serde(default = "default_nominatim_url")]
    pub nominatim_url: String,
    /// IQAir (AirVisual) base URL.
    #[serde(default = "default_iqair_url")]
    pub iqair_url: String,
    /// `OpenAQ` base URL.
    #[serde(default = "default_openaq_url")]
    pub openaq_url: String,
    /// Climatiq base URL.
    #[serde(default = "default_climatiq_url")]
    pub climatiq_url: String,
    pub iqair_api_key: Option<String>,
    pub openaq_api_key: Option<String>,
    pub climatiq_api_key: Option<String>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
            nominatim_url: default_nominatim_url(),
            iqair_url: default_iqair_url(),
            openaq_url: default_openaq_url(),
            climatiq_url: default_climatiq_url(),
            iqair_api_key: None,
            openaq_api_key: None,
            climatiq_api_key: None,
        }
    }
}

impl ProvidersConfig {
    /// Replace API keys with values from `lookup` (normally the process
    /// environment). Empty values are ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(key) = read("IQAIR_API_KEY") {
            self.iqair_api_key = Some(key);
        }
        if let Some(key) = read("CLIMATIQ_API_KEY") {
            self.climatiq_api_key = Some(key);
        }
        if let Some(key) = read("OPENAQ_API_KEY") {
            self.openaq_api_key = Some(key);
        }
    }
}

fn default_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    ecoquest_provider::http::DEFAULT_USER_AGENT.to_owned()
}

fn default_nominatim_url() -> String {
    "https://nominatim.openstreetmap.org".to_owned()
}

fn default_iqair_url() -> String {
    "http://api.airvisual.com".to_owned()
}

fn default_openaq_url() -> String {
    "https://api.openaq.org".to_owned()
}

fn default_climatiq_url() -> String {
    "https://api.climatiq.io".to_owned()
}
