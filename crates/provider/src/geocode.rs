use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::{ProviderError, check_status};
use crate::http::DEFAULT_TIMEOUT;
use crate::source::Geocoder;
use crate::types::Coordinates;

/// Configuration for the Nominatim geocoder.
#[derive(Debug, Clone)]
pub struct NominatimConfig {
    /// Base URL for the Nominatim API. Override this for testing against a
    /// mock server.
    pub api_base_url: String,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://nominatim.openstreetmap.org".to_owned(),
        }
    }
}

impl NominatimConfig {
    /// Override the API base URL (useful for testing).
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// Nominatim returns coordinates as strings.
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

/// Geocoder backed by OpenStreetMap Nominatim.
pub struct NominatimGeocoder {
    config: NominatimConfig,
    client: Client,
    timeout: Duration,
}

impl NominatimGeocoder {
    /// The client must carry a `User-Agent`; Nominatim rejects anonymous calls.
    pub fn with_client(config: NominatimConfig, client: Client) -> Self {
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

    fn search_url(&self) -> String {
        format!("{}/search", self.config.api_base_url)
    }
}

fn parse_places(places: &[Place], location: &str) -> Result<Coordinates, ProviderError> {
    let place = places
        .first()
        .ok_or_else(|| ProviderError::GeocodeFailed(location.to_owned()))?;
    let lat = place
        .lat
        .parse::<f64>()
        .map_err(|e| ProviderError::Serialization(format!("bad latitude {:?}: {e}", place.lat)))?;
    let lon = place
        .lon
        .parse::<f64>()
        .map_err(|e| ProviderError::Serialization(format!("bad longitude {:?}: {e}", place.lon)))?;
    Ok(Coordinates { lat, lon })
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    #[instrument(skip(self))]
    async fn geocode(&self, city: &str, country: &str) -> Result<Coordinates, ProviderError> {
        let location = format!("{city}, {country}");
        let response = self
            .client
            .get(self.search_url())
            .query(&[("q", location.as_str()), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(&e, self.timeout))?;
        let response = check_status(response, "nominatim").await?;

        let places: Vec<Place> = response
            .json()
            .await
            .map_err(|e| ProviderError::Serialization(e.to_string()))?;
        let coords = parse_places(&places, &location)?;
        debug!(lat = coords.lat, lon = coords.lon, "geocoded location");
        Ok(coords)
    }
}
