use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::{ProviderError, check_status};
use crate::http::DEFAULT_TIMEOUT;
use crate::types::Coordinates;

/// Configuration for the IQAir (`AirVisual`) API.
#[derive(Debug, Clone)]
pub struct IqAirConfig {
    pub api_key: String,

    /// Base URL for the `AirVisual` API. Override this for testing against a
    /// mock server.
    pub api_base_url: String,
}

impl IqAirConfig {
    /// Create a new configuration with the given API key.
    ///
    /// Uses the public `AirVisual` base URL (`http://api.airvisual.com`).
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base_url: "http://api.airvisual.com".to_owned(),
        }
    }

    /// Override the API base URL (useful for testing).
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// Station reading parsed out of an IQAir response.
#[derive(Debug, Clone, PartialEq)]
pub struct StationReading {
    pub city: String,
    pub state: String,
    pub country: String,
    pub coordinates: Coordinates,
    pub aqi_us: i64,
    pub main_pollutant: String,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct StationData {
    city: String,
    state: String,
    country: String,
    location: Location,
    current: Current,
}

#[derive(Debug, Deserialize)]
struct Location {
    /// GeoJSON order: `[lon, lat]`.
    coordinates: [f64; 2],
}

#[derive(Debug, Deserialize)]
struct Current {
    pollution: Pollution,
    weather: Weather,
}

#[derive(Debug, Deserialize)]
struct Pollution {
    aqius: i64,
    mainus: String,
}

#[derive(Debug, Deserialize)]
struct Weather {
    tp: f64,
    hu: f64,
    ws: f64,
}

/// Parse an IQAir JSON body into a [`StationReading`].
fn parse_station(body: &str) -> Result<StationReading, ProviderError> {
    let envelope: Envelope =
        serde_json::from_str(body).map_err(|e| ProviderError::Serialization(e.to_string()))?;

    if envelope.status != "success" {
        let message = envelope
            .data
            .get("message")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("unknown error");
        return Err(ProviderError::Upstream(format!("iqair: {message}")));
    }

    let data: StationData = serde_json::from_value(envelope.data)
        .map_err(|e| ProviderError::Serialization(e.to_string()))?;
    let [lon, lat] = data.location.coordinates;

    Ok(StationReading {
        city: data.city,
        state: data.state,
        country: data.country,
        coordinates: Coordinates { lat, lon },
        aqi_us: data.current.pollution.aqius,
        main_pollutant: data.current.pollution.mainus,
        temperature: data.current.weather.tp,
        humidity: data.current.weather.hu,
        wind_speed: data.current.weather.ws,
    })
}

/// Client for the IQAir city and nearest-city endpoints.
pub struct IqAirClient {
    config: IqAirConfig,
    client: Client,
    timeout: Duration,
}

impl IqAirClient {
    pub fn with_client(config: IqAirConfig, client: Client) -> Self {
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

    /// Look up a station by city, state and country name.
    #[instrument(skip(self))]
    pub async fn city(
        &self,
        city: &str,
        state: &str,
        country: &str,
    ) -> Result<StationReading, ProviderError> {
        let url = format!("{}/v2/city", self.config.api_base_url);
        self.fetch(
            &url,
            &[
                ("city", city),
                ("state", state),
                ("country", country),
                ("key", self.config.api_key.as_str()),
            ],
        )
        .await
    }

    /// Look up the station nearest to the given coordinates.
    #[instrument(skip(self))]
    pub async fn nearest_city(&self, coords: Coordinates) -> Result<StationReading, ProviderError> {
        let url = format!("{}/v2/nearest_city", self.config.api_base_url);
        let lat = coords.lat.to_string();
        let lon = coords.lon.to_string();
        self.fetch(
            &url,
            &[("lat", lat.as_str()), ("lon", lon.as_str()), ("key", self.config.api_key.as_str())],
        )
        .await
    }

    async fn fetch(&self, url: &str, query: &[(&str, &str)]) -> Result<StationReading, ProviderError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(&e, self.timeout))?;
        let response = check_status(response, "iqair").await?;
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::from_reqwest(&e, self.timeout))?;

        let reading = parse_station(&body)?;
        debug!(station = %reading.city, aqi_us = reading.aqi_us, "iqair reading");
        Ok(reading)
    }
}
