use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use ecoquest_core::ProviderOutcome;

use crate::error::{ProviderError, check_status};
use crate::http::DEFAULT_TIMEOUT;
use crate::source::CarbonEstimator;
use crate::types::{Activity, CarbonEstimate};

/// Emission factor dataset version pinned for reproducible estimates.
pub const DATA_VERSION: &str = "24.24";

/// Configuration for the Climatiq estimate API.
#[derive(Debug, Clone)]
pub struct ClimatiqConfig {
    /// Sent as a bearer token.
    pub api_key: String,

    /// Base URL for the Climatiq API. Override this for testing against a
    /// mock server.
    pub api_base_url: String,
}

impl ClimatiqConfig {
    /// Create a new configuration with the given API key.
    ///
    /// Uses the public Climatiq base URL (`https://api.climatiq.io`).
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base_url: "https://api.climatiq.io".to_owned(),
        }
    }

    /// Override the API base URL (useful for testing).
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// Climatiq activity id for each supported activity.
pub fn activity_id(activity: Activity) -> &'static str {
    match activity {
        Activity::Car => {
            "passenger_vehicle-vehicle_type_car-fuel_source_na-engine_size_na-vehicle_age_na-vehicle_weight_na"
        }
        Activity::Bus => "passenger_vehicle-vehicle_type_bus-fuel_source_na-distance_na",
        Activity::Train => "passenger_train-route_type_commuter",
        Activity::Flight => {
            "passenger_flight-route_type_domestic-aircraft_type_na-distance_na-class_na"
        }
        Activity::Electricity => "electricity-supply_grid-source_total_supplier_mix",
    }
}

#[derive(Debug, Serialize)]
struct EstimateRequest {
    emission_factor: EmissionFactor,
    parameters: Parameters,
}

#[derive(Debug, Serialize)]
struct EmissionFactor {
    activity_id: &'static str,
    data_version: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Parameters {
    Distance { distance: f64, distance_unit: &'static str },
    /// Passenger factors (bus, train, flight) reject plain `distance`.
    PassengerDistance {
        passenger_distance: f64,
        passenger_distance_unit: &'static str,
    },
    Energy { energy: f64, energy_unit: &'static str },
}

#[derive(Debug, Deserialize)]
struct EstimateResponse {
    co2e: Option<f64>,
}

fn build_request(activity: Activity, value: f64) -> EstimateRequest {
    let parameters = match activity {
        Activity::Electricity => Parameters::Energy {
            energy: value,
            energy_unit: "kWh",
        },
        Activity::Car => Parameters::Distance {
            distance: value,
            distance_unit: "km",
        },
        Activity::Bus | Activity::Train | Activity::Flight => Parameters::PassengerDistance {
            passenger_distance: value,
            passenger_distance_unit: "km",
        },
    };
    EstimateRequest {
        emission_factor: EmissionFactor {
            activity_id: activity_id(activity),
            data_version: DATA_VERSION,
        },
        parameters,
    }
}

/// Carbon estimator backed by the Climatiq `POST /estimate` endpoint.
pub struct ClimatiqEstimator {
    config: ClimatiqConfig,
    client: Client,
    timeout: Duration,
}

impl ClimatiqEstimator {
    pub fn with_client(config: ClimatiqConfig, client: Client) -> Self {
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

    async fn request_estimate(&self, activity: Activity, value: f64) -> Result<f64, ProviderError> {
        let url = format!("{}/estimate", self.config.api_base_url);
        let body = build_request(activity, value);
        debug!(activity_id = body.emission_factor.activity_id, "sending estimate to Climatiq");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(&e, self.timeout))?;
        let response = check_status(response, "climatiq").await?;
        let estimate: EstimateResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Serialization(e.to_string()))?;

        estimate
            .co2e
            .ok_or_else(|| ProviderError::Serialization("climatiq response has no co2e".into()))
    }
}

#[async_trait]
impl CarbonEstimator for ClimatiqEstimator {
    #[instrument(skip(self))]
    async fn estimate(&self, activity: Activity, value: f64) -> ProviderOutcome<CarbonEstimate> {
        match self.request_estimate(activity, value).await {
            Ok(kg_co2) => ProviderOutcome::success(
                CarbonEstimate {
                    activity,
                    value,
                    unit: activity.unit().to_owned(),
                    kg_co2,
                },
                "climatiq",
            ),
            Err(e) => {
                warn!(error = %e, "carbon estimate failed");
                ProviderOutcome::failure(format!("Failed to fetch carbon data: {e}"))
            }
        }
    }
}
