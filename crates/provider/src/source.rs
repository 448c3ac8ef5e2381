use async_trait::async_trait;

use ecoquest_core::ProviderOutcome;

use crate::error::ProviderError;
use crate::types::{
    Activity, AirQualityReport, CarbonEstimate, Coordinates, Forecast, LocationQuery, Pollutants,
};

/// Resolves a city/country pair to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, city: &str, country: &str) -> Result<Coordinates, ProviderError>;
}

/// Supplies a per-pollutant breakdown. An empty map means "no readings".
#[async_trait]
pub trait PollutantSource: Send + Sync {
    async fn latest(&self, city: &str, country: &str) -> Result<Pollutants, ProviderError>;
}

/// Collaborator behind the AQI check action.
///
/// Implementations never return `Err`: every failure is folded into
/// [`ProviderOutcome::Failure`] so the caller can report it in the payload.
#[async_trait]
pub trait AirQualitySource: Send + Sync {
    async fn air_quality(&self, query: &LocationQuery) -> ProviderOutcome<AirQualityReport>;
}

/// Collaborator behind the forecast action.
#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn forecast(&self, query: &LocationQuery, days: u8) -> ProviderOutcome<Forecast>;
}

/// Collaborator behind the carbon calculation action.
#[async_trait]
pub trait CarbonEstimator: Send + Sync {
    async fn estimate(&self, activity: Activity, value: f64) -> ProviderOutcome<CarbonEstimate>;
}
