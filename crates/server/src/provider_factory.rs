use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use ecoquest_core::Clock;
use ecoquest_provider::{
    AirQualitySource, CarbonEstimator, ClimatiqConfig, ClimatiqEstimator, ForecastSource,
    IqAirClient, IqAirConfig, LiveAirQuality, NominatimConfig, NominatimGeocoder, OpenAqClient,
    OpenAqConfig, SimulatedForecast, build_client,
};

use crate::config::ProvidersConfig;
use crate::error::ServerError;

/// The three collaborators the gateway orchestrates.
pub struct Providers {
    pub air_quality: Arc<dyn AirQualitySource>,
    pub forecast: Arc<dyn ForecastSource>,
    pub carbon: Arc<dyn CarbonEstimator>,
}

/// Build the live providers from configuration.
///
/// A missing IQAir or Climatiq key is not fatal: calls will fail upstream
/// and surface as error payloads, which is logged once here.
pub fn create_providers(
    config: &ProvidersConfig,
    clock: Arc<dyn Clock>,
) -> Result<Providers, ServerError> {
    let timeout = Duration::from_secs(config.timeout_seconds);
    let client = build_client(&config.user_agent, timeout)
        .map_err(|e| ServerError::Config(e.to_string()))?;

    let geocoder = NominatimGeocoder::with_client(
        NominatimConfig::default().with_api_base_url(&config.nominatim_url),
        client.clone(),
    )
    .with_timeout(timeout);

    let iqair_key = config.iqair_api_key.clone().unwrap_or_else(|| {
        warn!("IQAIR_API_KEY is not set; air quality checks will fail");
        String::new()
    });
    let iqair = IqAirClient::with_client(
        IqAirConfig::new(iqair_key).with_api_base_url(&config.iqair_url),
        client.clone(),
    )
    .with_timeout(timeout);

    let mut openaq_config = OpenAqConfig::default().with_api_base_url(&config.openaq_url);
    if let Some(key) = &config.openaq_api_key {
        openaq_config = openaq_config.with_api_key(key);
    }
    let openaq = OpenAqClient::with_client(openaq_config, client.clone()).with_timeout(timeout);

    let climatiq_key = config.climatiq_api_key.clone().unwrap_or_else(|| {
        warn!("CLIMATIQ_API_KEY is not set; carbon calculations will fail");
        String::new()
    });
    let carbon = ClimatiqEstimator::with_client(
        ClimatiqConfig::new(climatiq_key).with_api_base_url(&config.climatiq_url),
        client,
    )
    .with_timeout(timeout);

    info!(
        timeout_secs = config.timeout_seconds,
        user_agent = %config.user_agent,
        "providers initialized"
    );

    Ok(Providers {
        air_quality: Arc::new(LiveAirQuality::new(
            Arc::new(geocoder),
            iqair,
            Arc::new(openaq),
        )),
        forecast: Arc::new(SimulatedForecast::new(clock)),
        carbon: Arc::new(carbon),
    })
}
