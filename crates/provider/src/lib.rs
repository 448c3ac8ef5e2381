pub mod air_quality;
pub mod climatiq;
pub mod error;
pub mod forecast;
pub mod geocode;
pub mod http;
pub mod iqair;
pub mod mock;
pub mod openaq;
pub mod source;
pub mod types;

#[cfg(test)]
mod test_support;

pub use air_quality::LiveAirQuality;
pub use climatiq::{ClimatiqConfig, ClimatiqEstimator};
pub use error::ProviderError;
pub use forecast::{MAX_FORECAST_DAYS, SimulatedForecast};
pub use geocode::{NominatimConfig, NominatimGeocoder};
pub use http::build_client;
pub use iqair::{IqAirClient, IqAirConfig};
pub use openaq::{OpenAqClient, OpenAqConfig};
pub use source::{AirQualitySource, CarbonEstimator, ForecastSource, Geocoder, PollutantSource};
pub use types::{
    Activity, AirQualityReport, CarbonEstimate, Coordinates, Forecast, ForecastDay,
    LocationQuery, Pollutants, UnsupportedActivity,
};
