use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where to look up air quality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationQuery {
    pub city: String,
    /// When set, the station is resolved by name instead of by coordinates.
    pub state: Option<String>,
    pub country: String,
}

impl LocationQuery {
    pub fn new(city: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            state: None,
            country: country.into(),
        }
    }

    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.city, self.country)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Pollutant concentrations keyed by normalized name (`pm2_5`, `pm10`, ...).
pub type Pollutants = BTreeMap<String, f64>;

/// Combined air-quality reading for a city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualityReport {
    pub requested_city: String,
    pub nearest_station_city: String,
    pub state: String,
    pub country: String,
    pub aqi_us: i64,
    pub main_pollutant: String,
    pub pollutants: Pollutants,
    pub coordinates: Coordinates,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub aqi: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forecast {
    pub city: String,
    pub country: String,
    pub forecast_type: String,
    pub days: Vec<ForecastDay>,
}

/// Activities the carbon estimator knows how to price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activity {
    Car,
    Bus,
    Train,
    Flight,
    Electricity,
}

/// Returned when parsing an activity name that is not in [`Activity::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported activity. Choose from [car, bus, train, flight, electricity]")]
pub struct UnsupportedActivity(pub String);

impl Activity {
    pub const ALL: [Self; 5] = [
        Self::Car,
        Self::Bus,
        Self::Train,
        Self::Flight,
        Self::Electricity,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Car => "car",
            Self::Bus => "bus",
            Self::Train => "train",
            Self::Flight => "flight",
            Self::Electricity => "electricity",
        }
    }

    /// Unit the activity `value` is measured in.
    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Electricity => "kWh",
            _ => "km",
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Activity {
    type Err = UnsupportedActivity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| UnsupportedActivity(s.to_owned()))
    }
}

/// Carbon estimate for a single activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbonEstimate {
    pub activity: Activity,
    pub value: f64,
    pub unit: String,
    #[serde(rename = "kgCO2")]
    pub kg_co2: f64,
}
