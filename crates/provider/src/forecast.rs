use std::sync::Arc;

use async_trait::async_trait;
use chrono::Days;
use rand::Rng;

use ecoquest_core::{Clock, ProviderOutcome};

use crate::source::ForecastSource;
use crate::types::{Forecast, ForecastDay, LocationQuery};

pub const MAX_FORECAST_DAYS: u8 = 7;

/// Forecast generator producing a synthetic daily AQI series.
///
/// There is no live forecast provider, so every result is a
/// [`ProviderOutcome::Fallback`].
pub struct SimulatedForecast {
    clock: Arc<dyn Clock>,
}

impl SimulatedForecast {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    fn generate<R: Rng + ?Sized>(&self, rng: &mut R, query: &LocationQuery, days: u8) -> Forecast {
        let today = self.clock.today();
        let days = (1..=u64::from(days.clamp(1, MAX_FORECAST_DAYS)))
            .filter_map(|offset| today.checked_add_days(Days::new(offset)))
            .map(|date| ForecastDay {
                date,
                aqi: rng.gen_range(20..=180),
            })
            .collect();

        Forecast {
            city: query.city.clone(),
            country: query.country.clone(),
            forecast_type: "simulated".to_owned(),
            days,
        }
    }
}

#[async_trait]
impl ForecastSource for SimulatedForecast {
    async fn forecast(&self, query: &LocationQuery, days: u8) -> ProviderOutcome<Forecast> {
        let forecast = self.generate(&mut rand::thread_rng(), query, days);
        ProviderOutcome::fallback(forecast, "no live forecast provider; values are simulated")
    }
}
