use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use ecoquest_core::ProviderOutcome;

use crate::iqair::{IqAirClient, StationReading};
use crate::mock::simulated_pollutants;
use crate::source::{AirQualitySource, Geocoder, PollutantSource};
use crate::types::{AirQualityReport, LocationQuery, Pollutants};

/// Air-quality collaborator combining IQAir station data with an `OpenAQ`
/// pollutant breakdown.
///
/// When `state` is given the station is looked up by name; otherwise the
/// city is geocoded and the nearest station is used. A missing pollutant
/// breakdown is replaced with simulated values and reported as a fallback.
pub struct LiveAirQuality {
    geocoder: Arc<dyn Geocoder>,
    iqair: IqAirClient,
    pollutants: Arc<dyn PollutantSource>,
}

impl LiveAirQuality {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        iqair: IqAirClient,
        pollutants: Arc<dyn PollutantSource>,
    ) -> Self {
        Self {
            geocoder,
            iqair,
            pollutants,
        }
    }

    async fn station(&self, query: &LocationQuery) -> Result<StationReading, String> {
        if let Some(state) = &query.state {
            return self
                .iqair
                .city(&query.city, state, &query.country)
                .await
                .map_err(|e| e.to_string());
        }

        let coords = self
            .geocoder
            .geocode(&query.city, &query.country)
            .await
            .map_err(|e| {
                warn!(error = %e, "geocoding failed");
                format!("Could not geocode {query}")
            })?;
        self.iqair
            .nearest_city(coords)
            .await
            .map_err(|e| e.to_string())
    }

    /// Live breakdown, or `Err(reason)` when a fallback is needed.
    async fn live_pollutants(&self, query: &LocationQuery) -> Result<Pollutants, String> {
        match self.pollutants.latest(&query.city, &query.country).await {
            Ok(p) if !p.is_empty() => Ok(p),
            Ok(_) => Err(format!("no OpenAQ readings for {query}; using simulated pollutant values")),
            Err(e) => Err(format!("OpenAQ unavailable ({e}); using simulated pollutant values")),
        }
    }
}

fn report(query: &LocationQuery, station: StationReading, pollutants: Pollutants) -> AirQualityReport {
    AirQualityReport {
        requested_city: query.city.clone(),
        nearest_station_city: station.city,
        state: station.state,
        country: station.country,
        aqi_us: station.aqi_us,
        main_pollutant: station.main_pollutant,
        pollutants,
        coordinates: station.coordinates,
        temperature: station.temperature,
        humidity: station.humidity,
        wind_speed: station.wind_speed,
    }
}

#[async_trait]
impl AirQualitySource for LiveAirQuality {
    #[instrument(skip(self), fields(city = %query.city, country = %query.country))]
    async fn air_quality(&self, query: &LocationQuery) -> ProviderOutcome<AirQualityReport> {
        let station = match self.station(query).await {
            Ok(station) => station,
            Err(reason) => return ProviderOutcome::failure(reason),
        };

        match self.live_pollutants(query).await {
            Ok(pollutants) => {
                ProviderOutcome::success(report(query, station, pollutants), "iqair+openaq")
            }
            Err(reason) => {
                info!(%reason, "using simulated pollutants");
                let pollutants = simulated_pollutants(&mut rand::thread_rng());
                ProviderOutcome::fallback(report(query, station, pollutants), reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::ProviderError;
    use crate::http::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, build_client};
    use crate::iqair::IqAirConfig;
    use crate::iqair::tests::MUMBAI_BODY;
    use crate::test_support::MockServer;
    use crate::types::Coordinates;

    struct StubGeocoder {
        result: Option<Coordinates>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Geocoder for StubGeocoder {
        async fn geocode(&self, city: &str, country: &str) -> Result<Coordinates, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result
                .ok_or_else(|| ProviderError::GeocodeFailed(format!("{city}, {country}")))
        }
    }

    struct StubPollutants(Result<Pollutants, ()>);

    #[async_trait]
    impl PollutantSource for StubPollutants {
        async fn latest(&self, _city: &str, _country: &str) -> Result<Pollutants, ProviderError> {
            self.0
                .clone()
                .map_err(|()| ProviderError::Connection("refused".into()))
        }
    }

    fn service(
        base_url: &str,
        geocoder: Arc<StubGeocoder>,
        pollutants: StubPollutants,
    ) -> LiveAirQuality {
        let http = build_client(DEFAULT_USER_AGENT, DEFAULT_TIMEOUT).unwrap();
        let iqair =
            IqAirClient::with_client(IqAirConfig::new("k").with_api_base_url(base_url), http);
        LiveAirQuality::new(geocoder, iqair, Arc::new(pollutants))
    }

    fn geocoder(result: Option<Coordinates>) -> Arc<StubGeocoder> {
        Arc::new(StubGeocoder {
            result,
            calls: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn nearest_city_with_live_pollutants() {
        let server = MockServer::start().await;
        let base_url = server.base_url.clone();
        let geo = geocoder(Some(Coordinates {
            lat: 19.07,
            lon: 72.87,
        }));
        let live = Pollutants::from([("pm2_5".to_owned(), 33.0)]);
        let svc = service(&base_url, Arc::clone(&geo), StubPollutants(Ok(live.clone())));

        let handle = tokio::spawn(async move { server.respond_once(200, MUMBAI_BODY).await });
        let outcome = svc.air_quality(&LocationQuery::new("Mumbai", "India")).await;
        let request = handle.await.unwrap();

        assert!(request.starts_with("GET /v2/nearest_city?"));
        assert_eq!(geo.calls.load(Ordering::SeqCst), 1);
        match outcome {
            ProviderOutcome::Success { data, source } => {
                assert_eq!(source, "iqair+openaq");
                assert_eq!(data.requested_city, "Mumbai");
                assert_eq!(data.nearest_station_city, "Mumbai");
                assert_eq!(data.aqi_us, 152);
                assert_eq!(data.pollutants, live);
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn state_skips_geocoding() {
        let server = MockServer::start().await;
        let base_url = server.base_url.clone();
        let geo = geocoder(None);
        let svc = service(
            &base_url,
            Arc::clone(&geo),
            StubPollutants(Ok(Pollutants::from([("o3".to_owned(), 20.0)]))),
        );

        let handle = tokio::spawn(async move { server.respond_once(200, MUMBAI_BODY).await });
        let query = LocationQuery::new("Mumbai", "India").with_state("Maharashtra");
        let outcome = svc.air_quality(&query).await;
        let request = handle.await.unwrap();

        assert!(request.starts_with("GET /v2/city?"));
        assert_eq!(geo.calls.load(Ordering::SeqCst), 0);
        assert!(!outcome.is_failure());
    }

    #[tokio::test]
    async fn empty_pollutants_fall_back_to_simulated() {
        let server = MockServer::start().await;
        let base_url = server.base_url.clone();
        let svc = service(
            &base_url,
            geocoder(Some(Coordinates { lat: 1.0, lon: 2.0 })),
            StubPollutants(Ok(Pollutants::new())),
        );

        let handle = tokio::spawn(async move { server.respond_once(200, MUMBAI_BODY).await });
        let outcome = svc.air_quality(&LocationQuery::new("Mumbai", "India")).await;
        handle.await.unwrap();

        match outcome {
            ProviderOutcome::Fallback { data, reason } => {
                assert!(reason.contains("no OpenAQ readings for Mumbai, India"));
                assert_eq!(data.pollutants.len(), 6);
                assert_eq!(data.aqi_us, 152);
            }
            other => panic!("expected fallback, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn pollutant_error_falls_back_to_simulated() {
        let server = MockServer::start().await;
        let base_url = server.base_url.clone();
        let svc = service(
            &base_url,
            geocoder(Some(Coordinates { lat: 1.0, lon: 2.0 })),
            StubPollutants(Err(())),
        );

        let handle = tokio::spawn(async move { server.respond_once(200, MUMBAI_BODY).await });
        let outcome = svc.air_quality(&LocationQuery::new("Mumbai", "India")).await;
        handle.await.unwrap();

        assert!(outcome.is_fallback());
    }

    #[tokio::test]
    async fn geocode_failure_is_reported() {
        // The IQAir server is never contacted.
        let svc = service(
            "http://127.0.0.1:9",
            geocoder(None),
            StubPollutants(Ok(Pollutants::new())),
        );

        let outcome = svc.air_quality(&LocationQuery::new("Atlantis", "Nowhere")).await;
        assert_eq!(
            outcome,
            ProviderOutcome::failure("Could not geocode Atlantis, Nowhere")
        );
    }

    #[tokio::test]
    async fn iqair_error_is_reported() {
        let server = MockServer::start().await;
        let base_url = server.base_url.clone();
        let svc = service(
            &base_url,
            geocoder(Some(Coordinates { lat: 1.0, lon: 2.0 })),
            StubPollutants(Ok(Pollutants::new())),
        );

        let handle = tokio::spawn(async move {
            server
                .respond_once(200, r#"{"status":"fail","data":{"message":"no_nearest_station"}}"#)
                .await
        });
        let outcome = svc.air_quality(&LocationQuery::new("Mumbai", "India")).await;
        handle.await.unwrap();

        match outcome {
            ProviderOutcome::Failure { reason } => assert!(reason.contains("no_nearest_station")),
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
