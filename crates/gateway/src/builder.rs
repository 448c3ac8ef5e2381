use std::sync::Arc;
use std::time::Duration;

use ecoquest_core::{Clock, DailyLimits, PointRewards, SystemClock};
use ecoquest_provider::{AirQualitySource, CarbonEstimator, ForecastSource};
use ecoquest_state::CounterStore;

use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::ledger::PointsLedger;
use crate::metrics::GatewayMetrics;
use crate::quota::QuotaGate;

/// Default bound on a single collaborator fetch.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// Fluent builder for constructing a [`Gateway`] instance.
///
/// A [`CounterStore`] and all three collaborators must be supplied. The
/// clock defaults to [`SystemClock`]; limits, rewards and the provider
/// timeout have defaults.
pub struct GatewayBuilder {
    store: Option<Arc<dyn CounterStore>>,
    clock: Arc<dyn Clock>,
    limits: DailyLimits,
    rewards: PointRewards,
    air_quality: Option<Arc<dyn AirQualitySource>>,
    forecast: Option<Arc<dyn ForecastSource>>,
    carbon: Option<Arc<dyn CarbonEstimator>>,
    provider_timeout: Duration,
}

impl GatewayBuilder {
    /// Create a new builder with all optional fields set to their defaults.
    pub fn new() -> Self {
        Self {
            store: None,
            clock: Arc::new(SystemClock),
            limits: DailyLimits::default(),
            rewards: PointRewards::default(),
            air_quality: None,
            forecast: None,
            carbon: None,
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    /// Set the counter store implementation.
    #[must_use]
    pub fn store(mut self, store: Arc<dyn CounterStore>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn limits(mut self, limits: DailyLimits) -> Self {
        self.limits = limits;
        self
    }

    #[must_use]
    pub fn rewards(mut self, rewards: PointRewards) -> Self {
        self.rewards = rewards;
        self
    }

    #[must_use]
    pub fn air_quality(mut self, source: Arc<dyn AirQualitySource>) -> Self {
        self.air_quality = Some(source);
        self
    }

    #[must_use]
    pub fn forecast(mut self, source: Arc<dyn ForecastSource>) -> Self {
        self.forecast = Some(source);
        self
    }

    #[must_use]
    pub fn carbon(mut self, estimator: Arc<dyn CarbonEstimator>) -> Self {
        self.carbon = Some(estimator);
        self
    }

    /// Bound on each collaborator fetch; exceeding it counts as a failure.
    #[must_use]
    pub fn provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }

    /// Consume the builder and produce a configured [`Gateway`].
    ///
    /// Returns a [`GatewayError::Configuration`] if the store or any
    /// collaborator has not been set, or if a reward is not positive.
    pub fn build(self) -> Result<Gateway, GatewayError> {
        let store = self
            .store
            .ok_or_else(|| GatewayError::Configuration("counter store is required".into()))?;
        let air_quality = self.air_quality.ok_or_else(|| {
            GatewayError::Configuration("air quality source is required".into())
        })?;
        let forecast = self
            .forecast
            .ok_or_else(|| GatewayError::Configuration("forecast source is required".into()))?;
        let carbon = self
            .carbon
            .ok_or_else(|| GatewayError::Configuration("carbon estimator is required".into()))?;

        if let Some(kind) = ecoquest_core::ActionKind::ALL
            .into_iter()
            .find(|kind| self.rewards.reward(*kind) <= 0)
        {
            return Err(GatewayError::Configuration(format!(
                "reward for {kind} must be positive"
            )));
        }

        Ok(Gateway {
            gate: QuotaGate::new(Arc::clone(&store), Arc::clone(&self.clock), self.limits),
            ledger: PointsLedger::new(Arc::clone(&store)),
            store,
            clock: self.clock,
            rewards: self.rewards,
            air_quality,
            forecast,
            carbon,
            provider_timeout: self.provider_timeout,
            metrics: Arc::new(GatewayMetrics::default()),
        })
    }
}

impl Default for GatewayBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use ecoquest_core::ProviderOutcome;
    use ecoquest_provider::{
        Activity, AirQualityReport, CarbonEstimate, Forecast, LocationQuery,
    };
    use ecoquest_state_memory::MemoryCounterStore;

    use super::*;

    struct Nothing;

    #[async_trait]
    impl AirQualitySource for Nothing {
        async fn air_quality(&self, _: &LocationQuery) -> ProviderOutcome<AirQualityReport> {
            ProviderOutcome::failure("none")
        }
    }

    #[async_trait]
    impl ForecastSource for Nothing {
        async fn forecast(&self, _: &LocationQuery, _: u8) -> ProviderOutcome<Forecast> {
            ProviderOutcome::failure("none")
        }
    }

    #[async_trait]
    impl CarbonEstimator for Nothing {
        async fn estimate(&self, _: Activity, _: f64) -> ProviderOutcome<CarbonEstimate> {
            ProviderOutcome::failure("none")
        }
    }

    fn complete() -> GatewayBuilder {
        GatewayBuilder::new()
            .store(Arc::new(MemoryCounterStore::new()))
            .air_quality(Arc::new(Nothing))
            .forecast(Arc::new(Nothing))
            .carbon(Arc::new(Nothing))
    }

    #[test]
    fn build_requires_store() {
        let err = GatewayBuilder::new()
            .air_quality(Arc::new(Nothing))
            .forecast(Arc::new(Nothing))
            .carbon(Arc::new(Nothing))
            .build()
            .unwrap_err();
        assert!(matches!(err, GatewayError::Configuration(ref m) if m.contains("counter store")));
    }

    #[test]
    fn build_requires_collaborators() {
        let err = GatewayBuilder::new()
            .store(Arc::new(MemoryCounterStore::new()))
            .build()
            .unwrap_err();
        assert!(matches!(err, GatewayError::Configuration(_)));
    }

    #[test]
    fn build_rejects_non_positive_reward() {
        let err = complete()
            .rewards(PointRewards {
                forecast_check: 0,
                ..PointRewards::default()
            })
            .build()
            .unwrap_err();
        assert!(matches!(err, GatewayError::Configuration(ref m) if m.contains("forecast_checks")));
    }

    #[test]
    fn build_with_custom_limits() {
        let gateway = complete()
            .limits(DailyLimits {
                aqi_checks: 1,
                ..DailyLimits::default()
            })
            .build()
            .unwrap();
        assert_eq!(gateway.gate().limits().aqi_checks, 1);
    }
}
