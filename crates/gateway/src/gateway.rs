use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, instrument, warn};

use ecoquest_core::{
    ActionKind, Clock, LeaderboardEntry, PointRewards, ProviderOutcome, UserSummary, Username,
};
use ecoquest_provider::{AirQualitySource, CarbonEstimator, ForecastSource};
use ecoquest_state::CounterStore;

use crate::error::GatewayError;
use crate::ledger::PointsLedger;
use crate::metrics::GatewayMetrics;
use crate::quota::QuotaGate;
use crate::report::ActionReport;
use crate::request::{AirQualityRequest, CarbonRequest, ForecastRequest};

/// The action orchestrator.
///
/// For each gated action:
/// 1. Gate: consume a daily quota slot, or reject with `QuotaExceeded`.
/// 2. Fetch: call the collaborator under a bounded timeout, holding no locks.
/// 3. Evaluate: a failed fetch ends the action without points or refund.
/// 4. Award: credit the fixed reward and merge points fields into the payload.
pub struct Gateway {
    pub(crate) store: Arc<dyn CounterStore>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) gate: QuotaGate,
    pub(crate) ledger: PointsLedger,
    pub(crate) rewards: PointRewards,
    pub(crate) air_quality: Arc<dyn AirQualitySource>,
    pub(crate) forecast: Arc<dyn ForecastSource>,
    pub(crate) carbon: Arc<dyn CarbonEstimator>,
    pub(crate) provider_timeout: Duration,
    pub(crate) metrics: Arc<GatewayMetrics>,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("limits", self.gate.limits())
            .field("rewards", &self.rewards)
            .field("provider_timeout", &self.provider_timeout)
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}

impl Gateway {
    /// Gated AQI check for a city.
    #[instrument(skip(self, request), fields(user = %request.username, city = %request.location.city))]
    pub async fn check_air_quality(
        &self,
        request: &AirQualityRequest,
    ) -> Result<ActionReport, GatewayError> {
        self.run(
            &request.username,
            ActionKind::AqiCheck,
            self.air_quality.air_quality(&request.location),
        )
        .await
    }

    /// Gated AQI forecast for a city.
    #[instrument(skip(self, request), fields(user = %request.username, city = %request.location.city, days = request.days))]
    pub async fn check_forecast(
        &self,
        request: &ForecastRequest,
    ) -> Result<ActionReport, GatewayError> {
        self.run(
            &request.username,
            ActionKind::ForecastCheck,
            self.forecast.forecast(&request.location, request.days),
        )
        .await
    }

    /// Gated carbon estimate for an activity.
    #[instrument(skip(self, request), fields(user = %request.username, activity = %request.activity))]
    pub async fn calculate_carbon(
        &self,
        request: &CarbonRequest,
    ) -> Result<ActionReport, GatewayError> {
        self.run(
            &request.username,
            ActionKind::CarbonCalculation,
            self.carbon.estimate(request.activity, request.value),
        )
        .await
    }

    async fn run<T, F>(
        &self,
        user: &Username,
        kind: ActionKind,
        fetch: F,
    ) -> Result<ActionReport, GatewayError>
    where
        T: Serialize,
        F: Future<Output = ProviderOutcome<T>>,
    {
        self.metrics.increment_requested();

        // 1. Gate.
        let count = match self.gate.check_and_increment(user, kind).await {
            Ok(count) => count,
            Err(e) => {
                if matches!(e, GatewayError::QuotaExceeded { .. }) {
                    self.metrics.increment_quota_rejected();
                    info!(%kind, "action rejected by daily quota");
                }
                return Err(e);
            }
        };
        let remaining_checks = self.gate.remaining(kind, count);

        // 2. Fetch. The future is only polled here, after the gate passed.
        let outcome = match tokio::time::timeout(self.provider_timeout, fetch).await {
            Ok(outcome) => outcome,
            Err(_) => ProviderOutcome::failure(format!(
                "provider timed out after {:?}",
                self.provider_timeout
            )),
        };

        // 3. Evaluate.
        let (data, fallback_reason) = match outcome {
            ProviderOutcome::Success { data, .. } => (data, None),
            ProviderOutcome::Fallback { data, reason } => (data, Some(reason)),
            ProviderOutcome::Failure { reason } => {
                return Ok(self.fail(kind, reason, remaining_checks));
            }
        };
        let data = match serde_json::to_value(data) {
            Ok(data) => data,
            Err(e) => {
                return Ok(self.fail(kind, format!("invalid provider payload: {e}"), remaining_checks));
            }
        };

        // 4. Award.
        let points_earned = self.rewards.reward(kind);
        let total_points = self.ledger.award(user, points_earned).await?;

        self.metrics.increment_completed();
        self.metrics
            .add_points_awarded(u64::try_from(points_earned).unwrap_or(0));
        if let Some(reason) = &fallback_reason {
            self.metrics.increment_fallbacks();
            info!(%kind, %reason, "served fallback data");
        }
        info!(%kind, points_earned, total_points, remaining_checks, "action completed");

        Ok(ActionReport::Completed {
            kind,
            data,
            points_earned,
            total_points,
            remaining_checks,
            fallback_reason,
        })
    }

    fn fail(&self, kind: ActionKind, error: String, remaining_checks: u32) -> ActionReport {
        self.metrics.increment_failed();
        warn!(%kind, %error, remaining_checks, "provider fetch failed; no points awarded");
        ActionReport::Failed {
            kind,
            error,
            remaining_checks,
        }
    }

    /// Balance, today's counters, and limits for a user. Creates the user
    /// (and today's record) if absent.
    #[instrument(skip(self), fields(user = %user))]
    pub async fn user_summary(&self, user: &Username) -> Result<UserSummary, GatewayError> {
        let points = self.ledger.get_balance(user).await?;
        let daily_actions = self.store.daily_actions(user, self.clock.today()).await?;
        Ok(UserSummary {
            username: user.clone(),
            points,
            daily_actions,
            daily_limits: *self.gate.limits(),
        })
    }

    /// Ungated administrative balance change.
    pub async fn adjust_points(&self, user: &Username, delta: i64) -> Result<i64, GatewayError> {
        self.ledger.adjust(user, delta).await
    }

    pub async fn leaderboard(&self, top_n: usize) -> Result<Vec<LeaderboardEntry>, GatewayError> {
        self.ledger.leaderboard(top_n).await
    }

    pub fn gate(&self) -> &QuotaGate {
        &self.gate
    }

    pub fn ledger(&self) -> &PointsLedger {
        &self.ledger
    }

    pub fn metrics(&self) -> &GatewayMetrics {
        &self.metrics
    }

    /// Close the counter store. Call once, after the server has drained.
    pub async fn shutdown(&self) {
        self.store.close().await;
        info!("gateway shutdown complete");
    }
}
