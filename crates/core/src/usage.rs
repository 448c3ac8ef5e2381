use serde::{Deserialize, Serialize};

use crate::action::{ActionKind, DailyLimits};
use crate::types::Username;

/// Counters for one (user, day) record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DailyActions {
    pub aqi_checks: u32,
    pub forecast_checks: u32,
    pub carbon_calculations: u32,
}

impl DailyActions {
    #[must_use]
    pub const fn count(&self, kind: ActionKind) -> u32 {
        match kind {
            ActionKind::AqiCheck => self.aqi_checks,
            ActionKind::ForecastCheck => self.forecast_checks,
            ActionKind::CarbonCalculation => self.carbon_calculations,
        }
    }

    /// Mutable access to the counter backing `kind`.
    pub fn count_mut(&mut self, kind: ActionKind) -> &mut u32 {
        match kind {
            ActionKind::AqiCheck => &mut self.aqi_checks,
            ActionKind::ForecastCheck => &mut self.forecast_checks,
            ActionKind::CarbonCalculation => &mut self.carbon_calculations,
        }
    }
}

/// A single row of the points leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "openapi", schema(example = json!({"username": "alice", "points": 120})))]
pub struct LeaderboardEntry {
    pub username: Username,
    pub points: i64,
}

/// Snapshot of a user's balance and today's usage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "openapi", schema(example = json!({
    "username": "alice",
    "points": 25,
    "daily_actions": {"aqi_checks": 2, "forecast_checks": 1, "carbon_calculations": 0},
    "daily_limits": {"aqi_checks": 5, "forecast_checks": 3, "carbon_calculations": 10}
})))]
pub struct UserSummary {
    pub username: Username,
    pub points: i64,
    pub daily_actions: DailyActions,
    pub daily_limits: DailyLimits,
}
