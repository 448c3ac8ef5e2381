use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A gated, rewarded action a user can perform.
///
/// Each kind maps onto exactly one fixed counter field of the daily record.
/// The wire and storage name is the counter name (`aqi_checks`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum ActionKind {
    #[serde(rename = "aqi_checks")]
    AqiCheck,
    #[serde(rename = "forecast_checks")]
    ForecastCheck,
    #[serde(rename = "carbon_calculations")]
    CarbonCalculation,
}

impl ActionKind {
    /// All action kinds, in counter-column order.
    pub const ALL: [Self; 3] = [Self::AqiCheck, Self::ForecastCheck, Self::CarbonCalculation];

    /// Counter name used on the wire and as the storage column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AqiCheck => "aqi_checks",
            Self::ForecastCheck => "forecast_checks",
            Self::CarbonCalculation => "carbon_calculations",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| CoreError::InvalidActionKind(s.to_owned()))
    }
}

fn default_aqi_limit() -> u32 {
    5
}

fn default_forecast_limit() -> u32 {
    3
}

fn default_carbon_limit() -> u32 {
    10
}

/// Per-user, per-day caps for each action kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DailyLimits {
    #[serde(default = "default_aqi_limit")]
    pub aqi_checks: u32,
    #[serde(default = "default_forecast_limit")]
    pub forecast_checks: u32,
    #[serde(default = "default_carbon_limit")]
    pub carbon_calculations: u32,
}

impl Default for DailyLimits {
    fn default() -> Self {
        Self {
            aqi_checks: default_aqi_limit(),
            forecast_checks: default_forecast_limit(),
            carbon_calculations: default_carbon_limit(),
        }
    }
}

impl DailyLimits {
    #[must_use]
    pub const fn limit(&self, kind: ActionKind) -> u32 {
        match kind {
            ActionKind::AqiCheck => self.aqi_checks,
            ActionKind::ForecastCheck => self.forecast_checks,
            ActionKind::CarbonCalculation => self.carbon_calculations,
        }
    }
}

fn default_aqi_reward() -> i64 {
    10
}

fn default_forecast_reward() -> i64 {
    5
}

fn default_carbon_reward() -> i64 {
    15
}

/// Points credited for each successfully completed action kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointRewards {
    #[serde(default = "default_aqi_reward")]
    pub aqi_check: i64,
    #[serde(default = "default_forecast_reward")]
    pub forecast_check: i64,
    #[serde(default = "default_carbon_reward")]
    pub carbon_calculation: i64,
}

impl Default for PointRewards {
    fn default() -> Self {
        Self {
            aqi_check: default_aqi_reward(),
            forecast_check: default_forecast_reward(),
            carbon_calculation: default_carbon_reward(),
        }
    }
}

impl PointRewards {
    #[must_use]
    pub const fn reward(&self, kind: ActionKind) -> i64 {
        match kind {
            ActionKind::AqiCheck => self.aqi_check,
            ActionKind::ForecastCheck => self.forecast_check,
            ActionKind::CarbonCalculation => self.carbon_calculation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_counter_names() {
        for kind in ActionKind::ALL {
            assert_eq!(kind.as_str().parse::<ActionKind>().unwrap(), kind);
        }
    }

    #[test]
    fn parse_rejects_unknown_name() {
        let err = "pollen_checks".parse::<ActionKind>().unwrap_err();
        assert_eq!(err, CoreError::InvalidActionKind("pollen_checks".into()));
        // Variant names are not accepted, only counter names.
        assert!("AqiCheck".parse::<ActionKind>().is_err());
    }

    #[test]
    fn serde_uses_counter_names() {
        let json = serde_json::to_string(&ActionKind::CarbonCalculation).unwrap();
        assert_eq!(json, "\"carbon_calculations\"");
    }

    #[test]
    fn default_limits_and_rewards() {
        let limits = DailyLimits::default();
        assert_eq!(limits.limit(ActionKind::AqiCheck), 5);
        assert_eq!(limits.limit(ActionKind::ForecastCheck), 3);
        assert_eq!(limits.limit(ActionKind::CarbonCalculation), 10);

        let rewards = PointRewards::default();
        assert_eq!(rewards.reward(ActionKind::AqiCheck), 10);
        assert_eq!(rewards.reward(ActionKind::ForecastCheck), 5);
        assert_eq!(rewards.reward(ActionKind::CarbonCalculation), 15);
    }

    #[test]
    fn partial_limits_fill_defaults() {
        let limits: DailyLimits = serde_json::from_str(r#"{"aqi_checks": 1}"#).unwrap();
        assert_eq!(limits.aqi_checks, 1);
        assert_eq!(limits.forecast_checks, 3);
        assert_eq!(limits.carbon_calculations, 10);
    }
}
