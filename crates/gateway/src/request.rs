use ecoquest_core::Username;
use ecoquest_provider::{Activity, LocationQuery, MAX_FORECAST_DAYS};

use crate::error::GatewayError;

pub const DEFAULT_FORECAST_DAYS: u8 = 3;

/// Validated input for an AQI check.
#[derive(Debug, Clone)]
pub struct AirQualityRequest {
    pub username: Username,
    pub location: LocationQuery,
}

impl AirQualityRequest {
    pub fn new(username: &str, location: LocationQuery) -> Result<Self, GatewayError> {
        Ok(Self {
            username: Username::parse(username)?,
            location,
        })
    }
}

/// Validated input for a forecast check. `days` is clamped to `1..=7`.
#[derive(Debug, Clone)]
pub struct ForecastRequest {
    pub username: Username,
    pub location: LocationQuery,
    pub days: u8,
}

impl ForecastRequest {
    pub fn new(
        username: &str,
        location: LocationQuery,
        days: Option<i64>,
    ) -> Result<Self, GatewayError> {
        let days = days.map_or(DEFAULT_FORECAST_DAYS, |d| {
            u8::try_from(d.clamp(1, i64::from(MAX_FORECAST_DAYS))).unwrap_or(DEFAULT_FORECAST_DAYS)
        });
        Ok(Self {
            username: Username::parse(username)?,
            location,
            days,
        })
    }
}

/// Validated input for a carbon calculation.
#[derive(Debug, Clone)]
pub struct CarbonRequest {
    pub username: Username,
    pub activity: Activity,
    pub value: f64,
}

impl CarbonRequest {
    /// Rejects unknown activities and negative or non-finite values.
    pub fn new(username: &str, activity: &str, value: f64) -> Result<Self, GatewayError> {
        let username = Username::parse(username)?;
        let activity: Activity = activity.parse()?;
        if !value.is_finite() || value < 0.0 {
            return Err(GatewayError::InvalidInput(format!(
                "value must be a non-negative number, got {value}"
            )));
        }
        Ok(Self {
            username,
            activity,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mumbai() -> LocationQuery {
        LocationQuery::new("Mumbai", "India")
    }

    #[test]
    fn forecast_days_default_and_clamp() {
        assert_eq!(ForecastRequest::new("a", mumbai(), None).unwrap().days, 3);
        assert_eq!(ForecastRequest::new("a", mumbai(), Some(0)).unwrap().days, 1);
        assert_eq!(ForecastRequest::new("a", mumbai(), Some(-4)).unwrap().days, 1);
        assert_eq!(ForecastRequest::new("a", mumbai(), Some(5)).unwrap().days, 5);
        assert_eq!(ForecastRequest::new("a", mumbai(), Some(99)).unwrap().days, 7);
    }

    #[test]
    fn blank_username_is_rejected() {
        assert!(matches!(
            AirQualityRequest::new("  ", mumbai()),
            Err(GatewayError::InvalidUsername)
        ));
    }

    #[test]
    fn carbon_validation() {
        let req = CarbonRequest::new("bob", "car", 10.0).unwrap();
        assert_eq!(req.activity, Activity::Car);

        let err = CarbonRequest::new("bob", "rocket", 10.0).unwrap_err();
        assert!(matches!(err, GatewayError::UnsupportedActivity(ref m) if m.starts_with("Unsupported activity")));

        assert!(matches!(
            CarbonRequest::new("bob", "car", -1.0),
            Err(GatewayError::InvalidInput(_))
        ));
        assert!(CarbonRequest::new("bob", "car", f64::NAN).is_err());
        assert!(CarbonRequest::new("bob", "car", 0.0).is_ok());
    }
}
