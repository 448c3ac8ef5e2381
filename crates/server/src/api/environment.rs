use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;
use utoipa::IntoParams;

use ecoquest_gateway::{AirQualityRequest, CarbonRequest, ForecastRequest};
use ecoquest_provider::LocationQuery;

use crate::error::ServerError;

use super::schemas::{
    ActionFailedResponse, ActionPointsFields, ErrorResponse, QuotaExceededResponse,
};
use super::{AppState, DEFAULT_CITY, DEFAULT_COUNTRY, require_username};

/// Query parameters shared by the location-based endpoints.
#[derive(Debug, Deserialize, IntoParams)]
pub struct LocationParams {
    /// City name. Defaults to `Mumbai`.
    pub city: Option<String>,
    /// State or region. When set, the station is looked up by name instead
    /// of by geocoded coordinates.
    pub state: Option<String>,
    /// Country name. Defaults to `India`.
    pub country: Option<String>,
    /// User performing the check.
    pub username: Option<String>,
    /// Forecast length in days, clamped to 1..=7 (forecast only).
    pub days: Option<i64>,
}

impl LocationParams {
    fn location(&self) -> LocationQuery {
        let city = self.city.as_deref().unwrap_or(DEFAULT_CITY);
        let country = self.country.as_deref().unwrap_or(DEFAULT_COUNTRY);
        let query = LocationQuery::new(city, country);
        match self.state.as_deref().map(str::trim) {
            Some(state) if !state.is_empty() => query.with_state(state),
            _ => query,
        }
    }
}

/// Query parameters for `GET /carbon`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct CarbonParams {
    /// One of `car`, `bus`, `train`, `flight`, `electricity`. Defaults to `car`.
    pub activity: Option<String>,
    /// Distance in km, or energy in kWh for `electricity`. Defaults to 10.
    pub value: Option<f64>,
    /// User performing the calculation.
    pub username: Option<String>,
}

/// `GET /air_quality` -- gated AQI check for a city.
#[utoipa::path(
    get,
    path = "/air_quality",
    tag = "Environment",
    summary = "Air quality check",
    description = "Consumes one aqi_checks slot, fetches the current AQI with a pollutant breakdown, and awards points on success.",
    params(LocationParams),
    responses(
        (status = 200, description = "Air quality payload merged with points fields, or an error payload when the provider failed", body = ActionPointsFields),
        (status = 400, description = "Missing or invalid input", body = ErrorResponse),
        (status = 429, description = "Daily limit reached", body = QuotaExceededResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn air_quality(
    State(state): State<AppState>,
    params: Result<Query<LocationParams>, QueryRejection>,
) -> Result<impl IntoResponse, ServerError> {
    let Query(params) = params?;
    let username = require_username(params.username.clone())?;
    let request = AirQualityRequest::new(&username, params.location())?;
    let report = state.gateway.check_air_quality(&request).await?;
    Ok((StatusCode::OK, Json(report.to_json())))
}

/// `GET /forecast` -- gated multi-day AQI forecast.
#[utoipa::path(
    get,
    path = "/forecast",
    tag = "Environment",
    summary = "Air quality forecast",
    description = "Consumes one forecast_checks slot and returns a simulated daily AQI forecast starting tomorrow.",
    params(LocationParams),
    responses(
        (status = 200, description = "Forecast payload merged with points fields", body = ActionPointsFields),
        (status = 400, description = "Missing or invalid input", body = ErrorResponse),
        (status = 429, description = "Daily limit reached", body = QuotaExceededResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn forecast(
    State(state): State<AppState>,
    params: Result<Query<LocationParams>, QueryRejection>,
) -> Result<impl IntoResponse, ServerError> {
    let Query(params) = params?;
    let username = require_username(params.username.clone())?;
    let request = ForecastRequest::new(&username, params.location(), params.days)?;
    let report = state.gateway.check_forecast(&request).await?;
    Ok((StatusCode::OK, Json(report.to_json())))
}

/// `GET /carbon` -- gated carbon estimate for an activity.
#[utoipa::path(
    get,
    path = "/carbon",
    tag = "Environment",
    summary = "Carbon estimate",
    description = "Validates the activity, consumes one carbon_calculations slot, and estimates kgCO2 for the given distance or energy.",
    params(CarbonParams),
    responses(
        (status = 200, description = "Estimate merged with points fields, or an error payload when the estimator failed", body = ActionFailedResponse),
        (status = 400, description = "Unsupported activity or invalid value", body = ErrorResponse),
        (status = 429, description = "Daily limit reached", body = QuotaExceededResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn carbon(
    State(state): State<AppState>,
    params: Result<Query<CarbonParams>, QueryRejection>,
) -> Result<impl IntoResponse, ServerError> {
    let Query(params) = params?;
    let username = require_username(params.username)?;
    let activity = params.activity.as_deref().unwrap_or("car");
    let request = CarbonRequest::new(&username, activity, params.value.unwrap_or(10.0))?;
    let report = state.gateway.calculate_carbon(&request).await?;
    Ok((StatusCode::OK, Json(report.to_json())))
}
