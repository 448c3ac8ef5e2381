use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::AppState;
use super::schemas::{HealthResponse, MetricsResponse, RootResponse};

/// `GET /` -- service banner.
#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    summary = "Service banner",
    responses(
        (status = 200, description = "Service banner", body = RootResponse)
    )
)]
pub async fn root() -> impl IntoResponse {
    Json(RootResponse {
        message: "EcoQuest API: air quality, forecasts, and carbon estimates".into(),
    })
}

/// `GET /health` -- returns service status together with a metrics snapshot.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    summary = "Health check",
    description = "Returns service status and a snapshot of gateway action metrics.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let body = HealthResponse {
        status: "ok".into(),
        metrics: state.gateway.metrics().snapshot().into(),
    };

    (StatusCode::OK, Json(body))
}

/// `GET /metrics` -- returns gateway metrics as JSON.
#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Health",
    summary = "Gateway metrics",
    description = "Returns current action counters for monitoring.",
    responses(
        (status = 200, description = "Current metric counters", body = MetricsResponse)
    )
)]
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let body: MetricsResponse = state.gateway.metrics().snapshot().into();
    (StatusCode::OK, Json(body))
}
