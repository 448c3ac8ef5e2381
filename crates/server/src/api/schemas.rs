use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Root banner.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RootResponse {
    #[schema(example = "EcoQuest API: air quality, forecasts, and carbon estimates")]
    pub message: String,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status indicator.
    #[schema(example = "ok")]
    pub status: String,
    /// Current gateway metrics snapshot.
    pub metrics: MetricsResponse,
}

/// Gateway action counters.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MetricsResponse {
    /// Gated actions that reached the orchestrator.
    #[schema(example = 142)]
    pub requested: u64,
    /// Actions that fetched data and awarded points.
    #[schema(example = 120)]
    pub completed: u64,
    /// Actions whose provider failed or timed out.
    #[schema(example = 4)]
    pub failed: u64,
    /// Completed actions served with synthetic data.
    #[schema(example = 31)]
    pub fallbacks: u64,
    /// Actions rejected by a daily limit.
    #[schema(example = 18)]
    pub quota_rejected: u64,
    /// Total points credited by completed actions.
    #[schema(example = 1230)]
    pub points_awarded: u64,
}

impl From<ecoquest_gateway::MetricsSnapshot> for MetricsResponse {
    fn from(snap: ecoquest_gateway::MetricsSnapshot) -> Self {
        Self {
            requested: snap.requested,
            completed: snap.completed,
            failed: snap.failed,
            fallbacks: snap.fallbacks,
            quota_rejected: snap.quota_rejected,
            points_awarded: snap.points_awarded,
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message.
    #[schema(example = "username is required")]
    pub error: String,
}

/// Body returned when a daily limit blocks an action.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct QuotaExceededResponse {
    #[schema(example = "daily limit reached for aqi_checks")]
    pub error: String,
    /// Counter that is exhausted.
    #[schema(example = "aqi_checks")]
    pub action: String,
    #[schema(example = 5)]
    pub limit: u32,
}

/// Body returned when a collaborator fails after the quota slot was used.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ActionFailedResponse {
    #[schema(example = "Failed to fetch carbon data: upstream returned 500")]
    pub error: String,
    #[schema(example = 9)]
    pub remaining_checks: u32,
}

/// Points fields merged into every completed action payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ActionPointsFields {
    #[schema(example = 10)]
    pub points_earned: i64,
    #[schema(example = 40)]
    pub total_points: i64,
    #[schema(example = 4)]
    pub remaining_checks: u32,
    /// `"live"` or `"fallback"`.
    #[schema(example = "live")]
    pub data_source: String,
    /// Present when synthetic data was served.
    pub fallback_reason: Option<String>,
}

/// Ungated points adjustment.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdatePointsRequest {
    #[schema(example = "alice")]
    pub username: Option<String>,
    /// Signed change to apply.
    #[schema(example = -20)]
    pub delta: Option<i64>,
}

/// Balance after an adjustment.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PointsResponse {
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = 80)]
    pub points: i64,
}
