#![allow(clippy::needless_for_each)]

use ecoquest_core::{ActionKind, DailyActions, DailyLimits, LeaderboardEntry, UserSummary};

use super::schemas::{
    ActionFailedResponse, ActionPointsFields, ErrorResponse, HealthResponse, MetricsResponse,
    PointsResponse, QuotaExceededResponse, RootResponse, UpdatePointsRequest,
};

#[derive(utoipa::OpenApi)]
#[openapi(
    info(
        title = "EcoQuest API",
        version = "0.1.0",
        description = "Air quality checks, AQI forecasts, and carbon estimates with per-user daily limits, points, and a leaderboard.",
        license(name = "Apache-2.0")
    ),
    tags(
        (name = "Health", description = "Service health and metrics"),
        (name = "Environment", description = "Quota-gated air quality, forecast, and carbon actions"),
        (name = "Users", description = "Point balances, adjustments, and the leaderboard")
    ),
    paths(
        super::health::root,
        super::health::health,
        super::health::metrics,
        super::environment::air_quality,
        super::environment::forecast,
        super::environment::carbon,
        super::users::get_user,
        super::users::update_points,
        super::users::leaderboard,
    ),
    components(schemas(
        RootResponse,
        HealthResponse,
        MetricsResponse,
        ErrorResponse,
        QuotaExceededResponse,
        ActionFailedResponse,
        ActionPointsFields,
        UpdatePointsRequest,
        PointsResponse,
        ActionKind,
        DailyActions,
        DailyLimits,
        LeaderboardEntry,
        UserSummary,
    ))
)]
pub struct ApiDoc;
