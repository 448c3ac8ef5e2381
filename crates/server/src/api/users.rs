use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;
use utoipa::IntoParams;

use ecoquest_core::{LeaderboardEntry, UserSummary, Username};
use ecoquest_gateway::GatewayError;

use crate::error::ServerError;

use super::schemas::{ErrorResponse, PointsResponse, UpdatePointsRequest};
use super::{AppState, require_username};

pub const DEFAULT_LEADERBOARD_SIZE: usize = 10;
pub const MAX_LEADERBOARD_SIZE: usize = 100;

/// Query parameters for `GET /leaderboard`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct LeaderboardParams {
    /// Number of entries to return (default 10, max 100).
    pub limit: Option<usize>,
}

/// `GET /user/{username}` -- balance, today's counters, and limits.
#[utoipa::path(
    get,
    path = "/user/{username}",
    tag = "Users",
    summary = "User summary",
    description = "Returns the user's point balance, today's action counts, and the daily limits. Unknown users are created with zero points.",
    params(
        ("username" = String, Path, description = "User name")
    ),
    responses(
        (status = 200, description = "User summary", body = UserSummary),
        (status = 400, description = "Blank username", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    let username = Username::parse(&username).map_err(GatewayError::from)?;
    let summary = state.gateway.user_summary(&username).await?;
    Ok((StatusCode::OK, Json(summary)))
}

/// `POST /update_points` -- ungated administrative balance change.
///
/// Accepts a JSON body `{username, delta}`; the same fields are also read
/// from the query string, with the body taking precedence.
#[utoipa::path(
    post,
    path = "/update_points",
    tag = "Users",
    summary = "Adjust points",
    description = "Applies a signed delta to the user's balance. Not subject to daily limits.",
    request_body(content = UpdatePointsRequest, description = "User and signed delta"),
    params(
        ("username" = Option<String>, Query, description = "User name (if not in the body)"),
        ("delta" = Option<i64>, Query, description = "Signed change (if not in the body)")
    ),
    responses(
        (status = 200, description = "New balance", body = PointsResponse),
        (status = 400, description = "Missing username or delta", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn update_points(
    State(state): State<AppState>,
    query: Result<Query<UpdatePointsRequest>, QueryRejection>,
    body: Bytes,
) -> Result<impl IntoResponse, ServerError> {
    let Query(query) = query?;
    let from_body: Option<UpdatePointsRequest> = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        Some(
            serde_json::from_slice(&body)
                .map_err(|e| ServerError::BadRequest(format!("invalid JSON body: {e}")))?,
        )
    };
    let (body_username, body_delta) = from_body.map_or((None, None), |b| (b.username, b.delta));

    let username = require_username(body_username.or(query.username))?;
    let delta = body_delta
        .or(query.delta)
        .ok_or_else(|| ServerError::BadRequest("delta is required".into()))?;

    let username = Username::parse(&username).map_err(GatewayError::from)?;
    let points = state.gateway.adjust_points(&username, delta).await?;

    Ok((
        StatusCode::OK,
        Json(PointsResponse {
            username: username.into(),
            points,
        }),
    ))
}

/// `GET /leaderboard` -- top users by points.
#[utoipa::path(
    get,
    path = "/leaderboard",
    tag = "Users",
    summary = "Leaderboard",
    description = "Users ordered by points descending; ties are ordered by username.",
    params(LeaderboardParams),
    responses(
        (status = 200, description = "Top users", body = Vec<LeaderboardEntry>),
        (status = 400, description = "Malformed limit", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn leaderboard(
    State(state): State<AppState>,
    params: Result<Query<LeaderboardParams>, QueryRejection>,
) -> Result<impl IntoResponse, ServerError> {
    let Query(params) = params?;
    let limit = params
        .limit
        .unwrap_or(DEFAULT_LEADERBOARD_SIZE)
        .min(MAX_LEADERBOARD_SIZE);
    let entries = state.gateway.leaderboard(limit).await?;
    Ok((StatusCode::OK, Json(entries)))
}
