use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use ecoquest_gateway::GatewayError;

/// Errors that can occur when running the EcoQuest server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O error (e.g. binding the listener).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A required request parameter was missing or malformed.
    #[error("{0}")]
    BadRequest(String),

    /// A gateway-level error surfaced through the API.
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

impl From<QueryRejection> for ServerError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, serde_json::json!({ "error": msg })),
            Self::Gateway(GatewayError::QuotaExceeded { kind, limit }) => (
                StatusCode::TOO_MANY_REQUESTS,
                serde_json::json!({
                    "error": format!("daily limit reached for {kind}"),
                    "action": kind,
                    "limit": limit,
                }),
            ),
            Self::Gateway(
                e @ (GatewayError::InvalidActionKind(_)
                | GatewayError::InvalidUsername
                | GatewayError::UnsupportedActivity(_)
                | GatewayError::InvalidInput(_)),
            ) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": input_message(e) }),
            ),
            Self::Gateway(GatewayError::State(_) | GatewayError::Configuration(_))
            | Self::Config(_)
            | Self::Io(_) => {
                // Storage details stay in the logs.
                error!(error = %self, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": "internal error" }),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

fn input_message(err: &GatewayError) -> String {
    match err {
        GatewayError::UnsupportedActivity(msg) => msg.clone(),
        other => other.to_string(),
    }
}
