pub mod environment;
pub mod health;
pub mod openapi;
pub mod schemas;
pub mod users;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use ecoquest_gateway::Gateway;

use crate::error::ServerError;

use self::openapi::ApiDoc;

/// City used when a request omits `city`.
pub const DEFAULT_CITY: &str = "Mumbai";
/// Country used when a request omits `country`.
pub const DEFAULT_COUNTRY: &str = "India";

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The gateway instance.
    pub gateway: Arc<Gateway>,
}

/// Build the Axum router with all API routes, middleware, and Swagger UI.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root))
        // Health & metrics
        .route("/health", get(health::health))
        .route("/metrics", get(health::metrics))
        // Gated environment actions
        .route("/air_quality", get(environment::air_quality))
        .route("/forecast", get(environment::forecast))
        .route("/carbon", get(environment::carbon))
        // Users & points
        .route("/user/{username}", get(users::get_user))
        .route("/update_points", post(users::update_points))
        .route("/leaderboard", get(users::leaderboard))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Every user-facing endpoint needs a non-blank `username`.
pub(crate) fn require_username(username: Option<String>) -> Result<String, ServerError> {
    match username {
        Some(name) if !name.trim().is_empty() => Ok(name),
        _ => Err(ServerError::BadRequest("username is required".into())),
    }
}
