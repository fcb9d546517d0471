//! Health check and welcome handlers.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub database: ServiceHealth,
}

/// Service health with optional error message.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ServiceHealth {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WelcomeResponse {
    pub name: String,
    pub version: String,
}

/// Create health routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/", get(health_check))
}

/// Liveness plus a database ping
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Response {
    let database = match &state.database {
        None => ServiceHealth {
            status: "disabled".to_string(),
            error: None,
        },
        Some(db) => match db.ping().await {
            Ok(()) => ServiceHealth {
                status: "healthy".to_string(),
                error: None,
            },
            Err(e) => {
                tracing::error!(error = %e, "database ping failed");
                ServiceHealth {
                    status: "unhealthy".to_string(),
                    error: Some("database unreachable".to_string()),
                }
            }
        },
    };

    let healthy = database.status != "unhealthy";
    let response = HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        database,
    };

    if healthy {
        (StatusCode::OK, Json(response)).into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response)).into_response()
    }
}

/// API name and version
#[utoipa::path(
    get,
    path = "/api",
    tag = "Health",
    responses((status = 200, description = "Welcome payload", body = WelcomeResponse))
)]
pub async fn welcome() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
