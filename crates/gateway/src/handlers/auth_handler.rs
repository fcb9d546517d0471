//! Authentication handlers.

use axum::{extract::State, response::Json, routing::post, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use common::AppResult;
use domain::{AccountResponse, TOKEN_TYPE_BEARER};

use crate::extractors::ValidatedJson;
use crate::state::AppState;

/// Login request with validation
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "invalid email format"))]
    #[schema(example = "jane@example.com")]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    #[schema(example = "password123")]
    pub password: String,
}

/// Issued session
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    /// Always `Bearer`
    pub token_type: String,
    /// Seconds until the token expires
    pub expires_in: i64,
    pub user: AccountResponse,
}

/// Create auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

/// Exchange credentials for a bearer token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Validation error", body = common::ErrorResponse),
        (status = 401, description = "Invalid email or password", body = common::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let session = state
        .accounts
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(LoginResponse {
        expires_in: session.token.expires_in(),
        token: session.token.token,
        token_type: TOKEN_TYPE_BEARER.to_string(),
        user: AccountResponse::from(session.account),
    }))
}
