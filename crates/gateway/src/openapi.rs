//! OpenAPI documentation.

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::handlers::auth_handler::{LoginRequest, LoginResponse};
use crate::handlers::health_handler::{HealthResponse, ServiceHealth, WelcomeResponse};
use crate::handlers::user_handler::{ChangePasswordRequest, CreateUserRequest, UpdateUserRequest};
use common::{CreatedId, ErrorBody, ErrorResponse, MessageResponse};
use domain::{AccountResponse, Role};

/// API documentation struct.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health_handler::health_check,
        crate::handlers::health_handler::welcome,
        crate::handlers::auth_handler::login,
        crate::handlers::user_handler::get_current_user,
        crate::handlers::user_handler::list_users,
        crate::handlers::user_handler::create_user,
        crate::handlers::user_handler::get_user,
        crate::handlers::user_handler::update_user,
        crate::handlers::user_handler::delete_user,
        crate::handlers::user_handler::change_password,
    ),
    components(
        schemas(
            LoginRequest,
            LoginResponse,
            CreateUserRequest,
            UpdateUserRequest,
            ChangePasswordRequest,
            AccountResponse,
            Role,
            CreatedId,
            MessageResponse,
            ErrorResponse,
            ErrorBody,
            HealthResponse,
            ServiceHealth,
            WelcomeResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and service info"),
        (name = "Authentication", description = "Login and token issuance"),
        (name = "Users", description = "Account management endpoints"),
    )
)]
pub struct ApiDoc;

/// Security scheme modifier.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
