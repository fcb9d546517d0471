//! User handlers.

use axum::{
    extract::{Extension, Path, State},
    middleware::from_fn,
    response::Json,
    routing::{get, patch, post},
    Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use account_service_lib::{AccountQuery, PasswordChange};
use auth_service_lib::Identity;
use common::{AppResult, Created, CreatedId, ListResponse, MessageResponse};
use domain::{
    AccountResponse, CreateAccount, UpdateAccount, DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE,
    MAX_NAME_LENGTH, MAX_PAGE_SIZE, MAX_PASSWORD_LENGTH, MAX_USERNAME_LENGTH, MIN_NAME_LENGTH,
    MIN_PASSWORD_LENGTH, MIN_USERNAME_LENGTH, ROLE_USER,
};

use super::parse_id;
use crate::extractors::{ValidatedJson, ValidatedQuery};
use crate::middleware::{admin_middleware, self_or_admin_middleware};
use crate::state::AppState;

/// Account creation request with validation
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(email(message = "invalid email format"))]
    #[schema(example = "jane@example.com")]
    pub email: String,
    #[validate(length(
        min = MIN_USERNAME_LENGTH,
        max = MAX_USERNAME_LENGTH,
        message = "username must be 3-50 characters"
    ))]
    #[schema(example = "jane")]
    pub username: String,
    #[validate(length(
        min = MIN_PASSWORD_LENGTH,
        max = MAX_PASSWORD_LENGTH,
        message = "password must be 8-100 characters"
    ))]
    #[schema(example = "password123")]
    pub password: String,
    #[validate(length(
        min = MIN_NAME_LENGTH,
        max = MAX_NAME_LENGTH,
        message = "name must be 1-100 characters"
    ))]
    #[schema(example = "Jane Doe")]
    pub name: String,
    /// `admin`, `user` or `viewer`; defaults to `user`
    #[schema(example = "user")]
    pub role: Option<String>,
}

/// Partial account update; absent fields are left alone
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(email(message = "invalid email format"))]
    pub email: Option<String>,
    #[validate(length(
        min = MIN_USERNAME_LENGTH,
        max = MAX_USERNAME_LENGTH,
        message = "username must be 3-50 characters"
    ))]
    pub username: Option<String>,
    #[validate(length(
        min = MIN_NAME_LENGTH,
        max = MAX_NAME_LENGTH,
        message = "name must be 1-100 characters"
    ))]
    pub name: Option<String>,
    #[schema(example = "viewer")]
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "current password is required"))]
    pub current_password: String,
    #[validate(length(
        min = MIN_PASSWORD_LENGTH,
        max = MAX_PASSWORD_LENGTH,
        message = "password must be 8-100 characters"
    ))]
    pub new_password: String,
}

/// Listing parameters
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListUsersQuery {
    /// 1-based page number (default 1)
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: Option<u64>,
    /// Page size, 1-100 (default 20)
    #[validate(range(
        min = 1,
        max = MAX_PAGE_SIZE,
        message = "size must be between 1 and 100"
    ))]
    pub size: Option<u64>,
    /// Only return active accounts
    pub only_active: Option<bool>,
}

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_users)
                .post(create_user)
                .route_layer(from_fn(admin_middleware)),
        )
        .route(
            "/:id",
            get(get_user)
                .route_layer(from_fn(self_or_admin_middleware))
                .merge(
                    patch(update_user)
                        .delete(delete_user)
                        .route_layer(from_fn(admin_middleware)),
                ),
        )
        .route(
            "/:id/change-password",
            post(change_password).route_layer(from_fn(self_or_admin_middleware)),
        )
}

/// Get current authenticated user
#[utoipa::path(
    get,
    path = "/api/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user profile", body = AccountResponse),
        (status = 401, description = "Unauthorized", body = common::ErrorResponse)
    )
)]
pub async fn get_current_user(
    Extension(identity): Extension<Identity>,
    State(state): State<AppState>,
) -> AppResult<Json<AccountResponse>> {
    let account = state.accounts.get_account(identity.user_id).await?;
    Ok(Json(AccountResponse::from(account)))
}

/// List users, newest first (admin only)
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Page of users: total_count, count, data"),
        (status = 400, description = "Invalid paging parameters", body = common::ErrorResponse),
        (status = 401, description = "Unauthorized", body = common::ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = common::ErrorResponse)
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<ListUsersQuery>,
) -> AppResult<Json<ListResponse<AccountResponse>>> {
    let page = state
        .accounts
        .list_accounts(AccountQuery {
            page: query.page.unwrap_or(DEFAULT_PAGE_NUMBER),
            size: query.size.unwrap_or(DEFAULT_PAGE_SIZE),
            only_active: query.only_active.unwrap_or(false),
        })
        .await?;

    let data = page.accounts.iter().map(AccountResponse::from).collect();
    Ok(Json(ListResponse::new(data, page.total_count)))
}

/// Create a user (admin only)
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = CreatedId),
        (status = 400, description = "Validation error", body = common::ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = common::ErrorResponse),
        (status = 409, description = "Email already registered", body = common::ErrorResponse)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> AppResult<Created<CreatedId>> {
    let id = state
        .accounts
        .create_account(CreateAccount {
            email: payload.email,
            username: payload.username,
            password: payload.password,
            name: payload.name,
            role: payload.role.unwrap_or_else(|| ROLE_USER.to_string()),
        })
        .await?;

    Ok(Created(CreatedId { id }))
}

/// Get user by ID (own profile or admin)
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User profile", body = AccountResponse),
        (status = 400, description = "Invalid user id", body = common::ErrorResponse),
        (status = 403, description = "Forbidden - Can only view own profile unless admin", body = common::ErrorResponse),
        (status = 404, description = "User not found", body = common::ErrorResponse)
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<AccountResponse>> {
    let account = state.accounts.get_account(parse_id(&id)?).await?;
    Ok(Json(AccountResponse::from(account)))
}

/// Update user fields (admin only)
#[utoipa::path(
    patch,
    path = "/api/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = MessageResponse),
        (status = 400, description = "Validation error", body = common::ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = common::ErrorResponse),
        (status = 404, description = "User not found", body = common::ErrorResponse),
        (status = 409, description = "Email already registered", body = common::ErrorResponse)
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> AppResult<Json<MessageResponse>> {
    state
        .accounts
        .update_account(
            parse_id(&id)?,
            UpdateAccount {
                email: payload.email,
                username: payload.username,
                name: payload.name,
                role: payload.role,
                is_active: payload.is_active,
            },
        )
        .await?;

    Ok(Json(MessageResponse::new("user updated successfully")))
}

/// Delete user (admin only)
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 403, description = "Forbidden - Admin only", body = common::ErrorResponse),
        (status = 404, description = "User not found", body = common::ErrorResponse)
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state.accounts.delete_account(parse_id(&id)?).await?;
    Ok(Json(MessageResponse::new("user deleted successfully")))
}

/// Change password (own account or admin; current password required)
#[utoipa::path(
    post,
    path = "/api/users/{id}/change-password",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "User ID")),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Validation error", body = common::ErrorResponse),
        (status = 401, description = "Current password is wrong", body = common::ErrorResponse),
        (status = 403, description = "Forbidden", body = common::ErrorResponse),
        (status = 404, description = "User not found", body = common::ErrorResponse)
    )
)]
pub async fn change_password(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<ChangePasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    state
        .accounts
        .change_password(
            parse_id(&id)?,
            PasswordChange {
                current_password: payload.current_password,
                new_password: payload.new_password,
            },
        )
        .await?;

    Ok(Json(MessageResponse::new("password changed successfully")))
}
