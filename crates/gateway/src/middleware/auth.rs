//! Authentication middleware and access gates.
//!
//! `auth_middleware` resolves the caller and stores an [`Identity`] in the
//! request extensions. The gates read it from there and must be layered inside
//! the authentication middleware.

use axum::{
    body::Body,
    extract::{RawPathParams, State},
    http::{
        header::{AUTHORIZATION, VARY},
        HeaderValue, Request,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};

use auth_service_lib::{require_admin, require_self_or_admin, Identity};
use common::AppError;

use crate::state::AppState;

/// Authentication middleware that validates bearer tokens.
///
/// Every response, success or rejection, varies on `Authorization`.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let header = request.headers().get(AUTHORIZATION).map(HeaderValue::as_bytes);

    let mut response = match state.policy.authenticate(header) {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => AppError::from(e).into_response(),
    };

    response
        .headers_mut()
        .append(VARY, HeaderValue::from_static("Authorization"));
    response
}

/// Admit administrators only.
pub async fn admin_middleware(request: Request<Body>, next: Next) -> Result<Response, AppError> {
    require_admin(request.extensions().get::<Identity>())?;
    Ok(next.run(request).await)
}

/// Admit administrators, or callers addressing their own `:id`.
pub async fn self_or_admin_middleware(
    params: RawPathParams,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let id = params
        .iter()
        .find(|(name, _)| *name == "id")
        .map(|(_, value)| value)
        .unwrap_or_default();

    require_self_or_admin(request.extensions().get::<Identity>(), id)?;
    Ok(next.run(request).await)
}
