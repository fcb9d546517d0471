//! Validating JSON and query extractors.

use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Query, Request,
    },
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use common::AppError;
use domain::DomainError;

/// JSON extractor that automatically validates the payload.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::validation(e.body_text()))?;

        value.validate().map_err(first_violation)?;
        Ok(ValidatedJson(value))
    }
}

/// Query-string extractor with the same validation and error shape.
pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e: QueryRejection| AppError::validation(e.body_text()))?;

        value.validate().map_err(first_violation)?;
        Ok(ValidatedQuery(value))
    }
}

/// Report the first failing field, alphabetically, so the message is stable.
fn first_violation(errors: ValidationErrors) -> AppError {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let Some((field, violations)) = fields.into_iter().next() else {
        return AppError::validation("validation failed");
    };

    let message = violations
        .first()
        .and_then(|v| v.message.as_ref())
        .map(|m| m.to_string())
        .unwrap_or_else(|| "is invalid".to_string());

    DomainError::invalid_field(field.to_string(), message).into()
}
