//! Response helpers shared by HTTP handlers.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

/// Message-only response
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body returned after a resource is created
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreatedId {
    pub id: i64,
}

/// List page: `count` items of `total_count` in `data`
#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub total_count: u64,
    pub count: usize,
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>, total_count: u64) -> Self {
        Self {
            total_count,
            count: data.len(),
            data,
        }
    }
}

/// 201 Created with a JSON body
pub struct Created<T: Serialize>(pub T);

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::CREATED, Json(self.0)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_count_follows_data() {
        let page = ListResponse::new(vec![1, 2, 3], 42);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["total_count"], 42);
        assert_eq!(json["count"], 3);
    }

    #[test]
    fn test_created_status() {
        let response = Created(CreatedId { id: 5 }).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
