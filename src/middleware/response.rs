use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::services::pagination::PageInfo;

/// Wrapper for API responses that renders the
/// `{status: {code, message}, data}` envelope.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with 200 status
    pub fn success(data: T) -> Self {
        Self {
            data,
            status_code: StatusCode::OK,
        }
    }

    /// Create a 201 Created response
    pub fn created(data: T) -> Self {
        Self {
            data,
            status_code: StatusCode::CREATED,
        }
    }
}

fn status_message(status: StatusCode) -> &'static str {
    match status {
        StatusCode::CREATED => "Created",
        _ => "Success",
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("failed to serialize response data: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "status": {
                            "code": 500,
                            "message": "Failed to format response"
                        }
                    })),
                )
                    .into_response();
            }
        };

        let envelope = json!({
            "status": {
                "code": self.status_code.as_u16(),
                "message": status_message(self.status_code),
            },
            "data": data_value,
        });

        (self.status_code, Json(envelope)).into_response()
    }
}

/// Envelope for paginated listings; adds the pagination block the clients
/// page through.
#[derive(Debug)]
pub struct PaginatedResponse<T: Serialize> {
    pub data: Vec<T>,
    pub pagination: PageInfo,
}

impl<T: Serialize> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, pagination: PageInfo) -> Self {
        Self { data, pagination }
    }
}

impl<T: Serialize> IntoResponse for PaginatedResponse<T> {
    fn into_response(self) -> Response {
        let envelope = json!({
            "status": {
                "code": 200,
                "message": "Success",
            },
            "data": self.data,
            "pagination": self.pagination,
        });

        (StatusCode::OK, Json(envelope)).into_response()
    }
}
