pub mod climate;
pub mod health;
pub mod index;
pub mod metrics;

// Common response types
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::errors::DatabaseError;
use serde::Serialize;

/// Standard API error response
///
/// Serializes as `{"error": "<message>"}`; the status code travels beside it.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
        }
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    pub fn not_found(error: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, error)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.")
    }
}

impl From<DatabaseError> for ErrorResponse {
    fn from(err: DatabaseError) -> Self {
        tracing::error!(error = %err, "Dataset query failed");
        Self::internal()
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_has_single_error_key() {
        let body = serde_json::to_value(ErrorResponse::bad_request("bad")).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "bad" }));
    }

    #[test]
    fn test_database_errors_become_internal_errors() {
        let response: ErrorResponse =
            DatabaseError::EmptyDataset("measurement".to_string()).into();
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.error, "Internal server error.");
    }

    #[test]
    fn test_status_is_carried_into_response() {
        let response = ErrorResponse::not_found("missing").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
