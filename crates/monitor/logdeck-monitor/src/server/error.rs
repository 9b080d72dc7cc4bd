use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use logdeck_store::StoreError;
use serde_json::json;
use thiserror::Error;

/// Errors returned to HTTP callers as `{ "error": message }`
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match self {
            ApiError::BadRequest(msg) | ApiError::Unavailable(msg) => msg,
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                "Internal server error".to_string()
            }
        };

        (status, Json(json!({ "error": error_message }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        if err.is_client_error() {
            ApiError::BadRequest(err.to_string())
        } else {
            ApiError::Internal(err.to_string())
        }
    }
}
