//! Request-level errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use edge_core::EdgeError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed request, such as an unsupported asset symbol
    #[error("{0}")]
    BadRequest(String),

    /// Deployment defect, such as an invalid dependency path
    #[error("{0}")]
    Internal(String),
}

impl From<EdgeError> for ApiError {
    fn from(e: EdgeError) -> Self {
        match e {
            EdgeError::UnsupportedAsset(_) => ApiError::BadRequest(e.to_string()),
            other => {
                error!("Builder failed: {}", other);
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.to_string()
            }
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
