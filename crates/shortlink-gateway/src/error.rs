use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use shortlink_recycle_bin::RecycleBinError;
use thiserror::Error;
use tracing::error;

use crate::model::ApiResponse;

pub type Result<T> = std::result::Result<T, AppError>;

const CLIENT_ERROR_CODE: &str = "A000001";
const SERVICE_ERROR_CODE: &str = "B000001";
const UNAVAILABLE_ERROR_CODE: &str = "C000001";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unavailable(String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, CLIENT_ERROR_CODE),
            AppError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, UNAVAILABLE_ERROR_CODE),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, SERVICE_ERROR_CODE),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = match &self {
            AppError::BadRequest(message) => message.clone(),
            AppError::Unavailable(detail) => {
                error!(error = %detail, "backing store unavailable");
                "service temporarily unavailable".to_string()
            }
            AppError::Internal(detail) => {
                error!(error = %detail, "request failed");
                "internal server error".to_string()
            }
        };
        (status, Json(ApiResponse::<()>::failure(code, message))).into_response()
    }
}

impl From<RecycleBinError> for AppError {
    fn from(err: RecycleBinError) -> Self {
        if err.is_unavailable() {
            AppError::Unavailable(err.to_string())
        } else {
            AppError::Internal(err.to_string())
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}
