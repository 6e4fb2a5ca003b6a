use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use serde_json::json;
use thiserror::Error;

use crate::services::currency_client::RateError;
use crate::services::reports::UnsupportedGrouping;

/// Errors a request handler can end with.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or out-of-range input, caught before any store or FX call.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Rate(#[from] RateError),

    #[error("Expense not found")]
    NotFound,

    #[error(transparent)]
    UnsupportedGrouping(#[from] UnsupportedGrouping),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    pub fn validation<S: Into<String>>(message: S) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Rate(RateError::Unavailable(_)) => StatusCode::BAD_REQUEST,
            ApiError::Rate(RateError::Transport(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::UnsupportedGrouping(_) => StatusCode::BAD_REQUEST,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = if status.is_server_error() {
            error!("request failed: {self}");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
