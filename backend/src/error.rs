//! Request-level errors and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tasks_shared::ValidationErrors;
use tracing::error;

use crate::db::StorageError;

pub const TASK_NOT_FOUND: &str = "Task not found";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Task not found")]
    NotFound,

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            Self::NotFound => json!({ "detail": TASK_NOT_FOUND }),
            Self::Validation(errors) => json!({ "detail": errors.errors() }),
            Self::Storage(e) => {
                error!(error = %e, "Storage failure");
                json!({ "detail": "Internal Server Error" })
            }
        };
        (status, Json(body)).into_response()
    }
}
