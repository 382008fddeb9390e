use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::error::JobError;
use crate::server::types::ApiResponse;

pub type ApiResult = Result<Response, ApiError>;

/// HTTP-facing error taxonomy. Every variant maps to a status code and a
/// message specific enough for the submitter to self-correct or know to
/// escalate.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid job id: {0}")]
    InvalidId(String),

    #[error("{0}")]
    NotFound(String),

    #[error("a verification for this submission is already in progress")]
    AlreadyInProgress,

    #[error("{0}")]
    Unprocessable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<JobError> for ApiError {
    fn from(value: JobError) -> Self {
        match value {
            JobError::Rejected(reason) => ApiError::Unprocessable(reason.to_string()),
            JobError::DuplicateInFlight => ApiError::AlreadyInProgress,
            JobError::NotFound(id) => ApiError::NotFound(format!("job {id} does not exist")),
            JobError::InvalidStatus { .. } => ApiError::Unprocessable(value.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidId(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::AlreadyInProgress => StatusCode::CONFLICT,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(ApiResponse::<()>::error(self.to_string()))).into_response()
    }
}
