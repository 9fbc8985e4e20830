//! Errors surfaced by the task routes.
//!
//! Every failure is one of three kinds and is reported immediately with the
//! underlying message text. Nothing is retried.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::envelope::Envelope;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// A required field is missing or a value could not be parsed (400).
    #[error("{0}")]
    Validation(String),

    /// The addressed task does not exist (404).
    #[error("Task not found")]
    NotFound,

    /// Anything else, including store failures (500).
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound => StatusCode::NOT_FOUND,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

impl From<JsonRejection> for ServiceError {
    fn from(rejection: JsonRejection) -> Self {
        ServiceError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ServiceError {
    fn from(rejection: QueryRejection) -> Self {
        ServiceError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ServiceError::Internal(message) => tracing::error!(%message, "request failed"),
            other => tracing::debug!(%status, message = %other, "request rejected"),
        }
        (status, Json(Envelope::<()>::failure(self.to_string()))).into_response()
    }
}
