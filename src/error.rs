//! Application error taxonomy and its HTTP mapping.
//!
//! Three kinds of failure leave the core: caller input that violates a field
//! constraint, a lookup that found nothing, and a backing store that could
//! not complete a read or write. The HTTP mapping keeps them distinguishable
//! so a client can tell "fix your input" from "try again later".

use crate::store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Caller-supplied input violates a field constraint. Never retried,
    /// never partially applied.
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// A lookup by id found no matching record. A normal negative result,
    /// not a system fault.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The backing store could not complete the requested read or write.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    /// The AI backend could not be reached or returned garbage at the
    /// transport level.
    #[error("ai service error: {0}")]
    Ai(anyhow::Error),
}

impl AppError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field,
            message: message.into(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'static str>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, field) = match &self {
            AppError::Validation { field, .. } => (StatusCode::BAD_REQUEST, Some(*field)),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, None),
            AppError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, None),
            AppError::Ai(_) => (StatusCode::INTERNAL_SERVER_ERROR, None),
        };

        let body = ErrorBody {
            error: self.to_string(),
            field,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_400() {
        let response = AppError::validation("dish", "must not be empty").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_found_is_not_a_5xx() {
        let response = AppError::NotFound("food analysis").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_storage_maps_to_500() {
        let err = AppError::Storage(StoreError::Unavailable("down".to_string()));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_message_names_offending_field() {
        let err = AppError::validation("healthScore", "must be an integer between 0 and 100");
        assert!(err.to_string().contains("healthScore"));
    }
}
