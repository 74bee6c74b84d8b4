use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

use crate::models::ApiResponse;

/// Message shown to clients when a store call fails. Details go to the log.
pub const GENERIC_FAILURE: &str = "Operation failed, please try again";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Database(sqlx::Error),
    #[error(transparent)]
    Internal(anyhow::Error),
}

/// Constraint violations are the caller's problem, not a transient failure.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return AppError::Conflict("a record with this id already exists".to_string());
            }
            if db_err.is_foreign_key_violation() {
                return AppError::Conflict(
                    "the record is referenced by other records or points at a missing one"
                        .to_string(),
                );
            }
        }
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<sqlx::Error>() {
            Ok(sqlx_err) => AppError::from(sqlx_err),
            Err(other) => AppError::Internal(other),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        AppError::NotFound(what.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// What the user gets to see.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(_) | AppError::NotFound(_) | AppError::Conflict(_) => {
                self.to_string()
            }
            AppError::Database(_) | AppError::Internal(_) => GENERIC_FAILURE.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {:#}", self);
        }
        let body = ApiResponse::<()>::error(self.user_message());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_are_hidden_from_users() {
        let err = AppError::from(anyhow::anyhow!("disk I/O error at page 42"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.user_message(), GENERIC_FAILURE);
    }

    #[test]
    fn test_wrapped_store_errors_keep_their_kind() {
        let err = AppError::from(anyhow::Error::from(sqlx::Error::RowNotFound));
        assert!(matches!(err, AppError::Database(sqlx::Error::RowNotFound)));
        assert_eq!(err.user_message(), GENERIC_FAILURE);
    }

    #[test]
    fn test_validation_message_is_passed_through() {
        let err = AppError::validation("end date is before start date");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.user_message(), "end date is before start date");

        let err = AppError::not_found("match");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.user_message(), "match not found");
    }
}
