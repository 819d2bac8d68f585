//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::cache::CacheError;
use crate::db::RepositoryError;
use crate::services::{OrderError, ReportError, SyncError};

/// Application-level error type for the order service.
#[derive(Debug, Error)]
pub enum AppError {
    /// Order validation or write failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Cache read failed.
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Cache sync failed.
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    /// Report computation failed.
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Whether this error is a server-side failure worth tracking, as
    /// opposed to a client mistake.
    const fn is_server_error(&self) -> bool {
        match self {
            Self::Database(_) | Self::Cache(_) | Self::Sync(_) | Self::Report(_) => true,
            Self::Order(err) => matches!(err, OrderError::Ledger(_)),
            Self::NotFound(_) => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Order(err) => match err {
                OrderError::InvalidInput
                | OrderError::InvalidProductId(_)
                | OrderError::InvalidQuantity(_) => StatusCode::BAD_REQUEST,
                OrderError::UnknownProduct(_) => StatusCode::UNPROCESSABLE_ENTITY,
                OrderError::Ledger(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Database(_) | Self::Cache(_) | Self::Sync(_) | Self::Report(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        };

        // Don't expose internal error details to clients
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use orderflow_core::ProductId;

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_validation_errors_are_bad_request() {
        assert_eq!(
            get_status(AppError::Order(OrderError::InvalidInput)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Order(OrderError::InvalidProductId(
                "abc".to_string()
            ))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Order(OrderError::InvalidQuantity("0".to_string()))),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_unknown_product_is_unprocessable() {
        assert_eq!(
            get_status(AppError::Order(OrderError::UnknownProduct(ProductId::new(
                9
            )))),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_not_found_status() {
        assert_eq!(
            get_status(AppError::NotFound("order 1".to_string())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let response = AppError::Order(OrderError::Ledger(
            sqlx::Error::PoolClosed.into(),
        ))
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
