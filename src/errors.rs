use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::error::DbErr;
use serde::{Deserialize, Serialize};

/// Standard JSON error body returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Not Found", "Bad Request")
    pub error: String,
    /// Human-readable error description
    pub message: String,
    /// ISO 8601 timestamp when the error occurred
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("User with ID {0} not found")]
    UserNotFound(i32),

    #[error("Order with ID {0} not found")]
    OrderNotFound(i32),

    #[error("Product with ID {0} not found")]
    ProductNotFound(i32),

    #[error("No line for product {product_id} on order {order_id}")]
    AssociationNotFound { order_id: i32, product_id: i32 },

    #[error("Product {product_id} is already on order {order_id}")]
    DuplicateAssociation { order_id: i32, product_id: i32 },

    #[error("Quantity must be a positive integer, got {0}")]
    InvalidQuantity(i32),

    #[error("Email {0} is already registered")]
    EmailTaken(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Transient storage error: {0}")]
    TransientStorage(String),

    #[error("Database error: {0}")]
    DatabaseError(DbErr),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

/// Classifies database errors so retryable connection-level failures keep
/// their transient kind instead of collapsing into a generic 500.
impl From<DbErr> for ServiceError {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::ConnectionAcquire(source) => {
                ServiceError::TransientStorage(source.to_string())
            }
            DbErr::Conn(source) => ServiceError::TransientStorage(source.to_string()),
            other => ServiceError::DatabaseError(other),
        }
    }
}

impl ServiceError {
    /// Returns the HTTP status code for this error.
    /// This is the single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::UserNotFound(_)
            | Self::OrderNotFound(_)
            | Self::ProductNotFound(_)
            | Self::AssociationNotFound { .. } => StatusCode::NOT_FOUND,
            Self::DuplicateAssociation { .. }
            | Self::InvalidQuantity(_)
            | Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::EmailTaken(_) => StatusCode::CONFLICT,
            Self::TransientStorage(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error message suitable for HTTP responses.
    /// Internal errors return generic messages to avoid leaking implementation details.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Database error".to_string(),
            Self::TransientStorage(_) => "Storage temporarily unavailable".to_string(),
            _ => self.to_string(),
        }
    }

    /// Whether a caller may retry the failed operation.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientStorage(_))
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let err = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(err)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_are_distinct_per_kind() {
        assert_eq!(
            ServiceError::OrderNotFound(1).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::AssociationNotFound {
                order_id: 1,
                product_id: 7
            }
            .status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::DuplicateAssociation {
                order_id: 1,
                product_id: 7
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::InvalidQuantity(0).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::EmailTaken("a@b.c".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::TransientStorage("pool exhausted".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn only_transient_errors_are_retryable() {
        assert!(ServiceError::TransientStorage("timeout".into()).is_retryable());
        assert!(!ServiceError::OrderNotFound(3).is_retryable());
        assert!(!ServiceError::DuplicateAssociation {
            order_id: 1,
            product_id: 2
        }
        .is_retryable());
    }

    #[test]
    fn database_errors_hide_details_in_responses() {
        let err = ServiceError::DatabaseError(DbErr::Custom("secret dsn".into()));
        assert_eq!(err.response_message(), "Database error");
    }
}
