//! Store-facing errors for catalog, cart, checkout, enrollment and refund
//! operations.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | CourseNotFound, JourneyNotFound, PaymentNotFound, NotInCart | 404 |
//! | Forbidden | 403 |
//! | AlreadyInCart, AlreadyOwned, RefundInProgress, Conflict | 409 |
//! | NotPurchasable, EmptyCart, ValidationFailed | 400 |
//! | InvalidState, RefundNotAllowed | 422 |
//! | Gateway | 502 |
//! | Infrastructure | 500 |

use thiserror::Error;

use crate::domain::catalog::CatalogItem;
use crate::domain::foundation::{CourseId, DomainError, ErrorCode, JourneyId, PaymentId};
use crate::domain::refund::RefundRejection;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Course not found: {0}")]
    CourseNotFound(CourseId),

    #[error("Journey not found: {0}")]
    JourneyNotFound(JourneyId),

    #[error("Payment not found: {0}")]
    PaymentNotFound(PaymentId),

    #[error("{0} is not available for purchase")]
    NotPurchasable(CatalogItem),

    #[error("{0} is already in the cart")]
    AlreadyInCart(CatalogItem),

    #[error("{0} is not in the cart")]
    NotInCart(CatalogItem),

    #[error("You already have access to {0}")]
    AlreadyOwned(CatalogItem),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Refund not allowed: {0}")]
    RefundNotAllowed(String),

    #[error("A refund is already in progress for payment {0}")]
    RefundInProgress(PaymentId),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Validation failed for '{field}': {message}")]
    ValidationFailed { field: String, message: String },

    #[error("Payment gateway error: {0}")]
    Gateway(String),

    #[error("Concurrent update: {0}")]
    Conflict(String),

    #[error("Error: {0}")]
    Infrastructure(String),
}

impl StoreError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        StoreError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        StoreError::Forbidden(message.into())
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        StoreError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            StoreError::CourseNotFound(_) => ErrorCode::CourseNotFound,
            StoreError::JourneyNotFound(_) => ErrorCode::JourneyNotFound,
            StoreError::PaymentNotFound(_) => ErrorCode::PaymentNotFound,
            StoreError::NotInCart(_) => ErrorCode::NotFound,
            StoreError::AlreadyInCart(_)
            | StoreError::AlreadyOwned(_)
            | StoreError::RefundInProgress(_) => ErrorCode::AlreadyExists,
            StoreError::NotPurchasable(_)
            | StoreError::EmptyCart
            | StoreError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            StoreError::Forbidden(_) => ErrorCode::Forbidden,
            StoreError::RefundNotAllowed(_) | StoreError::InvalidState(_) => {
                ErrorCode::InvalidStateTransition
            }
            StoreError::Gateway(_) => ErrorCode::ExternalServiceError,
            StoreError::Conflict(_) => ErrorCode::ConcurrencyConflict,
            StoreError::Infrastructure(_) => ErrorCode::InternalError,
        }
    }

    /// Returns true if the same request may succeed later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::Gateway(_) | StoreError::Conflict(_) | StoreError::Infrastructure(_)
        )
    }
}

impl From<DomainError> for StoreError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => StoreError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            ErrorCode::AlreadyExists => StoreError::Conflict(err.message),
            ErrorCode::InvalidStateTransition => StoreError::InvalidState(err.message),
            ErrorCode::Forbidden => StoreError::Forbidden(err.message),
            ErrorCode::ConcurrencyConflict => StoreError::Conflict(err.message),
            ErrorCode::ExternalServiceError => StoreError::Gateway(err.message),
            _ => StoreError::Infrastructure(err.to_string()),
        }
    }
}

impl From<RefundRejection> for StoreError {
    fn from(rejection: RefundRejection) -> Self {
        match rejection {
            RefundRejection::NotOwner => StoreError::Forbidden(rejection.to_string()),
            RefundRejection::NotApproved(_)
            | RefundRejection::WindowClosed { .. }
            | RefundRejection::AlreadyRequested => {
                StoreError::RefundNotAllowed(rejection.to_string())
            }
        }
    }
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}
