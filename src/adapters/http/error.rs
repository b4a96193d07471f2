//! Conversion of store errors into HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::StoreError;

/// JSON error body returned by every endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// API error type that converts store errors to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    Store(StoreError),
    BadRequest(String),
    Unauthorized(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Store(err) => store_status(err),
        }
    }
}

fn store_status(err: &StoreError) -> StatusCode {
    match err {
        StoreError::CourseNotFound(_)
        | StoreError::JourneyNotFound(_)
        | StoreError::PaymentNotFound(_)
        | StoreError::NotInCart(_) => StatusCode::NOT_FOUND,
        StoreError::Forbidden(_) => StatusCode::FORBIDDEN,
        StoreError::AlreadyInCart(_)
        | StoreError::AlreadyOwned(_)
        | StoreError::RefundInProgress(_)
        | StoreError::Conflict(_) => StatusCode::CONFLICT,
        StoreError::NotPurchasable(_)
        | StoreError::EmptyCart
        | StoreError::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
        StoreError::InvalidState(_) | StoreError::RefundNotAllowed(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        StoreError::Gateway(_) => StatusCode::BAD_GATEWAY,
        StoreError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Store(StoreError::from(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::BadRequest(message) => {
                ErrorResponse::new(ErrorCode::ValidationFailed.to_string(), message.clone())
            }
            ApiError::Unauthorized(message) => {
                ErrorResponse::new("UNAUTHORIZED", message.clone())
            }
            ApiError::Store(err) => {
                if status.is_server_error() {
                    tracing::error!(error = %err, "Request failed");
                }
                // Internal details stay in the log.
                let message = match err {
                    StoreError::Infrastructure(_) => "Internal error".to_string(),
                    other => other.to_string(),
                };
                ErrorResponse::new(err.code().to_string(), message)
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::PaymentId;

    #[test]
    fn not_found_errors_map_to_404() {
        let err = ApiError::from(StoreError::PaymentNotFound(PaymentId::new()));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn refund_rules_map_to_422_and_409() {
        assert_eq!(
            ApiError::from(StoreError::RefundNotAllowed("window closed".into())).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::from(StoreError::RefundInProgress(PaymentId::new())).status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn gateway_errors_map_to_502() {
        let err = ApiError::from(StoreError::Gateway("timeout".into()));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn infrastructure_errors_hide_details() {
        let response = ApiError::from(StoreError::infrastructure("db password wrong")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
