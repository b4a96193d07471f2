//! Webhook error types for Mercado Pago notification handling.
//!
//! Every failure carries its HTTP status, which drives the gateway's retry
//! behavior.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Errors that occur during notification processing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookError {
    /// Signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Signature timestamp is older than the tolerance window.
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Signature timestamp is in the future beyond clock skew tolerance.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Failed to parse the notification or signature header.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Required field missing from the notification.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// The gateway charged a different amount than the checkout total.
    #[error("Amount mismatch: expected {expected}, gateway reported {charged}")]
    AmountMismatch { expected: String, charged: String },

    /// Notification acknowledged but intentionally not acted on.
    #[error("Notification ignored: {0}")]
    Ignored(String),

    /// The gateway could not be reached or answered with an error.
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// A concurrent update won; processing again will see the new state.
    #[error("Concurrent update: {0}")]
    Conflict(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(String),
}

impl WebhookError {
    /// Returns true if the gateway should deliver this notification again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WebhookError::Gateway(_) | WebhookError::Conflict(_) | WebhookError::Database(_)
        )
    }

    /// Maps the error to the HTTP status returned to the gateway.
    ///
    /// - 2xx: acknowledged, no retry
    /// - 4xx: rejected, no retry
    /// - 5xx: temporary failure, will retry
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::InvalidSignature | WebhookError::TimestampOutOfRange => {
                StatusCode::UNAUTHORIZED
            }

            WebhookError::InvalidTimestamp
            | WebhookError::ParseError(_)
            | WebhookError::MissingField(_) => StatusCode::BAD_REQUEST,

            WebhookError::AmountMismatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,

            WebhookError::Ignored(_) => StatusCode::OK,

            WebhookError::Gateway(_) => StatusCode::BAD_GATEWAY,

            WebhookError::Conflict(_) | WebhookError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<DomainError> for WebhookError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ConcurrencyConflict => WebhookError::Conflict(err.to_string()),
            ErrorCode::ExternalServiceError => WebhookError::Gateway(err.to_string()),
            _ => WebhookError::Database(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_failures_are_unauthorized_and_final() {
        for err in [WebhookError::InvalidSignature, WebhookError::TimestampOutOfRange] {
            assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
            assert!(!err.is_retryable());
        }
    }

    #[test]
    fn malformed_notifications_are_bad_requests() {
        assert_eq!(
            WebhookError::MissingField("data.id").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WebhookError::ParseError("bad json".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn amount_mismatch_is_final() {
        let err = WebhookError::AmountMismatch {
            expected: "BRL 10.00".into(),
            charged: "BRL 1.00".into(),
        };
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(!err.is_retryable());
    }

    #[test]
    fn ignored_is_acknowledged() {
        assert_eq!(
            WebhookError::Ignored("merchant_order".into()).status_code(),
            StatusCode::OK
        );
    }

    #[test]
    fn infrastructure_failures_are_retried() {
        for err in [
            WebhookError::Gateway("timeout".into()),
            WebhookError::Conflict("version".into()),
            WebhookError::Database("down".into()),
        ] {
            assert!(err.is_retryable());
            assert!(err.status_code().is_server_error());
        }
    }

    #[test]
    fn domain_errors_keep_their_retry_class() {
        let conflict: WebhookError =
            DomainError::new(ErrorCode::ConcurrencyConflict, "stale version").into();
        assert!(matches!(conflict, WebhookError::Conflict(_)));

        let gateway: WebhookError =
            DomainError::new(ErrorCode::ExternalServiceError, "503").into();
        assert!(matches!(gateway, WebhookError::Gateway(_)));

        let db: WebhookError = DomainError::database("pool timeout").into();
        assert!(matches!(db, WebhookError::Database(_)));
    }

    #[test]
    fn display_includes_detail() {
        assert_eq!(
            WebhookError::MissingField("type").to_string(),
            "Missing field: type"
        );
    }
}
