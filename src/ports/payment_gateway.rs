//! Payment gateway port.
//!
//! Defines the contract for the checkout gateway (Mercado Pago). The gateway
//! is the source of truth for payment status: notifications only say that
//! something changed, and the current state is always fetched through
//! [`PaymentGateway::get_payment`].
//!
//! # Design
//!
//! - **Gateway agnostic**: amounts are `Money`, statuses are `GatewayStatus`
//! - **Idempotent**: refunds carry an idempotency key and can be retried

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, ErrorCode, Money, Timestamp};
use crate::domain::payment::GatewayStatus;

/// Port for payment gateway integrations.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a checkout preference the buyer is redirected to.
    async fn create_preference(
        &self,
        request: CreatePreferenceRequest,
    ) -> Result<CheckoutPreference, GatewayError>;

    /// Fetch the current state of a gateway payment.
    async fn get_payment(&self, gateway_payment_id: &str) -> Result<GatewayPayment, GatewayError>;

    /// Refund a payment. `amount: None` refunds it in full.
    async fn refund_payment(&self, request: RefundRequest) -> Result<GatewayRefund, GatewayError>;
}

/// One line of a checkout preference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceItem {
    pub id: String,
    pub title: String,
    pub unit_price: Money,
    pub quantity: u32,
}

/// Request to create a checkout preference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePreferenceRequest {
    /// Our payment id; echoed back on every gateway payment.
    pub external_reference: String,
    pub items: Vec<PreferenceItem>,
    /// Idempotency key for the creation call.
    pub idempotency_key: String,
}

/// Checkout preference created at the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutPreference {
    pub id: String,
    /// URL the buyer is redirected to.
    pub checkout_url: String,
    pub sandbox_checkout_url: Option<String>,
}

/// Authoritative snapshot of a gateway payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayPayment {
    pub id: String,
    pub status: GatewayStatus,
    pub status_detail: Option<String>,
    pub external_reference: Option<String>,
    pub amount: Money,
    pub date_last_updated: Option<Timestamp>,
    pub live_mode: bool,
}

/// Request to refund a gateway payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundRequest {
    pub gateway_payment_id: String,
    pub amount: Option<Money>,
    pub idempotency_key: String,
}

/// Status of a refund at the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayRefundStatus {
    /// Money returned.
    Approved,
    /// Still processing; a payment notification follows.
    Pending,
    /// Refused by the gateway.
    Rejected,
}

impl GatewayRefundStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "approved" => GatewayRefundStatus::Approved,
            "rejected" | "cancelled" => GatewayRefundStatus::Rejected,
            _ => GatewayRefundStatus::Pending,
        }
    }
}

/// Refund created at the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayRefund {
    pub id: String,
    pub status: GatewayRefundStatus,
}

/// Errors from gateway operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayError {
    pub code: GatewayErrorCode,
    pub message: String,
    /// Gateway's own error code, if any.
    pub provider_code: Option<String>,
    pub retryable: bool,
}

impl GatewayError {
    pub fn new(code: GatewayErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
            retryable: code.is_retryable(),
        }
    }

    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::NetworkError, message)
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new(GatewayErrorCode::NotFound, format!("{} not found", resource))
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::InvalidRequest, message)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::ProviderError, message)
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for GatewayError {}

impl From<GatewayError> for DomainError {
    fn from(err: GatewayError) -> Self {
        let code = match err.code {
            GatewayErrorCode::InvalidRequest => ErrorCode::ValidationFailed,
            _ => ErrorCode::ExternalServiceError,
        };
        DomainError::new(code, err.message)
    }
}

/// Gateway error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayErrorCode {
    /// Network connectivity issue or timeout.
    NetworkError,

    /// Access token rejected.
    AuthenticationError,

    /// Resource does not exist (yet) at the gateway.
    NotFound,

    /// Request rejected as invalid.
    InvalidRequest,

    /// Too many requests.
    RateLimited,

    /// Gateway-side failure (5xx).
    ProviderError,

    /// Response could not be understood.
    InvalidResponse,
}

impl GatewayErrorCode {
    /// Returns true if the operation may succeed on retry.
    ///
    /// A payment that was just created can briefly be missing from the
    /// payments API, so `NotFound` is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayErrorCode::NetworkError
                | GatewayErrorCode::RateLimited
                | GatewayErrorCode::ProviderError
                | GatewayErrorCode::NotFound
        )
    }
}

impl std::fmt::Display for GatewayErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GatewayErrorCode::NetworkError => "network_error",
            GatewayErrorCode::AuthenticationError => "authentication_error",
            GatewayErrorCode::NotFound => "not_found",
            GatewayErrorCode::InvalidRequest => "invalid_request",
            GatewayErrorCode::RateLimited => "rate_limited",
            GatewayErrorCode::ProviderError => "provider_error",
            GatewayErrorCode::InvalidResponse => "invalid_response",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn PaymentGateway) {}

    #[test]
    fn retryable_follows_code() {
        assert!(GatewayError::network("timeout").retryable);
        assert!(GatewayError::not_found("payment").retryable);
        assert!(!GatewayError::invalid_request("bad amount").retryable);
        assert!(!GatewayError::new(GatewayErrorCode::AuthenticationError, "401").retryable);
    }

    #[test]
    fn converts_to_external_service_error() {
        let err: DomainError = GatewayError::provider("500").into();
        assert_eq!(err.code, ErrorCode::ExternalServiceError);

        let err: DomainError = GatewayError::invalid_request("bad").into();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn refund_status_parsing() {
        assert_eq!(GatewayRefundStatus::parse("approved"), GatewayRefundStatus::Approved);
        assert_eq!(GatewayRefundStatus::parse("in_process"), GatewayRefundStatus::Pending);
        assert_eq!(GatewayRefundStatus::parse("rejected"), GatewayRefundStatus::Rejected);
        assert_eq!(GatewayRefundStatus::parse("cancelled"), GatewayRefundStatus::Rejected);
    }

    #[test]
    fn display_includes_code() {
        let err = GatewayError::network("connection reset");
        assert_eq!(err.to_string(), "network_error: connection reset");
    }
}
