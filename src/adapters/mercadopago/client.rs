//! Mercado Pago gateway adapter.
//!
//! Implements the `PaymentGateway` port against the Mercado Pago REST API.
//!
//! # Security
//!
//! - The access token is held in a `secrecy::SecretString` and never logged
//! - Every mutating call carries an `X-Idempotency-Key`
//!
//! # Configuration
//!
//! ```ignore
//! let config = MercadoPagoConfig::new(access_token)
//!     .with_notification_url("https://shop.example.com/api/webhooks/mercadopago");
//! let gateway = MercadoPagoGateway::new(config);
//! ```

use async_trait::async_trait;
use chrono::DateTime;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

use crate::domain::foundation::{Money, Timestamp};
use crate::domain::payment::GatewayStatus;
use crate::ports::{
    CheckoutPreference, CreatePreferenceRequest, GatewayError, GatewayErrorCode, GatewayPayment,
    GatewayRefund, GatewayRefundStatus, PaymentGateway, RefundRequest,
};

use super::api_types::{
    ApiErrorBody, BackUrls, PaymentResponse, PreferenceBody, PreferenceItemBody,
    PreferenceResponse, RefundBody, RefundResponse,
};

pub const DEFAULT_API_BASE_URL: &str = "https://api.mercadopago.com";

/// Mercado Pago API configuration.
#[derive(Clone)]
pub struct MercadoPagoConfig {
    access_token: SecretString,
    api_base_url: String,
    notification_url: Option<String>,
    back_urls: BackUrls,
    statement_descriptor: Option<String>,
}

impl MercadoPagoConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: SecretString::new(access_token.into()),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            notification_url: None,
            back_urls: BackUrls::default(),
            statement_descriptor: None,
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// URL the gateway sends payment notifications to.
    pub fn with_notification_url(mut self, url: impl Into<String>) -> Self {
        self.notification_url = Some(url.into());
        self
    }

    pub fn with_back_urls(mut self, back_urls: BackUrls) -> Self {
        self.back_urls = back_urls;
        self
    }

    pub fn with_statement_descriptor(mut self, descriptor: impl Into<String>) -> Self {
        self.statement_descriptor = Some(descriptor.into());
        self
    }
}

impl std::fmt::Debug for MercadoPagoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MercadoPagoConfig")
            .field("access_token", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .field("notification_url", &self.notification_url)
            .finish()
    }
}

/// Mercado Pago implementation of [`PaymentGateway`].
pub struct MercadoPagoGateway {
    config: MercadoPagoConfig,
    http_client: reqwest::Client,
}

impl MercadoPagoGateway {
    pub fn new(config: MercadoPagoConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url, path)
    }

    /// Turns a response into `T`, mapping non-2xx statuses to gateway errors.
    async fn read_response<T: DeserializeOwned>(
        response: reqwest::Response,
        operation: &str,
    ) -> Result<T, GatewayError> {
        let status = response.status();
        if !status.is_success() {
            let body: ApiErrorBody = response.json().await.unwrap_or_default();
            let message = body
                .message
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            tracing::warn!(
                operation,
                status = status.as_u16(),
                error = %message,
                "Mercado Pago request failed"
            );
            let mut err = GatewayError::new(error_code_for(status), message);
            if let Some(code) = body.error {
                err = err.with_provider_code(code);
            }
            return Err(err);
        }

        response.json::<T>().await.map_err(|e| {
            GatewayError::new(
                GatewayErrorCode::InvalidResponse,
                format!("Failed to parse Mercado Pago response: {}", e),
            )
        })
    }
}

fn error_code_for(status: reqwest::StatusCode) -> GatewayErrorCode {
    match status.as_u16() {
        401 | 403 => GatewayErrorCode::AuthenticationError,
        404 => GatewayErrorCode::NotFound,
        429 => GatewayErrorCode::RateLimited,
        400..=499 => GatewayErrorCode::InvalidRequest,
        _ => GatewayErrorCode::ProviderError,
    }
}

fn to_gateway_payment(raw: PaymentResponse) -> Result<GatewayPayment, GatewayError> {
    let amount = Money::from_decimal(raw.transaction_amount, &raw.currency_id).map_err(|e| {
        GatewayError::new(
            GatewayErrorCode::InvalidResponse,
            format!("Invalid transaction amount: {}", e),
        )
    })?;

    let date_last_updated = match raw.date_last_updated.as_deref() {
        Some(value) => Some(parse_gateway_time(value)?),
        None => None,
    };

    Ok(GatewayPayment {
        id: raw.id,
        status: GatewayStatus::parse(&raw.status),
        status_detail: raw.status_detail,
        external_reference: raw.external_reference.filter(|r| !r.is_empty()),
        amount,
        date_last_updated,
        live_mode: raw.live_mode,
    })
}

fn parse_gateway_time(value: &str) -> Result<Timestamp, GatewayError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| Timestamp::from_datetime(dt.with_timezone(&chrono::Utc)))
        .map_err(|e| {
            GatewayError::new(
                GatewayErrorCode::InvalidResponse,
                format!("Invalid date_last_updated '{}': {}", value, e),
            )
        })
}

#[async_trait]
impl PaymentGateway for MercadoPagoGateway {
    async fn create_preference(
        &self,
        request: CreatePreferenceRequest,
    ) -> Result<CheckoutPreference, GatewayError> {
        let back_urls = if self.config.back_urls.is_empty() {
            None
        } else {
            Some(self.config.back_urls.clone())
        };
        let auto_return = back_urls
            .as_ref()
            .and_then(|urls| urls.success.as_ref())
            .map(|_| "approved".to_string());

        let body = PreferenceBody {
            items: request
                .items
                .iter()
                .map(|item| PreferenceItemBody {
                    id: item.id.clone(),
                    title: item.title.clone(),
                    quantity: item.quantity,
                    unit_price: item.unit_price.as_decimal(),
                    currency_id: item.unit_price.currency().to_string(),
                })
                .collect(),
            external_reference: request.external_reference.clone(),
            notification_url: self.config.notification_url.clone(),
            back_urls,
            auto_return,
            statement_descriptor: self.config.statement_descriptor.clone(),
        };

        let response = self
            .http_client
            .post(self.url("/checkout/preferences"))
            .bearer_auth(self.config.access_token.expose_secret())
            .header("X-Idempotency-Key", &request.idempotency_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        let preference: PreferenceResponse =
            Self::read_response(response, "create_preference").await?;

        tracing::info!(
            preference_id = %preference.id,
            external_reference = %request.external_reference,
            "Checkout preference created"
        );

        Ok(CheckoutPreference {
            id: preference.id,
            checkout_url: preference.init_point,
            sandbox_checkout_url: preference.sandbox_init_point,
        })
    }

    async fn get_payment(&self, gateway_payment_id: &str) -> Result<GatewayPayment, GatewayError> {
        let response = self
            .http_client
            .get(self.url(&format!("/v1/payments/{}", gateway_payment_id)))
            .bearer_auth(self.config.access_token.expose_secret())
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        let raw: PaymentResponse = Self::read_response(response, "get_payment").await?;
        to_gateway_payment(raw)
    }

    async fn refund_payment(&self, request: RefundRequest) -> Result<GatewayRefund, GatewayError> {
        let body = RefundBody {
            amount: request.amount.as_ref().map(Money::as_decimal),
        };

        let response = self
            .http_client
            .post(self.url(&format!(
                "/v1/payments/{}/refunds",
                request.gateway_payment_id
            )))
            .bearer_auth(self.config.access_token.expose_secret())
            .header("X-Idempotency-Key", &request.idempotency_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        let refund: RefundResponse = Self::read_response(response, "refund_payment").await?;

        tracing::info!(
            gateway_payment_id = %request.gateway_payment_id,
            refund_id = %refund.id,
            status = %refund.status,
            "Refund created at Mercado Pago"
        );

        Ok(GatewayRefund {
            id: refund.id,
            status: GatewayRefundStatus::parse(&refund.status),
        })
    }
}
