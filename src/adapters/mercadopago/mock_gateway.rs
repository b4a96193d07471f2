//! Mock payment gateway for testing.
//!
//! Holds gateway payments in memory so tests can play the role of Mercado
//! Pago: seed a payment, send a notification, and let reconciliation fetch it.
//! Supports error injection and call tracking.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::foundation::{Money, Timestamp};
use crate::domain::payment::GatewayStatus;
use crate::ports::{
    CheckoutPreference, CreatePreferenceRequest, GatewayError, GatewayPayment, GatewayRefund,
    GatewayRefundStatus, PaymentGateway, RefundRequest,
};

/// In-memory stand-in for Mercado Pago.
#[derive(Clone, Default)]
pub struct MockPaymentGateway {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    payments: HashMap<String, GatewayPayment>,
    preferences: Vec<CreatePreferenceRequest>,
    refunds: Vec<RefundRequest>,
    refund_status: Option<GatewayRefundStatus>,
    method_errors: HashMap<&'static str, GatewayError>,
    call_log: Vec<String>,
    next_id: u64,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Adds or replaces a gateway payment.
    pub fn put_payment(&self, payment: GatewayPayment) {
        self.state().payments.insert(payment.id.clone(), payment);
    }

    /// Adds a payment for `external_reference` and returns its gateway id.
    pub fn add_payment(
        &self,
        external_reference: impl Into<String>,
        status: GatewayStatus,
        amount: Money,
    ) -> String {
        let mut state = self.state();
        state.next_id += 1;
        let id = format!("{}", 9_000_000 + state.next_id);
        state.payments.insert(
            id.clone(),
            GatewayPayment {
                id: id.clone(),
                status,
                status_detail: None,
                external_reference: Some(external_reference.into()),
                amount,
                date_last_updated: Some(Timestamp::now()),
                live_mode: true,
            },
        );
        id
    }

    /// Changes the status of a stored payment, as the gateway would.
    pub fn set_status(&self, gateway_payment_id: &str, status: GatewayStatus) {
        if let Some(payment) = self.state().payments.get_mut(gateway_payment_id) {
            payment.status = status;
            payment.date_last_updated = Some(Timestamp::now());
        }
    }

    /// Status returned by the next refunds. Defaults to `Approved`.
    pub fn set_refund_status(&self, status: GatewayRefundStatus) {
        self.state().refund_status = Some(status);
    }

    /// Makes every call to `method` fail until cleared.
    pub fn fail_method(&self, method: &'static str, error: GatewayError) {
        self.state().method_errors.insert(method, error);
    }

    pub fn clear_failures(&self) {
        self.state().method_errors.clear();
    }

    pub fn preference_requests(&self) -> Vec<CreatePreferenceRequest> {
        self.state().preferences.clone()
    }

    pub fn refund_requests(&self) -> Vec<RefundRequest> {
        self.state().refunds.clone()
    }

    /// Number of calls made to `method`.
    pub fn call_count(&self, method: &str) -> usize {
        self.state().call_log.iter().filter(|m| *m == method).count()
    }

    fn record(&self, method: &'static str) -> Result<(), GatewayError> {
        let mut state = self.state();
        state.call_log.push(method.to_string());
        match state.method_errors.get(method) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_preference(
        &self,
        request: CreatePreferenceRequest,
    ) -> Result<CheckoutPreference, GatewayError> {
        self.record("create_preference")?;
        let mut state = self.state();
        let id = format!("pref-{}", request.external_reference);
        state.preferences.push(request);
        Ok(CheckoutPreference {
            checkout_url: format!("https://checkout.example.test/{}", id),
            sandbox_checkout_url: None,
            id,
        })
    }

    async fn get_payment(&self, gateway_payment_id: &str) -> Result<GatewayPayment, GatewayError> {
        self.record("get_payment")?;
        self.state()
            .payments
            .get(gateway_payment_id)
            .cloned()
            .ok_or_else(|| GatewayError::not_found("Payment"))
    }

    async fn refund_payment(&self, request: RefundRequest) -> Result<GatewayRefund, GatewayError> {
        self.record("refund_payment")?;
        let mut state = self.state();
        let status = state.refund_status.unwrap_or(GatewayRefundStatus::Approved);
        if !state.payments.contains_key(&request.gateway_payment_id) {
            return Err(GatewayError::not_found("Payment"));
        }
        if status == GatewayRefundStatus::Approved {
            if let Some(payment) = state.payments.get_mut(&request.gateway_payment_id) {
                payment.status = GatewayStatus::Refunded;
                payment.date_last_updated = Some(Timestamp::now());
            }
        }
        let id = format!("refund-{}", state.refunds.len() + 1);
        state.refunds.push(request);
        Ok(GatewayRefund { id, status })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::GatewayErrorCode;

    fn brl(cents: i64) -> Money {
        Money::new(cents, "BRL").unwrap()
    }

    #[tokio::test]
    async fn serves_seeded_payments() {
        let gateway = MockPaymentGateway::new();
        let id = gateway.add_payment("ref-1", GatewayStatus::Approved, brl(1000));

        let payment = gateway.get_payment(&id).await.unwrap();
        assert_eq!(payment.external_reference.as_deref(), Some("ref-1"));
        assert_eq!(gateway.call_count("get_payment"), 1);

        let err = gateway.get_payment("missing").await.unwrap_err();
        assert_eq!(err.code, GatewayErrorCode::NotFound);
    }

    #[tokio::test]
    async fn approved_refund_flips_payment_to_refunded() {
        let gateway = MockPaymentGateway::new();
        let id = gateway.add_payment("ref-1", GatewayStatus::Approved, brl(1000));

        let refund = gateway
            .refund_payment(RefundRequest {
                gateway_payment_id: id.clone(),
                amount: None,
                idempotency_key: "refund-1".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(refund.status, GatewayRefundStatus::Approved);
        assert_eq!(
            gateway.get_payment(&id).await.unwrap().status,
            GatewayStatus::Refunded
        );
    }

    #[tokio::test]
    async fn injected_errors_are_returned() {
        let gateway = MockPaymentGateway::new();
        gateway.fail_method("get_payment", GatewayError::network("timeout"));
        assert!(gateway.get_payment("1").await.unwrap_err().retryable);

        gateway.clear_failures();
        assert_eq!(
            gateway.get_payment("1").await.unwrap_err().code,
            GatewayErrorCode::NotFound
        );
    }
}
