//! ReconcilePaymentHandler - Brings a payment in line with the gateway.
//!
//! Notifications only say that a gateway payment changed. The handler fetches
//! the payment from the gateway, applies the mapped status to the internal
//! payment and then converges side effects from the resulting status, so a
//! redelivered or reordered notification repairs anything a failed attempt
//! left half done.

use std::sync::Arc;

use crate::domain::foundation::{ErrorCode, PaymentId, SerializableDomainEvent, Timestamp};
use crate::domain::payment::{Payment, PaymentEvent, PaymentStatus, StatusChange};
use crate::domain::webhook::WebhookError;
use crate::ports::{EventPublisher, GatewayPayment, PaymentGateway, PaymentRepository};

use crate::application::handlers::fulfillment::Fulfillment;

/// Optimistic-lock retries before giving the notification back to the gateway.
const MAX_UPDATE_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone)]
pub struct ReconcilePaymentCommand {
    /// Payment id at the gateway (the notification's `data.id`).
    pub gateway_payment_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilePaymentResult {
    pub payment_id: PaymentId,
    pub change: StatusChange,
    /// Status after reconciliation.
    pub status: PaymentStatus,
}

pub struct ReconcilePaymentHandler {
    payments: Arc<dyn PaymentRepository>,
    gateway: Arc<dyn PaymentGateway>,
    fulfillment: Fulfillment,
    event_publisher: Arc<dyn EventPublisher>,
}

impl ReconcilePaymentHandler {
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        gateway: Arc<dyn PaymentGateway>,
        fulfillment: Fulfillment,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            payments,
            gateway,
            fulfillment,
            event_publisher,
        }
    }

    /// Reconciles one gateway payment.
    ///
    /// # Errors
    ///
    /// - `Ignored` when the payment is not ours or its status is unknown
    /// - `AmountMismatch` when an approval charged a different amount
    /// - `Gateway`, `Conflict`, `Database` for retryable failures
    pub async fn handle(
        &self,
        cmd: ReconcilePaymentCommand,
    ) -> Result<ReconcilePaymentResult, WebhookError> {
        let remote = self
            .gateway
            .get_payment(&cmd.gateway_payment_id)
            .await
            .map_err(|e| WebhookError::Gateway(e.to_string()))?;

        let payment_id = remote
            .external_reference
            .as_deref()
            .and_then(|r| r.parse::<PaymentId>().ok())
            .ok_or_else(|| {
                WebhookError::Ignored(format!(
                    "Gateway payment {} has no known external reference",
                    remote.id
                ))
            })?;

        let Some(target) = remote.status.to_payment_status() else {
            tracing::warn!(
                gateway_payment_id = %remote.id,
                status = ?remote.status,
                "Unknown gateway status"
            );
            return Err(WebhookError::Ignored(format!(
                "Unknown gateway status {:?}",
                remote.status
            )));
        };

        let (payment, change) = self.apply(payment_id, target, &remote).await?;

        if let StatusChange::Transitioned { from, to } = change {
            tracing::info!(
                payment_id = %payment.id,
                gateway_payment_id = %remote.id,
                from = %from,
                to = %to,
                "Payment status changed"
            );
            let event = PaymentEvent::StatusChanged {
                payment_id: payment.id,
                user_id: payment.user_id.clone(),
                from,
                to,
                gateway_payment_id: Some(remote.id.clone()),
                occurred_at: Timestamp::now(),
            };
            let envelope = event
                .to_envelope()
                .with_correlation_id(format!("mp-payment:{}", remote.id));
            self.event_publisher.publish(envelope).await?;
        } else if matches!(
            change,
            StatusChange::Rejected {
                from: PaymentStatus::Cancelled,
                to: PaymentStatus::Approved,
            }
        ) {
            // Charged after the checkout expired. Needs a manual refund or grant.
            tracing::error!(
                payment_id = %payment.id,
                gateway_payment_id = %remote.id,
                amount = %remote.amount,
                "Gateway approved a cancelled payment"
            );
            let event = PaymentEvent::ApprovedAfterCancellation {
                payment_id: payment.id,
                user_id: payment.user_id.clone(),
                charged: remote.amount.clone(),
                gateway_payment_id: remote.id.clone(),
                occurred_at: Timestamp::now(),
            };
            let envelope = event
                .to_envelope()
                .with_correlation_id(format!("mp-payment:{}", remote.id));
            self.event_publisher.publish(envelope).await?;
        } else {
            tracing::debug!(
                payment_id = %payment.id,
                gateway_payment_id = %remote.id,
                change = ?change,
                "Payment status not changed"
            );
        }

        self.converge(&payment, change).await?;

        Ok(ReconcilePaymentResult {
            payment_id: payment.id,
            change,
            status: payment.status,
        })
    }

    /// Applies the gateway status, retrying on concurrent updates.
    async fn apply(
        &self,
        payment_id: PaymentId,
        target: PaymentStatus,
        remote: &GatewayPayment,
    ) -> Result<(Payment, StatusChange), WebhookError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut payment = self.payments.find_by_id(&payment_id).await?.ok_or_else(|| {
                WebhookError::Ignored(format!("Unknown payment {}", payment_id))
            })?;

            if target == PaymentStatus::Approved
                && payment.status != PaymentStatus::Approved
                && !payment.amount_matches(&remote.amount)
            {
                return Err(self.amount_mismatch(&payment, remote).await);
            }

            let known_attempt = payment.gateway_payment_id.clone();
            let change = payment.apply_gateway_status(
                target,
                &remote.id,
                remote.status_detail.clone(),
                remote.date_last_updated,
            );

            if let StatusChange::Rejected { from, to } = change {
                tracing::warn!(
                    payment_id = %payment.id,
                    gateway_payment_id = %remote.id,
                    from = %from,
                    to = %to,
                    "Gateway status does not follow payment lifecycle"
                );
            }
            let learned_attempt = payment.gateway_payment_id != known_attempt;
            if !change.is_transition() && !learned_attempt {
                return Ok((payment, change));
            }

            match self.payments.update(&payment).await {
                Ok(()) => {
                    payment.version += 1;
                    return Ok((payment, change));
                }
                Err(e) if e.code == ErrorCode::ConcurrencyConflict && attempt < MAX_UPDATE_ATTEMPTS => {
                    tracing::debug!(payment_id = %payment_id, attempt, "Retrying after concurrent update");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn amount_mismatch(&self, payment: &Payment, remote: &GatewayPayment) -> WebhookError {
        tracing::error!(
            payment_id = %payment.id,
            gateway_payment_id = %remote.id,
            expected = %payment.total,
            charged = %remote.amount,
            "Approved amount does not match payment total"
        );

        let event = PaymentEvent::AmountMismatch {
            payment_id: payment.id,
            expected: payment.total.clone(),
            charged: remote.amount.clone(),
            gateway_payment_id: remote.id.clone(),
            occurred_at: Timestamp::now(),
        };
        let envelope = event
            .to_envelope()
            .with_correlation_id(format!("mp-payment:{}", remote.id));
        if let Err(e) = self.event_publisher.publish(envelope).await {
            tracing::warn!(error = %e, "Failed to publish amount mismatch event");
        }

        WebhookError::AmountMismatch {
            expected: payment.total.to_string(),
            charged: remote.amount.to_string(),
        }
    }

    /// Makes enrollments, cart and refunds agree with the payment status.
    async fn converge(&self, payment: &Payment, change: StatusChange) -> Result<(), WebhookError> {
        match payment.status {
            PaymentStatus::Approved => {
                self.fulfillment.grant_access(payment).await?;
                if change.is_transition() {
                    self.fulfillment.clear_cart(payment).await?;
                }
            }
            PaymentStatus::Refunded => {
                let reason = payment
                    .status_detail
                    .clone()
                    .unwrap_or_else(|| "refunded".to_string());
                self.fulfillment.revoke_access(payment, &reason).await?;
                self.fulfillment.settle_refund(payment, &reason).await?;
            }
            PaymentStatus::Pending | PaymentStatus::Failed | PaymentStatus::Cancelled => {}
        }
        Ok(())
    }
}
