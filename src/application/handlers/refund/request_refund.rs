//! RequestRefundHandler - Command handler for refunding a payment.

use std::sync::Arc;

use crate::domain::foundation::{
    Actor, DomainError, ErrorCode, PaymentId, RefundId, SerializableDomainEvent, Timestamp,
};
use crate::domain::payment::{Payment, PaymentEvent, PaymentStatus};
use crate::domain::refund::{Refund, RefundEvent, RefundPolicy, RefundRejection};
use crate::domain::StoreError;
use crate::ports::{
    EventPublisher, GatewayRefundStatus, PaymentGateway, PaymentRepository, RefundRepository,
    RefundRequest,
};

use crate::application::handlers::fulfillment::Fulfillment;

/// Command to refund a payment in full.
#[derive(Debug, Clone)]
pub struct RequestRefundCommand {
    pub actor: Actor,
    pub payment_id: PaymentId,
    pub reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RequestRefundResult {
    pub refund: Refund,
    pub payment_status: PaymentStatus,
}

pub struct RequestRefundHandler {
    payments: Arc<dyn PaymentRepository>,
    refunds: Arc<dyn RefundRepository>,
    gateway: Arc<dyn PaymentGateway>,
    fulfillment: Fulfillment,
    event_publisher: Arc<dyn EventPublisher>,
    policy: RefundPolicy,
}

impl RequestRefundHandler {
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        refunds: Arc<dyn RefundRepository>,
        gateway: Arc<dyn PaymentGateway>,
        fulfillment: Fulfillment,
        event_publisher: Arc<dyn EventPublisher>,
        policy: RefundPolicy,
    ) -> Self {
        Self {
            payments,
            refunds,
            gateway,
            fulfillment,
            event_publisher,
            policy,
        }
    }

    pub async fn handle(&self, cmd: RequestRefundCommand) -> Result<RequestRefundResult, StoreError> {
        let payment = self
            .payments
            .find_by_id(&cmd.payment_id)
            .await?
            .ok_or(StoreError::PaymentNotFound(cmd.payment_id))?;

        let open = self.refunds.find_open_by_payment(&payment.id).await?;
        self.policy
            .evaluate(&payment, &cmd.actor, open.as_ref(), Timestamp::now())
            .map_err(|rejection| match rejection {
                RefundRejection::AlreadyRequested => StoreError::RefundInProgress(payment.id),
                other => StoreError::from(other),
            })?;

        let gateway_payment_id = payment.gateway_payment_id.clone().ok_or_else(|| {
            StoreError::InvalidState(format!("Payment {} has no gateway payment", payment.id))
        })?;

        let mut refund = Refund::request(RefundId::new(), &payment, &cmd.actor, cmd.reason);
        self.refunds.save(&refund).await.map_err(|e| match e.code {
            ErrorCode::AlreadyExists => StoreError::RefundInProgress(payment.id),
            _ => StoreError::from(e),
        })?;

        tracing::info!(
            refund_id = %refund.id,
            payment_id = %payment.id,
            origin = refund.origin.as_str(),
            requested_by = %cmd.actor.user_id,
            "Refund requested"
        );
        let event = RefundEvent::Requested {
            refund_id: refund.id,
            payment_id: payment.id,
            amount: refund.amount.clone(),
            origin: refund.origin,
            occurred_at: Timestamp::now(),
        };
        let envelope = event.to_envelope().with_user_id(cmd.actor.user_id.as_str());
        self.event_publisher.publish(envelope).await?;

        let gateway_refund = match self
            .gateway
            .refund_payment(RefundRequest {
                gateway_payment_id,
                amount: None,
                idempotency_key: refund.idempotency_key(),
            })
            .await
        {
            Ok(gateway_refund) => gateway_refund,
            Err(e) => {
                tracing::error!(refund_id = %refund.id, error = %e, "Gateway refund failed");
                self.fail(&mut refund, e.to_string()).await?;
                return Err(StoreError::Gateway(e.message));
            }
        };

        refund.record_gateway_refund(&gateway_refund.id);
        self.refunds.update(&refund).await?;

        let payment_status = match gateway_refund.status {
            GatewayRefundStatus::Approved => {
                let payment = self.mark_refunded(payment.id).await?;
                let reason = refund
                    .reason
                    .clone()
                    .unwrap_or_else(|| "refund requested".to_string());
                self.fulfillment.revoke_access(&payment, &reason).await?;
                self.fulfillment.settle_refund(&payment, &reason).await?;
                payment.status
            }
            GatewayRefundStatus::Pending => {
                tracing::info!(
                    refund_id = %refund.id,
                    "Refund pending at gateway, waiting for notification"
                );
                payment.status
            }
            GatewayRefundStatus::Rejected => {
                self.fail(&mut refund, "Refund rejected by gateway").await?;
                payment.status
            }
        };

        let refund = self
            .refunds
            .find_by_id(&refund.id)
            .await?
            .unwrap_or(refund);

        Ok(RequestRefundResult {
            refund,
            payment_status,
        })
    }

    /// Moves the payment to `Refunded`, tolerating a notification that got
    /// there first.
    async fn mark_refunded(&self, payment_id: PaymentId) -> Result<Payment, StoreError> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            let mut payment = self
                .payments
                .find_by_id(&payment_id)
                .await?
                .ok_or(StoreError::PaymentNotFound(payment_id))?;
            if payment.status == PaymentStatus::Refunded {
                return Ok(payment);
            }
            let from = payment.status;
            payment.mark_refunded()?;

            match self.payments.update(&payment).await {
                Ok(()) => {
                    payment.version += 1;
                    let event = PaymentEvent::StatusChanged {
                        payment_id: payment.id,
                        user_id: payment.user_id.clone(),
                        from,
                        to: PaymentStatus::Refunded,
                        gateway_payment_id: payment.gateway_payment_id.clone(),
                        occurred_at: Timestamp::now(),
                    };
                    self.event_publisher.publish(event.to_envelope()).await?;
                    return Ok(payment);
                }
                Err(DomainError {
                    code: ErrorCode::ConcurrencyConflict,
                    ..
                }) if attempts < 3 => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn fail(&self, refund: &mut Refund, reason: impl Into<String>) -> Result<(), StoreError> {
        let reason = reason.into();
        refund.fail(reason.clone())?;
        self.refunds.update(refund).await?;

        let event = RefundEvent::Failed {
            refund_id: refund.id,
            payment_id: refund.payment_id,
            reason,
            occurred_at: Timestamp::now(),
        };
        self.event_publisher.publish(event.to_envelope()).await?;
        Ok(())
    }
}
