//! Payment domain events.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainEvent, Money, PaymentId, Timestamp, UserId};

use super::PaymentStatus;

/// Events emitted over a payment's lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaymentEvent {
    /// Checkout started and a gateway preference was created.
    Created {
        payment_id: PaymentId,
        user_id: UserId,
        total: Money,
        occurred_at: Timestamp,
    },

    /// Status moved after a gateway notification, refund or maintenance run.
    StatusChanged {
        payment_id: PaymentId,
        user_id: UserId,
        from: PaymentStatus,
        to: PaymentStatus,
        gateway_payment_id: Option<String>,
        occurred_at: Timestamp,
    },

    /// The gateway charged a different amount than the checkout total.
    AmountMismatch {
        payment_id: PaymentId,
        expected: Money,
        charged: Money,
        gateway_payment_id: String,
        occurred_at: Timestamp,
    },

    /// The gateway approved a payment the store had already cancelled.
    ApprovedAfterCancellation {
        payment_id: PaymentId,
        user_id: UserId,
        charged: Money,
        gateway_payment_id: String,
        occurred_at: Timestamp,
    },
}

impl PaymentEvent {
    pub fn payment_id(&self) -> &PaymentId {
        match self {
            PaymentEvent::Created { payment_id, .. }
            | PaymentEvent::StatusChanged { payment_id, .. }
            | PaymentEvent::AmountMismatch { payment_id, .. }
            | PaymentEvent::ApprovedAfterCancellation { payment_id, .. } => payment_id,
        }
    }
}

impl DomainEvent for PaymentEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PaymentEvent::Created { .. } => "payment.created.v1",
            PaymentEvent::StatusChanged { .. } => "payment.status_changed.v1",
            PaymentEvent::AmountMismatch { .. } => "payment.amount_mismatch.v1",
            PaymentEvent::ApprovedAfterCancellation { .. } => {
                "payment.approved_after_cancellation.v1"
            }
        }
    }

    fn aggregate_id(&self) -> String {
        self.payment_id().to_string()
    }

    fn aggregate_type(&self) -> &'static str {
        "Payment"
    }

    fn occurred_at(&self) -> Timestamp {
        match self {
            PaymentEvent::Created { occurred_at, .. }
            | PaymentEvent::StatusChanged { occurred_at, .. }
            | PaymentEvent::AmountMismatch { occurred_at, .. }
            | PaymentEvent::ApprovedAfterCancellation { occurred_at, .. } => *occurred_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SerializableDomainEvent;

    #[test]
    fn status_changed_envelope() {
        let payment_id = PaymentId::new();
        let event = PaymentEvent::StatusChanged {
            payment_id,
            user_id: UserId::new("buyer").unwrap(),
            from: PaymentStatus::Pending,
            to: PaymentStatus::Approved,
            gateway_payment_id: Some("987".to_string()),
            occurred_at: Timestamp::now(),
        };

        let envelope = event.to_envelope();
        assert_eq!(envelope.event_type, "payment.status_changed.v1");
        assert_eq!(envelope.aggregate_type, "Payment");
        assert_eq!(envelope.aggregate_id, payment_id.to_string());
        assert_eq!(envelope.payload["to"], "approved");
    }
}
