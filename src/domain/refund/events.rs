//! Refund domain events.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainEvent, Money, PaymentId, RefundId, Timestamp};

use super::RefundOrigin;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RefundEvent {
    Requested {
        refund_id: RefundId,
        payment_id: PaymentId,
        amount: Money,
        origin: RefundOrigin,
        occurred_at: Timestamp,
    },

    Completed {
        refund_id: RefundId,
        payment_id: PaymentId,
        origin: RefundOrigin,
        occurred_at: Timestamp,
    },

    Failed {
        refund_id: RefundId,
        payment_id: PaymentId,
        reason: String,
        occurred_at: Timestamp,
    },
}

impl DomainEvent for RefundEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RefundEvent::Requested { .. } => "refund.requested.v1",
            RefundEvent::Completed { .. } => "refund.completed.v1",
            RefundEvent::Failed { .. } => "refund.failed.v1",
        }
    }

    fn aggregate_id(&self) -> String {
        match self {
            RefundEvent::Requested { refund_id, .. }
            | RefundEvent::Completed { refund_id, .. }
            | RefundEvent::Failed { refund_id, .. } => refund_id.to_string(),
        }
    }

    fn aggregate_type(&self) -> &'static str {
        "Refund"
    }

    fn occurred_at(&self) -> Timestamp {
        match self {
            RefundEvent::Requested { occurred_at, .. }
            | RefundEvent::Completed { occurred_at, .. }
            | RefundEvent::Failed { occurred_at, .. } => *occurred_at,
        }
    }
}
