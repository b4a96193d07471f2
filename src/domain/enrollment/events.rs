//! Enrollment domain events.

use serde::{Deserialize, Serialize};

use crate::domain::catalog::CatalogItem;
use crate::domain::foundation::{DomainEvent, EnrollmentId, PaymentId, Timestamp, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EnrollmentEvent {
    Granted {
        enrollment_id: EnrollmentId,
        user_id: UserId,
        target: CatalogItem,
        payment_id: PaymentId,
        expires_at: Option<Timestamp>,
        occurred_at: Timestamp,
    },

    Expired {
        enrollment_id: EnrollmentId,
        user_id: UserId,
        occurred_at: Timestamp,
    },

    Revoked {
        enrollment_id: EnrollmentId,
        user_id: UserId,
        payment_id: PaymentId,
        reason: String,
        occurred_at: Timestamp,
    },
}

impl DomainEvent for EnrollmentEvent {
    fn event_type(&self) -> &'static str {
        match self {
            EnrollmentEvent::Granted { .. } => "enrollment.granted.v1",
            EnrollmentEvent::Expired { .. } => "enrollment.expired.v1",
            EnrollmentEvent::Revoked { .. } => "enrollment.revoked.v1",
        }
    }

    fn aggregate_id(&self) -> String {
        match self {
            EnrollmentEvent::Granted { enrollment_id, .. }
            | EnrollmentEvent::Expired { enrollment_id, .. }
            | EnrollmentEvent::Revoked { enrollment_id, .. } => enrollment_id.to_string(),
        }
    }

    fn aggregate_type(&self) -> &'static str {
        "Enrollment"
    }

    fn occurred_at(&self) -> Timestamp {
        match self {
            EnrollmentEvent::Granted { occurred_at, .. }
            | EnrollmentEvent::Expired { occurred_at, .. }
            | EnrollmentEvent::Revoked { occurred_at, .. } => *occurred_at,
        }
    }
}
