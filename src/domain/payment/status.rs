//! Payment status state machine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};

/// Internal status of a checkout payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Checkout created, or the gateway is still processing.
    Pending,

    /// Money captured. Grants access to every purchased item.
    Approved,

    /// Money returned to the buyer (refund or chargeback). Access revoked.
    Refunded,

    /// Abandoned or cancelled before approval.
    Cancelled,

    /// Attempt rejected. The buyer may retry on the same checkout.
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Approved => "approved",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::Cancelled => "cancelled",
            PaymentStatus::Failed => "failed",
        }
    }

    /// Returns true if a payment in this status grants access.
    pub fn grants_access(&self) -> bool {
        matches!(self, PaymentStatus::Approved)
    }
}

impl StateMachine for PaymentStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, target),
            // From PENDING
            (Pending, Approved)
                | (Pending, Failed)
                | (Pending, Cancelled)
            // From FAILED (buyer retried the same checkout)
                | (Failed, Approved)
                | (Failed, Pending)
                | (Failed, Cancelled)
            // From APPROVED
                | (Approved, Refunded)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use PaymentStatus::*;
        match self {
            Pending => vec![Approved, Failed, Cancelled],
            Failed => vec![Approved, Pending, Cancelled],
            Approved => vec![Refunded],
            Refunded | Cancelled => vec![],
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "approved" => Ok(PaymentStatus::Approved),
            "refunded" => Ok(PaymentStatus::Refunded),
            "cancelled" => Ok(PaymentStatus::Cancelled),
            "failed" => Ok(PaymentStatus::Failed),
            other => Err(ValidationError::invalid_format(
                "payment_status",
                format!("unknown status '{}'", other),
            )),
        }
    }
}
