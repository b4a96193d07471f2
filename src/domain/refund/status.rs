//! Refund status state machine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundStatus {
    /// Sent to the gateway, waiting for confirmation.
    Requested,

    /// Money returned. The payment is refunded and access revoked.
    Completed,

    /// The gateway refused the refund.
    Failed,
}

impl RefundStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefundStatus::Requested => "requested",
            RefundStatus::Completed => "completed",
            RefundStatus::Failed => "failed",
        }
    }
}

impl StateMachine for RefundStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use RefundStatus::*;
        matches!((self, target), (Requested, Completed) | (Requested, Failed))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use RefundStatus::*;
        match self {
            Requested => vec![Completed, Failed],
            Completed | Failed => vec![],
        }
    }
}

impl fmt::Display for RefundStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RefundStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "requested" => Ok(RefundStatus::Requested),
            "completed" => Ok(RefundStatus::Completed),
            "failed" => Ok(RefundStatus::Failed),
            other => Err(ValidationError::invalid_format(
                "refund_status",
                format!("unknown status '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requested_resolves_to_completed_or_failed() {
        assert_eq!(
            RefundStatus::Requested.transition_to(RefundStatus::Completed),
            Ok(RefundStatus::Completed)
        );
        assert_eq!(
            RefundStatus::Requested.transition_to(RefundStatus::Failed),
            Ok(RefundStatus::Failed)
        );
    }

    #[test]
    fn resolved_refunds_are_terminal() {
        assert!(RefundStatus::Completed.is_terminal());
        assert!(RefundStatus::Failed.is_terminal());
        assert!(RefundStatus::Completed
            .transition_to(RefundStatus::Requested)
            .is_err());
    }
}
