//! Rules deciding whether a refund may be requested.

use thiserror::Error;

use crate::domain::foundation::{Actor, Timestamp};
use crate::domain::payment::{Payment, PaymentStatus};

use super::Refund;

/// Reason a refund request was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefundRejection {
    #[error("Payment belongs to another user")]
    NotOwner,

    #[error("Payment is {0}; only approved payments can be refunded")]
    NotApproved(PaymentStatus),

    #[error("Refunds must be requested within {window_days} days of purchase")]
    WindowClosed { window_days: u32 },

    #[error("A refund is already in progress for this payment")]
    AlreadyRequested,
}

/// Refund eligibility rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefundPolicy {
    /// Days after approval during which customers may ask for a refund.
    pub window_days: u32,
}

impl RefundPolicy {
    pub fn new(window_days: u32) -> Self {
        Self { window_days }
    }

    /// Checks a request against the payment and any refund already open.
    ///
    /// Admins may refund any payment at any time; customers only their own,
    /// inside the window.
    pub fn evaluate(
        &self,
        payment: &Payment,
        actor: &Actor,
        open_refund: Option<&Refund>,
        now: Timestamp,
    ) -> Result<(), RefundRejection> {
        if !actor.can_access(&payment.user_id) {
            return Err(RefundRejection::NotOwner);
        }
        if payment.status != PaymentStatus::Approved {
            return Err(RefundRejection::NotApproved(payment.status));
        }
        if open_refund.map_or(false, Refund::is_open) {
            return Err(RefundRejection::AlreadyRequested);
        }
        if !actor.is_admin() && !payment.within_refund_window(now, self.window_days) {
            return Err(RefundRejection::WindowClosed {
                window_days: self.window_days,
            });
        }
        Ok(())
    }
}

impl Default for RefundPolicy {
    fn default() -> Self {
        Self::new(7)
    }
}
