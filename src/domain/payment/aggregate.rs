//! Payment aggregate.
//!
//! A Payment is created at checkout with a snapshot of what is being bought,
//! and is then driven by gateway notifications.
//!
//! # Design Decisions
//!
//! - **Gateway is authoritative**: status only moves through
//!   `apply_gateway_status`, fed from a payment fetched from the gateway
//! - **Out-of-order safe**: the gateway's last-updated time is kept and older
//!   snapshots are reported as `Stale`
//! - **Optimistic locking**: `version` increments on every persisted change

use serde::{Deserialize, Serialize};

use crate::domain::catalog::PricedItem;
use crate::domain::foundation::{
    DomainError, ErrorCode, Money, PaymentId, StateMachine, Timestamp, UserId,
};

use super::PaymentStatus;

/// Outcome of applying a gateway status to a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    /// The transition was allowed and applied.
    Transitioned {
        from: PaymentStatus,
        to: PaymentStatus,
    },

    /// The payment already has this status (duplicate notification).
    Unchanged,

    /// The gateway snapshot is older than the last one applied.
    Stale,

    /// The transition is not allowed. Nothing was applied.
    Rejected {
        from: PaymentStatus,
        to: PaymentStatus,
    },
}

impl StatusChange {
    pub fn is_transition(&self) -> bool {
        matches!(self, StatusChange::Transitioned { .. })
    }
}

/// Payment aggregate.
///
/// # Invariants
///
/// - `items` is non-empty and `total` is their sum
/// - status transitions follow [`PaymentStatus`] rules
/// - `approved_at` is set once the payment has been approved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub user_id: UserId,

    /// Items bought, priced at checkout time.
    pub items: Vec<PricedItem>,
    pub total: Money,
    pub status: PaymentStatus,

    /// Checkout preference created at the gateway.
    pub preference_id: Option<String>,
    pub checkout_url: Option<String>,

    /// Gateway payment last applied to this record.
    pub gateway_payment_id: Option<String>,
    pub status_detail: Option<String>,
    pub gateway_updated_at: Option<Timestamp>,

    pub approved_at: Option<Timestamp>,
    pub refunded_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub version: i64,
}

impl Payment {
    /// Creates a pending payment for the given items.
    ///
    /// # Errors
    ///
    /// Returns validation error for an empty item list or mixed currencies.
    pub fn create(
        id: PaymentId,
        user_id: UserId,
        items: Vec<PricedItem>,
    ) -> Result<Self, DomainError> {
        let currency = match items.first() {
            Some(first) => first.unit_price.currency().to_string(),
            None => return Err(DomainError::validation("items", "Payment has no items")),
        };
        let total = Money::sum(&currency, items.iter().map(|i| &i.unit_price))?;
        let now = Timestamp::now();
        Ok(Self {
            id,
            user_id,
            items,
            total,
            status: PaymentStatus::Pending,
            preference_id: None,
            checkout_url: None,
            gateway_payment_id: None,
            status_detail: None,
            gateway_updated_at: None,
            approved_at: None,
            refunded_at: None,
            created_at: now,
            updated_at: now,
            version: 0,
        })
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    /// Records the checkout preference created at the gateway.
    pub fn attach_preference(&mut self, preference_id: String, checkout_url: String) {
        self.preference_id = Some(preference_id);
        self.checkout_url = Some(checkout_url);
        self.updated_at = Timestamp::now();
    }

    /// True when the gateway charged exactly the payment total.
    pub fn amount_matches(&self, charged: &Money) -> bool {
        &self.total == charged
    }

    /// Applies a status reported by the gateway.
    ///
    /// `gateway_updated_at` is the gateway's own last-modified time for the
    /// payment. A snapshot older than the one already applied is `Stale`.
    pub fn apply_gateway_status(
        &mut self,
        status: PaymentStatus,
        gateway_payment_id: &str,
        status_detail: Option<String>,
        gateway_updated_at: Option<Timestamp>,
    ) -> StatusChange {
        if let (Some(applied), Some(incoming)) = (self.gateway_updated_at, gateway_updated_at) {
            if incoming.is_before(&applied) {
                return StatusChange::Stale;
            }
        }

        if status == self.status {
            // A pending attempt is still worth remembering; maintenance
            // leaves payments the gateway knows about alone.
            if self.gateway_payment_id.is_none() {
                self.gateway_payment_id = Some(gateway_payment_id.to_string());
                self.updated_at = Timestamp::now();
            }
            return StatusChange::Unchanged;
        }

        let from = self.status;
        if !from.can_transition_to(&status) {
            return StatusChange::Rejected { from, to: status };
        }

        let now = Timestamp::now();
        self.status = status;
        self.gateway_payment_id = Some(gateway_payment_id.to_string());
        self.status_detail = status_detail;
        if gateway_updated_at.is_some() {
            self.gateway_updated_at = gateway_updated_at;
        }
        match status {
            PaymentStatus::Approved => self.approved_at = Some(now),
            PaymentStatus::Refunded => self.refunded_at = Some(now),
            _ => {}
        }
        self.updated_at = now;

        StatusChange::Transitioned { from, to: status }
    }

    /// Marks the payment refunded after the gateway confirmed a refund.
    ///
    /// # Errors
    ///
    /// Returns error if the payment is not approved.
    pub fn mark_refunded(&mut self) -> Result<(), DomainError> {
        self.transition_to(PaymentStatus::Refunded)?;
        self.refunded_at = Some(Timestamp::now());
        Ok(())
    }

    /// Cancels a checkout that never completed.
    ///
    /// # Errors
    ///
    /// Returns error if the payment is not pending or failed.
    pub fn cancel(&mut self, reason: &str) -> Result<(), DomainError> {
        self.transition_to(PaymentStatus::Cancelled)?;
        self.status_detail = Some(reason.to_string());
        Ok(())
    }

    /// True when a refund requested at `now` is within `window_days` of approval.
    pub fn within_refund_window(&self, now: Timestamp, window_days: u32) -> bool {
        match self.approved_at {
            Some(approved_at) => !now.is_after(&approved_at.add_days(i64::from(window_days))),
            None => false,
        }
    }

    fn transition_to(&mut self, target: PaymentStatus) -> Result<(), DomainError> {
        self.status = self.status.transition_to(target).map_err(|_| {
            DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Cannot transition payment from {} to {}", self.status, target),
            )
        })?;
        self.updated_at = Timestamp::now();
        Ok(())
    }
}
