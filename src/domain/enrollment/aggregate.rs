//! Enrollment aggregate - a user's access to a course or journey.

use serde::{Deserialize, Serialize};

use crate::domain::catalog::{CatalogItem, PricedItem};
use crate::domain::foundation::{
    DomainError, EnrollmentId, ErrorCode, PaymentId, StateMachine, Timestamp, UserId,
};

use super::EnrollmentStatus;

/// Access grant created when a payment is approved.
///
/// # Invariants
///
/// - at most one enrollment per `(payment_id, target)`
/// - `expires_at`, when set, is after `granted_at`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub user_id: UserId,
    pub target: CatalogItem,
    pub payment_id: PaymentId,
    pub status: EnrollmentStatus,
    pub granted_at: Timestamp,
    pub expires_at: Option<Timestamp>,
    pub revoked_at: Option<Timestamp>,
    pub revoke_reason: Option<String>,
}

impl Enrollment {
    /// Grants access to a purchased item.
    ///
    /// The access period comes from the item snapshot taken at checkout.
    pub fn grant(
        id: EnrollmentId,
        user_id: UserId,
        purchased: &PricedItem,
        payment_id: PaymentId,
        granted_at: Timestamp,
    ) -> Self {
        Self {
            id,
            user_id,
            target: purchased.item,
            payment_id,
            status: EnrollmentStatus::Active,
            granted_at,
            expires_at: purchased
                .access_days
                .map(|days| granted_at.add_days(i64::from(days))),
            revoked_at: None,
            revoke_reason: None,
        }
    }

    /// True when the enrollment gives access at `now`.
    pub fn is_active_at(&self, now: Timestamp) -> bool {
        self.status == EnrollmentStatus::Active
            && self.expires_at.map_or(true, |expires| now.is_before(&expires))
    }

    /// True when the access period has ended but the status still says active.
    pub fn is_due_for_expiry(&self, now: Timestamp) -> bool {
        self.status == EnrollmentStatus::Active
            && self.expires_at.map_or(false, |expires| !now.is_before(&expires))
    }

    /// Ends access because the period is over.
    ///
    /// # Errors
    ///
    /// Returns error if the enrollment is not active.
    pub fn expire(&mut self) -> Result<(), DomainError> {
        self.transition_to(EnrollmentStatus::Expired)
    }

    /// Withdraws access.
    ///
    /// # Errors
    ///
    /// Returns error if the enrollment is already revoked.
    pub fn revoke(&mut self, reason: impl Into<String>) -> Result<(), DomainError> {
        self.transition_to(EnrollmentStatus::Revoked)?;
        self.revoked_at = Some(Timestamp::now());
        self.revoke_reason = Some(reason.into());
        Ok(())
    }

    fn transition_to(&mut self, target: EnrollmentStatus) -> Result<(), DomainError> {
        self.status = self.status.transition_to(target).map_err(|_| {
            DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!(
                    "Cannot transition enrollment from {} to {}",
                    self.status, target
                ),
            )
        })?;
        Ok(())
    }
}
