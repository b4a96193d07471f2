//! Refund aggregate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{
    Actor, DomainError, ErrorCode, Money, PaymentId, RefundId, StateMachine, Timestamp, UserId,
    ValidationError,
};
use crate::domain::payment::Payment;

use super::RefundStatus;

/// Who started the refund.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundOrigin {
    Customer,
    Admin,
    /// Refunded or charged back directly at the gateway.
    Gateway,
}

impl RefundOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefundOrigin::Customer => "customer",
            RefundOrigin::Admin => "admin",
            RefundOrigin::Gateway => "gateway",
        }
    }
}

impl fmt::Display for RefundOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RefundOrigin {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(RefundOrigin::Customer),
            "admin" => Ok(RefundOrigin::Admin),
            "gateway" => Ok(RefundOrigin::Gateway),
            other => Err(ValidationError::invalid_format(
                "refund_origin",
                format!("unknown origin '{}'", other),
            )),
        }
    }
}

/// Full reversal of an approved payment.
///
/// # Invariants
///
/// - `amount` equals the payment total
/// - at most one `Requested` refund per payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refund {
    pub id: RefundId,
    pub payment_id: PaymentId,
    /// Owner of the refunded payment.
    pub user_id: UserId,
    pub amount: Money,
    pub reason: Option<String>,
    pub status: RefundStatus,
    pub origin: RefundOrigin,
    pub gateway_refund_id: Option<String>,
    /// `None` for gateway-initiated refunds.
    pub requested_by: Option<UserId>,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub failure_reason: Option<String>,
}

impl Refund {
    /// Opens a refund requested through the store.
    pub fn request(id: RefundId, payment: &Payment, actor: &Actor, reason: Option<String>) -> Self {
        Self {
            id,
            payment_id: payment.id,
            user_id: payment.user_id.clone(),
            amount: payment.total.clone(),
            reason,
            status: RefundStatus::Requested,
            origin: if actor.is_admin() {
                RefundOrigin::Admin
            } else {
                RefundOrigin::Customer
            },
            gateway_refund_id: None,
            requested_by: Some(actor.user_id.clone()),
            created_at: Timestamp::now(),
            completed_at: None,
            failure_reason: None,
        }
    }

    /// Records a refund that happened at the gateway without a store request.
    pub fn from_gateway(id: RefundId, payment: &Payment, reason: impl Into<String>) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            payment_id: payment.id,
            user_id: payment.user_id.clone(),
            amount: payment.total.clone(),
            reason: Some(reason.into()),
            status: RefundStatus::Completed,
            origin: RefundOrigin::Gateway,
            gateway_refund_id: None,
            requested_by: None,
            created_at: now,
            completed_at: Some(now),
            failure_reason: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == RefundStatus::Requested
    }

    /// Idempotency key sent with the gateway refund call.
    pub fn idempotency_key(&self) -> String {
        format!("refund-{}", self.id)
    }

    /// Records the gateway's id for this refund while it is processed.
    pub fn record_gateway_refund(&mut self, gateway_refund_id: impl Into<String>) {
        self.gateway_refund_id = Some(gateway_refund_id.into());
    }

    /// Marks the refund done.
    ///
    /// # Errors
    ///
    /// Returns error if the refund is not open.
    pub fn complete(&mut self) -> Result<(), DomainError> {
        self.transition_to(RefundStatus::Completed)?;
        self.completed_at = Some(Timestamp::now());
        Ok(())
    }

    /// Marks the refund refused by the gateway.
    ///
    /// # Errors
    ///
    /// Returns error if the refund is not open.
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), DomainError> {
        self.transition_to(RefundStatus::Failed)?;
        self.failure_reason = Some(reason.into());
        Ok(())
    }

    fn transition_to(&mut self, target: RefundStatus) -> Result<(), DomainError> {
        self.status = self.status.transition_to(target).map_err(|_| {
            DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Cannot transition refund from {} to {}", self.status, target),
            )
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{CatalogItem, PricedItem};
    use crate::domain::foundation::CourseId;

    fn payment() -> Payment {
        Payment::create(
            PaymentId::new(),
            UserId::new("buyer").unwrap(),
            vec![PricedItem {
                item: CatalogItem::Course(CourseId::new()),
                title: "Course".to_string(),
                unit_price: Money::new(4990, "BRL").unwrap(),
                access_days: None,
            }],
        )
        .unwrap()
    }

    #[test]
    fn request_refunds_the_full_total() {
        let payment = payment();
        let actor = Actor::customer(payment.user_id.clone());
        let refund = Refund::request(RefundId::new(), &payment, &actor, None);

        assert_eq!(refund.amount, payment.total);
        assert_eq!(refund.origin, RefundOrigin::Customer);
        assert!(refund.is_open());
    }

    #[test]
    fn admin_request_is_marked_admin() {
        let payment = payment();
        let actor = Actor::admin(UserId::new("staff").unwrap());
        let refund = Refund::request(RefundId::new(), &payment, &actor, Some("goodwill".into()));

        assert_eq!(refund.origin, RefundOrigin::Admin);
        assert_eq!(refund.user_id, payment.user_id);
        assert_eq!(refund.requested_by, Some(actor.user_id));
    }

    #[test]
    fn gateway_refund_is_already_completed() {
        let refund = Refund::from_gateway(RefundId::new(), &payment(), "charged_back");
        assert_eq!(refund.status, RefundStatus::Completed);
        assert!(refund.completed_at.is_some());
        assert!(refund.requested_by.is_none());
    }

    #[test]
    fn complete_then_fail_is_rejected() {
        let payment = payment();
        let mut refund = Refund::request(
            RefundId::new(),
            &payment,
            &Actor::customer(payment.user_id.clone()),
            None,
        );
        refund.complete().unwrap();
        assert!(refund.fail("late").is_err());
    }
}
