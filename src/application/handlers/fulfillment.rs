//! Side effects that follow a payment's status.
//!
//! Every operation here is idempotent so it can be re-run on each
//! notification: enrollments are unique per `(payment, item)`, revoked
//! enrollments are skipped and a refund is settled at most once.

use std::sync::Arc;

use crate::domain::enrollment::{Enrollment, EnrollmentEvent, EnrollmentStatus};
use crate::domain::foundation::{
    DomainError, EnrollmentId, RefundId, SerializableDomainEvent, Timestamp,
};
use crate::domain::payment::Payment;
use crate::domain::refund::{Refund, RefundEvent, RefundStatus};
use crate::ports::{CartRepository, EnrollmentRepository, EventPublisher, RefundRepository};

/// Grants and withdraws what a payment paid for.
#[derive(Clone)]
pub struct Fulfillment {
    enrollments: Arc<dyn EnrollmentRepository>,
    refunds: Arc<dyn RefundRepository>,
    carts: Arc<dyn CartRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl Fulfillment {
    pub fn new(
        enrollments: Arc<dyn EnrollmentRepository>,
        refunds: Arc<dyn RefundRepository>,
        carts: Arc<dyn CartRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            enrollments,
            refunds,
            carts,
            event_publisher,
        }
    }

    /// Ensures one enrollment per purchased item. Returns how many were new.
    pub async fn grant_access(&self, payment: &Payment) -> Result<usize, DomainError> {
        let granted_at = payment.approved_at.unwrap_or_else(Timestamp::now);
        let mut granted = 0;

        for item in &payment.items {
            let enrollment = Enrollment::grant(
                EnrollmentId::new(),
                payment.user_id.clone(),
                item,
                payment.id,
                granted_at,
            );
            if !self.enrollments.insert_if_absent(&enrollment).await? {
                continue;
            }
            granted += 1;

            tracing::info!(
                enrollment_id = %enrollment.id,
                payment_id = %payment.id,
                target = %enrollment.target,
                "Enrollment granted"
            );

            let event = EnrollmentEvent::Granted {
                enrollment_id: enrollment.id,
                user_id: enrollment.user_id.clone(),
                target: enrollment.target,
                payment_id: payment.id,
                expires_at: enrollment.expires_at,
                occurred_at: Timestamp::now(),
            };
            self.event_publisher.publish(event.to_envelope()).await?;
        }

        Ok(granted)
    }

    /// Empties the buyer's cart after a purchase went through.
    pub async fn clear_cart(&self, payment: &Payment) -> Result<(), DomainError> {
        self.carts.clear(&payment.user_id).await
    }

    /// Revokes every enrollment the payment granted. Returns how many changed.
    pub async fn revoke_access(&self, payment: &Payment, reason: &str) -> Result<usize, DomainError> {
        let mut revoked = 0;

        for mut enrollment in self.enrollments.find_by_payment(&payment.id).await? {
            if enrollment.status == EnrollmentStatus::Revoked {
                continue;
            }
            enrollment.revoke(reason)?;
            self.enrollments.update(&enrollment).await?;
            revoked += 1;

            tracing::info!(
                enrollment_id = %enrollment.id,
                payment_id = %payment.id,
                reason,
                "Enrollment revoked"
            );

            let event = EnrollmentEvent::Revoked {
                enrollment_id: enrollment.id,
                user_id: enrollment.user_id.clone(),
                payment_id: payment.id,
                reason: reason.to_string(),
                occurred_at: Timestamp::now(),
            };
            self.event_publisher.publish(event.to_envelope()).await?;
        }

        Ok(revoked)
    }

    /// Completes the open refund of a refunded payment.
    ///
    /// When no refund was requested through the store (a chargeback or a
    /// refund made in the gateway dashboard) one is recorded with a gateway
    /// origin. Returns `None` when the refund was already settled.
    pub async fn settle_refund(
        &self,
        payment: &Payment,
        reason: &str,
    ) -> Result<Option<Refund>, DomainError> {
        let refund = match self.refunds.find_open_by_payment(&payment.id).await? {
            Some(mut open) => {
                open.complete()?;
                self.refunds.update(&open).await?;
                open
            }
            None => {
                let settled = self
                    .refunds
                    .find_by_payment(&payment.id)
                    .await?
                    .iter()
                    .any(|r| r.status == RefundStatus::Completed);
                if settled {
                    return Ok(None);
                }
                let recorded = Refund::from_gateway(RefundId::new(), payment, reason);
                self.refunds.save(&recorded).await?;
                recorded
            }
        };

        tracing::info!(
            refund_id = %refund.id,
            payment_id = %payment.id,
            origin = refund.origin.as_str(),
            "Refund completed"
        );

        let event = RefundEvent::Completed {
            refund_id: refund.id,
            payment_id: payment.id,
            origin: refund.origin,
            occurred_at: Timestamp::now(),
        };
        self.event_publisher.publish(event.to_envelope()).await?;

        Ok(Some(refund))
    }
}
