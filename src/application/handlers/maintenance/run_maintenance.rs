//! MaintenanceHandler - Periodic housekeeping.
//!
//! - Expires enrollments past `expires_at`
//! - Cancels checkouts left `Pending` longer than the timeout, unless the
//!   gateway already reported a payment attempt for them
//! - Purges notification delivery records past retention
//!
//! Each step logs and skips items it cannot update so one bad row does not
//! stop the run.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::domain::enrollment::EnrollmentEvent;
use crate::domain::foundation::{DomainError, SerializableDomainEvent, Timestamp};
use crate::domain::payment::{PaymentEvent, PaymentStatus};
use crate::ports::{
    EnrollmentRepository, EventPublisher, PaymentRepository, WebhookEventRepository,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaintenanceSettings {
    pub pending_payment_timeout_hours: u32,
    pub webhook_retention_days: u32,
}

impl Default for MaintenanceSettings {
    fn default() -> Self {
        Self {
            pending_payment_timeout_hours: 72,
            webhook_retention_days: 30,
        }
    }
}

/// Counts of what one run changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaintenanceReport {
    pub enrollments_expired: usize,
    pub payments_cancelled: usize,
    pub webhook_records_purged: u64,
}

pub struct MaintenanceHandler {
    payments: Arc<dyn PaymentRepository>,
    enrollments: Arc<dyn EnrollmentRepository>,
    webhook_events: Arc<dyn WebhookEventRepository>,
    event_publisher: Arc<dyn EventPublisher>,
    settings: MaintenanceSettings,
}

impl MaintenanceHandler {
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        enrollments: Arc<dyn EnrollmentRepository>,
        webhook_events: Arc<dyn WebhookEventRepository>,
        event_publisher: Arc<dyn EventPublisher>,
        settings: MaintenanceSettings,
    ) -> Self {
        Self {
            payments,
            enrollments,
            webhook_events,
            event_publisher,
            settings,
        }
    }

    pub async fn run(&self, now: Timestamp) -> Result<MaintenanceReport, DomainError> {
        let report = MaintenanceReport {
            enrollments_expired: self.expire_enrollments(now).await?,
            payments_cancelled: self.cancel_stale_payments(now).await?,
            webhook_records_purged: self.purge_webhook_events(now).await?,
        };
        if report != MaintenanceReport::default() {
            tracing::info!(
                enrollments_expired = report.enrollments_expired,
                payments_cancelled = report.payments_cancelled,
                webhook_records_purged = report.webhook_records_purged,
                "Maintenance run finished"
            );
        }
        Ok(report)
    }

    pub async fn expire_enrollments(&self, now: Timestamp) -> Result<usize, DomainError> {
        let mut expired = 0;
        for mut enrollment in self.enrollments.find_due_for_expiry(now).await? {
            if let Err(e) = enrollment.expire() {
                tracing::warn!(enrollment_id = %enrollment.id, error = %e, "Cannot expire enrollment");
                continue;
            }
            if let Err(e) = self.enrollments.update(&enrollment).await {
                tracing::warn!(enrollment_id = %enrollment.id, error = %e, "Failed to store expired enrollment");
                continue;
            }
            expired += 1;

            let event = EnrollmentEvent::Expired {
                enrollment_id: enrollment.id,
                user_id: enrollment.user_id.clone(),
                occurred_at: now,
            };
            self.event_publisher.publish(event.to_envelope()).await?;
        }
        Ok(expired)
    }

    pub async fn cancel_stale_payments(&self, now: Timestamp) -> Result<usize, DomainError> {
        let cutoff = now.add_hours(-i64::from(self.settings.pending_payment_timeout_hours));
        let mut cancelled = 0;

        for mut payment in self.payments.find_pending_before(cutoff).await? {
            // Slow methods (boleto, bank transfer) settle days later; the
            // gateway reports their final status itself.
            if let Some(gateway_payment_id) = &payment.gateway_payment_id {
                tracing::debug!(
                    payment_id = %payment.id,
                    gateway_payment_id = %gateway_payment_id,
                    "Keeping stale payment with a gateway attempt"
                );
                continue;
            }
            if let Err(e) = payment.cancel("checkout expired") {
                tracing::warn!(payment_id = %payment.id, error = %e, "Cannot cancel payment");
                continue;
            }
            // A conflict means a notification touched it meanwhile; leave it.
            if let Err(e) = self.payments.update(&payment).await {
                tracing::warn!(payment_id = %payment.id, error = %e, "Failed to cancel stale payment");
                continue;
            }
            cancelled += 1;

            let event = PaymentEvent::StatusChanged {
                payment_id: payment.id,
                user_id: payment.user_id.clone(),
                from: PaymentStatus::Pending,
                to: PaymentStatus::Cancelled,
                gateway_payment_id: payment.gateway_payment_id.clone(),
                occurred_at: now,
            };
            self.event_publisher.publish(event.to_envelope()).await?;
        }
        Ok(cancelled)
    }

    pub async fn purge_webhook_events(&self, now: Timestamp) -> Result<u64, DomainError> {
        let cutoff = now.minus_days(i64::from(self.settings.webhook_retention_days));
        self.webhook_events.delete_before(cutoff).await
    }
}

/// Runs maintenance every `interval` until the runtime shuts down.
pub fn spawn_maintenance(handler: Arc<MaintenanceHandler>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(e) = handler.run(Timestamp::now()).await {
                tracing::error!(error = %e, "Maintenance run failed");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::TestStore;
    use crate::domain::catalog::CatalogItem;
    use crate::domain::enrollment::EnrollmentStatus;
    use crate::ports::WebhookEventRecord;

    fn handler(store: &TestStore) -> MaintenanceHandler {
        MaintenanceHandler::new(
            store.payments.clone(),
            store.enrollments.clone(),
            store.webhook_events.clone(),
            store.events.clone(),
            MaintenanceSettings::default(),
        )
    }

    #[tokio::test]
    async fn expires_enrollments_past_access_period() {
        let store = TestStore::seeded().await;
        let payment = store
            .approved_payment(vec![
                CatalogItem::Course(store.go_course.id),
                CatalogItem::Course(store.rust_course.id),
            ])
            .await;
        store.fulfillment().grant_access(&payment).await.unwrap();

        let later = Timestamp::now().add_days(400);
        let report = handler(&store).run(later).await.unwrap();

        assert_eq!(report.enrollments_expired, 1);
        let enrollments = store.enrollments.find_by_payment(&payment.id).await.unwrap();
        let statuses: Vec<EnrollmentStatus> = enrollments.iter().map(|e| e.status).collect();
        assert!(statuses.contains(&EnrollmentStatus::Expired));
        assert!(statuses.contains(&EnrollmentStatus::Active));
    }

    #[tokio::test]
    async fn cancels_only_stale_pending_payments() {
        let store = TestStore::seeded().await;
        let payment = store
            .pending_payment(vec![CatalogItem::Course(store.rust_course.id)])
            .await;
        let handler = handler(&store);

        assert_eq!(handler.cancel_stale_payments(Timestamp::now()).await.unwrap(), 0);

        let later = Timestamp::now().add_hours(73);
        assert_eq!(handler.cancel_stale_payments(later).await.unwrap(), 1);
        let stored = store.payments.find_by_id(&payment.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PaymentStatus::Cancelled);
    }

    #[tokio::test]
    async fn keeps_stale_payments_the_gateway_is_still_processing() {
        let store = TestStore::seeded().await;
        let mut payment = store
            .pending_payment(vec![CatalogItem::Course(store.rust_course.id)])
            .await;
        payment.apply_gateway_status(PaymentStatus::Pending, "boleto-1", None, None);
        store.payments.update(&payment).await.unwrap();

        let later = Timestamp::now().add_days(4);
        assert_eq!(handler(&store).cancel_stale_payments(later).await.unwrap(), 0);
        let stored = store.payments.find_by_id(&payment.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn purges_old_webhook_records() {
        let store = TestStore::seeded().await;
        store
            .webhook_events
            .save(WebhookEventRecord::success(
                "notification:1",
                "payment",
                "1",
                serde_json::json!({}),
            ))
            .await
            .unwrap();

        let purged = handler(&store)
            .purge_webhook_events(Timestamp::now().add_days(31))
            .await
            .unwrap();
        assert_eq!(purged, 1);
    }
}
