//! Routes `payment` notifications into reconciliation.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::webhook::{Notification, NotificationHandler, NotificationTopic, WebhookError};

use super::{ReconcilePaymentCommand, ReconcilePaymentHandler};

pub struct PaymentNotificationHandler {
    reconcile: Arc<ReconcilePaymentHandler>,
}

impl PaymentNotificationHandler {
    pub fn new(reconcile: Arc<ReconcilePaymentHandler>) -> Self {
        Self { reconcile }
    }
}

#[async_trait]
impl NotificationHandler for PaymentNotificationHandler {
    fn topic(&self) -> NotificationTopic {
        NotificationTopic::Payment
    }

    async fn handle(&self, notification: &Notification) -> Result<(), WebhookError> {
        let result = self
            .reconcile
            .handle(ReconcilePaymentCommand {
                gateway_payment_id: notification.data_id.clone(),
            })
            .await?;

        tracing::info!(
            payment_id = %result.payment_id,
            gateway_payment_id = %notification.data_id,
            status = %result.status,
            "Payment notification reconciled"
        );
        Ok(())
    }
}
