//! Payment queries for buyers and admins.

use std::sync::Arc;

use crate::domain::foundation::{Actor, PaymentId, UserId};
use crate::domain::payment::Payment;
use crate::domain::refund::Refund;
use crate::domain::StoreError;
use crate::ports::{PaymentRepository, RefundRepository};

#[derive(Debug, Clone)]
pub struct GetPaymentQuery {
    pub actor: Actor,
    pub payment_id: PaymentId,
}

#[derive(Debug, Clone)]
pub struct GetPaymentResult {
    pub payment: Payment,
    /// Newest first.
    pub refunds: Vec<Refund>,
}

pub struct GetPaymentHandler {
    payments: Arc<dyn PaymentRepository>,
    refunds: Arc<dyn RefundRepository>,
}

impl GetPaymentHandler {
    pub fn new(payments: Arc<dyn PaymentRepository>, refunds: Arc<dyn RefundRepository>) -> Self {
        Self { payments, refunds }
    }

    /// Owners and admins may read a payment.
    pub async fn handle(&self, query: GetPaymentQuery) -> Result<GetPaymentResult, StoreError> {
        let payment = self
            .payments
            .find_by_id(&query.payment_id)
            .await?
            .ok_or(StoreError::PaymentNotFound(query.payment_id))?;

        if !query.actor.can_access(&payment.user_id) {
            return Err(StoreError::forbidden("Payment belongs to another user"));
        }

        let refunds = self.refunds.find_by_payment(&payment.id).await?;
        Ok(GetPaymentResult { payment, refunds })
    }
}

#[derive(Debug, Clone)]
pub struct ListPaymentsQuery {
    pub user_id: UserId,
}

pub struct ListPaymentsHandler {
    payments: Arc<dyn PaymentRepository>,
}

impl ListPaymentsHandler {
    pub fn new(payments: Arc<dyn PaymentRepository>) -> Self {
        Self { payments }
    }

    pub async fn handle(&self, query: ListPaymentsQuery) -> Result<Vec<Payment>, StoreError> {
        Ok(self.payments.find_by_user(&query.user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::TestStore;
    use crate::domain::catalog::CatalogItem;

    #[tokio::test]
    async fn owner_and_admin_can_read() {
        let store = TestStore::seeded().await;
        let payment = store
            .pending_payment(vec![CatalogItem::Course(store.rust_course.id)])
            .await;
        let handler = GetPaymentHandler::new(store.payments.clone(), store.refunds.clone());

        for actor in [
            Actor::customer(store.buyer()),
            Actor::admin(UserId::new("admin").unwrap()),
        ] {
            let result = handler
                .handle(GetPaymentQuery {
                    actor,
                    payment_id: payment.id,
                })
                .await
                .unwrap();
            assert_eq!(result.payment.id, payment.id);
        }
    }

    #[tokio::test]
    async fn other_customer_is_forbidden() {
        let store = TestStore::seeded().await;
        let payment = store
            .pending_payment(vec![CatalogItem::Course(store.rust_course.id)])
            .await;

        let err = GetPaymentHandler::new(store.payments.clone(), store.refunds.clone())
            .handle(GetPaymentQuery {
                actor: Actor::customer(UserId::new("someone-else").unwrap()),
                payment_id: payment.id,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Forbidden(_)));
    }

    #[tokio::test]
    async fn lists_own_payments() {
        let store = TestStore::seeded().await;
        store
            .pending_payment(vec![CatalogItem::Course(store.rust_course.id)])
            .await;
        let payments = ListPaymentsHandler::new(store.payments.clone())
            .handle(ListPaymentsQuery {
                user_id: store.buyer(),
            })
            .await
            .unwrap();
        assert_eq!(payments.len(), 1);
    }
}
