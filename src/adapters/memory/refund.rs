//! In-memory refunds.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, PaymentId, RefundId};
use crate::domain::refund::Refund;
use crate::ports::RefundRepository;

#[derive(Default)]
pub struct InMemoryRefundRepository {
    refunds: RwLock<HashMap<RefundId, Refund>>,
}

impl InMemoryRefundRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RefundRepository for InMemoryRefundRepository {
    async fn save(&self, refund: &Refund) -> Result<(), DomainError> {
        let mut refunds = self.refunds.write().await;
        let open_exists = refund.is_open()
            && refunds
                .values()
                .any(|r| r.payment_id == refund.payment_id && r.is_open());
        if open_exists || refunds.contains_key(&refund.id) {
            return Err(DomainError::new(
                ErrorCode::AlreadyExists,
                format!("A refund is already open for payment {}", refund.payment_id),
            ));
        }
        refunds.insert(refund.id, refund.clone());
        Ok(())
    }

    async fn update(&self, refund: &Refund) -> Result<(), DomainError> {
        let mut refunds = self.refunds.write().await;
        match refunds.get_mut(&refund.id) {
            Some(stored) => {
                *stored = refund.clone();
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::RefundNotFound,
                format!("Refund {} not found", refund.id),
            )),
        }
    }

    async fn find_by_id(&self, id: &RefundId) -> Result<Option<Refund>, DomainError> {
        Ok(self.refunds.read().await.get(id).cloned())
    }

    async fn find_open_by_payment(
        &self,
        payment_id: &PaymentId,
    ) -> Result<Option<Refund>, DomainError> {
        Ok(self
            .refunds
            .read()
            .await
            .values()
            .find(|r| &r.payment_id == payment_id && r.is_open())
            .cloned())
    }

    async fn find_by_payment(&self, payment_id: &PaymentId) -> Result<Vec<Refund>, DomainError> {
        let mut refunds: Vec<Refund> = self
            .refunds
            .read()
            .await
            .values()
            .filter(|r| &r.payment_id == payment_id)
            .cloned()
            .collect();
        refunds.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(refunds)
    }
}
