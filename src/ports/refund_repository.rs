//! Refund repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, PaymentId, RefundId};
use crate::domain::refund::Refund;

/// Storage for refunds.
///
/// Implementations must reject a second `Requested` refund for the same
/// payment (partial unique index in PostgreSQL).
#[async_trait]
pub trait RefundRepository: Send + Sync {
    /// Save a new refund.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists` if an open refund exists for the payment
    async fn save(&self, refund: &Refund) -> Result<(), DomainError>;

    async fn update(&self, refund: &Refund) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &RefundId) -> Result<Option<Refund>, DomainError>;

    /// The `Requested` refund of a payment, if any.
    async fn find_open_by_payment(
        &self,
        payment_id: &PaymentId,
    ) -> Result<Option<Refund>, DomainError>;

    /// Every refund of a payment, newest first.
    async fn find_by_payment(&self, payment_id: &PaymentId) -> Result<Vec<Refund>, DomainError>;
}
