//! Payment repository port.
//!
//! # Design
//!
//! - **Optimistic locking**: `update` only succeeds if the stored version
//!   equals the one the caller loaded; the stored version is then
//!   incremented. A lost race yields `ConcurrencyConflict`.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, PaymentId, Timestamp, UserId};
use crate::domain::payment::Payment;

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Save a new payment.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists` if the id is taken
    /// - `DatabaseError` on persistence failure
    async fn save(&self, payment: &Payment) -> Result<(), DomainError>;

    /// Update an existing payment.
    ///
    /// # Errors
    ///
    /// - `PaymentNotFound` if it does not exist
    /// - `ConcurrencyConflict` if the stored version differs from
    ///   `payment.version`
    async fn update(&self, payment: &Payment) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, DomainError>;

    /// Payments of a user, newest first.
    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<Payment>, DomainError>;

    /// Pending payments created before `cutoff`.
    async fn find_pending_before(&self, cutoff: Timestamp) -> Result<Vec<Payment>, DomainError>;
}
