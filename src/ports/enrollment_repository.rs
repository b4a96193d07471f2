//! Enrollment repository port.

use async_trait::async_trait;

use crate::domain::catalog::CatalogItem;
use crate::domain::enrollment::Enrollment;
use crate::domain::foundation::{DomainError, PaymentId, Timestamp, UserId};

/// Storage for enrollments.
///
/// Implementations must enforce uniqueness of `(payment_id, target)` so that
/// concurrent provisioning of the same payment cannot grant twice.
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// Insert unless an enrollment for the same payment and target exists.
    ///
    /// Returns true when inserted.
    async fn insert_if_absent(&self, enrollment: &Enrollment) -> Result<bool, DomainError>;

    /// Persist status changes of an existing enrollment.
    async fn update(&self, enrollment: &Enrollment) -> Result<(), DomainError>;

    async fn find_by_payment(&self, payment_id: &PaymentId)
        -> Result<Vec<Enrollment>, DomainError>;

    /// All enrollments of a user, newest first.
    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<Enrollment>, DomainError>;

    /// Enrollments of a user for any of the given targets, any status.
    async fn find_for_targets(
        &self,
        user_id: &UserId,
        targets: &[CatalogItem],
    ) -> Result<Vec<Enrollment>, DomainError>;

    /// Active enrollments whose `expires_at` is at or before `now`.
    async fn find_due_for_expiry(&self, now: Timestamp) -> Result<Vec<Enrollment>, DomainError>;
}
