//! In-memory enrollments.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::catalog::CatalogItem;
use crate::domain::enrollment::{Enrollment, EnrollmentStatus};
use crate::domain::foundation::{DomainError, EnrollmentId, ErrorCode, PaymentId, Timestamp, UserId};
use crate::ports::EnrollmentRepository;

#[derive(Default)]
pub struct InMemoryEnrollmentRepository {
    enrollments: RwLock<HashMap<EnrollmentId, Enrollment>>,
}

impl InMemoryEnrollmentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EnrollmentRepository for InMemoryEnrollmentRepository {
    async fn insert_if_absent(&self, enrollment: &Enrollment) -> Result<bool, DomainError> {
        let mut enrollments = self.enrollments.write().await;
        let exists = enrollments
            .values()
            .any(|e| e.payment_id == enrollment.payment_id && e.target == enrollment.target);
        if exists {
            return Ok(false);
        }
        enrollments.insert(enrollment.id, enrollment.clone());
        Ok(true)
    }

    async fn update(&self, enrollment: &Enrollment) -> Result<(), DomainError> {
        let mut enrollments = self.enrollments.write().await;
        match enrollments.get_mut(&enrollment.id) {
            Some(stored) => {
                *stored = enrollment.clone();
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::NotFound,
                format!("Enrollment {} not found", enrollment.id),
            )),
        }
    }

    async fn find_by_payment(
        &self,
        payment_id: &PaymentId,
    ) -> Result<Vec<Enrollment>, DomainError> {
        Ok(self
            .enrollments
            .read()
            .await
            .values()
            .filter(|e| &e.payment_id == payment_id)
            .cloned()
            .collect())
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<Enrollment>, DomainError> {
        let mut enrollments: Vec<Enrollment> = self
            .enrollments
            .read()
            .await
            .values()
            .filter(|e| &e.user_id == user_id)
            .cloned()
            .collect();
        enrollments.sort_by(|a, b| b.granted_at.cmp(&a.granted_at));
        Ok(enrollments)
    }

    async fn find_for_targets(
        &self,
        user_id: &UserId,
        targets: &[CatalogItem],
    ) -> Result<Vec<Enrollment>, DomainError> {
        Ok(self
            .enrollments
            .read()
            .await
            .values()
            .filter(|e| &e.user_id == user_id && targets.contains(&e.target))
            .cloned()
            .collect())
    }

    async fn find_due_for_expiry(&self, now: Timestamp) -> Result<Vec<Enrollment>, DomainError> {
        Ok(self
            .enrollments
            .read()
            .await
            .values()
            .filter(|e| e.status == EnrollmentStatus::Active && e.is_due_for_expiry(now))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::PricedItem;
    use crate::domain::foundation::{CourseId, Money};

    fn enrollment(payment_id: PaymentId, item: CatalogItem, days: Option<u32>) -> Enrollment {
        Enrollment::grant(
            EnrollmentId::new(),
            UserId::new("student").unwrap(),
            &PricedItem {
                item,
                title: "Course".to_string(),
                unit_price: Money::new(1000, "BRL").unwrap(),
                access_days: days,
            },
            payment_id,
            Timestamp::now(),
        )
    }

    #[tokio::test]
    async fn insert_is_unique_per_payment_and_target() {
        let repo = InMemoryEnrollmentRepository::new();
        let payment_id = PaymentId::new();
        let item = CatalogItem::Course(CourseId::new());

        assert!(repo
            .insert_if_absent(&enrollment(payment_id, item, None))
            .await
            .unwrap());
        assert!(!repo
            .insert_if_absent(&enrollment(payment_id, item, None))
            .await
            .unwrap());
        assert_eq!(repo.find_by_payment(&payment_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn finds_enrollments_due_for_expiry() {
        let repo = InMemoryEnrollmentRepository::new();
        let item = CatalogItem::Course(CourseId::new());
        repo.insert_if_absent(&enrollment(PaymentId::new(), item, Some(1)))
            .await
            .unwrap();
        repo.insert_if_absent(&enrollment(PaymentId::new(), item, None))
            .await
            .unwrap();

        let due = repo
            .find_due_for_expiry(Timestamp::now().add_days(2))
            .await
            .unwrap();
        assert_eq!(due.len(), 1);
    }
}
