//! Resolves whether a user currently has access to a catalog item.

use std::sync::Arc;

use crate::domain::catalog::CatalogItem;
use crate::domain::enrollment::Enrollment;
use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::ports::{CatalogRepository, EnrollmentRepository};

/// Access lookup shared by the cart, checkout and access-check handlers.
///
/// A course is accessible through its own enrollment or through an
/// enrollment in any journey that contains it. A journey is accessible only
/// through its own enrollment.
#[derive(Clone)]
pub struct AccessResolver {
    catalog: Arc<dyn CatalogRepository>,
    enrollments: Arc<dyn EnrollmentRepository>,
}

impl AccessResolver {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        enrollments: Arc<dyn EnrollmentRepository>,
    ) -> Self {
        Self {
            catalog,
            enrollments,
        }
    }

    /// The enrollment granting access at `now`, preferring the one that
    /// lasts longest.
    pub async fn active_enrollment(
        &self,
        user_id: &UserId,
        item: &CatalogItem,
        now: Timestamp,
    ) -> Result<Option<Enrollment>, DomainError> {
        let mut targets = vec![*item];
        if let CatalogItem::Course(course_id) = item {
            let journeys = self.catalog.find_journeys_containing(course_id).await?;
            targets.extend(journeys.iter().map(|j| CatalogItem::Journey(j.id)));
        }

        let mut active: Vec<Enrollment> = self
            .enrollments
            .find_for_targets(user_id, &targets)
            .await?
            .into_iter()
            .filter(|e| e.is_active_at(now))
            .collect();

        // Unlimited access sorts last.
        active.sort_by_key(|e| (e.expires_at.is_none(), e.expires_at));
        Ok(active.pop())
    }

    pub async fn has_access(
        &self,
        user_id: &UserId,
        item: &CatalogItem,
        now: Timestamp,
    ) -> Result<bool, DomainError> {
        Ok(self.active_enrollment(user_id, item, now).await?.is_some())
    }
}
