//! CheckAccessHandler - Query handler for course access.

use std::sync::Arc;

use crate::domain::catalog::CatalogItem;
use crate::domain::foundation::{CourseId, Timestamp, UserId};
use crate::domain::StoreError;
use crate::ports::CatalogRepository;

use super::AccessResolver;

/// Query to check whether a user may open a course.
#[derive(Debug, Clone)]
pub struct CheckAccessQuery {
    pub user_id: UserId,
    pub course_id: CourseId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckAccessResult {
    pub has_access: bool,
    /// The course itself or the journey access comes through.
    pub via: Option<CatalogItem>,
    /// `None` with access means access does not expire.
    pub expires_at: Option<Timestamp>,
}

pub struct CheckAccessHandler {
    catalog: Arc<dyn CatalogRepository>,
    access: AccessResolver,
}

impl CheckAccessHandler {
    pub fn new(catalog: Arc<dyn CatalogRepository>, access: AccessResolver) -> Self {
        Self { catalog, access }
    }

    pub async fn handle(&self, query: CheckAccessQuery) -> Result<CheckAccessResult, StoreError> {
        if self.catalog.find_course(&query.course_id).await?.is_none() {
            return Err(StoreError::CourseNotFound(query.course_id));
        }

        let enrollment = self
            .access
            .active_enrollment(
                &query.user_id,
                &CatalogItem::Course(query.course_id),
                Timestamp::now(),
            )
            .await?;

        Ok(match enrollment {
            Some(enrollment) => CheckAccessResult {
                has_access: true,
                via: Some(enrollment.target),
                expires_at: enrollment.expires_at,
            },
            None => CheckAccessResult {
                has_access: false,
                via: None,
                expires_at: None,
            },
        })
    }
}
