//! ListEnrollmentsHandler - Query handler for a user's enrollments.

use std::sync::Arc;

use crate::domain::enrollment::Enrollment;
use crate::domain::foundation::UserId;
use crate::domain::StoreError;
use crate::ports::EnrollmentRepository;

#[derive(Debug, Clone)]
pub struct ListEnrollmentsQuery {
    pub user_id: UserId,
}

pub struct ListEnrollmentsHandler {
    enrollments: Arc<dyn EnrollmentRepository>,
}

impl ListEnrollmentsHandler {
    pub fn new(enrollments: Arc<dyn EnrollmentRepository>) -> Self {
        Self { enrollments }
    }

    /// Newest first, including expired and revoked ones.
    pub async fn handle(&self, query: ListEnrollmentsQuery) -> Result<Vec<Enrollment>, StoreError> {
        Ok(self.enrollments.find_by_user(&query.user_id).await?)
    }
}
