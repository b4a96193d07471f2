//! Catalog repository port.

use async_trait::async_trait;

use crate::domain::catalog::{Course, Journey};
use crate::domain::foundation::{CourseId, DomainError, JourneyId};

/// Storage for courses and journeys.
///
/// Content management is outside this service; `save_*` exists for seeding
/// and tests.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// List courses, optionally only published ones, ordered by title.
    async fn list_courses(&self, published_only: bool) -> Result<Vec<Course>, DomainError>;

    async fn find_course(&self, id: &CourseId) -> Result<Option<Course>, DomainError>;

    /// Load several courses at once. Missing ids are skipped.
    async fn find_courses(&self, ids: &[CourseId]) -> Result<Vec<Course>, DomainError>;

    /// List journeys, optionally only published ones, ordered by title.
    async fn list_journeys(&self, published_only: bool) -> Result<Vec<Journey>, DomainError>;

    async fn find_journey(&self, id: &JourneyId) -> Result<Option<Journey>, DomainError>;

    /// Journeys that include the course, published or not.
    async fn find_journeys_containing(
        &self,
        course_id: &CourseId,
    ) -> Result<Vec<Journey>, DomainError>;

    /// Insert or replace a course.
    async fn save_course(&self, course: &Course) -> Result<(), DomainError>;

    /// Insert or replace a journey.
    async fn save_journey(&self, journey: &Journey) -> Result<(), DomainError>;
}
