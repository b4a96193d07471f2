//! In-memory catalog.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::catalog::{Course, Journey};
use crate::domain::foundation::{CourseId, DomainError, JourneyId};
use crate::ports::CatalogRepository;

#[derive(Default)]
pub struct InMemoryCatalogRepository {
    courses: RwLock<HashMap<CourseId, Course>>,
    journeys: RwLock<HashMap<JourneyId, Journey>>,
}

impl InMemoryCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn list_courses(&self, published_only: bool) -> Result<Vec<Course>, DomainError> {
        let mut courses: Vec<Course> = self
            .courses
            .read()
            .await
            .values()
            .filter(|c| !published_only || c.published)
            .cloned()
            .collect();
        courses.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(courses)
    }

    async fn find_course(&self, id: &CourseId) -> Result<Option<Course>, DomainError> {
        Ok(self.courses.read().await.get(id).cloned())
    }

    async fn find_courses(&self, ids: &[CourseId]) -> Result<Vec<Course>, DomainError> {
        let courses = self.courses.read().await;
        Ok(ids.iter().filter_map(|id| courses.get(id).cloned()).collect())
    }

    async fn list_journeys(&self, published_only: bool) -> Result<Vec<Journey>, DomainError> {
        let mut journeys: Vec<Journey> = self
            .journeys
            .read()
            .await
            .values()
            .filter(|j| !published_only || j.published)
            .cloned()
            .collect();
        journeys.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(journeys)
    }

    async fn find_journey(&self, id: &JourneyId) -> Result<Option<Journey>, DomainError> {
        Ok(self.journeys.read().await.get(id).cloned())
    }

    async fn find_journeys_containing(
        &self,
        course_id: &CourseId,
    ) -> Result<Vec<Journey>, DomainError> {
        Ok(self
            .journeys
            .read()
            .await
            .values()
            .filter(|j| j.includes(course_id))
            .cloned()
            .collect())
    }

    async fn save_course(&self, course: &Course) -> Result<(), DomainError> {
        self.courses.write().await.insert(course.id, course.clone());
        Ok(())
    }

    async fn save_journey(&self, journey: &Journey) -> Result<(), DomainError> {
        self.journeys
            .write()
            .await
            .insert(journey.id, journey.clone());
        Ok(())
    }
}
