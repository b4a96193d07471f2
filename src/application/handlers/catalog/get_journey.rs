//! GetJourneyHandler - Query handler for a journey with its courses.

use std::sync::Arc;

use crate::domain::catalog::{Course, Journey};
use crate::domain::foundation::JourneyId;
use crate::domain::StoreError;
use crate::ports::CatalogRepository;

#[derive(Debug, Clone, Copy)]
pub struct GetJourneyQuery {
    pub journey_id: JourneyId,
    pub include_unpublished: bool,
}

#[derive(Debug, Clone)]
pub struct GetJourneyResult {
    pub journey: Journey,
    /// Courses in the journey's order.
    pub courses: Vec<Course>,
}

pub struct GetJourneyHandler {
    catalog: Arc<dyn CatalogRepository>,
}

impl GetJourneyHandler {
    pub fn new(catalog: Arc<dyn CatalogRepository>) -> Self {
        Self { catalog }
    }

    pub async fn handle(&self, query: GetJourneyQuery) -> Result<GetJourneyResult, StoreError> {
        let journey = self
            .catalog
            .find_journey(&query.journey_id)
            .await?
            .filter(|j| j.published || query.include_unpublished)
            .ok_or(StoreError::JourneyNotFound(query.journey_id))?;

        let found = self.catalog.find_courses(&journey.course_ids).await?;
        let courses = journey
            .course_ids
            .iter()
            .filter_map(|id| found.iter().find(|c| &c.id == id).cloned())
            .collect();

        Ok(GetJourneyResult { journey, courses })
    }
}
