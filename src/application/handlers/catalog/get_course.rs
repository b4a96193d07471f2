//! GetCourseHandler - Query handler for one course and the journeys selling it.

use std::sync::Arc;

use crate::domain::catalog::{Course, Journey};
use crate::domain::foundation::CourseId;
use crate::domain::StoreError;
use crate::ports::CatalogRepository;

#[derive(Debug, Clone, Copy)]
pub struct GetCourseQuery {
    pub course_id: CourseId,
    pub include_unpublished: bool,
}

#[derive(Debug, Clone)]
pub struct GetCourseResult {
    pub course: Course,
    /// Published journeys that include the course.
    pub journeys: Vec<Journey>,
}

pub struct GetCourseHandler {
    catalog: Arc<dyn CatalogRepository>,
}

impl GetCourseHandler {
    pub fn new(catalog: Arc<dyn CatalogRepository>) -> Self {
        Self { catalog }
    }

    pub async fn handle(&self, query: GetCourseQuery) -> Result<GetCourseResult, StoreError> {
        let course = self
            .catalog
            .find_course(&query.course_id)
            .await?
            .filter(|c| c.published || query.include_unpublished)
            .ok_or(StoreError::CourseNotFound(query.course_id))?;

        let journeys = self
            .catalog
            .find_journeys_containing(&course.id)
            .await?
            .into_iter()
            .filter(|j| j.published)
            .collect();

        Ok(GetCourseResult { course, journeys })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::TestStore;

    #[tokio::test]
    async fn returns_course_with_journeys() {
        let store = TestStore::seeded().await;
        let result = GetCourseHandler::new(store.catalog.clone())
            .handle(GetCourseQuery {
                course_id: store.rust_course.id,
                include_unpublished: false,
            })
            .await
            .unwrap();

        assert_eq!(result.course.id, store.rust_course.id);
        assert_eq!(result.journeys.len(), 1);
    }

    #[tokio::test]
    async fn draft_is_not_found_for_customers() {
        let store = TestStore::seeded().await;
        let handler = GetCourseHandler::new(store.catalog.clone());
        let query = GetCourseQuery {
            course_id: store.draft_course.id,
            include_unpublished: false,
        };

        assert!(matches!(
            handler.handle(query).await,
            Err(StoreError::CourseNotFound(_))
        ));
        assert!(handler
            .handle(GetCourseQuery {
                include_unpublished: true,
                ..query
            })
            .await
            .is_ok());
    }
}
