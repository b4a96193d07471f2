//! Catalog listing queries.

use std::sync::Arc;

use crate::domain::catalog::{Course, Journey};
use crate::domain::StoreError;
use crate::ports::CatalogRepository;

/// Query for courses or journeys. Unpublished items are visible to admins.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListCatalogQuery {
    pub include_unpublished: bool,
}

pub struct ListCoursesHandler {
    catalog: Arc<dyn CatalogRepository>,
}

impl ListCoursesHandler {
    pub fn new(catalog: Arc<dyn CatalogRepository>) -> Self {
        Self { catalog }
    }

    pub async fn handle(&self, query: ListCatalogQuery) -> Result<Vec<Course>, StoreError> {
        Ok(self.catalog.list_courses(!query.include_unpublished).await?)
    }
}

pub struct ListJourneysHandler {
    catalog: Arc<dyn CatalogRepository>,
}

impl ListJourneysHandler {
    pub fn new(catalog: Arc<dyn CatalogRepository>) -> Self {
        Self { catalog }
    }

    pub async fn handle(&self, query: ListCatalogQuery) -> Result<Vec<Journey>, StoreError> {
        Ok(self
            .catalog
            .list_journeys(!query.include_unpublished)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::TestStore;

    #[tokio::test]
    async fn drafts_are_hidden_by_default() {
        let store = TestStore::seeded().await;
        let handler = ListCoursesHandler::new(store.catalog.clone());

        let public = handler.handle(ListCatalogQuery::default()).await.unwrap();
        assert_eq!(public.len(), 2);

        let all = handler
            .handle(ListCatalogQuery {
                include_unpublished: true,
            })
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn lists_journeys() {
        let store = TestStore::seeded().await;
        let journeys = ListJourneysHandler::new(store.catalog.clone())
            .handle(ListCatalogQuery::default())
            .await
            .unwrap();
        assert_eq!(journeys.len(), 1);
    }
}
