//! Catalog queries.

mod get_course;
mod get_journey;
mod list_catalog;

pub use get_course::{GetCourseHandler, GetCourseQuery, GetCourseResult};
pub use get_journey::{GetJourneyHandler, GetJourneyQuery, GetJourneyResult};
pub use list_catalog::{ListCatalogQuery, ListCoursesHandler, ListJourneysHandler};
