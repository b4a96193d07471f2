//! Journey entity - a bundle of courses with its own price and access duration.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CourseId, JourneyId, Money, ValidationError};

/// A curated bundle of courses sold together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journey {
    pub id: JourneyId,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub price: Money,
    pub course_ids: Vec<CourseId>,
    /// Days of access granted by a purchase. `None` means lifetime access.
    pub access_days: Option<u32>,
    pub published: bool,
}

impl Journey {
    /// Creates an unpublished journey.
    ///
    /// # Errors
    ///
    /// Returns error for an empty title, no courses, duplicated courses or zero
    /// access days.
    pub fn new(
        id: JourneyId,
        slug: impl Into<String>,
        title: impl Into<String>,
        price: Money,
        course_ids: Vec<CourseId>,
        access_days: Option<u32>,
    ) -> Result<Self, ValidationError> {
        let slug = slug.into();
        let title = title.into();
        if slug.trim().is_empty() {
            return Err(ValidationError::empty_field("slug"));
        }
        if title.trim().is_empty() {
            return Err(ValidationError::empty_field("title"));
        }
        if course_ids.is_empty() {
            return Err(ValidationError::empty_field("course_ids"));
        }
        let mut seen = course_ids.clone();
        seen.sort();
        seen.dedup();
        if seen.len() != course_ids.len() {
            return Err(ValidationError::invalid_format(
                "course_ids",
                "a course appears more than once",
            ));
        }
        if access_days == Some(0) {
            return Err(ValidationError::out_of_range("access_days", 1, i64::from(u32::MAX), 0));
        }
        Ok(Self {
            id,
            slug,
            title,
            description: None,
            price,
            course_ids,
            access_days,
            published: false,
        })
    }

    /// Marks the journey as visible and purchasable.
    pub fn publish(mut self) -> Self {
        self.published = true;
        self
    }

    /// True when the journey grants access to the course.
    pub fn includes(&self, course_id: &CourseId) -> bool {
        self.course_ids.contains(course_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price() -> Money {
        Money::new(29900, "BRL").unwrap()
    }

    #[test]
    fn includes_listed_courses_only() {
        let a = CourseId::new();
        let b = CourseId::new();
        let journey =
            Journey::new(JourneyId::new(), "backend", "Backend", price(), vec![a], Some(365))
                .unwrap();
        assert!(journey.includes(&a));
        assert!(!journey.includes(&b));
    }

    #[test]
    fn rejects_empty_bundle() {
        assert!(Journey::new(JourneyId::new(), "x", "X", price(), vec![], None).is_err());
    }

    #[test]
    fn rejects_duplicate_courses() {
        let a = CourseId::new();
        assert!(Journey::new(JourneyId::new(), "x", "X", price(), vec![a, a], None).is_err());
    }
}
