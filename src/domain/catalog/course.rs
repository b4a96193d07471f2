//! Course entity.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CourseId, Money, ValidationError};

/// A purchasable unit of learning content.
///
/// Module and lesson content lives outside this service; the store only needs
/// what is required to sell and grant access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub price: Money,
    /// Days of access granted by a purchase. `None` means lifetime access.
    pub access_days: Option<u32>,
    pub published: bool,
}

impl Course {
    /// Creates an unpublished course.
    ///
    /// # Errors
    ///
    /// Returns error for an empty slug or title, or zero access days.
    pub fn new(
        id: CourseId,
        slug: impl Into<String>,
        title: impl Into<String>,
        price: Money,
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
        if access_days == Some(0) {
            return Err(ValidationError::out_of_range("access_days", 1, i64::from(u32::MAX), 0));
        }
        Ok(Self {
            id,
            slug,
            title,
            description: None,
            price,
            access_days,
            published: false,
        })
    }

    /// Marks the course as visible and purchasable.
    pub fn publish(mut self) -> Self {
        self.published = true;
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price() -> Money {
        Money::new(9900, "BRL").unwrap()
    }

    #[test]
    fn new_course_is_unpublished() {
        let course = Course::new(CourseId::new(), "rust-101", "Rust 101", price(), None).unwrap();
        assert!(!course.published);
        assert!(course.publish().published);
    }

    #[test]
    fn rejects_empty_title() {
        assert!(Course::new(CourseId::new(), "rust-101", " ", price(), None).is_err());
    }

    #[test]
    fn rejects_zero_access_days() {
        assert!(Course::new(CourseId::new(), "rust-101", "Rust", price(), Some(0)).is_err());
    }
}
