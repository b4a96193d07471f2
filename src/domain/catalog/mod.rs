//! Catalog domain module.
//!
//! Courses and journeys (curated course bundles) that can be bought.
//!
//! # Module Structure
//!
//! - `course` - Course entity
//! - `journey` - Journey entity
//! - `item` - `CatalogItem` reference used by carts, payments and enrollments

mod course;
mod item;
mod journey;

pub use course::Course;
pub use item::{CatalogItem, PricedItem};
pub use journey::Journey;
