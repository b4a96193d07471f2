//! Enrollment handlers.
//!
//! ## Queries
//! - Check access to a course (directly or through a journey)
//! - List a user's enrollments

mod access;
mod check_access;
mod list_enrollments;

pub use access::AccessResolver;
pub use check_access::{CheckAccessHandler, CheckAccessQuery, CheckAccessResult};
pub use list_enrollments::{ListEnrollmentsHandler, ListEnrollmentsQuery};
