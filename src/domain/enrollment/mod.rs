//! Enrollment domain module.
//!
//! Enrollments are the only source of course access. They are created from
//! approved payments and revoked when the payment is refunded.

mod aggregate;
mod events;
mod status;

pub use aggregate::Enrollment;
pub use events::EnrollmentEvent;
pub use status::EnrollmentStatus;
