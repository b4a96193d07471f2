//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, errors and the event vocabulary
//! used by every other domain module.

mod actor;
mod errors;
mod events;
mod ids;
mod money;
mod state_machine;
mod timestamp;

pub use actor::{Actor, Role};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{DomainEvent, EventEnvelope, EventId, EventMetadata, SerializableDomainEvent};
pub use ids::{CourseId, EnrollmentId, JourneyId, PaymentId, RefundId, UserId};
pub use money::Money;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
