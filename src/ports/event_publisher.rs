//! Outbound port for domain events.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Where payment, enrollment and refund events go once a handler has
/// committed its state change.
///
/// A failed publish is returned to the handler. The state change is already
/// stored at that point, so a redelivered notification may publish the same
/// fact twice; consumers dedupe on `event_id` or on the aggregate state.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError>;
}
