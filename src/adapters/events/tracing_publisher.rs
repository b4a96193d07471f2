//! Event publisher that writes every domain event to the log.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};
use crate::ports::EventPublisher;

/// Logs domain events as structured `tracing` records.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventPublisher;

impl TracingEventPublisher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventPublisher for TracingEventPublisher {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        tracing::info!(
            target: "coursehub::events",
            event_id = %event.event_id,
            event_type = %event.event_type,
            aggregate_type = %event.aggregate_type,
            aggregate_id = %event.aggregate_id,
            correlation_id = event.metadata.correlation_id.as_deref().unwrap_or(""),
            payload = %event.payload,
            "Domain event"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{EventId, EventMetadata, Timestamp};

    #[tokio::test]
    async fn publish_never_fails() {
        let publisher = TracingEventPublisher::new();
        let envelope = EventEnvelope {
            event_id: EventId::new(),
            event_type: "refund.completed.v1".to_string(),
            schema_version: 1,
            aggregate_id: "r-1".to_string(),
            aggregate_type: "Refund".to_string(),
            occurred_at: Timestamp::now(),
            payload: serde_json::json!({"refund_id": "r-1"}),
            metadata: EventMetadata::default(),
        };

        assert!(publisher.publish(envelope).await.is_ok());
    }
}
