//! Event bus that keeps everything it is given.
//!
//! Tests read it back to check what a handler emitted.

use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};

use crate::domain::foundation::{DomainError, EventEnvelope};
use crate::ports::EventPublisher;

#[derive(Default)]
pub struct InMemoryEventBus {
    published: Mutex<Vec<EventEnvelope>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn log(&self) -> MutexGuard<'_, Vec<EventEnvelope>> {
        // A panicking test thread must not hide the events from the others.
        self.published
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Everything published so far, oldest first.
    pub fn published_events(&self) -> Vec<EventEnvelope> {
        self.log().clone()
    }

    pub fn events_of_type(&self, event_type: &str) -> Vec<EventEnvelope> {
        self.matching(|e| e.event_type == event_type)
    }

    pub fn events_for_aggregate(&self, aggregate_id: &str) -> Vec<EventEnvelope> {
        self.matching(|e| e.aggregate_id == aggregate_id)
    }

    fn matching(&self, keep: impl Fn(&EventEnvelope) -> bool) -> Vec<EventEnvelope> {
        self.log().iter().filter(|&e| keep(e)).cloned().collect()
    }

    pub fn event_count(&self) -> usize {
        self.log().len()
    }

    pub fn has_event(&self, event_type: &str) -> bool {
        self.log().iter().any(|e| e.event_type == event_type)
    }

    pub fn clear(&self) {
        self.log().clear();
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        self.log().push(event);
        Ok(())
    }
}
