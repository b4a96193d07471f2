//! Event publishing adapters.
//!
//! - `InMemoryEventBus` - Captures events in-process, for tests
//! - `TracingEventPublisher` - Writes events to the structured log

mod in_memory;
mod tracing_publisher;

pub use in_memory::InMemoryEventBus;
pub use tracing_publisher::TracingEventPublisher;
