//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `events` - Event publishers (in-memory, tracing)
//! - `http` - axum REST API and webhook endpoint
//! - `memory` - In-memory repositories
//! - `mercadopago` - Payment gateway client and mock
//! - `postgres` - PostgreSQL repositories

pub mod events;
pub mod http;
pub mod memory;
pub mod mercadopago;
pub mod postgres;

pub use events::{InMemoryEventBus, TracingEventPublisher};
