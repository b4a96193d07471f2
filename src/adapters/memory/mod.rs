//! In-memory repository adapters.
//!
//! Used by tests and by the binary when no database is configured. They
//! enforce the same uniqueness and version rules as the PostgreSQL adapters.

mod cart;
mod catalog;
mod enrollment;
mod payment;
mod refund;
mod webhook_events;

pub use cart::InMemoryCartRepository;
pub use catalog::InMemoryCatalogRepository;
pub use enrollment::InMemoryEnrollmentRepository;
pub use payment::InMemoryPaymentRepository;
pub use refund::InMemoryRefundRepository;
pub use webhook_events::InMemoryWebhookEventRepository;
