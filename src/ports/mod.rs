//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Storage Ports
//!
//! - `CatalogRepository` - Courses and journeys
//! - `CartRepository` - One cart per user
//! - `PaymentRepository` - Payments with optimistic locking
//! - `EnrollmentRepository` - Access grants, unique per payment and item
//! - `RefundRepository` - Refunds, one open per payment
//! - `WebhookEventRepository` - Notification idempotency tracking
//!
//! ## External Service Ports
//!
//! - `PaymentGateway` - Checkout preferences, payment lookup, refunds
//! - `EventPublisher` - Domain event publishing

mod cart_repository;
mod catalog_repository;
mod enrollment_repository;
mod event_publisher;
mod payment_gateway;
mod payment_repository;
mod refund_repository;
mod webhook_event_repository;

pub use cart_repository::CartRepository;
pub use catalog_repository::CatalogRepository;
pub use enrollment_repository::EnrollmentRepository;
pub use event_publisher::EventPublisher;
pub use payment_gateway::{
    CheckoutPreference, CreatePreferenceRequest, GatewayError, GatewayErrorCode, GatewayPayment,
    GatewayRefund, GatewayRefundStatus, PaymentGateway, PreferenceItem, RefundRequest,
};
pub use payment_repository::PaymentRepository;
pub use refund_repository::RefundRepository;
pub use webhook_event_repository::{
    DeliveryOutcome, SaveResult, WebhookEventRecord, WebhookEventRepository, WebhookResult,
};
