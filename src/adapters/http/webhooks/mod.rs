//! HTTP adapter for payment gateway notifications.

pub mod handlers;
pub mod routes;

pub use routes::webhook_router;
