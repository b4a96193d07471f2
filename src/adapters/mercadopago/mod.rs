//! Mercado Pago gateway adapter.
//!
//! Implements the `PaymentGateway` port:
//! - Checkout preferences (`POST /checkout/preferences`)
//! - Payment lookup (`GET /v1/payments/{id}`)
//! - Refunds (`POST /v1/payments/{id}/refunds`)
//!
//! Notification signature verification lives in `domain::webhook` because it
//! does not need the HTTP client.

mod api_types;
mod client;
mod mock_gateway;

pub use api_types::BackUrls;
pub use client::{MercadoPagoConfig, MercadoPagoGateway, DEFAULT_API_BASE_URL};
pub use mock_gateway::MockPaymentGateway;
