//! HTTP adapters - REST API implementations.
//!
//! - `store` - Catalog, cart, checkout, payments, refunds, enrollments
//! - `webhooks` - Mercado Pago notifications
//! - `auth` - Caller identity from upstream headers
//! - `error` - Error to response mapping

pub mod auth;
pub mod error;
pub mod state;
pub mod store;
pub mod webhooks;

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

pub use auth::CurrentUser;
pub use error::{ApiError, ErrorResponse};
pub use state::{AppState, Repositories, StoreSettings};
pub use store::store_router;
pub use webhooks::webhook_router;

/// GET /health
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Creates the complete API router with state applied.
///
/// Middleware (tracing, CORS, timeouts) is layered on by the binary.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(store_router())
        .merge(webhook_router())
        .with_state(state)
}
