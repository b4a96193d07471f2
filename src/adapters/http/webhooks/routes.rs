//! Route configuration for gateway notifications.
//!
//! Kept apart from the store routes: notifications carry no user identity
//! and are authenticated by signature instead.

use axum::routing::post;
use axum::Router;

use crate::adapters::http::state::AppState;

use super::handlers::handle_mercadopago_notification;

/// Routes:
/// - `POST /api/webhooks/mercadopago`
pub fn webhook_router() -> Router<AppState> {
    Router::new().route("/api/webhooks/mercadopago", post(handle_mercadopago_notification))
}
