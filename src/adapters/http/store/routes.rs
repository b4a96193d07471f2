//! Route configuration for storefront endpoints.

use axum::routing::{get, post};
use axum::Router;

use crate::adapters::http::state::AppState;

use super::handlers::{
    add_cart_item, check_course_access, get_cart, get_course, get_journey, get_payment,
    list_courses, list_enrollments, list_journeys, list_payments, remove_cart_item,
    request_refund, start_checkout,
};

/// Creates the storefront router.
///
/// Routes:
/// - `GET /api/catalog/courses` and `GET /api/catalog/courses/:id`
/// - `GET /api/catalog/journeys` and `GET /api/catalog/journeys/:id`
/// - `GET /api/cart`, `POST /api/cart/items`, `DELETE /api/cart/items`
/// - `POST /api/checkout`
/// - `GET /api/payments`, `GET /api/payments/:id`
/// - `POST /api/payments/:id/refunds`
/// - `GET /api/enrollments`
/// - `GET /api/access/courses/:id`
pub fn store_router() -> Router<AppState> {
    Router::new()
        .route("/api/catalog/courses", get(list_courses))
        .route("/api/catalog/courses/:id", get(get_course))
        .route("/api/catalog/journeys", get(list_journeys))
        .route("/api/catalog/journeys/:id", get(get_journey))
        .route("/api/cart", get(get_cart))
        .route("/api/cart/items", post(add_cart_item).delete(remove_cart_item))
        .route("/api/checkout", post(start_checkout))
        .route("/api/payments", get(list_payments))
        .route("/api/payments/:id", get(get_payment))
        .route("/api/payments/:id/refunds", post(request_refund))
        .route("/api/enrollments", get(list_enrollments))
        .route("/api/access/courses/:id", get(check_course_access))
}
