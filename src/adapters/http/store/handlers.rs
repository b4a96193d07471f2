//! HTTP handlers for catalog, cart, checkout, payment, refund and enrollment
//! endpoints.
//!
//! These handlers connect axum routes to application layer command/query
//! handlers.

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::adapters::http::auth::CurrentUser;
use crate::adapters::http::error::ApiError;
use crate::adapters::http::state::AppState;
use crate::application::handlers::{
    AddToCartCommand, CheckAccessQuery, GetCartQuery, GetCartResult, GetCourseQuery,
    GetJourneyQuery, GetPaymentQuery, ListCatalogQuery, ListEnrollmentsQuery, ListPaymentsQuery,
    RemoveFromCartCommand, RequestRefundCommand, StartCheckoutCommand,
};
use crate::domain::cart::Cart;
use crate::domain::foundation::{CourseId, JourneyId, PaymentId};
use crate::domain::refund::RefundStatus;

use super::dto::{
    AccessResponse, CartItemRequest, CartResponse, CatalogParams, CheckoutResponse,
    CourseDetailResponse, CourseResponse, EnrollmentResponse, JourneyDetailResponse,
    JourneyResponse, PaymentResponse, RefundRequest, RequestRefundResponse,
};

fn parse_id<T: std::str::FromStr>(raw: &str, what: &str) -> Result<T, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid {} ID format", what)))
}

/// Unpublished items are only listed for admins who ask for them.
fn catalog_query(params: CatalogParams, user: Option<&CurrentUser>) -> ListCatalogQuery {
    ListCatalogQuery {
        include_unpublished: params.include_unpublished && user.map_or(false, |u| u.0.is_admin()),
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Catalog
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/catalog/courses
pub async fn list_courses(
    State(state): State<AppState>,
    Query(params): Query<CatalogParams>,
    user: Option<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let courses = state
        .list_courses_handler()
        .handle(catalog_query(params, user.as_ref()))
        .await?;
    Ok(Json(courses.iter().map(CourseResponse::from).collect::<Vec<_>>()))
}

/// GET /api/catalog/courses/:id
pub async fn get_course(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    Query(params): Query<CatalogParams>,
    user: Option<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let query = GetCourseQuery {
        course_id: parse_id::<CourseId>(&course_id, "course")?,
        include_unpublished: catalog_query(params, user.as_ref()).include_unpublished,
    };
    let result = state.get_course_handler().handle(query).await?;
    Ok(Json(CourseDetailResponse::from(result)))
}

/// GET /api/catalog/journeys
pub async fn list_journeys(
    State(state): State<AppState>,
    Query(params): Query<CatalogParams>,
    user: Option<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let journeys = state
        .list_journeys_handler()
        .handle(catalog_query(params, user.as_ref()))
        .await?;
    Ok(Json(journeys.iter().map(JourneyResponse::from).collect::<Vec<_>>()))
}

/// GET /api/catalog/journeys/:id
pub async fn get_journey(
    State(state): State<AppState>,
    Path(journey_id): Path<String>,
    Query(params): Query<CatalogParams>,
    user: Option<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let query = GetJourneyQuery {
        journey_id: parse_id::<JourneyId>(&journey_id, "journey")?,
        include_unpublished: catalog_query(params, user.as_ref()).include_unpublished,
    };
    let result = state.get_journey_handler().handle(query).await?;
    Ok(Json(JourneyDetailResponse::from(result)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Cart
// ════════════════════════════════════════════════════════════════════════════════

fn cart_response(state: &AppState, cart: Cart) -> Result<CartResponse, ApiError> {
    let total = cart.total(&state.settings.currency)?;
    Ok(CartResponse::from(GetCartResult { cart, total }))
}

/// GET /api/cart
pub async fn get_cart(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let query = GetCartQuery {
        user_id: user.user_id().clone(),
    };
    let result = state.get_cart_handler().handle(query).await?;
    Ok(Json(CartResponse::from(result)))
}

/// POST /api/cart/items
pub async fn add_cart_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CartItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = AddToCartCommand {
        user_id: user.user_id().clone(),
        item: request.to_item()?,
    };
    let cart = state.add_to_cart_handler().handle(cmd).await?;
    Ok((StatusCode::CREATED, Json(cart_response(&state, cart)?)))
}

/// DELETE /api/cart/items
pub async fn remove_cart_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CartItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = RemoveFromCartCommand {
        user_id: user.user_id().clone(),
        item: request.to_item()?,
    };
    let cart = state.remove_from_cart_handler().handle(cmd).await?;
    Ok(Json(cart_response(&state, cart)?))
}

// ════════════════════════════════════════════════════════════════════════════════
// Checkout and payments
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/checkout
pub async fn start_checkout(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = StartCheckoutCommand {
        user_id: user.user_id().clone(),
    };
    let result = state.start_checkout_handler().handle(cmd).await?;
    Ok((StatusCode::CREATED, Json(CheckoutResponse::from(result))))
}

/// GET /api/payments
pub async fn list_payments(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let query = ListPaymentsQuery {
        user_id: user.user_id().clone(),
    };
    let payments = state.list_payments_handler().handle(query).await?;
    Ok(Json(payments.iter().map(PaymentResponse::from).collect::<Vec<_>>()))
}

/// GET /api/payments/:id
pub async fn get_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<String>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let query = GetPaymentQuery {
        actor: user.into_actor(),
        payment_id: parse_id::<PaymentId>(&payment_id, "payment")?,
    };
    let result = state.get_payment_handler().handle(query).await?;
    Ok(Json(PaymentResponse::from(result)))
}

/// POST /api/payments/:id/refunds
///
/// 201 when the refund settled immediately, 202 while the gateway is still
/// processing it.
pub async fn request_refund(
    State(state): State<AppState>,
    Path(payment_id): Path<String>,
    user: CurrentUser,
    request: Option<Json<RefundRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let reason = request
        .and_then(|Json(body)| body.reason)
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());
    let cmd = RequestRefundCommand {
        actor: user.into_actor(),
        payment_id: parse_id::<PaymentId>(&payment_id, "payment")?,
        reason,
    };
    let result = state.request_refund_handler().handle(cmd).await?;

    let status = match result.refund.status {
        RefundStatus::Requested => StatusCode::ACCEPTED,
        _ => StatusCode::CREATED,
    };
    Ok((status, Json(RequestRefundResponse::from(result))))
}

// ════════════════════════════════════════════════════════════════════════════════
// Enrollments
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/enrollments
pub async fn list_enrollments(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let query = ListEnrollmentsQuery {
        user_id: user.user_id().clone(),
    };
    let enrollments = state.list_enrollments_handler().handle(query).await?;
    Ok(Json(
        enrollments
            .iter()
            .map(EnrollmentResponse::from)
            .collect::<Vec<_>>(),
    ))
}

/// GET /api/access/courses/:id
pub async fn check_course_access(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let course_id = parse_id::<CourseId>(&course_id, "course")?;
    let query = CheckAccessQuery {
        user_id: user.user_id().clone(),
        course_id,
    };
    let result = state.check_access_handler().handle(query).await?;
    Ok(Json(AccessResponse::new(course_id, result)))
}
