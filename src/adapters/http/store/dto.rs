//! HTTP DTOs for the storefront endpoints.
//!
//! These types define the JSON request/response structure of the API and keep
//! domain types off the wire.

use serde::{Deserialize, Serialize};

use crate::application::handlers::{
    CheckAccessResult, GetCartResult, GetCourseResult, GetJourneyResult, GetPaymentResult,
    RequestRefundResult, StartCheckoutResult,
};
use crate::domain::cart::CartItem;
use crate::domain::catalog::{CatalogItem, Course, Journey, PricedItem};
use crate::domain::enrollment::{Enrollment, EnrollmentStatus};
use crate::domain::foundation::{CourseId, JourneyId, Money, Timestamp};
use crate::domain::payment::{Payment, PaymentStatus};
use crate::domain::refund::{Refund, RefundOrigin, RefundStatus};

use crate::adapters::http::error::ApiError;

fn rfc3339(ts: &Timestamp) -> String {
    ts.as_datetime().to_rfc3339()
}

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Item reference used to add or remove cart items.
#[derive(Debug, Clone, Deserialize)]
pub struct CartItemRequest {
    /// `course` or `journey`.
    pub kind: String,
    pub id: String,
}

impl CartItemRequest {
    pub fn to_item(&self) -> Result<CatalogItem, ApiError> {
        let invalid_id = || ApiError::bad_request(format!("Invalid {} ID format", self.kind));
        match self.kind.as_str() {
            "course" => Ok(CatalogItem::Course(
                self.id.parse::<CourseId>().map_err(|_| invalid_id())?,
            )),
            "journey" => Ok(CatalogItem::Journey(
                self.id.parse::<JourneyId>().map_err(|_| invalid_id())?,
            )),
            other => Err(ApiError::bad_request(format!(
                "Unknown item kind '{}', expected course or journey",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefundRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

/// Query string of catalog endpoints. Only admins may see unpublished items.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct CatalogParams {
    #[serde(default)]
    pub include_unpublished: bool,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct MoneyResponse {
    pub amount_cents: i64,
    pub amount: f64,
    pub currency: String,
}

impl From<&Money> for MoneyResponse {
    fn from(money: &Money) -> Self {
        Self {
            amount_cents: money.amount_cents(),
            amount: money.as_decimal(),
            currency: money.currency().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemRef {
    pub kind: &'static str,
    pub id: String,
}

impl From<&CatalogItem> for ItemRef {
    fn from(item: &CatalogItem) -> Self {
        Self {
            kind: item.kind(),
            id: item.id_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CourseResponse {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub price: MoneyResponse,
    /// `null` means lifetime access.
    pub access_days: Option<u32>,
    pub published: bool,
}

impl From<&Course> for CourseResponse {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id.to_string(),
            slug: course.slug.clone(),
            title: course.title.clone(),
            description: course.description.clone(),
            price: MoneyResponse::from(&course.price),
            access_days: course.access_days,
            published: course.published,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JourneyResponse {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub price: MoneyResponse,
    pub access_days: Option<u32>,
    pub published: bool,
    pub course_ids: Vec<String>,
}

impl From<&Journey> for JourneyResponse {
    fn from(journey: &Journey) -> Self {
        Self {
            id: journey.id.to_string(),
            slug: journey.slug.clone(),
            title: journey.title.clone(),
            description: journey.description.clone(),
            price: MoneyResponse::from(&journey.price),
            access_days: journey.access_days,
            published: journey.published,
            course_ids: journey.course_ids.iter().map(ToString::to_string).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CourseDetailResponse {
    #[serde(flatten)]
    pub course: CourseResponse,
    /// Published journeys that include this course.
    pub journeys: Vec<JourneyResponse>,
}

impl From<GetCourseResult> for CourseDetailResponse {
    fn from(result: GetCourseResult) -> Self {
        Self {
            course: CourseResponse::from(&result.course),
            journeys: result.journeys.iter().map(JourneyResponse::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JourneyDetailResponse {
    #[serde(flatten)]
    pub journey: JourneyResponse,
    pub courses: Vec<CourseResponse>,
}

impl From<GetJourneyResult> for JourneyDetailResponse {
    fn from(result: GetJourneyResult) -> Self {
        Self {
            journey: JourneyResponse::from(&result.journey),
            courses: result.courses.iter().map(CourseResponse::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CartItemResponse {
    pub item: ItemRef,
    pub title: String,
    pub unit_price: MoneyResponse,
    pub added_at: String,
}

impl From<&CartItem> for CartItemResponse {
    fn from(line: &CartItem) -> Self {
        Self {
            item: ItemRef::from(&line.item),
            title: line.title.clone(),
            unit_price: MoneyResponse::from(&line.unit_price),
            added_at: rfc3339(&line.added_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CartResponse {
    pub items: Vec<CartItemResponse>,
    pub total: MoneyResponse,
}

impl From<GetCartResult> for CartResponse {
    fn from(result: GetCartResult) -> Self {
        Self {
            items: result.cart.items.iter().map(CartItemResponse::from).collect(),
            total: MoneyResponse::from(&result.total),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutResponse {
    pub payment_id: String,
    pub checkout_url: String,
    pub total: MoneyResponse,
}

impl From<StartCheckoutResult> for CheckoutResponse {
    fn from(result: StartCheckoutResult) -> Self {
        Self {
            payment_id: result.payment_id.to_string(),
            checkout_url: result.checkout_url,
            total: MoneyResponse::from(&result.total),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentItemResponse {
    pub item: ItemRef,
    pub title: String,
    pub unit_price: MoneyResponse,
    pub access_days: Option<u32>,
}

impl From<&PricedItem> for PaymentItemResponse {
    fn from(item: &PricedItem) -> Self {
        Self {
            item: ItemRef::from(&item.item),
            title: item.title.clone(),
            unit_price: MoneyResponse::from(&item.unit_price),
            access_days: item.access_days,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RefundResponse {
    pub id: String,
    pub status: RefundStatus,
    pub origin: RefundOrigin,
    pub amount: MoneyResponse,
    pub reason: Option<String>,
    pub gateway_refund_id: Option<String>,
    pub failure_reason: Option<String>,
    pub created_at: String,
    pub completed_at: Option<String>,
}

impl From<&Refund> for RefundResponse {
    fn from(refund: &Refund) -> Self {
        Self {
            id: refund.id.to_string(),
            status: refund.status,
            origin: refund.origin,
            amount: MoneyResponse::from(&refund.amount),
            reason: refund.reason.clone(),
            gateway_refund_id: refund.gateway_refund_id.clone(),
            failure_reason: refund.failure_reason.clone(),
            created_at: rfc3339(&refund.created_at),
            completed_at: refund.completed_at.as_ref().map(rfc3339),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentResponse {
    pub id: String,
    pub status: PaymentStatus,
    pub status_detail: Option<String>,
    pub items: Vec<PaymentItemResponse>,
    pub total: MoneyResponse,
    pub checkout_url: Option<String>,
    pub gateway_payment_id: Option<String>,
    pub approved_at: Option<String>,
    pub refunded_at: Option<String>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refunds: Option<Vec<RefundResponse>>,
}

impl From<&Payment> for PaymentResponse {
    fn from(payment: &Payment) -> Self {
        Self {
            id: payment.id.to_string(),
            status: payment.status,
            status_detail: payment.status_detail.clone(),
            items: payment.items.iter().map(PaymentItemResponse::from).collect(),
            total: MoneyResponse::from(&payment.total),
            checkout_url: payment.checkout_url.clone(),
            gateway_payment_id: payment.gateway_payment_id.clone(),
            approved_at: payment.approved_at.as_ref().map(rfc3339),
            refunded_at: payment.refunded_at.as_ref().map(rfc3339),
            created_at: rfc3339(&payment.created_at),
            refunds: None,
        }
    }
}

impl From<GetPaymentResult> for PaymentResponse {
    fn from(result: GetPaymentResult) -> Self {
        Self {
            refunds: Some(result.refunds.iter().map(RefundResponse::from).collect()),
            ..PaymentResponse::from(&result.payment)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestRefundResponse {
    pub refund: RefundResponse,
    pub payment_status: PaymentStatus,
}

impl From<RequestRefundResult> for RequestRefundResponse {
    fn from(result: RequestRefundResult) -> Self {
        Self {
            refund: RefundResponse::from(&result.refund),
            payment_status: result.payment_status,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentResponse {
    pub id: String,
    pub target: ItemRef,
    pub payment_id: String,
    pub status: EnrollmentStatus,
    pub granted_at: String,
    pub expires_at: Option<String>,
    pub revoked_at: Option<String>,
    pub revoke_reason: Option<String>,
}

impl From<&Enrollment> for EnrollmentResponse {
    fn from(enrollment: &Enrollment) -> Self {
        Self {
            id: enrollment.id.to_string(),
            target: ItemRef::from(&enrollment.target),
            payment_id: enrollment.payment_id.to_string(),
            status: enrollment.status,
            granted_at: rfc3339(&enrollment.granted_at),
            expires_at: enrollment.expires_at.as_ref().map(rfc3339),
            revoked_at: enrollment.revoked_at.as_ref().map(rfc3339),
            revoke_reason: enrollment.revoke_reason.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessResponse {
    pub course_id: String,
    pub has_access: bool,
    pub via: Option<ItemRef>,
    pub expires_at: Option<String>,
}

impl AccessResponse {
    pub fn new(course_id: CourseId, result: CheckAccessResult) -> Self {
        Self {
            course_id: course_id.to_string(),
            has_access: result.has_access,
            via: result.via.as_ref().map(ItemRef::from),
            expires_at: result.expires_at.as_ref().map(rfc3339),
        }
    }
}
