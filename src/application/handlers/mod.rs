//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod enrollment;
pub mod fulfillment;
pub mod maintenance;
pub mod reconciliation;
pub mod refund;

#[cfg(test)]
pub(crate) mod test_support;

pub use cart::{
    AddToCartCommand, AddToCartHandler, GetCartHandler, GetCartQuery, GetCartResult,
    RemoveFromCartCommand, RemoveFromCartHandler,
};
pub use catalog::{
    GetCourseHandler, GetCourseQuery, GetCourseResult, GetJourneyHandler, GetJourneyQuery,
    GetJourneyResult, ListCatalogQuery, ListCoursesHandler, ListJourneysHandler,
};
pub use checkout::{
    GetPaymentHandler, GetPaymentQuery, GetPaymentResult, ListPaymentsHandler, ListPaymentsQuery,
    StartCheckoutCommand, StartCheckoutHandler, StartCheckoutResult,
};
pub use enrollment::{
    AccessResolver, CheckAccessHandler, CheckAccessQuery, CheckAccessResult,
    ListEnrollmentsHandler, ListEnrollmentsQuery,
};
pub use fulfillment::Fulfillment;
pub use maintenance::{
    spawn_maintenance, MaintenanceHandler, MaintenanceReport, MaintenanceSettings,
};
pub use reconciliation::{
    PaymentNotificationHandler, ReconcilePaymentCommand, ReconcilePaymentHandler,
    ReconcilePaymentResult,
};
pub use refund::{RequestRefundCommand, RequestRefundHandler, RequestRefundResult};
