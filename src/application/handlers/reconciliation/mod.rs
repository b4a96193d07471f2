//! Payment reconciliation.
//!
//! Gateway notifications for the `payment` topic end up in
//! [`ReconcilePaymentHandler`], which is the only place payment status
//! follows the gateway.

mod payment_notification;
mod reconcile_payment;

pub use payment_notification::PaymentNotificationHandler;
pub use reconcile_payment::{
    ReconcilePaymentCommand, ReconcilePaymentHandler, ReconcilePaymentResult,
};
