//! Checkout and payment handlers.
//!
//! ## Commands
//! - Start checkout from the cart
//!
//! ## Queries
//! - Get a payment (owner or admin)
//! - List a user's payments

mod get_payment;
mod start_checkout;

pub use get_payment::{
    GetPaymentHandler, GetPaymentQuery, GetPaymentResult, ListPaymentsHandler, ListPaymentsQuery,
};
pub use start_checkout::{StartCheckoutCommand, StartCheckoutHandler, StartCheckoutResult};
