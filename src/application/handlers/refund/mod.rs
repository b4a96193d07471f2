//! Refund handlers.

mod request_refund;

pub use request_refund::{RequestRefundCommand, RequestRefundHandler, RequestRefundResult};
