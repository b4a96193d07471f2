//! Refund domain module.
//!
//! Full refunds of approved payments, requested by the buyer (inside the
//! refund window), by an admin, or initiated at the gateway.

mod aggregate;
mod events;
mod policy;
mod status;

pub use aggregate::{Refund, RefundOrigin};
pub use events::RefundEvent;
pub use policy::{RefundPolicy, RefundRejection};
pub use status::RefundStatus;
