//! Payment domain module - the reconciliation state machine.
//!
//! # Module Structure
//!
//! - `status` - `PaymentStatus` and its transition table
//! - `gateway_status` - Mercado Pago statuses mapped to `PaymentStatus`
//! - `aggregate` - `Payment` and `StatusChange`
//! - `events` - `PaymentEvent`

mod aggregate;
mod events;
mod gateway_status;
mod status;

pub use aggregate::{Payment, StatusChange};
pub use events::PaymentEvent;
pub use gateway_status::GatewayStatus;
pub use status::PaymentStatus;
