//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors, events)
//! - `catalog` - Courses and journeys
//! - `cart` - Pre-checkout cart
//! - `payment` - Payment reconciliation state machine
//! - `enrollment` - Access grants
//! - `refund` - Refund lifecycle and eligibility
//! - `webhook` - Gateway notifications and idempotent processing
//! - `errors` - `StoreError` returned by store operations

pub mod cart;
pub mod catalog;
pub mod enrollment;
pub mod errors;
pub mod foundation;
pub mod payment;
pub mod refund;
pub mod webhook;

pub use errors::StoreError;
