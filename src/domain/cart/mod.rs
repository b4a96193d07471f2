//! Cart domain module.
//!
//! One cart per user, holding priced snapshots of catalog items until
//! checkout.

mod aggregate;

pub use aggregate::{Cart, CartItem};
