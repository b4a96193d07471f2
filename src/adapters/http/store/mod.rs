//! HTTP adapter for the storefront.
//!
//! Catalog browsing is public. Everything else needs the caller identity
//! headers (see [`CurrentUser`](super::auth::CurrentUser)).

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::store_router;
