//! Cart handlers.
//!
//! ## Commands
//! - Add a published course or journey the user does not already own
//! - Remove an item
//!
//! ## Queries
//! - Get the cart with its total

mod add_to_cart;
mod get_cart;
mod remove_from_cart;

pub(crate) use add_to_cart::purchasable;
pub use add_to_cart::{AddToCartCommand, AddToCartHandler};
pub use get_cart::{GetCartHandler, GetCartQuery, GetCartResult};
pub use remove_from_cart::{RemoveFromCartCommand, RemoveFromCartHandler};
