//! Cart repository port.

use async_trait::async_trait;

use crate::domain::cart::Cart;
use crate::domain::foundation::{DomainError, UserId};

#[async_trait]
pub trait CartRepository: Send + Sync {
    /// The user's cart, `None` if they never added anything.
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<Cart>, DomainError>;

    /// Insert or replace the user's cart.
    async fn save(&self, cart: &Cart) -> Result<(), DomainError>;

    /// Remove every item from the user's cart. No-op when there is none.
    async fn clear(&self, user_id: &UserId) -> Result<(), DomainError>;
}
