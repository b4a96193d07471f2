//! In-memory carts.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::cart::Cart;
use crate::domain::foundation::{DomainError, UserId};
use crate::ports::CartRepository;

#[derive(Default)]
pub struct InMemoryCartRepository {
    carts: RwLock<HashMap<UserId, Cart>>,
}

impl InMemoryCartRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartRepository for InMemoryCartRepository {
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<Cart>, DomainError> {
        Ok(self.carts.read().await.get(user_id).cloned())
    }

    async fn save(&self, cart: &Cart) -> Result<(), DomainError> {
        self.carts
            .write()
            .await
            .insert(cart.user_id.clone(), cart.clone());
        Ok(())
    }

    async fn clear(&self, user_id: &UserId) -> Result<(), DomainError> {
        if let Some(cart) = self.carts.write().await.get_mut(user_id) {
            cart.clear();
        }
        Ok(())
    }
}
