//! GetCartHandler - Query handler for the current cart and its total.

use std::sync::Arc;

use crate::domain::cart::Cart;
use crate::domain::foundation::{Money, UserId};
use crate::domain::StoreError;
use crate::ports::CartRepository;

#[derive(Debug, Clone)]
pub struct GetCartQuery {
    pub user_id: UserId,
}

#[derive(Debug, Clone)]
pub struct GetCartResult {
    pub cart: Cart,
    pub total: Money,
}

pub struct GetCartHandler {
    carts: Arc<dyn CartRepository>,
    /// Currency of the total while the cart is empty.
    currency: String,
}

impl GetCartHandler {
    pub fn new(carts: Arc<dyn CartRepository>, currency: impl Into<String>) -> Self {
        Self {
            carts,
            currency: currency.into(),
        }
    }

    pub async fn handle(&self, query: GetCartQuery) -> Result<GetCartResult, StoreError> {
        let cart = self
            .carts
            .find_by_user(&query.user_id)
            .await?
            .unwrap_or_else(|| Cart::empty(query.user_id));
        let total = cart.total(&self.currency)?;
        Ok(GetCartResult { cart, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::{brl, TestStore};
    use crate::domain::catalog::CatalogItem;

    #[tokio::test]
    async fn empty_cart_has_zero_total() {
        let store = TestStore::seeded().await;
        let result = GetCartHandler::new(store.carts.clone(), "BRL")
            .handle(GetCartQuery {
                user_id: store.buyer(),
            })
            .await
            .unwrap();

        assert!(result.cart.is_empty());
        assert_eq!(result.total, brl(0));
    }

    #[tokio::test]
    async fn total_sums_lines() {
        let store = TestStore::seeded().await;
        let mut cart = Cart::empty(store.buyer());
        cart.add(&store.priced(CatalogItem::Course(store.rust_course.id)).await)
            .unwrap();
        cart.add(&store.priced(CatalogItem::Course(store.go_course.id)).await)
            .unwrap();
        store.carts.save(&cart).await.unwrap();

        let result = GetCartHandler::new(store.carts.clone(), "BRL")
            .handle(GetCartQuery {
                user_id: store.buyer(),
            })
            .await
            .unwrap();

        assert_eq!(result.total, brl(4990 + 3990));
    }
}
