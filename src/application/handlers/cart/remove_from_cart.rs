//! RemoveFromCartHandler - Command handler for removing a cart line.

use std::sync::Arc;

use crate::domain::cart::Cart;
use crate::domain::catalog::CatalogItem;
use crate::domain::foundation::UserId;
use crate::domain::StoreError;
use crate::ports::CartRepository;

#[derive(Debug, Clone)]
pub struct RemoveFromCartCommand {
    pub user_id: UserId,
    pub item: CatalogItem,
}

pub struct RemoveFromCartHandler {
    carts: Arc<dyn CartRepository>,
}

impl RemoveFromCartHandler {
    pub fn new(carts: Arc<dyn CartRepository>) -> Self {
        Self { carts }
    }

    pub async fn handle(&self, cmd: RemoveFromCartCommand) -> Result<Cart, StoreError> {
        let mut cart = self
            .carts
            .find_by_user(&cmd.user_id)
            .await?
            .ok_or(StoreError::NotInCart(cmd.item))?;

        if !cart.remove(&cmd.item) {
            return Err(StoreError::NotInCart(cmd.item));
        }
        self.carts.save(&cart).await?;
        Ok(cart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::TestStore;

    #[tokio::test]
    async fn removes_line_and_reports_missing() {
        let store = TestStore::seeded().await;
        let item = CatalogItem::Course(store.rust_course.id);
        let mut cart = Cart::empty(store.buyer());
        cart.add(&store.priced(item).await).unwrap();
        store.carts.save(&cart).await.unwrap();

        let handler = RemoveFromCartHandler::new(store.carts.clone());
        let cmd = RemoveFromCartCommand {
            user_id: store.buyer(),
            item,
        };

        let cart = handler.handle(cmd.clone()).await.unwrap();
        assert!(cart.is_empty());

        let err = handler.handle(cmd).await.unwrap_err();
        assert_eq!(err, StoreError::NotInCart(item));
    }
}
