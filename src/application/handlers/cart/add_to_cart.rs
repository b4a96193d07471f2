//! AddToCartHandler - Command handler for adding a course or journey to the cart.

use std::sync::Arc;

use crate::domain::cart::Cart;
use crate::domain::catalog::{CatalogItem, PricedItem};
use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::StoreError;
use crate::ports::{CartRepository, CatalogRepository};

use crate::application::handlers::enrollment::AccessResolver;

#[derive(Debug, Clone)]
pub struct AddToCartCommand {
    pub user_id: UserId,
    pub item: CatalogItem,
}

pub struct AddToCartHandler {
    catalog: Arc<dyn CatalogRepository>,
    carts: Arc<dyn CartRepository>,
    access: AccessResolver,
}

impl AddToCartHandler {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        carts: Arc<dyn CartRepository>,
        access: AccessResolver,
    ) -> Self {
        Self {
            catalog,
            carts,
            access,
        }
    }

    pub async fn handle(&self, cmd: AddToCartCommand) -> Result<Cart, StoreError> {
        let priced = purchasable(self.catalog.as_ref(), &cmd.item).await?;

        if self
            .access
            .has_access(&cmd.user_id, &cmd.item, Timestamp::now())
            .await?
        {
            return Err(StoreError::AlreadyOwned(cmd.item));
        }

        let mut cart = self
            .carts
            .find_by_user(&cmd.user_id)
            .await?
            .unwrap_or_else(|| Cart::empty(cmd.user_id.clone()));

        if cart.contains(&cmd.item) {
            return Err(StoreError::AlreadyInCart(cmd.item));
        }
        cart.add(&priced)?;
        self.carts.save(&cart).await?;

        tracing::debug!(user_id = %cmd.user_id, item = %cmd.item, "Item added to cart");
        Ok(cart)
    }
}

/// Prices a published item from the catalog.
///
/// # Errors
///
/// - `CourseNotFound` / `JourneyNotFound` if it does not exist
/// - `NotPurchasable` if it is not published
pub(crate) async fn purchasable(
    catalog: &dyn CatalogRepository,
    item: &CatalogItem,
) -> Result<PricedItem, StoreError> {
    match item {
        CatalogItem::Course(id) => {
            let course = catalog
                .find_course(id)
                .await?
                .ok_or(StoreError::CourseNotFound(*id))?;
            if !course.published {
                return Err(StoreError::NotPurchasable(*item));
            }
            Ok(PricedItem::from(&course))
        }
        CatalogItem::Journey(id) => {
            let journey = catalog
                .find_journey(id)
                .await?
                .ok_or(StoreError::JourneyNotFound(*id))?;
            if !journey.published {
                return Err(StoreError::NotPurchasable(*item));
            }
            Ok(PricedItem::from(&journey))
        }
    }
}
