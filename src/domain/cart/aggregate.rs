//! Cart aggregate.

use serde::{Deserialize, Serialize};

use crate::domain::catalog::{CatalogItem, PricedItem};
use crate::domain::foundation::{DomainError, ErrorCode, Money, Timestamp, UserId};

/// A line in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub item: CatalogItem,
    pub title: String,
    pub unit_price: Money,
    pub added_at: Timestamp,
}

/// A user's cart.
///
/// # Invariants
///
/// - an item appears at most once
/// - every line shares one currency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub user_id: UserId,
    pub items: Vec<CartItem>,
    pub updated_at: Timestamp,
}

impl Cart {
    /// Empty cart for a user.
    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            items: Vec::new(),
            updated_at: Timestamp::now(),
        }
    }

    /// Adds a priced item.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists` if the item is already in the cart
    /// - `ValidationFailed` if its currency differs from the cart's
    pub fn add(&mut self, priced: &PricedItem) -> Result<(), DomainError> {
        if self.contains(&priced.item) {
            return Err(DomainError::new(
                ErrorCode::AlreadyExists,
                format!("{} is already in the cart", priced.item),
            ));
        }
        if let Some(currency) = self.currency() {
            if currency != priced.unit_price.currency() {
                return Err(DomainError::validation(
                    "currency",
                    format!(
                        "Cart is priced in {} but item is priced in {}",
                        currency,
                        priced.unit_price.currency()
                    ),
                ));
            }
        }
        self.items.push(CartItem {
            item: priced.item,
            title: priced.title.clone(),
            unit_price: priced.unit_price.clone(),
            added_at: Timestamp::now(),
        });
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Removes an item. Returns false when it was not in the cart.
    pub fn remove(&mut self, item: &CatalogItem) -> bool {
        let before = self.items.len();
        self.items.retain(|line| &line.item != item);
        let removed = self.items.len() != before;
        if removed {
            self.updated_at = Timestamp::now();
        }
        removed
    }

    pub fn contains(&self, item: &CatalogItem) -> bool {
        self.items.iter().any(|line| &line.item == item)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Currency of the cart, `None` while empty.
    pub fn currency(&self) -> Option<&str> {
        self.items.first().map(|line| line.unit_price.currency())
    }

    /// Sum of line prices in `default_currency` when the cart is empty.
    ///
    /// # Errors
    ///
    /// Returns validation error if the sum overflows.
    pub fn total(&self, default_currency: &str) -> Result<Money, DomainError> {
        let currency = self.currency().unwrap_or(default_currency);
        Ok(Money::sum(currency, self.items.iter().map(|line| &line.unit_price))?)
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.updated_at = Timestamp::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{CourseId, JourneyId};

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    fn priced(item: CatalogItem, cents: i64, currency: &str) -> PricedItem {
        PricedItem {
            item,
            title: "Item".to_string(),
            unit_price: Money::new(cents, currency).unwrap(),
            access_days: None,
        }
    }

    #[test]
    fn add_then_total() {
        let mut cart = Cart::empty(user());
        cart.add(&priced(CatalogItem::Course(CourseId::new()), 1000, "BRL"))
            .unwrap();
        cart.add(&priced(CatalogItem::Journey(JourneyId::new()), 2550, "BRL"))
            .unwrap();

        let total = cart.total("BRL").unwrap();
        assert_eq!(total.amount_cents(), 3550);
        assert_eq!(cart.items.len(), 2);
    }

    #[test]
    fn rejects_duplicate_item() {
        let mut cart = Cart::empty(user());
        let item = CatalogItem::Course(CourseId::new());
        cart.add(&priced(item, 1000, "BRL")).unwrap();

        let err = cart.add(&priced(item, 1000, "BRL")).unwrap_err();
        assert_eq!(err.code, ErrorCode::AlreadyExists);
    }

    #[test]
    fn rejects_mixed_currency() {
        let mut cart = Cart::empty(user());
        cart.add(&priced(CatalogItem::Course(CourseId::new()), 1000, "BRL"))
            .unwrap();

        let err = cart
            .add(&priced(CatalogItem::Course(CourseId::new()), 1000, "USD"))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn remove_reports_whether_present() {
        let mut cart = Cart::empty(user());
        let item = CatalogItem::Course(CourseId::new());
        cart.add(&priced(item, 1000, "BRL")).unwrap();

        assert!(cart.remove(&item));
        assert!(!cart.remove(&item));
        assert!(cart.is_empty());
    }

    #[test]
    fn empty_cart_totals_zero_in_default_currency() {
        let cart = Cart::empty(user());
        let total = cart.total("BRL").unwrap();
        assert_eq!(total.amount_cents(), 0);
        assert_eq!(total.currency(), "BRL");
    }
}
