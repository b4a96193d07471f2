//! PostgreSQL implementation of CartRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::cart::{Cart, CartItem};
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::CartRepository;

use super::{db_error, user_id};

/// Carts keyed by user, lines stored as a JSONB array.
#[derive(Clone)]
pub struct PostgresCartRepository {
    pool: PgPool,
}

impl PostgresCartRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    user_id: String,
    items: serde_json::Value,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CartRow> for Cart {
    type Error = DomainError;

    fn try_from(row: CartRow) -> Result<Self, Self::Error> {
        let items: Vec<CartItem> = serde_json::from_value(row.items).map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid cart items in database: {}", e),
            )
        })?;
        Ok(Cart {
            user_id: user_id(row.user_id)?,
            items,
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[async_trait]
impl CartRepository for PostgresCartRepository {
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<Cart>, DomainError> {
        let row: Option<CartRow> =
            sqlx::query_as("SELECT user_id, items, updated_at FROM carts WHERE user_id = $1")
                .bind(user_id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("find cart", e))?;

        row.map(Cart::try_from).transpose()
    }

    async fn save(&self, cart: &Cart) -> Result<(), DomainError> {
        let items = serde_json::to_value(&cart.items).map_err(|e| {
            DomainError::new(
                ErrorCode::InternalError,
                format!("Failed to serialize cart items: {}", e),
            )
        })?;

        sqlx::query(
            r#"
            INSERT INTO carts (user_id, items, updated_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE SET
                items = EXCLUDED.items,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(cart.user_id.as_str())
        .bind(items)
        .bind(cart.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("save cart", e))?;

        Ok(())
    }

    async fn clear(&self, user_id: &UserId) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM carts WHERE user_id = $1")
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("clear cart", e))?;

        Ok(())
    }
}
