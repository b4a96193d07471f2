//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! This module provides adapters for PostgreSQL-backed persistence:
//! - `PostgresCatalogRepository` - Courses and journeys
//! - `PostgresCartRepository` - Carts, items stored as JSONB
//! - `PostgresPaymentRepository` - Payments with version-checked updates
//! - `PostgresEnrollmentRepository` - Enrollments, unique per payment and item
//! - `PostgresRefundRepository` - Refunds, one open per payment
//! - `PostgresWebhookEventRepository` - Notification delivery records
//!
//! The schema lives in `migrations/`.

mod cart;
mod catalog;
mod enrollment;
mod payment;
mod refund;
mod webhook_events;

pub use cart::PostgresCartRepository;
pub use catalog::PostgresCatalogRepository;
pub use enrollment::PostgresEnrollmentRepository;
pub use payment::PostgresPaymentRepository;
pub use refund::PostgresRefundRepository;
pub use webhook_events::PostgresWebhookEventRepository;

use std::str::FromStr;
use uuid::Uuid;

use crate::domain::catalog::CatalogItem;
use crate::domain::foundation::{
    CourseId, DomainError, ErrorCode, JourneyId, Money, UserId, ValidationError,
};

pub(crate) fn db_error(action: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("Failed to {}: {}", action, e))
}

/// True when `e` violates the named unique constraint or index.
pub(crate) fn is_unique_violation(e: &sqlx::Error, constraint: &str) -> bool {
    if let sqlx::Error::Database(db_err) = e {
        return db_err.constraint() == Some(constraint);
    }
    false
}

pub(crate) fn parse_column<T>(value: &str) -> Result<T, DomainError>
where
    T: FromStr<Err = ValidationError>,
{
    value.parse::<T>().map_err(DomainError::from)
}

pub(crate) fn money(amount_cents: i64, currency: &str) -> Result<Money, DomainError> {
    Money::new(amount_cents, currency).map_err(DomainError::from)
}

pub(crate) fn user_id(value: String) -> Result<UserId, DomainError> {
    UserId::new(value).map_err(DomainError::from)
}

pub(crate) fn catalog_item(kind: &str, id: Uuid) -> Result<CatalogItem, DomainError> {
    match kind {
        "course" => Ok(CatalogItem::Course(CourseId::from_uuid(id))),
        "journey" => Ok(CatalogItem::Journey(JourneyId::from_uuid(id))),
        other => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid catalog item kind in database: {}", other),
        )),
    }
}

pub(crate) fn item_uuid(item: &CatalogItem) -> Uuid {
    match item {
        CatalogItem::Course(id) => *id.as_uuid(),
        CatalogItem::Journey(id) => *id.as_uuid(),
    }
}

pub(crate) fn access_days_to_db(days: Option<u32>) -> Result<Option<i32>, DomainError> {
    days.map(|d| {
        i32::try_from(d).map_err(|_| DomainError::validation("access_days", "Value out of range"))
    })
    .transpose()
}

pub(crate) fn access_days_from_db(days: Option<i32>) -> Result<Option<u32>, DomainError> {
    days.map(|d| {
        u32::try_from(d).map_err(|_| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid access_days in database: {}", d),
            )
        })
    })
    .transpose()
}
