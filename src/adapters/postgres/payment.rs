//! PostgreSQL implementation of PaymentRepository.
//!
//! Updates are guarded by the `version` column: a write only lands when the
//! stored version still matches the one the caller loaded.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::catalog::PricedItem;
use crate::domain::foundation::{DomainError, ErrorCode, PaymentId, Timestamp, UserId};
use crate::domain::payment::{Payment, PaymentStatus};
use crate::ports::PaymentRepository;

use super::{db_error, is_unique_violation, money, parse_column, user_id};

#[derive(Clone)]
pub struct PostgresPaymentRepository {
    pool: PgPool,
}

impl PostgresPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    user_id: String,
    items: serde_json::Value,
    total_cents: i64,
    currency: String,
    status: String,
    preference_id: Option<String>,
    checkout_url: Option<String>,
    gateway_payment_id: Option<String>,
    status_detail: Option<String>,
    gateway_updated_at: Option<DateTime<Utc>>,
    approved_at: Option<DateTime<Utc>>,
    refunded_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: i64,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = DomainError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let items: Vec<PricedItem> = serde_json::from_value(row.items).map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid payment items in database: {}", e),
            )
        })?;

        Ok(Payment {
            id: PaymentId::from_uuid(row.id),
            user_id: user_id(row.user_id)?,
            items,
            total: money(row.total_cents, &row.currency)?,
            status: parse_column::<PaymentStatus>(&row.status)?,
            preference_id: row.preference_id,
            checkout_url: row.checkout_url,
            gateway_payment_id: row.gateway_payment_id,
            status_detail: row.status_detail,
            gateway_updated_at: row.gateway_updated_at.map(Timestamp::from_datetime),
            approved_at: row.approved_at.map(Timestamp::from_datetime),
            refunded_at: row.refunded_at.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
            version: row.version,
        })
    }
}

const PAYMENT_COLUMNS: &str = r#"
    id, user_id, items, total_cents, currency, status, preference_id, checkout_url,
    gateway_payment_id, status_detail, gateway_updated_at, approved_at, refunded_at,
    created_at, updated_at, version
"#;

fn items_json(payment: &Payment) -> Result<serde_json::Value, DomainError> {
    serde_json::to_value(&payment.items).map_err(|e| {
        DomainError::new(
            ErrorCode::InternalError,
            format!("Failed to serialize payment items: {}", e),
        )
    })
}

#[async_trait]
impl PaymentRepository for PostgresPaymentRepository {
    async fn save(&self, payment: &Payment) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO payments (
                id, user_id, items, total_cents, currency, status, preference_id,
                checkout_url, gateway_payment_id, status_detail, gateway_updated_at,
                approved_at, refunded_at, created_at, updated_at, version
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.user_id.as_str())
        .bind(items_json(payment)?)
        .bind(payment.total.amount_cents())
        .bind(payment.total.currency())
        .bind(payment.status.as_str())
        .bind(&payment.preference_id)
        .bind(&payment.checkout_url)
        .bind(&payment.gateway_payment_id)
        .bind(&payment.status_detail)
        .bind(payment.gateway_updated_at.as_ref().map(|t| *t.as_datetime()))
        .bind(payment.approved_at.as_ref().map(|t| *t.as_datetime()))
        .bind(payment.refunded_at.as_ref().map(|t| *t.as_datetime()))
        .bind(payment.created_at.as_datetime())
        .bind(payment.updated_at.as_datetime())
        .bind(payment.version)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, "payments_pkey") {
                return DomainError::new(
                    ErrorCode::AlreadyExists,
                    format!("Payment {} already exists", payment.id),
                );
            }
            db_error("save payment", e)
        })?;

        Ok(())
    }

    async fn update(&self, payment: &Payment) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE payments SET
                status = $3,
                preference_id = $4,
                checkout_url = $5,
                gateway_payment_id = $6,
                status_detail = $7,
                gateway_updated_at = $8,
                approved_at = $9,
                refunded_at = $10,
                updated_at = $11,
                version = version + 1
            WHERE id = $1 AND version = $2
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.version)
        .bind(payment.status.as_str())
        .bind(&payment.preference_id)
        .bind(&payment.checkout_url)
        .bind(&payment.gateway_payment_id)
        .bind(&payment.status_detail)
        .bind(payment.gateway_updated_at.as_ref().map(|t| *t.as_datetime()))
        .bind(payment.approved_at.as_ref().map(|t| *t.as_datetime()))
        .bind(payment.refunded_at.as_ref().map(|t| *t.as_datetime()))
        .bind(payment.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("update payment", e))?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        // Nothing matched: either the row is gone or another writer got there first.
        let stored: Option<i64> = sqlx::query_scalar("SELECT version FROM payments WHERE id = $1")
            .bind(payment.id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("check payment version", e))?;

        match stored {
            None => Err(DomainError::new(
                ErrorCode::PaymentNotFound,
                format!("Payment {} not found", payment.id),
            )),
            Some(found) => Err(DomainError::new(
                ErrorCode::ConcurrencyConflict,
                format!(
                    "Payment {} was modified concurrently (expected version {}, found {})",
                    payment.id, payment.version, found
                ),
            )),
        }
    }

    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, DomainError> {
        let row: Option<PaymentRow> = sqlx::query_as(&format!(
            "SELECT {} FROM payments WHERE id = $1",
            PAYMENT_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("find payment", e))?;

        row.map(Payment::try_from).transpose()
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<Payment>, DomainError> {
        let rows: Vec<PaymentRow> = sqlx::query_as(&format!(
            "SELECT {} FROM payments WHERE user_id = $1 ORDER BY created_at DESC",
            PAYMENT_COLUMNS
        ))
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("find payments for user", e))?;

        rows.into_iter().map(Payment::try_from).collect()
    }

    async fn find_pending_before(&self, cutoff: Timestamp) -> Result<Vec<Payment>, DomainError> {
        let rows: Vec<PaymentRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM payments
            WHERE status = $1 AND created_at < $2
            ORDER BY created_at
            "#,
            PAYMENT_COLUMNS
        ))
        .bind(PaymentStatus::Pending.as_str())
        .bind(cutoff.as_datetime())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("find stale pending payments", e))?;

        rows.into_iter().map(Payment::try_from).collect()
    }
}
