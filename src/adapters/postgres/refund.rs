//! PostgreSQL implementation of RefundRepository.
//!
//! The partial unique index `refunds_one_open_per_payment` allows a single
//! `requested` refund per payment.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, PaymentId, RefundId, Timestamp};
use crate::domain::refund::{Refund, RefundOrigin, RefundStatus};
use crate::ports::RefundRepository;

use super::{db_error, is_unique_violation, money, parse_column, user_id};

#[derive(Clone)]
pub struct PostgresRefundRepository {
    pool: PgPool,
}

impl PostgresRefundRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RefundRow {
    id: Uuid,
    payment_id: Uuid,
    user_id: String,
    amount_cents: i64,
    currency: String,
    reason: Option<String>,
    status: String,
    origin: String,
    gateway_refund_id: Option<String>,
    requested_by: Option<String>,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    failure_reason: Option<String>,
}

impl TryFrom<RefundRow> for Refund {
    type Error = DomainError;

    fn try_from(row: RefundRow) -> Result<Self, Self::Error> {
        Ok(Refund {
            id: RefundId::from_uuid(row.id),
            payment_id: PaymentId::from_uuid(row.payment_id),
            user_id: user_id(row.user_id)?,
            amount: money(row.amount_cents, &row.currency)?,
            reason: row.reason,
            status: parse_column::<RefundStatus>(&row.status)?,
            origin: parse_column::<RefundOrigin>(&row.origin)?,
            gateway_refund_id: row.gateway_refund_id,
            requested_by: row.requested_by.map(user_id).transpose()?,
            created_at: Timestamp::from_datetime(row.created_at),
            completed_at: row.completed_at.map(Timestamp::from_datetime),
            failure_reason: row.failure_reason,
        })
    }
}

const REFUND_COLUMNS: &str = r#"
    id, payment_id, user_id, amount_cents, currency, reason, status, origin,
    gateway_refund_id, requested_by, created_at, completed_at, failure_reason
"#;

#[async_trait]
impl RefundRepository for PostgresRefundRepository {
    async fn save(&self, refund: &Refund) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO refunds (
                id, payment_id, user_id, amount_cents, currency, reason, status, origin,
                gateway_refund_id, requested_by, created_at, completed_at, failure_reason
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(refund.id.as_uuid())
        .bind(refund.payment_id.as_uuid())
        .bind(refund.user_id.as_str())
        .bind(refund.amount.amount_cents())
        .bind(refund.amount.currency())
        .bind(&refund.reason)
        .bind(refund.status.as_str())
        .bind(refund.origin.as_str())
        .bind(&refund.gateway_refund_id)
        .bind(refund.requested_by.as_ref().map(|u| u.as_str()))
        .bind(refund.created_at.as_datetime())
        .bind(refund.completed_at.as_ref().map(|t| *t.as_datetime()))
        .bind(&refund.failure_reason)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, "refunds_one_open_per_payment") {
                return DomainError::new(
                    ErrorCode::AlreadyExists,
                    format!("Payment {} already has a refund in progress", refund.payment_id),
                );
            }
            db_error("save refund", e)
        })?;

        Ok(())
    }

    async fn update(&self, refund: &Refund) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE refunds SET
                status = $2,
                gateway_refund_id = $3,
                completed_at = $4,
                failure_reason = $5
            WHERE id = $1
            "#,
        )
        .bind(refund.id.as_uuid())
        .bind(refund.status.as_str())
        .bind(&refund.gateway_refund_id)
        .bind(refund.completed_at.as_ref().map(|t| *t.as_datetime()))
        .bind(&refund.failure_reason)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("update refund", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::RefundNotFound,
                format!("Refund {} not found", refund.id),
            ));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: &RefundId) -> Result<Option<Refund>, DomainError> {
        let row: Option<RefundRow> = sqlx::query_as(&format!(
            "SELECT {} FROM refunds WHERE id = $1",
            REFUND_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("find refund", e))?;

        row.map(Refund::try_from).transpose()
    }

    async fn find_open_by_payment(
        &self,
        payment_id: &PaymentId,
    ) -> Result<Option<Refund>, DomainError> {
        let row: Option<RefundRow> = sqlx::query_as(&format!(
            "SELECT {} FROM refunds WHERE payment_id = $1 AND status = $2",
            REFUND_COLUMNS
        ))
        .bind(payment_id.as_uuid())
        .bind(RefundStatus::Requested.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("find open refund", e))?;

        row.map(Refund::try_from).transpose()
    }

    async fn find_by_payment(&self, payment_id: &PaymentId) -> Result<Vec<Refund>, DomainError> {
        let rows: Vec<RefundRow> = sqlx::query_as(&format!(
            "SELECT {} FROM refunds WHERE payment_id = $1 ORDER BY created_at DESC",
            REFUND_COLUMNS
        ))
        .bind(payment_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("find refunds for payment", e))?;

        rows.into_iter().map(Refund::try_from).collect()
    }
}
