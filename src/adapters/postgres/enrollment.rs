//! PostgreSQL implementation of EnrollmentRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::catalog::CatalogItem;
use crate::domain::enrollment::{Enrollment, EnrollmentStatus};
use crate::domain::foundation::{
    DomainError, EnrollmentId, ErrorCode, PaymentId, Timestamp, UserId,
};
use crate::ports::EnrollmentRepository;

use super::{catalog_item, db_error, item_uuid, parse_column, user_id};

/// Enrollments are unique on `(payment_id, target_kind, target_id)`.
#[derive(Clone)]
pub struct PostgresEnrollmentRepository {
    pool: PgPool,
}

impl PostgresEnrollmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EnrollmentRow {
    id: Uuid,
    user_id: String,
    target_kind: String,
    target_id: Uuid,
    payment_id: Uuid,
    status: String,
    granted_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    revoked_at: Option<DateTime<Utc>>,
    revoke_reason: Option<String>,
}

impl TryFrom<EnrollmentRow> for Enrollment {
    type Error = DomainError;

    fn try_from(row: EnrollmentRow) -> Result<Self, Self::Error> {
        Ok(Enrollment {
            id: EnrollmentId::from_uuid(row.id),
            user_id: user_id(row.user_id)?,
            target: catalog_item(&row.target_kind, row.target_id)?,
            payment_id: PaymentId::from_uuid(row.payment_id),
            status: parse_column::<EnrollmentStatus>(&row.status)?,
            granted_at: Timestamp::from_datetime(row.granted_at),
            expires_at: row.expires_at.map(Timestamp::from_datetime),
            revoked_at: row.revoked_at.map(Timestamp::from_datetime),
            revoke_reason: row.revoke_reason,
        })
    }
}

const ENROLLMENT_COLUMNS: &str = r#"
    id, user_id, target_kind, target_id, payment_id, status, granted_at, expires_at,
    revoked_at, revoke_reason
"#;

#[async_trait]
impl EnrollmentRepository for PostgresEnrollmentRepository {
    async fn insert_if_absent(&self, enrollment: &Enrollment) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO enrollments (
                id, user_id, target_kind, target_id, payment_id, status, granted_at,
                expires_at, revoked_at, revoke_reason
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (payment_id, target_kind, target_id) DO NOTHING
            "#,
        )
        .bind(enrollment.id.as_uuid())
        .bind(enrollment.user_id.as_str())
        .bind(enrollment.target.kind())
        .bind(item_uuid(&enrollment.target))
        .bind(enrollment.payment_id.as_uuid())
        .bind(enrollment.status.as_str())
        .bind(enrollment.granted_at.as_datetime())
        .bind(enrollment.expires_at.as_ref().map(|t| *t.as_datetime()))
        .bind(enrollment.revoked_at.as_ref().map(|t| *t.as_datetime()))
        .bind(&enrollment.revoke_reason)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("insert enrollment", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn update(&self, enrollment: &Enrollment) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE enrollments SET
                status = $2,
                expires_at = $3,
                revoked_at = $4,
                revoke_reason = $5
            WHERE id = $1
            "#,
        )
        .bind(enrollment.id.as_uuid())
        .bind(enrollment.status.as_str())
        .bind(enrollment.expires_at.as_ref().map(|t| *t.as_datetime()))
        .bind(enrollment.revoked_at.as_ref().map(|t| *t.as_datetime()))
        .bind(&enrollment.revoke_reason)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("update enrollment", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::NotFound,
                format!("Enrollment {} not found", enrollment.id),
            ));
        }

        Ok(())
    }

    async fn find_by_payment(
        &self,
        payment_id: &PaymentId,
    ) -> Result<Vec<Enrollment>, DomainError> {
        let rows: Vec<EnrollmentRow> = sqlx::query_as(&format!(
            "SELECT {} FROM enrollments WHERE payment_id = $1 ORDER BY granted_at",
            ENROLLMENT_COLUMNS
        ))
        .bind(payment_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("find enrollments for payment", e))?;

        rows.into_iter().map(Enrollment::try_from).collect()
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<Enrollment>, DomainError> {
        let rows: Vec<EnrollmentRow> = sqlx::query_as(&format!(
            "SELECT {} FROM enrollments WHERE user_id = $1 ORDER BY granted_at DESC",
            ENROLLMENT_COLUMNS
        ))
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("find enrollments for user", e))?;

        rows.into_iter().map(Enrollment::try_from).collect()
    }

    async fn find_for_targets(
        &self,
        user_id: &UserId,
        targets: &[CatalogItem],
    ) -> Result<Vec<Enrollment>, DomainError> {
        if targets.is_empty() {
            return Ok(Vec::new());
        }
        let kinds: Vec<String> = targets.iter().map(|t| t.kind().to_string()).collect();
        let ids: Vec<Uuid> = targets.iter().map(item_uuid).collect();

        let rows: Vec<EnrollmentRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM enrollments
            WHERE user_id = $1
              AND (target_kind, target_id) IN (
                  SELECT * FROM UNNEST($2::text[], $3::uuid[])
              )
            "#,
            ENROLLMENT_COLUMNS
        ))
        .bind(user_id.as_str())
        .bind(&kinds)
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("find enrollments for targets", e))?;

        rows.into_iter().map(Enrollment::try_from).collect()
    }

    async fn find_due_for_expiry(&self, now: Timestamp) -> Result<Vec<Enrollment>, DomainError> {
        let rows: Vec<EnrollmentRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM enrollments
            WHERE status = $1 AND expires_at IS NOT NULL AND expires_at <= $2
            "#,
            ENROLLMENT_COLUMNS
        ))
        .bind(EnrollmentStatus::Active.as_str())
        .bind(now.as_datetime())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("find enrollments due for expiry", e))?;

        rows.into_iter().map(Enrollment::try_from).collect()
    }
}
