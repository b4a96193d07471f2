//! PostgreSQL implementation of WebhookEventRepository.
//!
//! The delivery key is the primary key. A conditional upsert replaces only
//! `failed` records so concurrent duplicates cannot both win.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, Timestamp};
use crate::ports::{DeliveryOutcome, SaveResult, WebhookEventRecord, WebhookEventRepository};

use super::{db_error, parse_column};

#[derive(Clone)]
pub struct PostgresWebhookEventRepository {
    pool: PgPool,
}

impl PostgresWebhookEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct WebhookEventRow {
    delivery_key: String,
    topic: String,
    resource_id: String,
    processed_at: DateTime<Utc>,
    result: String,
    message: Option<String>,
    payload: serde_json::Value,
}

impl TryFrom<WebhookEventRow> for WebhookEventRecord {
    type Error = DomainError;

    fn try_from(row: WebhookEventRow) -> Result<Self, Self::Error> {
        Ok(WebhookEventRecord {
            delivery_key: row.delivery_key,
            topic: row.topic,
            resource_id: row.resource_id,
            processed_at: Timestamp::from_datetime(row.processed_at),
            result: parse_column::<DeliveryOutcome>(&row.result)?,
            message: row.message,
            payload: row.payload,
        })
    }
}

#[async_trait]
impl WebhookEventRepository for PostgresWebhookEventRepository {
    async fn find_by_key(
        &self,
        delivery_key: &str,
    ) -> Result<Option<WebhookEventRecord>, DomainError> {
        let row: Option<WebhookEventRow> = sqlx::query_as(
            r#"
            SELECT delivery_key, topic, resource_id, processed_at, result, message, payload
            FROM webhook_events
            WHERE delivery_key = $1
            "#,
        )
        .bind(delivery_key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("find webhook event", e))?;

        row.map(WebhookEventRecord::try_from).transpose()
    }

    async fn save(&self, record: WebhookEventRecord) -> Result<SaveResult, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO webhook_events (
                delivery_key, topic, resource_id, processed_at, result, message, payload
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (delivery_key) DO UPDATE SET
                topic = EXCLUDED.topic,
                resource_id = EXCLUDED.resource_id,
                processed_at = EXCLUDED.processed_at,
                result = EXCLUDED.result,
                message = EXCLUDED.message,
                payload = EXCLUDED.payload
            WHERE webhook_events.result = 'failed'
            "#,
        )
        .bind(&record.delivery_key)
        .bind(&record.topic)
        .bind(&record.resource_id)
        .bind(record.processed_at.as_datetime())
        .bind(record.result.as_str())
        .bind(&record.message)
        .bind(&record.payload)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("save webhook event", e))?;

        if result.rows_affected() == 0 {
            Ok(SaveResult::AlreadyExists)
        } else {
            Ok(SaveResult::Inserted)
        }
    }

    async fn delete_before(&self, cutoff: Timestamp) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM webhook_events WHERE processed_at < $1")
            .bind(cutoff.as_datetime())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("purge webhook events", e))?;

        Ok(result.rows_affected())
    }
}
