//! WebhookEventRepository port - Interface for tracking processed gateway notifications.
//!
//! Enables idempotent webhook handling by recording which deliveries have
//! been processed, together with the notification and its outcome for
//! debugging and auditing.
//!
//! ## Why Webhook Idempotency Matters
//!
//! Mercado Pago may deliver the same notification multiple times due to:
//! - Network timeouts
//! - Non-2xx response from our endpoint (triggers retry)
//! - Our endpoint answering but the gateway not receiving it
//!
//! All notification handlers MUST be idempotent.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{DomainError, Timestamp, ValidationError};

/// Outcome recorded for a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Success,
    Ignored,
    /// Processing failed; a redelivery may process it again.
    Failed,
}

impl DeliveryOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryOutcome::Success => "success",
            DeliveryOutcome::Ignored => "ignored",
            DeliveryOutcome::Failed => "failed",
        }
    }

    /// True when a redelivery of the same notification is a duplicate.
    pub fn is_final(&self) -> bool {
        !matches!(self, DeliveryOutcome::Failed)
    }
}

impl fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryOutcome {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(DeliveryOutcome::Success),
            "ignored" => Ok(DeliveryOutcome::Ignored),
            "failed" => Ok(DeliveryOutcome::Failed),
            other => Err(ValidationError::invalid_format(
                "result",
                format!("unknown delivery outcome '{}'", other),
            )),
        }
    }
}

/// Record of a processed notification delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookEventRecord {
    /// Delivery key (notification id, or topic/resource/request id).
    pub delivery_key: String,

    /// Notification topic (e.g. "payment").
    pub topic: String,

    /// Id of the resource the notification refers to.
    pub resource_id: String,

    pub processed_at: Timestamp,

    pub result: DeliveryOutcome,

    /// Reason when ignored, error when failed.
    pub message: Option<String>,

    /// Original notification for debugging.
    pub payload: serde_json::Value,
}

impl WebhookEventRecord {
    fn new(
        delivery_key: impl Into<String>,
        topic: impl Into<String>,
        resource_id: impl Into<String>,
        result: DeliveryOutcome,
        message: Option<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            delivery_key: delivery_key.into(),
            topic: topic.into(),
            resource_id: resource_id.into(),
            processed_at: Timestamp::now(),
            result,
            message,
            payload,
        }
    }

    pub fn success(
        delivery_key: impl Into<String>,
        topic: impl Into<String>,
        resource_id: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self::new(
            delivery_key,
            topic,
            resource_id,
            DeliveryOutcome::Success,
            None,
            payload,
        )
    }

    pub fn ignored(
        delivery_key: impl Into<String>,
        topic: impl Into<String>,
        resource_id: impl Into<String>,
        reason: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self::new(
            delivery_key,
            topic,
            resource_id,
            DeliveryOutcome::Ignored,
            Some(reason.into()),
            payload,
        )
    }

    pub fn failed(
        delivery_key: impl Into<String>,
        topic: impl Into<String>,
        resource_id: impl Into<String>,
        error: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self::new(
            delivery_key,
            topic,
            resource_id,
            DeliveryOutcome::Failed,
            Some(error.into()),
            payload,
        )
    }
}

/// Result of attempting to save a delivery record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveResult {
    /// Record was written (first delivery, or replacing a failed one).
    Inserted,
    /// A final record already exists (duplicate delivery).
    AlreadyExists,
}

/// Port for storing and retrieving processed deliveries.
///
/// Implementations should use a PRIMARY KEY on the delivery key so that
/// concurrent deliveries cannot both insert.
#[async_trait]
pub trait WebhookEventRepository: Send + Sync {
    /// Find a previously recorded delivery.
    async fn find_by_key(&self, delivery_key: &str)
        -> Result<Option<WebhookEventRecord>, DomainError>;

    /// Attempt to save a delivery record.
    ///
    /// Inserts when no record exists and replaces an existing `Failed`
    /// record. Returns `AlreadyExists` when a final record is present.
    async fn save(&self, record: WebhookEventRecord) -> Result<SaveResult, DomainError>;

    /// Delete records processed before `cutoff`. Returns the number deleted.
    async fn delete_before(&self, cutoff: Timestamp) -> Result<u64, DomainError>;
}

/// Result of notification processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookResult {
    /// Notification was processed successfully.
    Processed,
    /// Notification was acknowledged without acting on it.
    Ignored(String),
    /// Notification was already processed (idempotent skip).
    AlreadyProcessed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_record_has_no_message() {
        let record = WebhookEventRecord::success(
            "notification:1",
            "payment",
            "999",
            serde_json::json!({"id": 1}),
        );

        assert_eq!(record.delivery_key, "notification:1");
        assert_eq!(record.result, DeliveryOutcome::Success);
        assert!(record.message.is_none());
    }

    #[test]
    fn ignored_record_includes_reason() {
        let record = WebhookEventRecord::ignored(
            "notification:2",
            "merchant_order",
            "1",
            "No handler for topic",
            serde_json::json!({}),
        );

        assert_eq!(record.result, DeliveryOutcome::Ignored);
        assert_eq!(record.message.as_deref(), Some("No handler for topic"));
    }

    #[test]
    fn only_failed_outcome_allows_reprocessing() {
        assert!(DeliveryOutcome::Success.is_final());
        assert!(DeliveryOutcome::Ignored.is_final());
        assert!(!DeliveryOutcome::Failed.is_final());
    }

    #[test]
    fn outcome_round_trips_through_storage_name() {
        for outcome in [
            DeliveryOutcome::Success,
            DeliveryOutcome::Ignored,
            DeliveryOutcome::Failed,
        ] {
            assert_eq!(outcome.as_str().parse::<DeliveryOutcome>(), Ok(outcome));
        }
    }
}
