//! Notification processor - Orchestrates idempotent notification handling.
//!
//! ## Design
//!
//! The processor follows these steps:
//! 1. Skip deliveries already recorded with a final outcome
//! 2. Dispatch to the handler registered for the notification topic
//! 3. Record the outcome (success, ignored, or failed)
//!
//! Failed deliveries are recorded too, but a redelivery processes them again
//! and replaces the failed record.
//!
//! ## Race Condition Handling
//!
//! When the same delivery arrives twice concurrently, the first final record
//! saved wins; the other caller gets `AlreadyExists` and reports
//! `AlreadyProcessed`. Handlers are idempotent, so the duplicate work is
//! harmless.

use async_trait::async_trait;
use std::sync::Arc;

use crate::ports::{SaveResult, WebhookEventRecord, WebhookEventRepository, WebhookResult};

use super::{Notification, NotificationTopic, WebhookError};

/// Handler for notifications of one topic.
#[async_trait]
pub trait NotificationHandler: Send + Sync {
    /// The topic this handler processes.
    fn topic(&self) -> NotificationTopic;

    /// Handles the notification.
    ///
    /// Returns `Err(WebhookError::Ignored(_))` if the notification should be
    /// acknowledged but not acted on.
    async fn handle(&self, notification: &Notification) -> Result<(), WebhookError>;
}

/// Routes notifications to handlers.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Find the handler for a topic.
    fn get_handler(&self, topic: &NotificationTopic) -> Option<&dyn NotificationHandler>;

    /// Dispatch a notification to its handler.
    ///
    /// Returns `Err(WebhookError::Ignored)` if no handler is registered.
    async fn dispatch(&self, notification: &Notification) -> Result<(), WebhookError> {
        match self.get_handler(&notification.topic) {
            Some(handler) => handler.handle(notification).await,
            None => Err(WebhookError::Ignored(format!(
                "No handler for topic: {}",
                notification.topic
            ))),
        }
    }
}

/// Dispatcher backed by a list of handlers, one per topic.
#[derive(Default)]
pub struct TopicDispatcher {
    handlers: Vec<Arc<dyn NotificationHandler>>,
}

impl TopicDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_handler(mut self, handler: Arc<dyn NotificationHandler>) -> Self {
        self.handlers.push(handler);
        self
    }
}

impl NotificationDispatcher for TopicDispatcher {
    fn get_handler(&self, topic: &NotificationTopic) -> Option<&dyn NotificationHandler> {
        self.handlers
            .iter()
            .find(|handler| &handler.topic() == topic)
            .map(|handler| handler.as_ref())
    }
}

/// Processes notifications with idempotency guarantees.
pub struct IdempotentNotificationProcessor {
    repository: Arc<dyn WebhookEventRepository>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    require_live_mode: bool,
}

impl IdempotentNotificationProcessor {
    pub fn new(
        repository: Arc<dyn WebhookEventRepository>,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            repository,
            dispatcher,
            require_live_mode: false,
        }
    }

    /// Acknowledge and ignore notifications sent from the gateway's test
    /// environment.
    pub fn require_live_mode(mut self, required: bool) -> Self {
        self.require_live_mode = required;
        self
    }

    /// Process a notification at most once per delivery key.
    ///
    /// # Returns
    ///
    /// - `Ok(WebhookResult::Processed)` - handled successfully
    /// - `Ok(WebhookResult::Ignored(_))` - acknowledged, nothing to do
    /// - `Ok(WebhookResult::AlreadyProcessed)` - duplicate delivery
    /// - `Err(_)` - processing failed
    pub async fn process(&self, notification: &Notification) -> Result<WebhookResult, WebhookError> {
        let key = notification.delivery_key();

        if let Some(key) = &key {
            if let Some(existing) = self.repository.find_by_key(key).await? {
                if existing.result.is_final() {
                    tracing::debug!(delivery_key = %key, "Duplicate notification delivery");
                    return Ok(WebhookResult::AlreadyProcessed);
                }
            }
        }

        let result = if self.require_live_mode && notification.is_test_mode() {
            Err(WebhookError::Ignored(
                "Test-mode notification in live environment".to_string(),
            ))
        } else {
            self.dispatcher.dispatch(notification).await
        };

        let Some(key) = key else {
            return finish(result);
        };

        let payload = serde_json::to_value(notification)
            .map_err(|e| WebhookError::ParseError(format!("Failed to serialize notification: {}", e)))?;
        let topic = notification.topic.as_str();
        let resource = notification.data_id.as_str();

        let record = match &result {
            Ok(()) => WebhookEventRecord::success(&key, topic, resource, payload),
            Err(WebhookError::Ignored(reason)) => {
                WebhookEventRecord::ignored(&key, topic, resource, reason, payload)
            }
            Err(e) => WebhookEventRecord::failed(&key, topic, resource, e.to_string(), payload),
        };

        match self.repository.save(record).await? {
            SaveResult::Inserted => finish(result),
            SaveResult::AlreadyExists => Ok(WebhookResult::AlreadyProcessed),
        }
    }
}

fn finish(result: Result<(), WebhookError>) -> Result<WebhookResult, WebhookError> {
    match result {
        Ok(()) => Ok(WebhookResult::Processed),
        Err(WebhookError::Ignored(reason)) => Ok(WebhookResult::Ignored(reason)),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{DomainError, Timestamp};
    use crate::ports::DeliveryOutcome;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::sync::RwLock;

    // ══════════════════════════════════════════════════════════════
    // Test Infrastructure
    // ══════════════════════════════════════════════════════════════

    #[derive(Default)]
    struct MockWebhookRepository {
        records: RwLock<HashMap<String, WebhookEventRecord>>,
    }

    #[async_trait]
    impl WebhookEventRepository for MockWebhookRepository {
        async fn find_by_key(&self, key: &str) -> Result<Option<WebhookEventRecord>, DomainError> {
            Ok(self.records.read().await.get(key).cloned())
        }

        async fn save(&self, record: WebhookEventRecord) -> Result<SaveResult, DomainError> {
            let mut records = self.records.write().await;
            match records.get(&record.delivery_key) {
                Some(existing) if existing.result.is_final() => Ok(SaveResult::AlreadyExists),
                _ => {
                    records.insert(record.delivery_key.clone(), record);
                    Ok(SaveResult::Inserted)
                }
            }
        }

        async fn delete_before(&self, cutoff: Timestamp) -> Result<u64, DomainError> {
            let mut records = self.records.write().await;
            let before = records.len();
            records.retain(|_, r| !r.processed_at.is_before(&cutoff));
            Ok((before - records.len()) as u64)
        }
    }

    enum Behavior {
        Succeed,
        Fail,
        Ignore,
    }

    struct MockHandler {
        behavior: RwLock<Behavior>,
        calls: AtomicU32,
    }

    impl MockHandler {
        fn new(behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                behavior: RwLock::new(behavior),
                calls: AtomicU32::new(0),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl NotificationHandler for MockHandler {
        fn topic(&self) -> NotificationTopic {
            NotificationTopic::Payment
        }

        async fn handle(&self, _notification: &Notification) -> Result<(), WebhookError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match *self.behavior.read().await {
                Behavior::Succeed => Ok(()),
                Behavior::Fail => Err(WebhookError::Database("Simulated failure".to_string())),
                Behavior::Ignore => Err(WebhookError::Ignored("Nothing to do".to_string())),
            }
        }
    }

    fn notification(id: Option<&str>, topic: NotificationTopic) -> Notification {
        Notification {
            id: id.map(str::to_string),
            topic,
            action: Some("payment.updated".to_string()),
            live_mode: Some(true),
            data_id: "999".to_string(),
            request_id: None,
        }
    }

    fn processor(
        repo: Arc<MockWebhookRepository>,
        handler: Arc<MockHandler>,
    ) -> IdempotentNotificationProcessor {
        let dispatcher = TopicDispatcher::new().with_handler(handler);
        IdempotentNotificationProcessor::new(repo, Arc::new(dispatcher))
    }

    // ══════════════════════════════════════════════════════════════
    // Dispatcher Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn dispatcher_ignores_topics_without_handler() {
        let dispatcher = TopicDispatcher::new().with_handler(MockHandler::new(Behavior::Succeed));
        let result = dispatcher
            .dispatch(&notification(Some("1"), NotificationTopic::MerchantOrder))
            .await;
        assert!(matches!(result, Err(WebhookError::Ignored(_))));
    }

    // ══════════════════════════════════════════════════════════════
    // Processor Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn first_delivery_is_processed_and_recorded() {
        let repo = Arc::new(MockWebhookRepository::default());
        let handler = MockHandler::new(Behavior::Succeed);
        let processor = processor(repo.clone(), handler.clone());

        let result = processor
            .process(&notification(Some("1"), NotificationTopic::Payment))
            .await;

        assert_eq!(result, Ok(WebhookResult::Processed));
        assert_eq!(handler.calls(), 1);
        let record = repo.find_by_key("notification:1:999").await.unwrap().unwrap();
        assert_eq!(record.result, DeliveryOutcome::Success);
        assert_eq!(record.resource_id, "999");
    }

    #[tokio::test]
    async fn duplicate_delivery_is_skipped() {
        let repo = Arc::new(MockWebhookRepository::default());
        let handler = MockHandler::new(Behavior::Succeed);
        let processor = processor(repo, handler.clone());
        let n = notification(Some("1"), NotificationTopic::Payment);

        processor.process(&n).await.unwrap();
        let second = processor.process(&n).await;

        assert_eq!(second, Ok(WebhookResult::AlreadyProcessed));
        assert_eq!(handler.calls(), 1);
    }

    #[tokio::test]
    async fn reused_notification_id_for_another_resource_is_processed() {
        let repo = Arc::new(MockWebhookRepository::default());
        let handler = MockHandler::new(Behavior::Succeed);
        let processor = processor(repo.clone(), handler.clone());
        let first = notification(Some("5"), NotificationTopic::Payment);
        let mut second = first.clone();
        second.data_id = "1000".to_string();

        processor.process(&first).await.unwrap();
        let result = processor.process(&second).await;

        assert_eq!(result, Ok(WebhookResult::Processed));
        assert_eq!(handler.calls(), 2);
        assert!(repo.find_by_key("notification:5:1000").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn ignored_delivery_is_recorded_and_not_repeated() {
        let repo = Arc::new(MockWebhookRepository::default());
        let handler = MockHandler::new(Behavior::Ignore);
        let processor = processor(repo.clone(), handler.clone());
        let n = notification(Some("2"), NotificationTopic::Payment);

        let first = processor.process(&n).await;
        let second = processor.process(&n).await;

        assert_eq!(first, Ok(WebhookResult::Ignored("Nothing to do".to_string())));
        assert_eq!(second, Ok(WebhookResult::AlreadyProcessed));
        assert_eq!(handler.calls(), 1);
    }

    #[tokio::test]
    async fn failed_delivery_can_be_retried() {
        let repo = Arc::new(MockWebhookRepository::default());
        let handler = MockHandler::new(Behavior::Fail);
        let processor = processor(repo.clone(), handler.clone());
        let n = notification(Some("3"), NotificationTopic::Payment);

        let first = processor.process(&n).await;
        assert!(matches!(first, Err(WebhookError::Database(_))));
        let record = repo.find_by_key("notification:3:999").await.unwrap().unwrap();
        assert_eq!(record.result, DeliveryOutcome::Failed);

        *handler.behavior.write().await = Behavior::Succeed;
        let second = processor.process(&n).await;

        assert_eq!(second, Ok(WebhookResult::Processed));
        assert_eq!(handler.calls(), 2);
        let record = repo.find_by_key("notification:3:999").await.unwrap().unwrap();
        assert_eq!(record.result, DeliveryOutcome::Success);
    }

    #[tokio::test]
    async fn unknown_topic_is_acknowledged() {
        let repo = Arc::new(MockWebhookRepository::default());
        let handler = MockHandler::new(Behavior::Succeed);
        let processor = processor(repo.clone(), handler.clone());

        let result = processor
            .process(&notification(Some("4"), NotificationTopic::MerchantOrder))
            .await;

        assert!(matches!(result, Ok(WebhookResult::Ignored(_))));
        assert_eq!(handler.calls(), 0);
        let record = repo.find_by_key("notification:4:999").await.unwrap().unwrap();
        assert_eq!(record.result, DeliveryOutcome::Ignored);
    }

    #[tokio::test]
    async fn delivery_without_key_is_processed_without_record() {
        let repo = Arc::new(MockWebhookRepository::default());
        let handler = MockHandler::new(Behavior::Succeed);
        let processor = processor(repo.clone(), handler.clone());
        let n = notification(None, NotificationTopic::Payment);

        processor.process(&n).await.unwrap();
        processor.process(&n).await.unwrap();

        assert_eq!(handler.calls(), 2);
        assert!(repo.records.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_mode_is_ignored_when_live_mode_required() {
        let repo = Arc::new(MockWebhookRepository::default());
        let handler = MockHandler::new(Behavior::Succeed);
        let processor = processor(repo, handler.clone()).require_live_mode(true);
        let mut n = notification(Some("5"), NotificationTopic::Payment);
        n.live_mode = Some(false);

        let result = processor.process(&n).await;

        assert!(matches!(result, Ok(WebhookResult::Ignored(_))));
        assert_eq!(handler.calls(), 0);
    }

    #[tokio::test]
    async fn purge_removes_old_records() {
        let repo = MockWebhookRepository::default();
        repo.save(WebhookEventRecord::success("k", "payment", "1", serde_json::json!({})))
            .await
            .unwrap();

        let deleted = repo.delete_before(Timestamp::now().add_days(1)).await.unwrap();
        assert_eq!(deleted, 1);
    }
}
