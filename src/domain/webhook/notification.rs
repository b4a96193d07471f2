//! Mercado Pago notification model.
//!
//! Notifications arrive in two shapes:
//!
//! - Webhooks: JSON body `{ "id", "live_mode", "type", "action", "data": { "id" } }`
//!   with `?data.id=..&type=..` repeated in the query string
//! - Legacy IPN: `?id=..&topic=..` with an optional `{ "resource", "topic" }` body
//!
//! Both are folded into one [`Notification`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

use super::WebhookError;

/// What a notification is about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationTopic {
    Payment,
    MerchantOrder,
    #[serde(untagged)]
    Other(String),
}

impl NotificationTopic {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "payment" => NotificationTopic::Payment,
            "merchant_order" => NotificationTopic::MerchantOrder,
            other => NotificationTopic::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            NotificationTopic::Payment => "payment",
            NotificationTopic::MerchantOrder => "merchant_order",
            NotificationTopic::Other(other) => other,
        }
    }
}

impl fmt::Display for NotificationTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Default, Deserialize)]
struct NotificationBody {
    id: Option<Value>,
    live_mode: Option<bool>,
    #[serde(rename = "type")]
    kind: Option<String>,
    topic: Option<String>,
    action: Option<String>,
    data: Option<NotificationData>,
    resource: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NotificationData {
    id: Option<Value>,
}

/// A gateway notification, normalized from body and query string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Notification id assigned by the gateway. Stable across redeliveries.
    pub id: Option<String>,
    pub topic: NotificationTopic,
    pub action: Option<String>,
    pub live_mode: Option<bool>,
    /// Id of the resource the notification is about (e.g. the payment id).
    pub data_id: String,
    /// Value of the `x-request-id` header.
    pub request_id: Option<String>,
}

impl Notification {
    /// Builds a notification from the raw request parts.
    ///
    /// Body fields win over query parameters. An empty body is allowed for
    /// legacy query-only notifications.
    ///
    /// # Errors
    ///
    /// - `ParseError` if a non-empty body is not a JSON object
    /// - `MissingField` if the topic or resource id cannot be found
    pub fn from_request(
        body: &[u8],
        query: &HashMap<String, String>,
        request_id: Option<String>,
    ) -> Result<Self, WebhookError> {
        let body: NotificationBody = if body.iter().all(u8::is_ascii_whitespace) {
            NotificationBody::default()
        } else {
            serde_json::from_slice(body).map_err(|e| WebhookError::ParseError(e.to_string()))?
        };

        let topic = body
            .kind
            .clone()
            .or_else(|| body.topic.clone())
            .or_else(|| non_empty(query.get("type")))
            .or_else(|| non_empty(query.get("topic")))
            .ok_or(WebhookError::MissingField("type"))?;

        let is_legacy = body.kind.is_none() && query.get("type").is_none();

        let data_id = body
            .data
            .as_ref()
            .and_then(|data| data.id.as_ref())
            .and_then(value_to_string)
            .or_else(|| non_empty(query.get("data.id")))
            .or_else(|| {
                if is_legacy {
                    non_empty(query.get("id"))
                } else {
                    None
                }
            })
            .or_else(|| body.resource.as_deref().and_then(resource_id))
            .ok_or(WebhookError::MissingField("data.id"))?;

        Ok(Self {
            id: body.id.as_ref().and_then(value_to_string),
            topic: NotificationTopic::parse(&topic),
            action: body.action,
            live_mode: body.live_mode,
            data_id,
            request_id: request_id.filter(|r| !r.trim().is_empty()),
        })
    }

    /// Key identifying this delivery for idempotency.
    ///
    /// The gateway's notification id and the resource id when an id is
    /// present, otherwise topic, resource and request id together. `None`
    /// when nothing stable identifies the delivery; such notifications are
    /// processed without a record.
    pub fn delivery_key(&self) -> Option<String> {
        if let Some(id) = &self.id {
            return Some(format!("notification:{}:{}", id, self.data_id));
        }
        self.request_id
            .as_ref()
            .map(|request_id| format!("{}:{}:{}", self.topic, self.data_id, request_id))
    }

    /// True when this notification is about the resource id covered by the
    /// signature. Alphanumeric ids are signed lowercased, so they compare
    /// without case.
    pub fn is_about(&self, signed_data_id: &str) -> bool {
        if signed_data_id.chars().all(|c| c.is_ascii_alphanumeric()) {
            self.data_id.eq_ignore_ascii_case(signed_data_id)
        } else {
            self.data_id == signed_data_id
        }
    }

    /// True for notifications sent from the gateway's test environment.
    pub fn is_test_mode(&self) -> bool {
        self.live_mode == Some(false)
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty()).cloned()
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Last path segment of a legacy resource URL.
fn resource_id(resource: &str) -> Option<String> {
    resource
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn parses_webhook_body() {
        let body = json!({
            "id": 12345,
            "live_mode": true,
            "type": "payment",
            "action": "payment.updated",
            "data": { "id": "999" }
        });
        let n = Notification::from_request(
            body.to_string().as_bytes(),
            &HashMap::new(),
            Some("req-1".into()),
        )
        .unwrap();

        assert_eq!(n.id.as_deref(), Some("12345"));
        assert_eq!(n.topic, NotificationTopic::Payment);
        assert_eq!(n.action.as_deref(), Some("payment.updated"));
        assert_eq!(n.data_id, "999");
        assert_eq!(n.live_mode, Some(true));
        assert_eq!(n.delivery_key().as_deref(), Some("notification:12345:999"));
    }

    #[test]
    fn numeric_data_id_is_accepted() {
        let body = json!({ "type": "payment", "data": { "id": 42 } });
        let n = Notification::from_request(body.to_string().as_bytes(), &HashMap::new(), None)
            .unwrap();
        assert_eq!(n.data_id, "42");
    }

    #[test]
    fn falls_back_to_query_string() {
        let n = Notification::from_request(
            b"",
            &query(&[("data.id", "777"), ("type", "payment")]),
            Some("req-9".into()),
        )
        .unwrap();

        assert_eq!(n.topic, NotificationTopic::Payment);
        assert_eq!(n.data_id, "777");
        assert_eq!(n.delivery_key().as_deref(), Some("payment:777:req-9"));
    }

    #[test]
    fn parses_legacy_ipn() {
        let n = Notification::from_request(
            b"",
            &query(&[("id", "555"), ("topic", "merchant_order")]),
            None,
        )
        .unwrap();

        assert_eq!(n.topic, NotificationTopic::MerchantOrder);
        assert_eq!(n.data_id, "555");
        assert_eq!(n.delivery_key(), None);
    }

    #[test]
    fn legacy_resource_url_provides_id() {
        let body = json!({
            "resource": "https://api.mercadolibre.com/collections/notifications/31415",
            "topic": "payment"
        });
        let n = Notification::from_request(body.to_string().as_bytes(), &HashMap::new(), None)
            .unwrap();
        assert_eq!(n.data_id, "31415");
    }

    #[test]
    fn missing_topic_is_rejected() {
        let body = json!({ "data": { "id": "1" } });
        let err = Notification::from_request(body.to_string().as_bytes(), &HashMap::new(), None)
            .unwrap_err();
        assert_eq!(err, WebhookError::MissingField("type"));
    }

    #[test]
    fn missing_data_id_is_rejected() {
        let body = json!({ "type": "payment" });
        let err = Notification::from_request(body.to_string().as_bytes(), &HashMap::new(), None)
            .unwrap_err();
        assert_eq!(err, WebhookError::MissingField("data.id"));
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let err = Notification::from_request(b"{not json", &HashMap::new(), None).unwrap_err();
        assert!(matches!(err, WebhookError::ParseError(_)));
    }

    #[test]
    fn unknown_topics_are_preserved() {
        let body = json!({ "type": "subscription_preapproval", "data": { "id": "1" } });
        let n = Notification::from_request(body.to_string().as_bytes(), &HashMap::new(), None)
            .unwrap();
        assert_eq!(
            n.topic,
            NotificationTopic::Other("subscription_preapproval".to_string())
        );
    }

    #[test]
    fn test_mode_is_detected() {
        let body = json!({ "type": "payment", "live_mode": false, "data": { "id": "1" } });
        let n = Notification::from_request(body.to_string().as_bytes(), &HashMap::new(), None)
            .unwrap();
        assert!(n.is_test_mode());
    }

    #[test]
    fn body_resource_must_match_signed_id() {
        let body = json!({ "id": 1, "type": "payment", "data": { "id": "222" } });
        let n = Notification::from_request(
            body.to_string().as_bytes(),
            &query(&[("data.id", "111"), ("type", "payment")]),
            None,
        )
        .unwrap();

        assert_eq!(n.data_id, "222");
        assert!(n.is_about("222"));
        assert!(!n.is_about("111"));
        assert!(!n.is_about(""));
    }

    #[test]
    fn alphanumeric_ids_match_without_case() {
        let body = json!({ "type": "payment", "data": { "id": "AbC123" } });
        let n = Notification::from_request(body.to_string().as_bytes(), &HashMap::new(), None)
            .unwrap();
        assert!(n.is_about("abc123"));

        let body = json!({ "type": "payment", "data": { "id": "Ab-1" } });
        let n = Notification::from_request(body.to_string().as_bytes(), &HashMap::new(), None)
            .unwrap();
        assert!(n.is_about("Ab-1"));
        assert!(!n.is_about("ab-1"));
    }

    #[test]
    fn delivery_key_changes_with_the_resource() {
        let first = json!({ "id": 7, "type": "payment", "data": { "id": "1" } });
        let second = json!({ "id": 7, "type": "payment", "data": { "id": "2" } });
        let first = Notification::from_request(first.to_string().as_bytes(), &HashMap::new(), None)
            .unwrap();
        let second =
            Notification::from_request(second.to_string().as_bytes(), &HashMap::new(), None)
                .unwrap();
        assert_ne!(first.delivery_key(), second.delivery_key());
    }
}
