//! Mercado Pago REST API payloads.
//!
//! Only the fields this service reads or sends are modelled. Unknown fields
//! are ignored on deserialization.

use serde::{Deserialize, Deserializer, Serialize};

/// Body of `POST /checkout/preferences`.
#[derive(Debug, Clone, Serialize)]
pub struct PreferenceBody {
    pub items: Vec<PreferenceItemBody>,
    pub external_reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub back_urls: Option<BackUrls>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_return: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statement_descriptor: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PreferenceItemBody {
    pub id: String,
    pub title: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub currency_id: String,
}

/// Where the buyer returns after checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackUrls {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl BackUrls {
    pub fn is_empty(&self) -> bool {
        self.success.is_none() && self.pending.is_none() && self.failure.is_none()
    }
}

/// Response of `POST /checkout/preferences`.
#[derive(Debug, Clone, Deserialize)]
pub struct PreferenceResponse {
    pub id: String,
    pub init_point: String,
    #[serde(default)]
    pub sandbox_init_point: Option<String>,
}

/// Response of `GET /v1/payments/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentResponse {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub status_detail: Option<String>,
    #[serde(default)]
    pub external_reference: Option<String>,
    pub transaction_amount: f64,
    pub currency_id: String,
    /// RFC 3339 with a local offset, e.g. `2024-03-01T10:00:00.000-04:00`.
    #[serde(default)]
    pub date_last_updated: Option<String>,
    #[serde(default)]
    pub live_mode: bool,
}

/// Body of `POST /v1/payments/{id}/refunds`. An empty body refunds in full.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RefundBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
}

/// Response of `POST /v1/payments/{id}/refunds`.
#[derive(Debug, Clone, Deserialize)]
pub struct RefundResponse {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub status: String,
}

/// Error body returned on non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Gateway ids are numbers in the API and strings everywhere else.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_response_accepts_numeric_id() {
        let json = r#"{
            "id": 1234567890,
            "status": "approved",
            "status_detail": "accredited",
            "external_reference": "a1b2",
            "transaction_amount": 199.9,
            "currency_id": "BRL",
            "date_last_updated": "2024-03-01T10:00:00.000-04:00",
            "live_mode": true,
            "payer": { "email": "buyer@example.com" }
        }"#;
        let payment: PaymentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(payment.id, "1234567890");
        assert_eq!(payment.status, "approved");
        assert!(payment.live_mode);
    }

    #[test]
    fn refund_body_omits_amount_for_full_refund() {
        let body = serde_json::to_string(&RefundBody::default()).unwrap();
        assert_eq!(body, "{}");
    }

    #[test]
    fn preference_body_skips_absent_urls() {
        let body = PreferenceBody {
            items: vec![],
            external_reference: "ref".to_string(),
            notification_url: None,
            back_urls: None,
            auto_return: None,
            statement_descriptor: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("notification_url").is_none());
        assert_eq!(json["external_reference"], "ref");
    }
}
