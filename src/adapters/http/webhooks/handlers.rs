//! HTTP handler for Mercado Pago notifications.
//!
//! The status code is the only thing the gateway looks at:
//! - 2xx: delivered, never sent again
//! - 4xx: rejected, not retried
//! - 5xx: retried later with the same notification

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::adapters::http::error::ErrorResponse;
use crate::adapters::http::state::AppState;
use crate::domain::webhook::{Notification, WebhookError};
use crate::ports::WebhookResult;

pub const SIGNATURE_HEADER: &str = "x-signature";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<WebhookResult> for WebhookAck {
    fn from(result: WebhookResult) -> Self {
        match result {
            WebhookResult::Processed => Self {
                status: "processed",
                reason: None,
            },
            WebhookResult::Ignored(reason) => Self {
                status: "ignored",
                reason: Some(reason),
            },
            WebhookResult::AlreadyProcessed => Self {
                status: "already_processed",
                reason: None,
            },
        }
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn reject(err: WebhookError) -> Response {
    let status = err.status_code();
    if err.is_retryable() {
        tracing::error!(error = %err, status = status.as_u16(), "Notification processing failed");
    } else {
        tracing::warn!(error = %err, status = status.as_u16(), "Notification rejected");
    }
    let code = match &err {
        WebhookError::InvalidSignature
        | WebhookError::TimestampOutOfRange
        | WebhookError::InvalidTimestamp => "INVALID_SIGNATURE",
        WebhookError::ParseError(_) | WebhookError::MissingField(_) => "INVALID_NOTIFICATION",
        WebhookError::AmountMismatch { .. } => "AMOUNT_MISMATCH",
        WebhookError::Ignored(_) => "IGNORED",
        WebhookError::Gateway(_) => "GATEWAY_ERROR",
        WebhookError::Conflict(_) => "CONCURRENCY_CONFLICT",
        WebhookError::Database(_) => "INTERNAL_ERROR",
    };
    (status, Json(ErrorResponse::new(code, err.to_string()))).into_response()
}

/// POST /api/webhooks/mercadopago
pub async fn handle_mercadopago_notification(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request_id = header(&headers, REQUEST_ID_HEADER).map(str::to_string);

    // Resource id covered by the signature, when signatures are checked.
    let mut signed_data_id = None;
    if let Some(verifier) = &state.signature_verifier {
        let Some(signature) = header(&headers, SIGNATURE_HEADER) else {
            return reject(WebhookError::InvalidSignature);
        };
        let Some(data_id) = query
            .get("data.id")
            .map(String::as_str)
            .filter(|id| !id.trim().is_empty())
        else {
            return reject(WebhookError::MissingField("data.id"));
        };
        if let Err(e) = verifier.verify(signature, request_id.as_deref(), Some(data_id)) {
            return reject(e);
        }
        signed_data_id = Some(data_id);
    }

    let notification = match Notification::from_request(&body, &query, request_id) {
        Ok(notification) => notification,
        Err(e) => return reject(e),
    };

    if let Some(signed) = signed_data_id {
        if !notification.is_about(signed) {
            tracing::warn!(
                signed_data_id = %signed,
                data_id = %notification.data_id,
                "Notification body names a different resource than its signature"
            );
            return reject(WebhookError::InvalidSignature);
        }
    }

    tracing::info!(
        topic = %notification.topic,
        data_id = %notification.data_id,
        notification_id = ?notification.id,
        "Notification received"
    );

    match state.notifications.process(&notification).await {
        Ok(result) => (StatusCode::OK, Json(WebhookAck::from(result))).into_response(),
        Err(e) => reject(e),
    }
}
