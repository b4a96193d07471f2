//! Shared harness for HTTP integration tests.
//!
//! Wires the real router to in-memory storage, the mock gateway and a
//! capturing event bus.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use coursehub::adapters::http::{app_router, AppState, Repositories, StoreSettings};
use coursehub::adapters::mercadopago::MockPaymentGateway;
use coursehub::adapters::InMemoryEventBus;
use coursehub::domain::catalog::{Course, Journey};
use coursehub::domain::foundation::{CourseId, JourneyId, Money};
use coursehub::domain::webhook::{sign_notification, MercadoPagoSignatureVerifier};

pub const WEBHOOK_SECRET: &str = "integration-webhook-secret";
pub const BUYER: &str = "buyer-1";

pub fn brl(cents: i64) -> Money {
    Money::new(cents, "BRL").unwrap()
}

pub struct TestApp {
    pub router: Router,
    pub gateway: MockPaymentGateway,
    pub events: Arc<InMemoryEventBus>,
    pub repositories: Repositories,
    pub rust_course: Course,
    pub async_course: Course,
    pub journey: Journey,
}

impl TestApp {
    /// App with signature checks enabled and a small published catalog.
    pub async fn new() -> Self {
        Self::build(Some(MercadoPagoSignatureVerifier::new(WEBHOOK_SECRET))).await
    }

    /// App that accepts unsigned notifications.
    pub async fn without_signatures() -> Self {
        Self::build(None).await
    }

    async fn build(verifier: Option<MercadoPagoSignatureVerifier>) -> Self {
        let repositories = Repositories::in_memory();
        let gateway = MockPaymentGateway::new();
        let events = Arc::new(InMemoryEventBus::new());

        let rust_course = Course::new(CourseId::new(), "rust-101", "Rust 101", brl(9900), None)
            .unwrap()
            .publish();
        let async_course =
            Course::new(CourseId::new(), "async-rust", "Async Rust", brl(12900), Some(365))
                .unwrap()
                .publish();
        let journey = Journey::new(
            JourneyId::new(),
            "rust-path",
            "Rust Path",
            brl(19900),
            vec![rust_course.id, async_course.id],
            Some(365),
        )
        .unwrap()
        .publish();

        repositories.catalog.save_course(&rust_course).await.unwrap();
        repositories.catalog.save_course(&async_course).await.unwrap();
        repositories.catalog.save_journey(&journey).await.unwrap();

        let state = AppState::new(
            repositories.clone(),
            Arc::new(gateway.clone()),
            events.clone(),
            StoreSettings::default(),
            verifier,
        );

        Self {
            router: app_router(state),
            gateway,
            events,
            repositories,
            rust_course,
            async_course,
            journey,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Sends a request as `user` and returns status and JSON body.
    pub async fn call(
        &self,
        method: &str,
        uri: &str,
        user: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header("X-User-Id", user);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        read_json(self.send(request).await).await
    }

    /// Puts an item in the buyer's cart and checks out. Returns the payment id.
    pub async fn checkout(&self, user: &str, kind: &str, id: &str) -> String {
        let (status, _) = self
            .call(
                "POST",
                "/api/cart/items",
                Some(user),
                Some(serde_json::json!({ "kind": kind, "id": id })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = self.call("POST", "/api/checkout", Some(user), None).await;
        assert_eq!(status, StatusCode::CREATED, "checkout failed: {}", body);
        body["payment_id"].as_str().unwrap().to_string()
    }

    /// Delivers a signed payment notification for `gateway_payment_id`.
    pub async fn notify_payment(
        &self,
        notification_id: u64,
        gateway_payment_id: &str,
    ) -> (StatusCode, Value) {
        let request_id = format!("req-{}", notification_id);
        let signature = sign_notification(
            WEBHOOK_SECRET,
            chrono::Utc::now().timestamp(),
            Some(&request_id),
            Some(gateway_payment_id),
        );
        let body = serde_json::json!({
            "id": notification_id,
            "type": "payment",
            "action": "payment.updated",
            "live_mode": true,
            "data": { "id": gateway_payment_id }
        });
        let request = Request::builder()
            .method("POST")
            .uri(format!(
                "/api/webhooks/mercadopago?data.id={}&type=payment",
                gateway_payment_id
            ))
            .header("content-type", "application/json")
            .header("x-request-id", request_id)
            .header("x-signature", signature)
            .body(Body::from(body.to_string()))
            .unwrap();
        read_json(self.send(request).await).await
    }
}

pub async fn read_json(response: Response<Body>) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}
