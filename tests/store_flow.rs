//! End-to-end purchase flow through the HTTP router.
//!
//! cart -> checkout -> gateway notification -> enrollment -> refund

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{brl, TestApp, BUYER};
use coursehub::domain::foundation::{PaymentId, UserId};
use coursehub::domain::payment::{GatewayStatus, PaymentStatus};

#[tokio::test]
async fn health_needs_no_user() {
    let app = TestApp::new().await;
    let (status, body) = app.call("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn catalog_is_public() {
    let app = TestApp::new().await;

    let (status, body) = app.call("GET", "/api/catalog/courses", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let uri = format!("/api/catalog/courses/{}", app.rust_course.id);
    let (status, body) = app.call("GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Rust 101");
    assert_eq!(body["journeys"][0]["slug"], "rust-path");
}

#[tokio::test]
async fn cart_requires_a_user() {
    let app = TestApp::new().await;

    let (status, body) = app.call("GET", "/api/cart", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn adding_the_same_item_twice_conflicts() {
    let app = TestApp::new().await;
    let item = json!({ "kind": "course", "id": app.rust_course.id.to_string() });

    let (status, body) = app
        .call("POST", "/api/cart/items", Some(BUYER), Some(item.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["total"]["amount_cents"], 9900);

    let (status, _) = app
        .call("POST", "/api/cart/items", Some(BUYER), Some(item))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn checkout_with_empty_cart_is_rejected() {
    let app = TestApp::new().await;

    let (status, _) = app.call("POST", "/api/checkout", Some(BUYER), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn approved_notification_grants_access_and_clears_cart() {
    let app = TestApp::new().await;
    let course_id = app.rust_course.id.to_string();
    let payment_id = app.checkout(BUYER, "course", &course_id).await;

    let access_uri = format!("/api/access/courses/{}", course_id);
    let (_, body) = app.call("GET", &access_uri, Some(BUYER), None).await;
    assert_eq!(body["has_access"], false);

    let gateway_id = app
        .gateway
        .add_payment(payment_id.clone(), GatewayStatus::Approved, brl(9900));
    let (status, body) = app.notify_payment(1001, &gateway_id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "processed");

    let (_, body) = app.call("GET", &access_uri, Some(BUYER), None).await;
    assert_eq!(body["has_access"], true);
    assert_eq!(body["via"]["kind"], "course");

    let (_, cart) = app.call("GET", "/api/cart", Some(BUYER), None).await;
    assert!(cart["items"].as_array().unwrap().is_empty());

    let (status, payment) = app
        .call("GET", &format!("/api/payments/{}", payment_id), Some(BUYER), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payment["status"], "approved");
    assert_eq!(payment["gateway_payment_id"], gateway_id.as_str());

    assert_eq!(app.events.events_of_type("enrollment.granted.v1").len(), 1);
}

#[tokio::test]
async fn journey_purchase_grants_every_included_course() {
    let app = TestApp::new().await;
    let payment_id = app
        .checkout(BUYER, "journey", &app.journey.id.to_string())
        .await;
    let gateway_id = app
        .gateway
        .add_payment(payment_id, GatewayStatus::Approved, brl(19900));
    app.notify_payment(2001, &gateway_id).await;

    for course in [&app.rust_course, &app.async_course] {
        let uri = format!("/api/access/courses/{}", course.id);
        let (_, body) = app.call("GET", &uri, Some(BUYER), None).await;
        assert_eq!(body["has_access"], true);
        assert_eq!(body["via"]["kind"], "journey");
        assert!(body["expires_at"].is_string());
    }

    // Owned through the journey, so it cannot be bought again.
    let (status, _) = app
        .call(
            "POST",
            "/api/cart/items",
            Some(BUYER),
            Some(json!({ "kind": "course", "id": app.async_course.id.to_string() })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn pending_then_approved_notifications_converge() {
    let app = TestApp::new().await;
    let payment_id = app
        .checkout(BUYER, "course", &app.rust_course.id.to_string())
        .await;
    let gateway_id = app
        .gateway
        .add_payment(payment_id.clone(), GatewayStatus::InProcess, brl(9900));

    let (status, _) = app.notify_payment(3001, &gateway_id).await;
    assert_eq!(status, StatusCode::OK);
    let stored = app
        .repositories
        .payments
        .find_by_id(&payment_id.parse::<PaymentId>().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, PaymentStatus::Pending);

    app.gateway.set_status(&gateway_id, GatewayStatus::Approved);
    let (status, body) = app.notify_payment(3002, &gateway_id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "processed");

    let enrollments = app
        .repositories
        .enrollments
        .find_by_user(&UserId::new(BUYER).unwrap())
        .await
        .unwrap();
    assert_eq!(enrollments.len(), 1);
}

#[tokio::test]
async fn customer_refund_revokes_access() {
    let app = TestApp::new().await;
    let course_id = app.rust_course.id.to_string();
    let payment_id = app.checkout(BUYER, "course", &course_id).await;
    let gateway_id = app
        .gateway
        .add_payment(payment_id.clone(), GatewayStatus::Approved, brl(9900));
    app.notify_payment(4001, &gateway_id).await;

    let (status, body) = app
        .call(
            "POST",
            &format!("/api/payments/{}/refunds", payment_id),
            Some(BUYER),
            Some(json!({ "reason": "changed my mind" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "refund failed: {}", body);
    assert_eq!(body["payment_status"], "refunded");
    assert_eq!(body["refund"]["status"], "completed");
    assert_eq!(app.gateway.refund_requests().len(), 1);

    let access_uri = format!("/api/access/courses/{}", course_id);
    let (_, body) = app.call("GET", &access_uri, Some(BUYER), None).await;
    assert_eq!(body["has_access"], false);

    let (_, enrollments) = app.call("GET", "/api/enrollments", Some(BUYER), None).await;
    assert_eq!(enrollments[0]["status"], "revoked");

    // The refund notification that follows changes nothing.
    let (status, _) = app.notify_payment(4002, &gateway_id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.gateway.refund_requests().len(), 1);
}

#[tokio::test]
async fn other_users_cannot_see_or_refund_a_payment() {
    let app = TestApp::new().await;
    let payment_id = app
        .checkout(BUYER, "course", &app.rust_course.id.to_string())
        .await;

    let uri = format!("/api/payments/{}", payment_id);
    let (status, _) = app.call("GET", &uri, Some("someone-else"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .call("POST", &format!("{}/refunds", uri), Some("someone-else"), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn refund_of_pending_payment_is_not_allowed() {
    let app = TestApp::new().await;
    let payment_id = app
        .checkout(BUYER, "course", &app.rust_course.id.to_string())
        .await;

    let (status, _) = app
        .call(
            "POST",
            &format!("/api/payments/{}/refunds", payment_id),
            Some(BUYER),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(app.gateway.refund_requests().is_empty());
}

#[tokio::test]
async fn payments_are_listed_for_their_owner() {
    let app = TestApp::new().await;
    app.checkout(BUYER, "course", &app.rust_course.id.to_string())
        .await;

    let (status, body) = app.call("GET", "/api/payments", Some(BUYER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["status"], "pending");

    let (_, body) = app.call("GET", "/api/payments", Some("someone-else"), None).await;
    assert!(body.as_array().unwrap().is_empty());
}
