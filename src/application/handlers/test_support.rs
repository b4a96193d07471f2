//! Shared fixtures for handler tests.

use std::sync::Arc;

use crate::adapters::events::InMemoryEventBus;
use crate::adapters::memory::{
    InMemoryCartRepository, InMemoryCatalogRepository, InMemoryEnrollmentRepository,
    InMemoryPaymentRepository, InMemoryRefundRepository, InMemoryWebhookEventRepository,
};
use crate::adapters::mercadopago::MockPaymentGateway;
use crate::domain::catalog::{CatalogItem, Course, Journey, PricedItem};
use crate::domain::foundation::{CourseId, JourneyId, Money, PaymentId, UserId};
use crate::domain::payment::{Payment, PaymentStatus};
use crate::ports::{CatalogRepository, PaymentRepository};

use super::enrollment::AccessResolver;
use super::fulfillment::Fulfillment;

/// In-memory store seeded with a small catalog.
pub struct TestStore {
    pub catalog: Arc<InMemoryCatalogRepository>,
    pub carts: Arc<InMemoryCartRepository>,
    pub payments: Arc<InMemoryPaymentRepository>,
    pub enrollments: Arc<InMemoryEnrollmentRepository>,
    pub refunds: Arc<InMemoryRefundRepository>,
    pub webhook_events: Arc<InMemoryWebhookEventRepository>,
    pub gateway: Arc<MockPaymentGateway>,
    pub events: Arc<InMemoryEventBus>,
    /// 49.90 BRL, unlimited access.
    pub rust_course: Course,
    /// 39.90 BRL, 365 days.
    pub go_course: Course,
    /// Not published.
    pub draft_course: Course,
    /// Rust + Go, 69.90 BRL, 180 days.
    pub journey: Journey,
}

pub fn brl(cents: i64) -> Money {
    Money::new(cents, "BRL").unwrap()
}

impl TestStore {
    pub async fn seeded() -> Self {
        let rust_course = Course::new(CourseId::new(), "rust", "Rust", brl(4990), None)
            .unwrap()
            .publish();
        let go_course = Course::new(CourseId::new(), "go", "Go", brl(3990), Some(365))
            .unwrap()
            .publish();
        let draft_course = Course::new(CourseId::new(), "zig", "Zig", brl(2990), None).unwrap();
        let journey = Journey::new(
            JourneyId::new(),
            "backend",
            "Backend Journey",
            brl(6990),
            vec![rust_course.id, go_course.id],
            Some(180),
        )
        .unwrap()
        .publish();

        let catalog = Arc::new(InMemoryCatalogRepository::new());
        for course in [&rust_course, &go_course, &draft_course] {
            catalog.save_course(course).await.unwrap();
        }
        catalog.save_journey(&journey).await.unwrap();

        Self {
            catalog,
            carts: Arc::new(InMemoryCartRepository::new()),
            payments: Arc::new(InMemoryPaymentRepository::new()),
            enrollments: Arc::new(InMemoryEnrollmentRepository::new()),
            refunds: Arc::new(InMemoryRefundRepository::new()),
            webhook_events: Arc::new(InMemoryWebhookEventRepository::new()),
            gateway: Arc::new(MockPaymentGateway::new()),
            events: Arc::new(InMemoryEventBus::new()),
            rust_course,
            go_course,
            draft_course,
            journey,
        }
    }

    pub fn buyer(&self) -> UserId {
        UserId::new("buyer-1").unwrap()
    }

    pub fn access(&self) -> AccessResolver {
        AccessResolver::new(self.catalog.clone(), self.enrollments.clone())
    }

    pub fn fulfillment(&self) -> Fulfillment {
        Fulfillment::new(
            self.enrollments.clone(),
            self.refunds.clone(),
            self.carts.clone(),
            self.events.clone(),
        )
    }

    pub async fn priced(&self, item: CatalogItem) -> PricedItem {
        match item {
            CatalogItem::Course(id) => {
                PricedItem::from(&self.catalog.find_course(&id).await.unwrap().unwrap())
            }
            CatalogItem::Journey(id) => {
                PricedItem::from(&self.catalog.find_journey(&id).await.unwrap().unwrap())
            }
        }
    }

    /// Saves a pending payment for the buyer.
    pub async fn pending_payment(&self, items: Vec<CatalogItem>) -> Payment {
        let mut priced = Vec::new();
        for item in items {
            priced.push(self.priced(item).await);
        }
        let payment = Payment::create(PaymentId::new(), self.buyer(), priced).unwrap();
        self.payments.save(&payment).await.unwrap();
        payment
    }

    /// Saves an approved payment backed by an approved gateway payment.
    pub async fn approved_payment(&self, items: Vec<CatalogItem>) -> Payment {
        let payment = self.pending_payment(items).await;
        let gateway_id = self.gateway.add_payment(
            payment.id.to_string(),
            crate::domain::payment::GatewayStatus::Approved,
            payment.total.clone(),
        );
        let mut approved = payment.clone();
        approved.apply_gateway_status(PaymentStatus::Approved, &gateway_id, None, None);
        self.payments.update(&approved).await.unwrap();
        self.payments.find_by_id(&payment.id).await.unwrap().unwrap()
    }
}
