//! Shared application state for the HTTP layer.

use sqlx::PgPool;
use std::sync::Arc;

use crate::adapters::memory::{
    InMemoryCartRepository, InMemoryCatalogRepository, InMemoryEnrollmentRepository,
    InMemoryPaymentRepository, InMemoryRefundRepository, InMemoryWebhookEventRepository,
};
use crate::adapters::postgres::{
    PostgresCartRepository, PostgresCatalogRepository, PostgresEnrollmentRepository,
    PostgresPaymentRepository, PostgresRefundRepository, PostgresWebhookEventRepository,
};
use crate::application::handlers::{
    AccessResolver, AddToCartHandler, CheckAccessHandler, Fulfillment, GetCartHandler,
    GetCourseHandler, GetJourneyHandler, GetPaymentHandler, ListCoursesHandler,
    ListEnrollmentsHandler, ListJourneysHandler, ListPaymentsHandler, PaymentNotificationHandler,
    ReconcilePaymentHandler, RemoveFromCartHandler, RequestRefundHandler, StartCheckoutHandler,
};
use crate::domain::refund::RefundPolicy;
use crate::domain::webhook::{
    IdempotentNotificationProcessor, MercadoPagoSignatureVerifier, TopicDispatcher,
};
use crate::ports::{
    CartRepository, CatalogRepository, EnrollmentRepository, EventPublisher, PaymentGateway,
    PaymentRepository, RefundRepository, WebhookEventRepository,
};

/// Storage ports used by the store, whatever backs them.
#[derive(Clone)]
pub struct Repositories {
    pub catalog: Arc<dyn CatalogRepository>,
    pub carts: Arc<dyn CartRepository>,
    pub payments: Arc<dyn PaymentRepository>,
    pub enrollments: Arc<dyn EnrollmentRepository>,
    pub refunds: Arc<dyn RefundRepository>,
    pub webhook_events: Arc<dyn WebhookEventRepository>,
}

impl Repositories {
    /// Process-local storage. Nothing survives a restart.
    pub fn in_memory() -> Self {
        Self {
            catalog: Arc::new(InMemoryCatalogRepository::new()),
            carts: Arc::new(InMemoryCartRepository::new()),
            payments: Arc::new(InMemoryPaymentRepository::new()),
            enrollments: Arc::new(InMemoryEnrollmentRepository::new()),
            refunds: Arc::new(InMemoryRefundRepository::new()),
            webhook_events: Arc::new(InMemoryWebhookEventRepository::new()),
        }
    }

    /// PostgreSQL-backed storage sharing one pool.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            catalog: Arc::new(PostgresCatalogRepository::new(pool.clone())),
            carts: Arc::new(PostgresCartRepository::new(pool.clone())),
            payments: Arc::new(PostgresPaymentRepository::new(pool.clone())),
            enrollments: Arc::new(PostgresEnrollmentRepository::new(pool.clone())),
            refunds: Arc::new(PostgresRefundRepository::new(pool.clone())),
            webhook_events: Arc::new(PostgresWebhookEventRepository::new(pool)),
        }
    }
}

/// Store rules that come from configuration.
#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub currency: String,
    pub refund_policy: RefundPolicy,
    /// Ignore notifications from the gateway's test environment.
    pub require_live_mode: bool,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            currency: "BRL".to_string(),
            refund_policy: RefundPolicy::default(),
            require_live_mode: false,
        }
    }
}

/// Shared application state containing all dependencies.
///
/// Cloned for each request; handlers are created on demand from the shared
/// ports.
#[derive(Clone)]
pub struct AppState {
    pub repositories: Repositories,
    pub gateway: Arc<dyn PaymentGateway>,
    pub event_publisher: Arc<dyn EventPublisher>,
    pub settings: StoreSettings,
    pub notifications: Arc<IdempotentNotificationProcessor>,
    /// `None` disables signature checks (local development only).
    pub signature_verifier: Option<Arc<MercadoPagoSignatureVerifier>>,
}

impl AppState {
    pub fn new(
        repositories: Repositories,
        gateway: Arc<dyn PaymentGateway>,
        event_publisher: Arc<dyn EventPublisher>,
        settings: StoreSettings,
        signature_verifier: Option<MercadoPagoSignatureVerifier>,
    ) -> Self {
        let fulfillment = fulfillment(&repositories, &event_publisher);
        let reconcile = Arc::new(ReconcilePaymentHandler::new(
            repositories.payments.clone(),
            gateway.clone(),
            fulfillment,
            event_publisher.clone(),
        ));
        let dispatcher =
            TopicDispatcher::new().with_handler(Arc::new(PaymentNotificationHandler::new(reconcile)));
        let notifications = IdempotentNotificationProcessor::new(
            repositories.webhook_events.clone(),
            Arc::new(dispatcher),
        )
        .require_live_mode(settings.require_live_mode);

        Self {
            repositories,
            gateway,
            event_publisher,
            settings,
            notifications: Arc::new(notifications),
            signature_verifier: signature_verifier.map(Arc::new),
        }
    }

    fn access(&self) -> AccessResolver {
        AccessResolver::new(
            self.repositories.catalog.clone(),
            self.repositories.enrollments.clone(),
        )
    }

    pub fn list_courses_handler(&self) -> ListCoursesHandler {
        ListCoursesHandler::new(self.repositories.catalog.clone())
    }

    pub fn list_journeys_handler(&self) -> ListJourneysHandler {
        ListJourneysHandler::new(self.repositories.catalog.clone())
    }

    pub fn get_course_handler(&self) -> GetCourseHandler {
        GetCourseHandler::new(self.repositories.catalog.clone())
    }

    pub fn get_journey_handler(&self) -> GetJourneyHandler {
        GetJourneyHandler::new(self.repositories.catalog.clone())
    }

    pub fn get_cart_handler(&self) -> GetCartHandler {
        GetCartHandler::new(self.repositories.carts.clone(), self.settings.currency.clone())
    }

    pub fn add_to_cart_handler(&self) -> AddToCartHandler {
        AddToCartHandler::new(
            self.repositories.catalog.clone(),
            self.repositories.carts.clone(),
            self.access(),
        )
    }

    pub fn remove_from_cart_handler(&self) -> RemoveFromCartHandler {
        RemoveFromCartHandler::new(self.repositories.carts.clone())
    }

    pub fn start_checkout_handler(&self) -> StartCheckoutHandler {
        StartCheckoutHandler::new(
            self.repositories.catalog.clone(),
            self.repositories.carts.clone(),
            self.repositories.payments.clone(),
            self.gateway.clone(),
            self.access(),
            self.event_publisher.clone(),
        )
    }

    pub fn get_payment_handler(&self) -> GetPaymentHandler {
        GetPaymentHandler::new(
            self.repositories.payments.clone(),
            self.repositories.refunds.clone(),
        )
    }

    pub fn list_payments_handler(&self) -> ListPaymentsHandler {
        ListPaymentsHandler::new(self.repositories.payments.clone())
    }

    pub fn request_refund_handler(&self) -> RequestRefundHandler {
        RequestRefundHandler::new(
            self.repositories.payments.clone(),
            self.repositories.refunds.clone(),
            self.gateway.clone(),
            fulfillment(&self.repositories, &self.event_publisher),
            self.event_publisher.clone(),
            self.settings.refund_policy,
        )
    }

    pub fn list_enrollments_handler(&self) -> ListEnrollmentsHandler {
        ListEnrollmentsHandler::new(self.repositories.enrollments.clone())
    }

    pub fn check_access_handler(&self) -> CheckAccessHandler {
        CheckAccessHandler::new(self.repositories.catalog.clone(), self.access())
    }
}

fn fulfillment(repositories: &Repositories, event_publisher: &Arc<dyn EventPublisher>) -> Fulfillment {
    Fulfillment::new(
        repositories.enrollments.clone(),
        repositories.refunds.clone(),
        repositories.carts.clone(),
        event_publisher.clone(),
    )
}
