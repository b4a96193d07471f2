//! StartCheckoutHandler - Command handler that turns the cart into a payment.
//!
//! The cart is re-priced from the catalog, a `Pending` payment is stored with
//! the line snapshots, and the gateway is asked for a checkout preference
//! whose `external_reference` is the payment id. The cart is left alone until
//! the payment is approved.

use std::sync::Arc;

use crate::domain::catalog::PricedItem;
use crate::domain::foundation::{Money, PaymentId, SerializableDomainEvent, Timestamp, UserId};
use crate::domain::payment::{Payment, PaymentEvent};
use crate::domain::StoreError;
use crate::ports::{
    CartRepository, CatalogRepository, CreatePreferenceRequest, EventPublisher, PaymentGateway,
    PaymentRepository, PreferenceItem,
};

use crate::application::handlers::cart::purchasable;
use crate::application::handlers::enrollment::AccessResolver;

#[derive(Debug, Clone)]
pub struct StartCheckoutCommand {
    pub user_id: UserId,
}

#[derive(Debug, Clone)]
pub struct StartCheckoutResult {
    pub payment_id: PaymentId,
    pub checkout_url: String,
    pub total: Money,
}

pub struct StartCheckoutHandler {
    catalog: Arc<dyn CatalogRepository>,
    carts: Arc<dyn CartRepository>,
    payments: Arc<dyn PaymentRepository>,
    gateway: Arc<dyn PaymentGateway>,
    access: AccessResolver,
    event_publisher: Arc<dyn EventPublisher>,
}

impl StartCheckoutHandler {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        carts: Arc<dyn CartRepository>,
        payments: Arc<dyn PaymentRepository>,
        gateway: Arc<dyn PaymentGateway>,
        access: AccessResolver,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            catalog,
            carts,
            payments,
            gateway,
            access,
            event_publisher,
        }
    }

    pub async fn handle(&self, cmd: StartCheckoutCommand) -> Result<StartCheckoutResult, StoreError> {
        let cart = self
            .carts
            .find_by_user(&cmd.user_id)
            .await?
            .filter(|cart| !cart.is_empty())
            .ok_or(StoreError::EmptyCart)?;

        // Prices come from the catalog now, not from when items were added.
        let now = Timestamp::now();
        let mut items: Vec<PricedItem> = Vec::with_capacity(cart.items.len());
        for line in &cart.items {
            let priced = purchasable(self.catalog.as_ref(), &line.item).await?;
            if self.access.has_access(&cmd.user_id, &line.item, now).await? {
                return Err(StoreError::AlreadyOwned(line.item));
            }
            items.push(priced);
        }

        let mut payment = Payment::create(PaymentId::new(), cmd.user_id.clone(), items)?;
        self.payments.save(&payment).await?;

        let request = CreatePreferenceRequest {
            external_reference: payment.id.to_string(),
            items: payment
                .items
                .iter()
                .map(|item| PreferenceItem {
                    id: item.item.to_string(),
                    title: item.title.clone(),
                    unit_price: item.unit_price.clone(),
                    quantity: 1,
                })
                .collect(),
            idempotency_key: format!("checkout-{}", payment.id),
        };

        let preference = match self.gateway.create_preference(request).await {
            Ok(preference) => preference,
            Err(e) => {
                tracing::error!(payment_id = %payment.id, error = %e, "Checkout preference failed");
                if payment.cancel("checkout preference could not be created").is_ok() {
                    if let Err(update_err) = self.payments.update(&payment).await {
                        tracing::warn!(
                            payment_id = %payment.id,
                            error = %update_err,
                            "Failed to cancel payment after gateway error"
                        );
                    }
                }
                return Err(StoreError::Gateway(e.message));
            }
        };

        payment.attach_preference(preference.id, preference.checkout_url.clone());
        self.payments.update(&payment).await?;

        tracing::info!(
            payment_id = %payment.id,
            user_id = %payment.user_id,
            total = %payment.total,
            "Checkout started"
        );

        let event = PaymentEvent::Created {
            payment_id: payment.id,
            user_id: payment.user_id.clone(),
            total: payment.total.clone(),
            occurred_at: Timestamp::now(),
        };
        self.event_publisher.publish(event.to_envelope()).await?;

        Ok(StartCheckoutResult {
            payment_id: payment.id,
            checkout_url: preference.checkout_url,
            total: payment.total,
        })
    }
}
