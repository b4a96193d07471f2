//! Gateway webhook module.
//!
//! Mercado Pago notification model, signature verification and the
//! idempotent processor that routes notifications to handlers.

mod errors;
mod notification;
mod processor;
mod verifier;

pub use errors::WebhookError;
pub use notification::{Notification, NotificationTopic};
pub use processor::{
    IdempotentNotificationProcessor, NotificationDispatcher, NotificationHandler, TopicDispatcher,
};
pub use verifier::{
    sign_notification, signature_manifest, MercadoPagoSignatureVerifier, SignatureHeader,
    DEFAULT_TOLERANCE_SECS,
};
