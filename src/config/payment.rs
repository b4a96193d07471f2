//! Payment gateway configuration (Mercado Pago)

use serde::Deserialize;

use crate::adapters::mercadopago::{BackUrls, MercadoPagoConfig, DEFAULT_API_BASE_URL};
use crate::domain::webhook::{MercadoPagoSignatureVerifier, DEFAULT_TOLERANCE_SECS};

use super::error::ValidationError;
use super::server::Environment;

/// Mercado Pago configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Access token (`APP_USR-...` in production, `TEST-...` in sandbox)
    pub access_token: String,

    /// Secret used to sign notifications (`x-signature`)
    pub webhook_secret: Option<String>,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Public URL of `POST /api/webhooks/mercadopago`
    pub notification_url: Option<String>,

    /// Where the buyer returns after checkout
    pub success_url: Option<String>,
    pub pending_url: Option<String>,
    pub failure_url: Option<String>,

    /// Text on the buyer's card statement
    pub statement_descriptor: Option<String>,

    /// Maximum age of a notification signature
    #[serde(default = "default_signature_tolerance")]
    pub signature_tolerance_secs: i64,

    /// Ignore notifications sent from the gateway's test environment
    #[serde(default)]
    pub require_live_mode: bool,
}

impl PaymentConfig {
    /// Check if using a sandbox token
    pub fn is_test_mode(&self) -> bool {
        self.access_token.starts_with("TEST-")
    }

    /// Client configuration for the gateway adapter.
    pub fn gateway_config(&self) -> MercadoPagoConfig {
        let mut config = MercadoPagoConfig::new(self.access_token.clone())
            .with_base_url(self.api_base_url.clone())
            .with_back_urls(BackUrls {
                success: self.success_url.clone(),
                pending: self.pending_url.clone(),
                failure: self.failure_url.clone(),
            });
        if let Some(url) = &self.notification_url {
            config = config.with_notification_url(url.clone());
        }
        if let Some(descriptor) = &self.statement_descriptor {
            config = config.with_statement_descriptor(descriptor.clone());
        }
        config
    }

    /// Notification signature verifier, when a secret is configured.
    pub fn signature_verifier(&self) -> Option<MercadoPagoSignatureVerifier> {
        self.webhook_secret
            .as_ref()
            .filter(|secret| !secret.is_empty())
            .map(|secret| {
                MercadoPagoSignatureVerifier::new(secret.clone())
                    .with_tolerance_secs(self.signature_tolerance_secs)
            })
    }

    /// Validate payment configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.access_token.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__ACCESS_TOKEN"));
        }
        if !self.access_token.starts_with("APP_USR-") && !self.is_test_mode() {
            return Err(ValidationError::InvalidAccessToken);
        }
        if self.signature_tolerance_secs <= 0 {
            return Err(ValidationError::MustBePositive("signature_tolerance_secs"));
        }

        if *environment == Environment::Production {
            if self.is_test_mode() {
                return Err(ValidationError::TestTokenInProduction);
            }
            if self.webhook_secret.as_deref().map_or(true, str::is_empty) {
                return Err(ValidationError::MissingRequired("PAYMENT__WEBHOOK_SECRET"));
            }
            if let Some(url) = &self.notification_url {
                if !url.starts_with("https://") {
                    return Err(ValidationError::UrlMustBeHttps("notification_url"));
                }
            }
        }
        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            webhook_secret: None,
            api_base_url: default_api_base_url(),
            notification_url: None,
            success_url: None,
            pending_url: None,
            failure_url: None,
            statement_descriptor: None,
            signature_tolerance_secs: default_signature_tolerance(),
            require_live_mode: false,
        }
    }
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_signature_tolerance() -> i64 {
    DEFAULT_TOLERANCE_SECS
}
