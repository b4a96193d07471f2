//! Store rules: currency, refund window and maintenance schedule

use serde::Deserialize;
use std::time::Duration;

use crate::application::handlers::MaintenanceSettings;
use crate::domain::refund::RefundPolicy;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// ISO 4217 code all prices are in
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Days after approval during which customers may request a refund
    #[serde(default = "default_refund_window_days")]
    pub refund_window_days: u32,

    /// Pending checkouts older than this are cancelled
    #[serde(default = "default_pending_payment_timeout_hours")]
    pub pending_payment_timeout_hours: u32,

    /// How long notification delivery records are kept
    #[serde(default = "default_webhook_retention_days")]
    pub webhook_retention_days: u32,

    #[serde(default = "default_maintenance_interval_secs")]
    pub maintenance_interval_secs: u64,
}

impl StoreConfig {
    pub fn refund_policy(&self) -> RefundPolicy {
        RefundPolicy::new(self.refund_window_days)
    }

    pub fn maintenance_settings(&self) -> MaintenanceSettings {
        MaintenanceSettings {
            pending_payment_timeout_hours: self.pending_payment_timeout_hours,
            webhook_retention_days: self.webhook_retention_days,
        }
    }

    pub fn maintenance_interval(&self) -> Duration {
        Duration::from_secs(self.maintenance_interval_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::InvalidCurrency(self.currency.clone()));
        }
        if self.pending_payment_timeout_hours == 0 {
            return Err(ValidationError::MustBePositive("pending_payment_timeout_hours"));
        }
        if self.webhook_retention_days == 0 {
            return Err(ValidationError::MustBePositive("webhook_retention_days"));
        }
        if self.maintenance_interval_secs == 0 {
            return Err(ValidationError::MustBePositive("maintenance_interval_secs"));
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            refund_window_days: default_refund_window_days(),
            pending_payment_timeout_hours: default_pending_payment_timeout_hours(),
            webhook_retention_days: default_webhook_retention_days(),
            maintenance_interval_secs: default_maintenance_interval_secs(),
        }
    }
}

fn default_currency() -> String {
    "BRL".to_string()
}

fn default_refund_window_days() -> u32 {
    7
}

fn default_pending_payment_timeout_hours() -> u32 {
    72
}

fn default_webhook_retention_days() -> u32 {
    30
}

fn default_maintenance_interval_secs() -> u64 {
    300
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = StoreConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.refund_policy(), RefundPolicy::new(7));
        assert_eq!(config.maintenance_settings(), MaintenanceSettings::default());
    }

    #[test]
    fn rejects_bad_currency() {
        let config = StoreConfig {
            currency: "REAL".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidCurrency("REAL".to_string()))
        );
    }

    #[test]
    fn rejects_zero_interval() {
        let config = StoreConfig {
            maintenance_interval_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
