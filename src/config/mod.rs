//! Runtime configuration.
//!
//! Everything comes from `COURSEHUB__*` environment variables (a `.env` file
//! is read first when present). Sections nest with `__`, so
//! `COURSEHUB__STORE__REFUND_WINDOW_DAYS=14` sets `store.refund_window_days`.
//! Only `payment.access_token` is mandatory.
//!
//! ```no_run
//! use coursehub::config::AppConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! config.validate()?;
//! # Ok(())
//! # }
//! ```

mod database;
mod error;
mod payment;
mod server;
mod store;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use payment::PaymentConfig;
pub use server::{Environment, ServerConfig};
pub use store::StoreConfig;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// Absent means in-memory storage.
    #[serde(default)]
    pub database: Option<DatabaseConfig>,

    pub payment: PaymentConfig,

    #[serde(default)]
    pub store: StoreConfig,
}

impl AppConfig {
    /// Read `.env` and the `COURSEHUB__` environment.
    ///
    /// Fails when `payment.access_token` is missing or a value does not
    /// parse. Call [`AppConfig::validate`] afterwards for range checks.
    pub fn load() -> Result<Self, ConfigError> {
        if let Err(e) = load_dotenv() {
            tracing::warn!(error = %e, "Ignoring unreadable .env file");
        }
        Self::from_env()
    }

    /// Like [`AppConfig::load`] without touching `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let source = config::Environment::with_prefix("COURSEHUB")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true);

        Ok(config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()?)
    }

    /// Checks each section in turn, stopping at the first problem.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database
            .as_ref()
            .map_or(Ok(()), DatabaseConfig::validate)?;
        self.payment.validate(&self.server.environment)?;
        self.store.validate()
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

/// Loads `.env` into the process environment.
///
/// A missing file is normal outside development and is not an error. A file
/// that exists but cannot be read or parsed is.
pub fn load_dotenv() -> Result<(), dotenvy::Error> {
    dotenv_outcome(dotenvy::dotenv().map(|_| ()))
}

fn dotenv_outcome(result: Result<(), dotenvy::Error>) -> Result<(), dotenvy::Error> {
    match result {
        Err(e) if e.not_found() => Ok(()),
        other => other,
    }
}
