//! Startup configuration errors

use thiserror::Error;

/// Configuration could not be read.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// A value was read but is not usable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingRequired(&'static str),

    #[error("'{0}' is not a valid listen address")]
    InvalidAddress(String),

    #[error("server.port must not be 0")]
    InvalidPort,

    #[error("server.request_timeout_secs is out of range")]
    InvalidTimeout,

    #[error("database.url is not a postgres:// URL")]
    InvalidDatabaseUrl,

    #[error("database.min_connections is above database.max_connections")]
    InvalidPoolSize,

    #[error("database.max_connections is above 100")]
    PoolSizeTooLarge,

    #[error("payment.access_token is neither a TEST- nor an APP_USR- token")]
    InvalidAccessToken,

    #[error("a sandbox access token cannot be used in production")]
    TestTokenInProduction,

    #[error("{0} must be an https URL in production")]
    UrlMustBeHttps(&'static str),

    #[error("'{0}' is not an ISO 4217 currency code")]
    InvalidCurrency(String),

    #[error("{0} must be greater than zero")]
    MustBePositive(&'static str),
}
