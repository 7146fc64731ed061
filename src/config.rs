//! Configuration module
//!
//! Loads configuration from environment variables. Everything has a
//! default: there is no external infrastructure to point at.

use std::env;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::domain::WithdrawalPolicy;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Idle minutes before an HTTP session is dropped
    pub session_ttl_minutes: i64,

    /// Lifetime of issued access tokens
    pub token_ttl_minutes: i64,

    /// Maximum amount for a single withdrawal
    pub withdrawal_limit: Decimal,

    /// Maximum number of withdrawals per account
    pub withdrawal_count_limit: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT"))?;

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let session_ttl_minutes = env::var("SESSION_TTL_MINUTES")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("SESSION_TTL_MINUTES"))?;

        let token_ttl_minutes = env::var("TOKEN_TTL_MINUTES")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("TOKEN_TTL_MINUTES"))?;

        let withdrawal_limit = env::var("WITHDRAWAL_LIMIT")
            .map(|raw| Decimal::from_str(&raw))
            .unwrap_or_else(|_| Ok(Decimal::from(1000)))
            .map_err(|_| ConfigError::InvalidValue("WITHDRAWAL_LIMIT"))?;

        let withdrawal_count_limit = env::var("WITHDRAWAL_COUNT_LIMIT")
            .unwrap_or_else(|_| "3".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("WITHDRAWAL_COUNT_LIMIT"))?;

        Ok(Self {
            host,
            port,
            environment,
            session_ttl_minutes,
            token_ttl_minutes,
            withdrawal_limit,
            withdrawal_count_limit,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Withdrawal policy applied to newly opened accounts
    pub fn policy(&self) -> WithdrawalPolicy {
        WithdrawalPolicy {
            limit_per_withdrawal: self.withdrawal_limit,
            count_limit: self.withdrawal_count_limit,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            environment: "development".to_string(),
            session_ttl_minutes: 60,
            token_ttl_minutes: 60,
            withdrawal_limit: Decimal::from(1000),
            withdrawal_count_limit: 3,
        }
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
