//! Runtime configuration.
//!
//! Settings are loaded from environment variables with fallback to defaults:
//!
//! | Variable                       | Default       | Meaning                      |
//! |--------------------------------|---------------|------------------------------|
//! | `SHOEHUB_DATABASE_PATH`        | `shoehub.db`  | SQLite file                  |
//! | `SHOEHUB_DB_MAX_CONNECTIONS`   | `5`           | pool size                    |
//! | `SHOEHUB_ORDER_RETRY_ATTEMPTS` | `8`           | order creation attempts      |
//! | `SHOEHUB_DISCOUNT_POLICY`      | `reject`      | reject, clamp, allow_negative|
//! | `SHOEHUB_STATUS_POLICY`        | `independent` | independent, strict          |

use shoehub_core::{DiscountPolicy, StatusPolicy};
use std::env;
use std::path::PathBuf;

use crate::pool::DbConfig;
use crate::retry::RetryConfig;

/// Rules applied by the order repository.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrderPolicy {
    pub discount: DiscountPolicy,
    pub status: StatusPolicy,
    pub retry: RetryConfig,
}

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_path: PathBuf,
    pub max_connections: u32,
    pub order_policy: OrderPolicy,
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Settings::from_lookup(|key| env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let max_connections: u32 = var("SHOEHUB_DB_MAX_CONNECTIONS", "5")
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue("SHOEHUB_DB_MAX_CONNECTIONS".to_string()))?;
        if max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "SHOEHUB_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        let retry_attempts: u32 = var("SHOEHUB_ORDER_RETRY_ATTEMPTS", "8")
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue("SHOEHUB_ORDER_RETRY_ATTEMPTS".to_string()))?;

        let discount: DiscountPolicy = var("SHOEHUB_DISCOUNT_POLICY", "reject")
            .parse()
            .map_err(|_| ConfigError::InvalidValue("SHOEHUB_DISCOUNT_POLICY".to_string()))?;

        let status: StatusPolicy = var("SHOEHUB_STATUS_POLICY", "independent")
            .parse()
            .map_err(|_| ConfigError::InvalidValue("SHOEHUB_STATUS_POLICY".to_string()))?;

        Ok(Settings {
            database_path: PathBuf::from(var("SHOEHUB_DATABASE_PATH", "shoehub.db")),
            max_connections,
            order_policy: OrderPolicy {
                discount,
                status,
                retry: RetryConfig::with_attempts(retry_attempts),
            },
        })
    }

    /// Pool configuration for these settings.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path.clone())
            .max_connections(self.max_connections)
            .order_policy(self.order_policy)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
