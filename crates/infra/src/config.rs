//! Environment configuration.

use thiserror::Error;

use orderdesk_sales::DEFAULT_ORDER_PREFIX;

pub const ORDER_PREFIX_VAR: &str = "ORDERDESK_ORDER_PREFIX";
pub const PAGE_SIZE_VAR: &str = "ORDERDESK_PAGE_SIZE";
pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a non-empty ASCII alphanumeric prefix, got {value:?}")]
    InvalidPrefix { var: &'static str, value: String },

    #[error("{var} must be a positive integer, got {value:?}")]
    InvalidPageSize { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDeskConfig {
    /// First segment of order numbers (`CMD` in `CMD-2026-001`).
    pub order_prefix: String,
    /// Orders per list page.
    pub page_size: usize,
}

impl Default for OrderDeskConfig {
    fn default() -> Self {
        Self {
            order_prefix: DEFAULT_ORDER_PREFIX.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl OrderDeskConfig {
    /// Read from the process environment; unset variables take their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read through `lookup` instead of the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup(ORDER_PREFIX_VAR) {
            let prefix = raw.trim();
            if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(ConfigError::InvalidPrefix {
                    var: ORDER_PREFIX_VAR,
                    value: raw,
                });
            }
            config.order_prefix = prefix.to_string();
        }

        if let Some(raw) = lookup(PAGE_SIZE_VAR) {
            config.page_size = match raw.trim().parse::<usize>() {
                Ok(n) if n >= 1 => n,
                _ => {
                    return Err(ConfigError::InvalidPageSize {
                        var: PAGE_SIZE_VAR,
                        value: raw,
                    });
                }
            };
        }

        Ok(config)
    }
}
