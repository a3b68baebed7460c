//! Service configuration.

use crate::clients::item_client::DEFAULT_TIMEOUT;
use std::time::Duration;

pub const DEFAULT_ITEM_ADDRESS: &str = "0.0.0.0:8080";
pub const DEFAULT_ORDER_ADDRESS: &str = "0.0.0.0:9090";
pub const DEFAULT_ITEM_SERVICE: &str = "http://127.0.0.1:8080";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Listen address of the item service (env: STOCKROOM_ITEM_ADDRESS)
    pub item_address: String,
    /// Listen address of the order service (env: STOCKROOM_ORDER_ADDRESS)
    pub order_address: String,
    /// Base URL the order service uses to reach the item service (env: STOCKROOM_ITEM_SERVICE)
    pub item_service: String,
    /// Timeout for one catalog fetch (env: STOCKROOM_REQUEST_TIMEOUT_MS)
    pub request_timeout: Duration,
    /// Default log filter when RUST_LOG is unset (env: STOCKROOM_LOG_LEVEL)
    pub log_level: String,
    /// Emit JSON log lines (env: STOCKROOM_LOG_JSON)
    pub log_json: bool,
    /// Redis holding the catalog; in-process when unset (env: STOCKROOM_ITEM_REDIS_URL)
    pub item_redis_url: Option<String>,
    /// Redis holding orders and the order counter; in-process when unset
    /// (env: STOCKROOM_ORDER_REDIS_URL)
    pub order_redis_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            item_address: DEFAULT_ITEM_ADDRESS.to_string(),
            order_address: DEFAULT_ORDER_ADDRESS.to_string(),
            item_service: DEFAULT_ITEM_SERVICE.to_string(),
            request_timeout: DEFAULT_TIMEOUT,
            log_level: "info".to_string(),
            log_json: false,
            item_redis_url: None,
            order_redis_url: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |name: &str| var(name).filter(|v| !v.is_empty());

        Self {
            item_address: non_empty("STOCKROOM_ITEM_ADDRESS").unwrap_or(defaults.item_address),
            order_address: non_empty("STOCKROOM_ORDER_ADDRESS").unwrap_or(defaults.order_address),
            item_service: non_empty("STOCKROOM_ITEM_SERVICE").unwrap_or(defaults.item_service),
            request_timeout: non_empty("STOCKROOM_REQUEST_TIMEOUT_MS")
                .and_then(|ms| ms.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.request_timeout),
            log_level: non_empty("STOCKROOM_LOG_LEVEL").unwrap_or(defaults.log_level),
            log_json: non_empty("STOCKROOM_LOG_JSON")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.log_json),
            item_redis_url: non_empty("STOCKROOM_ITEM_REDIS_URL"),
            order_redis_url: non_empty("STOCKROOM_ORDER_REDIS_URL"),
        }
    }
}
