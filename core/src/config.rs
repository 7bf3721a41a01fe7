//! Client configuration.
//!
//! Values come from code or from `IDBLOCK_*` environment variables. The
//! map and block-explorer keys are opaque: they are carried for the host
//! and never attached to IDBlock API requests.

use std::time::Duration;

use url::Url;

use crate::error::ConfigError;
use crate::retry::RetryPolicy;

/// Default backend origin.
pub const DEFAULT_ORIGIN: &str = "https://idblock-test.site";

/// Path prefix every operation path is composed with.
pub const DEFAULT_API_PREFIX: &str = "/api/v1";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(7);

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub origin: String,
    pub api_prefix: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub maps_api_key: Option<String>,
    pub explorer_api_key: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
            maps_api_key: None,
            explorer_api_key: None,
        }
    }
}

impl ClientConfig {
    pub fn new(origin: &str) -> Self {
        Self {
            origin: origin.to_string(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(origin) = lookup("IDBLOCK_API_ORIGIN") {
            config.origin = origin;
        }
        if let Some(prefix) = lookup("IDBLOCK_API_PREFIX") {
            config.api_prefix = prefix;
        }
        if let Some(ms) = lookup("IDBLOCK_TIMEOUT_MS") {
            config.timeout = Duration::from_millis(parse_number("IDBLOCK_TIMEOUT_MS", &ms)?);
        }
        if let Some(retries) = lookup("IDBLOCK_MAX_RETRIES") {
            let max_retries = parse_number("IDBLOCK_MAX_RETRIES", &retries)?;
            config.retry.max_retries = u32::try_from(max_retries).map_err(|_| ConfigError::InvalidValue {
                key: "IDBLOCK_MAX_RETRIES",
                value: retries,
            })?;
        }
        config.maps_api_key = lookup("IDBLOCK_MAPS_API_KEY").filter(|k| !k.is_empty());
        config.explorer_api_key = lookup("IDBLOCK_EXPLORER_API_KEY").filter(|k| !k.is_empty());
        config.base_url()?;
        Ok(config)
    }

    /// Origin joined with the API prefix, e.g. `https://host/api/v1/`.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let prefix = self.api_prefix.trim_matches('/');
        let joined = if prefix.is_empty() {
            format!("{}/", self.origin.trim_end_matches('/'))
        } else {
            format!("{}/{prefix}/", self.origin.trim_end_matches('/'))
        };
        let url = Url::parse(&joined).map_err(|e| ConfigError::InvalidOrigin {
            origin: self.origin.clone(),
            message: e.to_string(),
        })?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::InvalidOrigin {
                origin: self.origin.clone(),
                message: "origin cannot be a base URL".to_string(),
            });
        }
        Ok(url)
    }
}

fn parse_number(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}
