//! Configuration for the lookup service

use std::time::Duration as StdDuration;

use anyhow::{Context, Result};
use chrono::Duration;

/// Production Companies House API endpoint.
pub const COMPANIES_HOUSE_BASE_URL: &str = "https://api.company-information.service.gov.uk";

/// Settings for the upstream registry client.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// API key, used as the basic-auth username with an empty password.
    pub api_key: String,
    /// Base URL, overridable for tests.
    pub base_url: String,
    /// Per-request timeout on the shared HTTP client.
    pub timeout: StdDuration,
}

impl RegistryConfig {
    /// Build a config with the given API key and production defaults.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: COMPANIES_HOUSE_BASE_URL.to_string(),
            timeout: StdDuration::from_secs(30),
        }
    }

    /// Read the API key from `COMPANIES_HOUSE_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("COMPANIES_HOUSE_API_KEY")
            .context("COMPANIES_HOUSE_API_KEY environment variable not set")?;
        Ok(Self::new(api_key))
    }

    /// Override the base URL (mock servers in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Cache and quota settings for the lookup service.
///
/// The quota mirrors the real Companies House limit of 600 requests per
/// 5-minute fixed window; the cache holds snapshots for 24 hours.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    /// How long a cached snapshot stays fresh.
    pub cache_ttl: Duration,
    /// Maximum upstream requests per window, shared across all tenants.
    pub rate_limit: i32,
    /// Fixed-window duration for the quota counter.
    pub rate_window: Duration,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::hours(24),
            rate_limit: 600,
            rate_window: Duration::minutes(5),
        }
    }
}
