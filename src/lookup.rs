//! Company lookup orchestration
//!
//! The core state machine: validate the number, try the cache, spend quota,
//! fetch from the registry, persist, and report. Step order is a contract.
//! Invalid input must never touch the cache or the counter, and a fresh
//! cache hit must never touch the counter or the network. Quota is consumed
//! at acquisition time even if the upstream call then fails.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};

use crate::audit::{Actor, AuditSink, LookupActivity};
use crate::config::LookupConfig;
use crate::error::{LookupError, LookupResult};
use crate::registry::{CompanyRegistry, CompanySnapshot};
use crate::store::{CacheStore, RateLimitDecision, RateLimiter};

/// Orchestrates registry lookups across the cache, the quota counter, the
/// upstream client, and the audit sink.
pub struct CompanyLookupService {
    registry: Arc<dyn CompanyRegistry>,
    cache: Arc<dyn CacheStore>,
    limiter: Arc<dyn RateLimiter>,
    audit: Arc<dyn AuditSink>,
    cache_ttl: Duration,
}

impl CompanyLookupService {
    pub fn new(
        registry: Arc<dyn CompanyRegistry>,
        cache: Arc<dyn CacheStore>,
        limiter: Arc<dyn RateLimiter>,
        audit: Arc<dyn AuditSink>,
        config: &LookupConfig,
    ) -> Self {
        Self {
            registry,
            cache,
            limiter,
            audit,
            cache_ttl: config.cache_ttl,
        }
    }

    /// Look up the combined snapshot for a company number.
    ///
    /// Returns cached data when fresh, falls back to stale data when the
    /// shared quota is exhausted, and otherwise performs one upstream fetch.
    pub async fn lookup(&self, raw_number: &str, actor: &Actor) -> LookupResult<CompanySnapshot> {
        let number = raw_number.trim();
        if !is_valid_company_number(number) {
            return Err(LookupError::InvalidCompanyNumber {
                number: number.to_string(),
            });
        }

        let cached = self.cache.get(number).await?;
        if let Some(entry) = &cached {
            if entry.is_fresh(Utc::now()) {
                debug!(company_number = number, "serving fresh cached snapshot");
                return Ok(entry.snapshot.clone());
            }
        }

        match self.limiter.try_acquire().await? {
            RateLimitDecision::Denied { retry_after } => {
                // Stale data beats no data under quota exhaustion.
                if let Some(entry) = cached {
                    warn!(
                        company_number = number,
                        "quota exhausted, serving stale cached snapshot"
                    );
                    return Ok(entry.snapshot);
                }
                warn!(
                    company_number = number,
                    retry_after_secs = retry_after.num_seconds(),
                    "quota exhausted and no cached snapshot available"
                );
                return Err(LookupError::RateLimited);
            }
            RateLimitDecision::Allowed { remaining } => {
                debug!(company_number = number, remaining, "quota acquired");
            }
        }

        // Quota is spent from here on, even if the fetch fails.
        let snapshot = self.registry.fetch_snapshot(number).await?;

        self.cache.put(number, &snapshot, self.cache_ttl).await?;

        let activity = LookupActivity {
            company_number: number.to_string(),
            company_name: snapshot.company.company_name.clone(),
            actor: actor.clone(),
        };
        if let Err(err) = self.audit.record_lookup(&activity).await {
            warn!(
                company_number = number,
                error = %err,
                "failed to record lookup activity"
            );
        }

        info!(
            company_number = number,
            company_name = %snapshot.company.company_name,
            "fetched company data from Companies House"
        );
        Ok(snapshot)
    }
}

/// A valid company number for this integration is exactly 8 ASCII digits.
fn is_valid_company_number(number: &str) -> bool {
    number.len() == 8 && number.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eight_digit_numbers_are_valid() {
        assert!(is_valid_company_number("12345678"));
        assert!(is_valid_company_number("00000006"));
    }

    #[test]
    fn other_shapes_are_rejected() {
        assert!(!is_valid_company_number("123"));
        assert!(!is_valid_company_number("123456789"));
        assert!(!is_valid_company_number("ABCD1234"));
        assert!(!is_valid_company_number("1234567a"));
        assert!(!is_valid_company_number("SC123456"));
        assert!(!is_valid_company_number(""));
        assert!(!is_valid_company_number("1234 678"));
    }
}
