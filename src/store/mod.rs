//! Persistent stores backing the lookup service
//!
//! Two pieces of shared, globally-scoped state: the snapshot cache and the
//! quota counter. Both are visible identically to every tenant. The Postgres
//! implementations (behind the `database` feature) are the production path;
//! the in-memory implementations back tests and embedded callers.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::registry::CompanySnapshot;

pub mod memory;
#[cfg(feature = "database")]
pub mod postgres;

pub use memory::{MemoryCacheStore, MemoryRateLimiter};
#[cfg(feature = "database")]
pub use postgres::{PgCacheStore, PgRateLimiter};

/// A cached company snapshot with its validity window.
#[derive(Debug, Clone)]
pub struct CachedCompany {
    pub company_number: String,
    pub snapshot: CompanySnapshot,
    pub cached_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CachedCompany {
    /// A cache read is fresh iff `now` is before the expiry instant. The
    /// store never judges freshness itself; the caller does.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Outcome of a quota acquisition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// Capacity was available; the counter has already been incremented.
    Allowed { remaining: i32 },
    /// The window is full; the counter was left unchanged.
    Denied { retry_after: Duration },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// Key/value store of previously fetched snapshots.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Look up an entry by company number. Returns the entry even when
    /// expired; a miss is `Ok(None)`, not an error.
    async fn get(&self, company_number: &str) -> anyhow::Result<Option<CachedCompany>>;

    /// Full upsert: replaces any prior entry for the number in a single
    /// write, stamping `cached_at = now` and `expires_at = now + ttl`.
    async fn put(
        &self,
        company_number: &str,
        snapshot: &CompanySnapshot,
        ttl: Duration,
    ) -> anyhow::Result<()>;
}

/// Global fixed-window quota counter.
///
/// There is exactly one counter for the whole system; it is not partitioned
/// by tenant and knows nothing about the cache.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Atomic check-and-increment: if the window has elapsed it is reset
    /// first, then the request is admitted iff the count is below the limit.
    /// Two concurrent callers must never both be admitted past the limit.
    async fn try_acquire(&self) -> anyhow::Result<RateLimitDecision>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{CompanyDetails, RegisteredOffice};

    fn snapshot() -> CompanySnapshot {
        CompanySnapshot {
            company: CompanyDetails {
                company_number: "12345678".to_string(),
                company_name: "Test Company Ltd".to_string(),
                status: "active".to_string(),
                company_type: "ltd".to_string(),
                registered_office: RegisteredOffice::default(),
                date_of_creation: None,
                sic_codes: None,
            },
            officers: vec![],
            pscs: vec![],
        }
    }

    #[test]
    fn freshness_is_judged_against_expiry_instant() {
        let cached_at = Utc::now();
        let entry = CachedCompany {
            company_number: "12345678".to_string(),
            snapshot: snapshot(),
            cached_at,
            expires_at: cached_at + Duration::hours(24),
        };

        assert!(entry.is_fresh(cached_at + Duration::hours(23)));
        assert!(!entry.is_fresh(cached_at + Duration::hours(24)));
        assert!(!entry.is_fresh(cached_at + Duration::hours(25)));
    }
}
