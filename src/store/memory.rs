//! In-memory store implementations
//!
//! Mutex-guarded state, suitable for tests and single-process embedding.
//! The production deployment uses the Postgres stores so that multiple host
//! processes share one view of the cache and the quota.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use super::{CacheStore, CachedCompany, RateLimitDecision, RateLimiter};
use crate::registry::CompanySnapshot;

/// In-memory snapshot cache.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<String, CachedCompany>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry with an explicit validity window, bypassing the
    /// `now + ttl` stamping of `put`. Lets callers seed expired entries.
    pub fn insert(&self, entry: CachedCompany) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(entry.company_number.clone(), entry);
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, company_number: &str) -> anyhow::Result<Option<CachedCompany>> {
        let entries = self.entries.lock().unwrap();
        Ok(entries.get(company_number).cloned())
    }

    async fn put(
        &self,
        company_number: &str,
        snapshot: &CompanySnapshot,
        ttl: Duration,
    ) -> anyhow::Result<()> {
        let cached_at = Utc::now();
        let entry = CachedCompany {
            company_number: company_number.to_string(),
            snapshot: snapshot.clone(),
            cached_at,
            expires_at: cached_at + ttl,
        };

        let mut entries = self.entries.lock().unwrap();
        entries.insert(company_number.to_string(), entry);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct WindowState {
    requests_count: i32,
    window_start: DateTime<Utc>,
}

/// In-memory fixed-window rate limiter.
///
/// The whole decision runs under one mutex guard, so concurrent callers
/// cannot both observe the last slot and overshoot the limit.
#[derive(Debug)]
pub struct MemoryRateLimiter {
    limit: i32,
    window: Duration,
    state: Mutex<Option<WindowState>>,
}

impl MemoryRateLimiter {
    pub fn new(limit: i32, window: Duration) -> Self {
        Self {
            limit,
            window,
            state: Mutex::new(None),
        }
    }
}

#[async_trait]
impl RateLimiter for MemoryRateLimiter {
    async fn try_acquire(&self) -> anyhow::Result<RateLimitDecision> {
        let now = Utc::now();
        let mut guard = self.state.lock().unwrap();

        let mut state = match *guard {
            Some(state) if now - state.window_start < self.window => state,
            // First acquisition, or the window has elapsed: start fresh.
            _ => WindowState {
                requests_count: 0,
                window_start: now,
            },
        };

        if state.requests_count >= self.limit {
            let retry_after = self.window - (now - state.window_start);
            *guard = Some(state);
            return Ok(RateLimitDecision::Denied { retry_after });
        }

        state.requests_count += 1;
        let remaining = self.limit - state.requests_count;
        *guard = Some(state);
        Ok(RateLimitDecision::Allowed { remaining })
    }
}
