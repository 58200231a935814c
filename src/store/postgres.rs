//! Postgres store implementations
//!
//! Production persistence: the cache is one row per company number, the
//! quota counter is the single `'global'` row. Both tables are shared by
//! every host process, so quota consumption and cache hits are consistent
//! across the whole deployment.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::{FromRow, PgPool};
use tracing::debug;

use super::{CacheStore, CachedCompany, RateLimitDecision, RateLimiter};
use crate::registry::CompanySnapshot;

/// Snapshot cache backed by the `companies_house_cache` table.
#[derive(Clone, Debug)]
pub struct PgCacheStore {
    pool: PgPool,
}

#[derive(Debug, FromRow)]
struct CacheRow {
    company_number: String,
    cached_data: serde_json::Value,
    cached_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl PgCacheStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CacheStore for PgCacheStore {
    async fn get(&self, company_number: &str) -> Result<Option<CachedCompany>> {
        let row = sqlx::query_as::<_, CacheRow>(
            r#"
            SELECT company_number, cached_data, cached_at, expires_at
            FROM companies_house_cache
            WHERE company_number = $1
            "#,
        )
        .bind(company_number)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to read company cache entry")?;

        let Some(row) = row else {
            return Ok(None);
        };

        let snapshot: CompanySnapshot = serde_json::from_value(row.cached_data)
            .context("Failed to decode cached company snapshot")?;

        Ok(Some(CachedCompany {
            company_number: row.company_number,
            snapshot,
            cached_at: row.cached_at,
            expires_at: row.expires_at,
        }))
    }

    async fn put(
        &self,
        company_number: &str,
        snapshot: &CompanySnapshot,
        ttl: Duration,
    ) -> Result<()> {
        let cached_at = Utc::now();
        let expires_at = cached_at + ttl;
        let cached_data =
            serde_json::to_value(snapshot).context("Failed to encode company snapshot")?;

        sqlx::query(
            r#"
            INSERT INTO companies_house_cache (id, company_number, cached_data, cached_at, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (company_number) DO UPDATE SET
                cached_data = EXCLUDED.cached_data,
                cached_at = EXCLUDED.cached_at,
                expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(format!("ch-{}", company_number))
        .bind(company_number)
        .bind(cached_data)
        .bind(cached_at)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .context("Failed to upsert company cache entry")?;

        debug!(company_number, "cached company snapshot");
        Ok(())
    }
}

/// Fixed-window quota counter backed by the single `'global'` row of
/// `companies_house_rate_limit`.
#[derive(Clone, Debug)]
pub struct PgRateLimiter {
    pool: PgPool,
    limit: i32,
    window: Duration,
}

#[derive(Debug, FromRow)]
struct RateLimitRow {
    requests_count: i32,
    window_start: DateTime<Utc>,
}

impl PgRateLimiter {
    pub fn new(pool: PgPool, limit: i32, window: Duration) -> Self {
        Self {
            pool,
            limit,
            window,
        }
    }
}

#[async_trait]
impl RateLimiter for PgRateLimiter {
    /// Check-and-increment inside one transaction. `SELECT ... FOR UPDATE`
    /// serializes concurrent callers on the counter row, so the limit cannot
    /// be overshot by simultaneous acquisitions across processes.
    async fn try_acquire(&self) -> Result<RateLimitDecision> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin rate-limit transaction")?;

        // Lazy row creation on first use.
        sqlx::query(
            r#"
            INSERT INTO companies_house_rate_limit (id, requests_count, window_start, updated_at)
            VALUES ('global', 0, NOW(), NOW())
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .execute(&mut *tx)
        .await
        .context("Failed to initialize rate-limit counter")?;

        let row = sqlx::query_as::<_, RateLimitRow>(
            r#"
            SELECT requests_count, window_start
            FROM companies_house_rate_limit
            WHERE id = 'global'
            FOR UPDATE
            "#,
        )
        .fetch_one(&mut *tx)
        .await
        .context("Failed to lock rate-limit counter")?;

        let now = Utc::now();
        let window_elapsed = now - row.window_start >= self.window;

        let decision = if window_elapsed {
            sqlx::query(
                r#"
                UPDATE companies_house_rate_limit
                SET requests_count = 1, window_start = $1, updated_at = $1
                WHERE id = 'global'
                "#,
            )
            .bind(now)
            .execute(&mut *tx)
            .await
            .context("Failed to reset rate-limit window")?;

            RateLimitDecision::Allowed {
                remaining: self.limit - 1,
            }
        } else if row.requests_count < self.limit {
            sqlx::query(
                r#"
                UPDATE companies_house_rate_limit
                SET requests_count = requests_count + 1, updated_at = $1
                WHERE id = 'global'
                "#,
            )
            .bind(now)
            .execute(&mut *tx)
            .await
            .context("Failed to increment rate-limit counter")?;

            RateLimitDecision::Allowed {
                remaining: self.limit - row.requests_count - 1,
            }
        } else {
            // Denied: the counter is left unchanged.
            RateLimitDecision::Denied {
                retry_after: self.window - (now - row.window_start),
            }
        };

        tx.commit()
            .await
            .context("Failed to commit rate-limit transaction")?;

        if let RateLimitDecision::Denied { retry_after } = &decision {
            debug!(retry_after_secs = retry_after.num_seconds(), "quota window is full");
        }

        Ok(decision)
    }
}
