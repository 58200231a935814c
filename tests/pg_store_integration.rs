//! Integration tests for the Postgres-backed stores
//!
//! These tests verify that:
//! 1. Cache upserts fully replace prior entries
//! 2. The quota counter is a single transactional check-and-increment
//! 3. Window elapse resets the counter before evaluation
//!
//! Requires: DATABASE_URL environment variable and the `database` feature.
//! Run with: cargo test --features database -- --ignored

#![cfg(feature = "database")]

use std::sync::Arc;

use chrono::{Duration, Utc};
use sqlx::PgPool;
use tokio::sync::Barrier;

use ch_lookup::{
    ensure_schema, CacheStore, CompanyDetails, CompanySnapshot, PgCacheStore, PgRateLimiter,
    RateLimiter, RegisteredOffice,
};

/// Helper to get a test database pool with the schema in place.
async fn get_test_pool() -> PgPool {
    let database_url = std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("DATABASE_URL must be set for integration tests");
    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test database");
    ensure_schema(&pool).await.expect("Failed to ensure schema");
    pool
}

async fn reset_counter(pool: &PgPool) {
    sqlx::query("DELETE FROM companies_house_rate_limit")
        .execute(pool)
        .await
        .expect("Failed to reset rate-limit counter");
}

fn snapshot(number: &str, name: &str) -> CompanySnapshot {
    CompanySnapshot {
        company: CompanyDetails {
            company_number: number.to_string(),
            company_name: name.to_string(),
            status: "active".to_string(),
            company_type: "ltd".to_string(),
            registered_office: RegisteredOffice::default(),
            date_of_creation: Some("2020-01-01".to_string()),
            sic_codes: None,
        },
        officers: vec![],
        pscs: vec![],
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn cache_put_then_get_round_trips() {
    let pool = get_test_pool().await;
    let store = PgCacheStore::new(pool.clone());
    let number = "91000001";

    store
        .put(number, &snapshot(number, "Round Trip Ltd"), Duration::hours(24))
        .await
        .expect("put failed");

    let entry = store
        .get(number)
        .await
        .expect("get failed")
        .expect("entry missing");
    assert_eq!(entry.company_number, number);
    assert_eq!(entry.snapshot.company.company_name, "Round Trip Ltd");
    assert!(entry.expires_at > entry.cached_at);
    assert!(entry.is_fresh(Utc::now()));

    sqlx::query("DELETE FROM companies_house_cache WHERE company_number = $1")
        .bind(number)
        .execute(&pool)
        .await
        .ok();
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn cache_upsert_replaces_the_prior_entry() {
    let pool = get_test_pool().await;
    let store = PgCacheStore::new(pool.clone());
    let number = "91000002";

    store
        .put(number, &snapshot(number, "First Ltd"), Duration::hours(24))
        .await
        .expect("first put failed");
    store
        .put(number, &snapshot(number, "Second Ltd"), Duration::hours(24))
        .await
        .expect("second put failed");

    let entry = store
        .get(number)
        .await
        .expect("get failed")
        .expect("entry missing");
    assert_eq!(entry.snapshot.company.company_name, "Second Ltd");

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM companies_house_cache WHERE company_number = $1")
            .bind(number)
            .fetch_one(&pool)
            .await
            .expect("count failed");
    assert_eq!(count, 1, "upsert must not create duplicate rows");

    sqlx::query("DELETE FROM companies_house_cache WHERE company_number = $1")
        .bind(number)
        .execute(&pool)
        .await
        .ok();
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn missing_cache_entry_is_a_clean_miss() {
    let pool = get_test_pool().await;
    let store = PgCacheStore::new(pool);

    let entry = store.get("91999999").await.expect("get failed");
    assert!(entry.is_none());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn limiter_denies_once_the_window_is_full() {
    let pool = get_test_pool().await;
    reset_counter(&pool).await;

    let limiter = PgRateLimiter::new(pool.clone(), 2, Duration::minutes(5));

    assert!(limiter.try_acquire().await.expect("acquire 1").is_allowed());
    assert!(limiter.try_acquire().await.expect("acquire 2").is_allowed());
    assert!(!limiter.try_acquire().await.expect("acquire 3").is_allowed());

    // Denials leave the counter unchanged.
    let count: i32 = sqlx::query_scalar(
        "SELECT requests_count FROM companies_house_rate_limit WHERE id = 'global'",
    )
    .fetch_one(&pool)
    .await
    .expect("read counter");
    assert_eq!(count, 2);

    reset_counter(&pool).await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn limiter_resets_after_the_window_elapses() {
    let pool = get_test_pool().await;
    reset_counter(&pool).await;

    let limiter = PgRateLimiter::new(pool.clone(), 1, Duration::milliseconds(100));

    assert!(limiter.try_acquire().await.expect("acquire").is_allowed());
    assert!(!limiter.try_acquire().await.expect("denied").is_allowed());

    tokio::time::sleep(std::time::Duration::from_millis(150)).await;

    assert!(
        limiter.try_acquire().await.expect("fresh window").is_allowed(),
        "an elapsed window must reset before evaluation"
    );

    reset_counter(&pool).await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn concurrent_acquisition_admits_exactly_the_limit() {
    let pool = get_test_pool().await;
    reset_counter(&pool).await;

    let limiter = Arc::new(PgRateLimiter::new(pool.clone(), 3, Duration::minutes(5)));
    let barrier = Arc::new(Barrier::new(10));

    let mut handles = Vec::new();
    for _ in 0..10 {
        let limiter = Arc::clone(&limiter);
        let barrier = Arc::clone(&barrier);
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            limiter.try_acquire().await.expect("acquire failed")
        }));
    }

    let mut allowed = 0;
    for handle in handles {
        if handle.await.expect("task panicked").is_allowed() {
            allowed += 1;
        }
    }
    assert_eq!(allowed, 3, "simultaneous callers must not overshoot the limit");

    reset_counter(&pool).await;
}
