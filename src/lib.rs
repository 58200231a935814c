//! Companies House lookup cache and rate limiter
//!
//! This crate is the company-registry integration of a multi-tenant practice
//! management application: a time-bounded cache of registry snapshots, a
//! global fixed-window rate limiter protecting the shared API quota, and the
//! lookup orchestration that ties them together with a stable error taxonomy.
//!
//! ## Lookup flow
//! Validate -> cache check -> quota check -> upstream fetch -> persist -> report.
//! A fresh cache hit returns without touching the quota or the network; when
//! the quota is exhausted, a stale cache entry is served in place of a fetch.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use ch_lookup::{
//!     Actor, CompaniesHouseClient, CompanyLookupService, LookupConfig, MemoryCacheStore,
//!     MemoryRateLimiter, NoopAuditSink, RegistryConfig,
//! };
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = LookupConfig::default();
//! let client = CompaniesHouseClient::new(RegistryConfig::new("api-key"))?;
//! let service = CompanyLookupService::new(
//!     Arc::new(client),
//!     Arc::new(MemoryCacheStore::new()),
//!     Arc::new(MemoryRateLimiter::new(config.rate_limit, config.rate_window)),
//!     Arc::new(NoopAuditSink),
//!     &config,
//! );
//!
//! let actor = Actor {
//!     tenant_id: "tenant-a".to_string(),
//!     user_id: "user-1".to_string(),
//!     user_name: "Test User".to_string(),
//! };
//! let snapshot = service.lookup("12345678", &actor).await?;
//! println!("{}", snapshot.company.company_name);
//! # Ok(())
//! # }
//! ```

// Core error handling
pub mod error;

// Configuration
pub mod config;

// Upstream registry client and snapshot types
pub mod registry;

// Cache and quota stores
pub mod store;

// Activity reporting
pub mod audit;

// Lookup orchestration
pub mod lookup;

// Database integration (when enabled)
#[cfg(feature = "database")]
pub mod db;

pub use audit::{Actor, AuditSink, LookupActivity, NoopAuditSink};
pub use config::{LookupConfig, RegistryConfig, COMPANIES_HOUSE_BASE_URL};
pub use error::{LookupError, LookupResult, RegistryError};
pub use lookup::CompanyLookupService;
pub use registry::{
    CompaniesHouseClient, CompanyDetails, CompanyRegistry, CompanySnapshot, Officer,
    PersonWithControl, RegisteredOffice,
};
pub use store::{
    CacheStore, CachedCompany, MemoryCacheStore, MemoryRateLimiter, RateLimitDecision, RateLimiter,
};

#[cfg(feature = "database")]
pub use audit::PgActivityLog;
#[cfg(feature = "database")]
pub use db::{ensure_schema, DatabaseConfig, DatabaseManager};
#[cfg(feature = "database")]
pub use store::{PgCacheStore, PgRateLimiter};
