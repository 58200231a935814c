//! Upstream registry adapter
//!
//! [`CompanyRegistry`] is the seam between the lookup service and the
//! external registry API; [`CompaniesHouseClient`] is the production
//! implementation.

use async_trait::async_trait;

use crate::error::RegistryError;

pub mod client;
pub mod types;

pub use client::CompaniesHouseClient;
pub use types::{CompanyDetails, CompanySnapshot, Officer, PersonWithControl, RegisteredOffice};

/// Trait for the upstream company registry.
///
/// The combined fetch is deliberately the only operation: profile, officers,
/// and controlling persons are always fetched together and treated as a
/// single atomic snapshot.
#[async_trait]
pub trait CompanyRegistry: Send + Sync {
    /// Fetch the combined snapshot for a validated company number.
    async fn fetch_snapshot(&self, company_number: &str) -> Result<CompanySnapshot, RegistryError>;
}
