//! Companies House API client
//!
//! HTTP client for the UK Companies House API. Authenticates with basic auth
//! (API key as username, empty password) and classifies every failure into
//! [`RegistryError`] so the lookup service can map it onto its taxonomy.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;

use super::types::{
    CompanyDetails, CompanyProfileResponse, CompanySnapshot, Officer, OfficerListResponse,
    PersonWithControl, PscListResponse,
};
use super::CompanyRegistry;
use crate::config::RegistryConfig;
use crate::error::RegistryError;

/// Companies House API client
pub struct CompaniesHouseClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl CompaniesHouseClient {
    /// Create a new client from the `COMPANIES_HOUSE_API_KEY` environment
    /// variable with production defaults.
    pub fn from_env() -> Result<Self> {
        Self::new(RegistryConfig::from_env()?)
    }

    /// Create a new client with the given configuration.
    pub fn new(config: RegistryConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            api_key: config.api_key,
            base_url: config.base_url,
        })
    }

    /// Make an authenticated GET request and decode the JSON body.
    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        company_number: &str,
    ) -> Result<T, RegistryError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .http
            .get(&url)
            .basic_auth(&self.api_key, Option::<&str>::None)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|err| RegistryError::Network {
                message: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status.as_u16() {
                404 => RegistryError::NotFound {
                    company_number: company_number.to_string(),
                },
                429 => RegistryError::RateLimited,
                500 | 502 | 503 | 504 => RegistryError::ServerError {
                    status: status.as_u16(),
                },
                other => RegistryError::UnexpectedStatus { status: other },
            });
        }

        response.json().await.map_err(|err| RegistryError::Decode {
            message: err.to_string(),
        })
    }

    /// Get the company profile by company number.
    pub async fn get_company(&self, number: &str) -> Result<CompanyDetails, RegistryError> {
        let response: CompanyProfileResponse =
            self.get(&format!("/company/{}", number), number).await?;
        Ok(response.into())
    }

    /// Get the officers (directors, secretaries) of a company.
    pub async fn get_officers(&self, number: &str) -> Result<Vec<Officer>, RegistryError> {
        let response: OfficerListResponse = self
            .get(&format!("/company/{}/officers", number), number)
            .await?;
        Ok(response.items.into_iter().map(Officer::from).collect())
    }

    /// Get the persons with significant control of a company.
    pub async fn get_pscs(&self, number: &str) -> Result<Vec<PersonWithControl>, RegistryError> {
        let response: PscListResponse = self
            .get(
                &format!("/company/{}/persons-with-significant-control", number),
                number,
            )
            .await?;
        Ok(response
            .items
            .into_iter()
            .map(PersonWithControl::from)
            .collect())
    }
}

#[async_trait]
impl CompanyRegistry for CompaniesHouseClient {
    /// Fetch profile, officers, and PSCs concurrently and combine them into
    /// one snapshot. The three sub-lookups are one logical unit: if any of
    /// them fails the whole fetch fails and nothing is returned.
    async fn fetch_snapshot(&self, company_number: &str) -> Result<CompanySnapshot, RegistryError> {
        let (company, officers, pscs) = tokio::try_join!(
            self.get_company(company_number),
            self.get_officers(company_number),
            self.get_pscs(company_number),
        )?;

        Ok(CompanySnapshot {
            company,
            officers,
            pscs,
        })
    }
}
