//! Companies House wire types and the combined snapshot
//!
//! The `*Response` types mirror the upstream JSON exactly; the public types
//! are what the rest of the application consumes and what the cache stores.

use serde::{Deserialize, Serialize};

/// Registered office address as reported by the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredOffice {
    pub address_line_1: Option<String>,
    pub address_line_2: Option<String>,
    pub locality: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

/// Core company profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyDetails {
    pub company_number: String,
    pub company_name: String,
    pub status: String,
    pub company_type: String,
    pub registered_office: RegisteredOffice,
    pub date_of_creation: Option<String>,
    pub sic_codes: Option<Vec<String>>,
}

/// A company officer (director, secretary, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Officer {
    pub name: String,
    pub role: String,
    pub appointed_on: Option<String>,
    pub resigned_on: Option<String>,
}

/// A person with significant control over the company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonWithControl {
    pub name: String,
    pub notified_on: Option<String>,
    pub natures_of_control: Vec<String>,
    pub kind: String,
}

/// The combined payload fetched in one logical unit: profile, officers, and
/// persons with significant control. Cached and returned atomically, never
/// partially updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanySnapshot {
    pub company: CompanyDetails,
    pub officers: Vec<Officer>,
    pub pscs: Vec<PersonWithControl>,
}

// =============================================================================
// Wire types (internal)
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct CompanyProfileResponse {
    pub company_number: String,
    pub company_name: String,
    pub company_status: String,
    #[serde(rename = "type")]
    pub company_type: String,
    #[serde(default)]
    pub registered_office_address: RegisteredOfficeAddress,
    pub date_of_creation: Option<String>,
    pub sic_codes: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RegisteredOfficeAddress {
    pub address_line_1: Option<String>,
    pub address_line_2: Option<String>,
    pub locality: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OfficerListResponse {
    #[serde(default)]
    pub items: Vec<OfficerItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OfficerItem {
    pub name: String,
    pub officer_role: String,
    pub appointed_on: Option<String>,
    pub resigned_on: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PscListResponse {
    #[serde(default)]
    pub items: Vec<PscItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PscItem {
    pub name: String,
    pub notified_on: Option<String>,
    #[serde(default)]
    pub natures_of_control: Vec<String>,
    pub kind: String,
}

impl From<CompanyProfileResponse> for CompanyDetails {
    fn from(response: CompanyProfileResponse) -> Self {
        let address = response.registered_office_address;
        Self {
            company_number: response.company_number,
            company_name: response.company_name,
            status: response.company_status,
            company_type: response.company_type,
            registered_office: RegisteredOffice {
                address_line_1: address.address_line_1,
                address_line_2: address.address_line_2,
                locality: address.locality,
                region: address.region,
                postal_code: address.postal_code,
                country: address.country,
            },
            date_of_creation: response.date_of_creation,
            sic_codes: response.sic_codes,
        }
    }
}

impl From<OfficerItem> for Officer {
    fn from(item: OfficerItem) -> Self {
        Self {
            name: item.name,
            role: item.officer_role,
            appointed_on: item.appointed_on,
            resigned_on: item.resigned_on,
        }
    }
}

impl From<PscItem> for PersonWithControl {
    fn from(item: PscItem) -> Self {
        Self {
            name: item.name,
            notified_on: item.notified_on,
            natures_of_control: item.natures_of_control,
            kind: item.kind,
        }
    }
}
