//! Error types for Companies House lookups
//!
//! Upstream failures are classified by the registry client into
//! [`RegistryError`] and surfaced to callers as the [`LookupError`] taxonomy,
//! each variant carrying only what a user-facing message needs.

use thiserror::Error;

/// Errors returned by the registry client for a single upstream request.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The registry has no company with this number (HTTP 404).
    #[error("company {company_number} not found")]
    NotFound { company_number: String },

    /// The upstream API itself is throttling us (HTTP 429).
    #[error("Companies House API rate limit exceeded")]
    RateLimited,

    /// Upstream 5xx.
    #[error("Companies House API server error: {status}")]
    ServerError { status: u16 },

    /// Any other non-success status the API is not documented to return.
    #[error("Companies House API request failed with status {status}")]
    UnexpectedStatus { status: u16 },

    /// Transport-level failure: DNS, connect, timeout.
    #[error("network error connecting to Companies House API: {message}")]
    Network { message: String },

    /// The response body could not be decoded.
    #[error("failed to decode Companies House response: {message}")]
    Decode { message: String },
}

/// Failure taxonomy exposed by the lookup service.
#[derive(Error, Debug)]
pub enum LookupError {
    /// The identifier is not an 8-digit company number. Raised before any
    /// cache or quota interaction.
    #[error("'{number}' is not a valid 8-digit company number")]
    InvalidCompanyNumber { number: String },

    /// The registry has no such company. Not cached.
    #[error("company {number} not found")]
    NotFound { number: String },

    /// The shared quota is exhausted (locally or upstream) and no cached
    /// snapshot was available to fall back on.
    #[error("Companies House rate limit exceeded")]
    RateLimited,

    /// The upstream service reported a server fault.
    #[error("Companies House API server error: {status}")]
    UpstreamUnavailable { status: u16 },

    /// Companies House could not be reached at all.
    #[error("unable to reach Companies House: {message}")]
    Connectivity { message: String },

    /// Cache, counter, or serialization faults internal to this service.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl LookupError {
    /// Message suitable for showing to an end user.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidCompanyNumber { .. } => "Company number must be 8 digits",
            Self::NotFound { .. } => {
                "Company not found. Please check the company number and try again."
            }
            Self::RateLimited => "Too many requests. Please try again in 5 minutes.",
            Self::UpstreamUnavailable { .. } => {
                "Companies House API is currently unavailable. Please try again later."
            }
            Self::Connectivity { .. } => {
                "Unable to connect to Companies House. Please check your internet connection and try again."
            }
            Self::Internal(_) => "An unexpected error occurred while looking up company data.",
        }
    }
}

impl From<RegistryError> for LookupError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound { company_number } => Self::NotFound {
                number: company_number,
            },
            RegistryError::RateLimited => Self::RateLimited,
            RegistryError::ServerError { status } => Self::UpstreamUnavailable { status },
            RegistryError::Network { message } => Self::Connectivity { message },
            RegistryError::UnexpectedStatus { .. } | RegistryError::Decode { .. } => {
                Self::Internal(anyhow::Error::new(err))
            }
        }
    }
}

/// Result alias for lookup operations.
pub type LookupResult<T> = Result<T, LookupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_errors_map_to_taxonomy_kinds() {
        let not_found = LookupError::from(RegistryError::NotFound {
            company_number: "12345678".to_string(),
        });
        assert!(matches!(not_found, LookupError::NotFound { ref number } if number == "12345678"));

        assert!(matches!(
            LookupError::from(RegistryError::RateLimited),
            LookupError::RateLimited
        ));

        assert!(matches!(
            LookupError::from(RegistryError::ServerError { status: 503 }),
            LookupError::UpstreamUnavailable { status: 503 }
        ));

        let network = LookupError::from(RegistryError::Network {
            message: "connection refused".to_string(),
        });
        assert!(matches!(network, LookupError::Connectivity { .. }));

        assert!(matches!(
            LookupError::from(RegistryError::UnexpectedStatus { status: 418 }),
            LookupError::Internal(_)
        ));
    }

    #[test]
    fn user_messages_distinguish_upstream_fault_from_connectivity() {
        let unavailable = LookupError::UpstreamUnavailable { status: 502 };
        let connectivity = LookupError::Connectivity {
            message: "dns failure".to_string(),
        };
        assert!(unavailable.user_message().contains("Companies House API"));
        assert!(connectivity.user_message().contains("Unable to connect"));
        assert_ne!(unavailable.user_message(), connectivity.user_message());
    }
}
