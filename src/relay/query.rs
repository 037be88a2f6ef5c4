use serde::Serialize;
use thiserror::Error;

pub const MIN_TIMEOUT_MS: u64 = 10_000;
pub const MAX_TIMEOUT_MS: u64 = 180_000;
pub const FINDER_DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const VERIFY_DEFAULT_TIMEOUT_MS: u64 = 130_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("Name and domain are required fields")]
    MissingFinderFields,
    #[error("Email address is a required field")]
    MissingEmail,
    #[error("Timeout must be a whole number of milliseconds, got {0:?}")]
    InvalidTimeout(String),
}

/// Find the email address of `person_name` at `domain_or_company`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinderQuery {
    person_name: String,
    domain_or_company: String,
    timeout_ms: u64,
}

impl FinderQuery {
    #[must_use]
    pub fn new(person_name: impl Into<String>, domain_or_company: impl Into<String>) -> Self {
        Self {
            person_name: person_name.into(),
            domain_or_company: domain_or_company.into(),
            timeout_ms: FINDER_DEFAULT_TIMEOUT_MS,
        }
    }

    /// Set the provider-side wait time, clamped to `[MIN_TIMEOUT_MS, MAX_TIMEOUT_MS]`.
    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = clamp_timeout(timeout_ms);
        self
    }

    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// # Errors
    /// Returns `QueryError::MissingFinderFields` if either field is blank.
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.person_name.trim().is_empty() || self.domain_or_company.trim().is_empty() {
            return Err(QueryError::MissingFinderFields);
        }
        Ok(())
    }

    pub(crate) fn request_body(&self) -> FinderRequest<'_> {
        FinderRequest {
            name: self.person_name.trim(),
            domain: self.domain_or_company.trim(),
            timeout: self.timeout_ms,
            queue: true,
        }
    }
}

/// Verify the deliverability of `email_address`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyQuery {
    email_address: String,
    timeout_ms: u64,
}

impl VerifyQuery {
    #[must_use]
    pub fn new(email_address: impl Into<String>) -> Self {
        Self {
            email_address: email_address.into(),
            timeout_ms: VERIFY_DEFAULT_TIMEOUT_MS,
        }
    }

    /// Set the provider-side wait time, clamped to `[MIN_TIMEOUT_MS, MAX_TIMEOUT_MS]`.
    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = clamp_timeout(timeout_ms);
        self
    }

    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// # Errors
    /// Returns `QueryError::MissingEmail` if the address is blank.
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.email_address.trim().is_empty() {
            return Err(QueryError::MissingEmail);
        }
        Ok(())
    }

    pub(crate) fn request_body(&self) -> VerifyRequest<'_> {
        VerifyRequest {
            email: self.email_address.trim(),
            timeout: self.timeout_ms,
        }
    }
}

#[derive(Serialize, Debug)]
pub(crate) struct FinderRequest<'a> {
    name: &'a str,
    domain: &'a str,
    timeout: u64,
    queue: bool,
}

#[derive(Serialize, Debug)]
pub(crate) struct VerifyRequest<'a> {
    email: &'a str,
    timeout: u64,
}

fn clamp_timeout(timeout_ms: u64) -> u64 {
    timeout_ms.clamp(MIN_TIMEOUT_MS, MAX_TIMEOUT_MS)
}

/// Parse the optional `timeout` form field. Blank means "use the default".
///
/// # Errors
/// Returns `QueryError::InvalidTimeout` if the value is not an unsigned integer.
pub fn parse_timeout_field(raw: Option<&str>) -> Result<Option<u64>, QueryError> {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    raw.parse::<u64>()
        .map(Some)
        .map_err(|_| QueryError::InvalidTimeout(raw.to_string()))
}
