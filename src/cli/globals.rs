use crate::relay::{
    CredentialSource, EnvCredential, FileCredential, ProviderEndpoints, RelayGateway,
};
use anyhow::Result;
use std::{fmt, path::PathBuf, sync::Arc};

/// Where the provider token is read from. A file wins over the env var when both are set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    Env(String),
    File(PathBuf),
}

impl TokenSource {
    #[must_use]
    pub fn credential(&self) -> Arc<dyn CredentialSource> {
        match self {
            Self::Env(var) => Arc::new(EnvCredential::new(var.clone())),
            Self::File(path) => Arc::new(FileCredential::new(path.clone())),
        }
    }
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Env(var) => write!(f, "env:{var}"),
            Self::File(path) => write!(f, "file:{}", path.display()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub provider_url: String,
    pub token_source: TokenSource,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(provider_url: String, token_source: TokenSource) -> Self {
        Self {
            provider_url,
            token_source,
        }
    }

    /// Build the shared gateway; the credential is resolved per request, not here.
    /// # Errors
    /// Returns an error if the provider URL is invalid or the HTTP client cannot be built.
    pub fn gateway(&self) -> Result<Arc<RelayGateway>> {
        let endpoints = ProviderEndpoints::from_base(&self.provider_url)?;
        Ok(Arc::new(RelayGateway::new(
            endpoints,
            self.token_source.credential(),
        )?))
    }
}
