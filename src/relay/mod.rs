//! Relay gateway: validate, attach the credential, POST once, classify.
//!
//! Every path out of the gateway is an [`Outcome`]; nothing is thrown past it.
//! Local checks run in a fixed order and short-circuit before any I/O:
//!
//! 1. query validation -> `VALIDATION_ERROR`
//! 2. credential lookup -> `CONFIG_ERROR`
//!
//! The provider call itself is never retried and has no local deadline; the query
//! timeout only travels in the request body.

pub mod classify;
pub mod credential;
pub mod outcome;
pub mod query;
mod wire;

pub use self::credential::{CredentialSource, EnvCredential, FileCredential, StaticCredential};
pub use self::outcome::{
    EmailCandidate, ErrorOutcome, Failure, FinderResult, Outcome, Payload, QueueInfo, Relayed,
    SubStatus, ValidationReason, VerifyResult,
};
pub use self::query::{FinderQuery, QueryError, VerifyQuery};

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, header::AUTHORIZATION};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::{error::Error as _, sync::Arc};
use tracing::{Instrument, debug, error, info_span, instrument};
use url::Url;

pub const DEFAULT_PROVIDER_URL: &str = "https://api.clearout.io";
const FINDER_PATH: &str = "/v2/email_finder/instant";
const VERIFY_PATH: &str = "/v2/email_verify/instant";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Finder,
    Verify,
}

impl QueryKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Finder => "finder",
            Self::Verify => "verify",
        }
    }
}

/// Provider endpoints derived from a base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoints {
    finder: Url,
    verify: Url,
}

impl ProviderEndpoints {
    /// # Errors
    /// Returns an error if `base` is not an absolute http(s) URL.
    pub fn from_base(base: &str) -> Result<Self> {
        let base = Url::parse(base).with_context(|| format!("invalid provider URL: {base}"))?;
        match base.scheme() {
            "http" | "https" => {}
            scheme => return Err(anyhow!("unsupported provider URL scheme: {scheme}")),
        }
        if base.host().is_none() {
            return Err(anyhow!("provider URL has no host: {base}"));
        }

        let prefix = base.path().trim_end_matches('/').to_string();
        let join = |path: &str| -> Url {
            let mut url = base.clone();
            url.set_path(&format!("{prefix}{path}"));
            url
        };

        Ok(Self {
            finder: join(FINDER_PATH),
            verify: join(VERIFY_PATH),
        })
    }

    #[must_use]
    pub fn finder(&self) -> &Url {
        &self.finder
    }

    #[must_use]
    pub fn verify(&self) -> &Url {
        &self.verify
    }

    fn for_kind(&self, kind: QueryKind) -> &Url {
        match kind {
            QueryKind::Finder => &self.finder,
            QueryKind::Verify => &self.verify,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RelayGateway {
    client: Client,
    endpoints: ProviderEndpoints,
    credential: Arc<dyn CredentialSource>,
}

impl RelayGateway {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(endpoints: ProviderEndpoints, credential: Arc<dyn CredentialSource>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .build()
            .context("Failed to build provider HTTP client")?;

        Ok(Self {
            client,
            endpoints,
            credential,
        })
    }

    #[must_use]
    pub fn endpoints(&self) -> &ProviderEndpoints {
        &self.endpoints
    }

    /// Whether the credential source currently yields a token.
    pub async fn has_credential(&self) -> bool {
        self.credential().await.is_some()
    }

    // Sources may touch the filesystem, so the lookup runs on the blocking pool.
    async fn credential(&self) -> Option<SecretString> {
        let source = Arc::clone(&self.credential);
        match tokio::task::spawn_blocking(move || source.current()).await {
            Ok(token) => token,
            Err(err) => {
                error!("Credential lookup task failed: {err}");
                None
            }
        }
    }

    pub async fn submit_finder_query(&self, query: &FinderQuery) -> Outcome {
        self.relay_finder(query).await.outcome
    }

    pub async fn submit_verify_query(&self, query: &VerifyQuery) -> Outcome {
        self.relay_verify(query).await.outcome
    }

    #[instrument(skip(self), fields(timeout_ms = query.timeout_ms()))]
    pub async fn relay_finder(&self, query: &FinderQuery) -> Relayed {
        if let Err(err) = query.validate() {
            debug!("Rejected finder query: {err}");
            return Relayed::validation(err.to_string());
        }
        let Some(token) = self.credential().await else {
            return self.missing_credential();
        };
        self.dispatch(QueryKind::Finder, &token, &query.request_body())
            .await
    }

    #[instrument(skip(self), fields(timeout_ms = query.timeout_ms()))]
    pub async fn relay_verify(&self, query: &VerifyQuery) -> Relayed {
        if let Err(err) = query.validate() {
            debug!("Rejected verify query: {err}");
            return Relayed::validation(err.to_string());
        }
        let Some(token) = self.credential().await else {
            return self.missing_credential();
        };
        self.dispatch(QueryKind::Verify, &token, &query.request_body())
            .await
    }

    fn missing_credential(&self) -> Relayed {
        error!(source = %self.credential.describe(), "Provider API token is not configured");
        Relayed::config(format!(
            "API token not configured. Please provide it via {}.",
            self.credential.describe()
        ))
    }

    async fn dispatch<B: Serialize + Sync>(
        &self,
        kind: QueryKind,
        token: &SecretString,
        body: &B,
    ) -> Relayed {
        let url = self.endpoints.for_kind(kind);
        let span = info_span!(
            "provider.request",
            http.method = "POST",
            url = %url,
            kind = kind.as_str()
        );

        let response = match self
            .client
            .post(url.clone())
            .header(AUTHORIZATION, token.expose_secret())
            .json(body)
            .send()
            .instrument(span)
            .await
        {
            Ok(response) => response,
            Err(err) => {
                let message = error_chain(&err);
                error!("Provider request failed: {message}");
                return Relayed::network(message);
            }
        };

        let status = response.status();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => {
                let message = error_chain(&err);
                error!(%status, "Failed to read provider response: {message}");
                return Relayed::network(message);
            }
        };

        debug!(%status, bytes = bytes.len(), "Provider responded");
        classify::classify(kind, status, &bytes)
    }
}

// reqwest hides the interesting part (DNS, refused, reset) in the source chain.
fn error_chain(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}
