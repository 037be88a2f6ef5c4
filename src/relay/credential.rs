//! Provider credential sources.
//!
//! The gateway asks its source for the token on every call and never keeps a copy,
//! so rotating the env var or the file takes effect on the next lookup.

use secrecy::{ExposeSecret, SecretString};
use std::{fmt, fs, path::PathBuf};
use tracing::warn;

pub const DEFAULT_TOKEN_ENV: &str = "CLEAROUT_API_TOKEN";

pub trait CredentialSource: Send + Sync + fmt::Debug {
    /// Current provider token, `None` if not configured. Blank values count as missing.
    fn current(&self) -> Option<SecretString>;

    /// Human readable origin for logs; never contains the secret.
    fn describe(&self) -> String;
}

/// Fixed token, mostly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct StaticCredential {
    token: Option<SecretString>,
}

impl StaticCredential {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(SecretString::from(token.into())),
        }
    }

    #[must_use]
    pub fn missing() -> Self {
        Self { token: None }
    }
}

impl CredentialSource for StaticCredential {
    fn current(&self) -> Option<SecretString> {
        self.token.as_ref().and_then(non_blank)
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}

/// Reads the named environment variable on each call.
#[derive(Debug, Clone)]
pub struct EnvCredential {
    var: String,
}

impl EnvCredential {
    #[must_use]
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvCredential {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_ENV)
    }
}

impl CredentialSource for EnvCredential {
    fn current(&self) -> Option<SecretString> {
        let value = std::env::var(&self.var).ok()?;
        non_blank(&SecretString::from(value))
    }

    fn describe(&self) -> String {
        format!("env:{}", self.var)
    }
}

/// Reads the token from a file on each call (e.g. a mounted secret).
#[derive(Debug, Clone)]
pub struct FileCredential {
    path: PathBuf,
}

impl FileCredential {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialSource for FileCredential {
    fn current(&self) -> Option<SecretString> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => non_blank(&SecretString::from(contents)),
            Err(err) => {
                warn!(path = %self.path.display(), "Failed to read API token file: {err}");
                None
            }
        }
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

fn non_blank(secret: &SecretString) -> Option<SecretString> {
    let trimmed = secret.expose_secret().trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(SecretString::from(trimmed.to_string()))
    }
}
