//! # Mailprobe (Email Finder & Verifier Relay)
//!
//! `mailprobe` is a small HTTP service that sits between a browser form and the
//! Clearout email finder/verifier API. It keeps the provider credential on the server,
//! forwards lookups, and turns whatever comes back into one canonical [`relay::Outcome`].
//!
//! ## Pipeline
//!
//! ```text
//! form submit -> RelayGateway (validate, POST, classify) -> Outcome -> render() -> HTML / JSON
//! ```
//!
//! - **Relay Gateway** ([`relay::RelayGateway`]): validates the query, reads the credential
//!   from its injected [`relay::CredentialSource`] on every call, performs exactly one POST and
//!   classifies the response.
//! - **Result Presenter** ([`present::render`]): a pure mapping from an optional `Outcome`
//!   to a [`present::RenderTree`]; it never sees transport errors.
//!
//! ## Status Code vs. Result Status
//!
//! The provider reports business failures (`status: "failed"`) inside `200` responses and
//! uses `400/401/402/429/524` for requests it understood but refused. Both axes are inspected.
//! The local `/action` endpoint re-emits those five statuses as `200` so callers branch on
//! the body, not on the HTTP layer.

pub mod api;
pub mod cli;
pub mod present;
pub mod relay;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

/// First seven characters of the commit hash, or the whole value if shorter.
#[must_use]
pub fn short_commit(hash: &str) -> &str {
    let trimmed = hash.trim();
    trimmed.get(..7).unwrap_or(trimmed)
}
