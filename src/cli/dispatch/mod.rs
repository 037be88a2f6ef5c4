use crate::cli::{
    actions::{Action, server::Args},
    commands::{
        ARG_PORT,
        provider::{ARG_API_TOKEN_ENV, ARG_API_TOKEN_FILE, ARG_PROVIDER_URL},
    },
    globals::TokenSource,
};
use crate::relay::{DEFAULT_PROVIDER_URL, ProviderEndpoints, credential::DEFAULT_TOKEN_ENV};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);

    let provider_url = matches
        .get_one::<String>(ARG_PROVIDER_URL)
        .cloned()
        .unwrap_or_else(|| DEFAULT_PROVIDER_URL.to_string());

    // Fail at startup rather than on the first lookup.
    ProviderEndpoints::from_base(&provider_url).context("invalid MAILPROBE_PROVIDER_URL")?;

    let token_source = match matches.get_one::<String>(ARG_API_TOKEN_FILE) {
        Some(path) => TokenSource::File(PathBuf::from(path)),
        None => TokenSource::Env(
            matches
                .get_one::<String>(ARG_API_TOKEN_ENV)
                .cloned()
                .unwrap_or_else(|| DEFAULT_TOKEN_ENV.to_string()),
        ),
    };

    Ok(Action::Server(Args {
        port,
        provider_url,
        token_source,
    }))
}
