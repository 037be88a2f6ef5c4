use crate::relay::{DEFAULT_PROVIDER_URL, credential::DEFAULT_TOKEN_ENV};
use clap::{Arg, Command};

pub const ARG_PROVIDER_URL: &str = "provider-url";
pub const ARG_API_TOKEN_ENV: &str = "api-token-env";
pub const ARG_API_TOKEN_FILE: &str = "api-token-file";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_PROVIDER_URL)
                .long(ARG_PROVIDER_URL)
                .help("Email finder/verifier API base URL")
                .env("MAILPROBE_PROVIDER_URL")
                .default_value(DEFAULT_PROVIDER_URL),
        )
        .arg(
            Arg::new(ARG_API_TOKEN_ENV)
                .long(ARG_API_TOKEN_ENV)
                .help("Name of the environment variable holding the provider API token")
                .long_help(
                    "Name of the environment variable holding the provider API token. The variable is read on every request, so the token can be rotated without a restart.",
                )
                .env("MAILPROBE_API_TOKEN_ENV")
                .default_value(DEFAULT_TOKEN_ENV),
        )
        .arg(
            Arg::new(ARG_API_TOKEN_FILE)
                .long(ARG_API_TOKEN_FILE)
                .help("File containing the provider API token (re-read on every request)")
                .env("MAILPROBE_API_TOKEN_FILE"),
        )
}
