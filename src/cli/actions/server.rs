use crate::{
    api,
    cli::globals::{GlobalArgs, TokenSource},
    short_commit,
};
use anyhow::Result;
use tracing::{debug, info, warn};
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub provider_url: String,
    pub token_source: TokenSource,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the gateway cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let globals = GlobalArgs::new(args.provider_url.clone(), args.token_source.clone());
    let gateway = globals.gateway()?;

    let credential_present = gateway.has_credential().await;
    log_startup_args(&args, credential_present);

    if !credential_present {
        warn!(
            source = %args.token_source,
            "No provider API token available; lookups will fail with CONFIG_ERROR until one is set"
        );
    }

    debug!("Global args: {:?}", globals);

    api::new(args.port, gateway).await
}

fn log_startup_args(args: &Args, credential_present: bool) {
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        ("provider_url", redact_url(&args.provider_url)),
        ("api_token_source", args.token_source.to_string()),
        ("api_token_present", credential_present.to_string()),
    ];
    log_entries("Startup configuration", &entries);
}

// Userinfo in the provider URL is not logged.
fn redact_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("REDACTED"));
            }
            parsed.to_string()
        }
        Err(_) => "invalid-url".to_string(),
    }
}

fn log_entries(title: &str, entries: &[(&str, String)]) {
    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!("{}\n\n{title}:", banner());
    for (key, value) in entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ =
            std::fmt::Write::write_fmt(&mut message, format_args!("\n  {key}:{padding} {value}"));
    }
    info!("{message}");
}

fn banner() -> String {
    MAILPROBE_BANNER.replace(
        "{VERSION}",
        &format!(
            " - {} - {}",
            env!("CARGO_PKG_VERSION"),
            short_commit(crate::GIT_COMMIT_HASH)
        ),
    )
}

const MAILPROBE_BANNER: &str = r"
   .-------------.
   |\           /|
   | \   @?    / |   M A I L P R O B E {VERSION}
   |  '-------'  |
   '-------------'";
