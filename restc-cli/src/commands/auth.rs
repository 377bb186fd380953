//! Authentication commands.

use clap::Subcommand;
use console::style;

use restc_core::config::AppConfig;
use restc_core::error::{RcError, RcResult};

use crate::OutputFormat;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Fetch a new token from the configured provider.
    Refresh,
}

/// Run an auth subcommand.
pub async fn run(config: &AppConfig, action: AuthAction, format: OutputFormat) -> RcResult<()> {
    match action {
        AuthAction::Refresh => refresh(config, format).await,
    }
}

async fn refresh(config: &AppConfig, format: OutputFormat) -> RcResult<()> {
    let client = super::create_client(config)?;
    let auth = client
        .auth()
        .ok_or_else(|| RcError::MissingConfig("auth.kind (no auth provider configured)".into()))?;

    let outcome = auth.refresh_token().await;
    let has_token = matches!(auth.token().await, Ok(Some(ref t)) if !t.is_empty());

    match format {
        OutputFormat::Json => {
            let out = serde_json::json!({
                "refreshed": outcome.is_ok(),
                "has_token": has_token,
                "error": outcome.as_ref().err().map(ToString::to_string),
            });
            println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
        }
        OutputFormat::Text => match &outcome {
            Ok(()) => println!("{} token refreshed", style("ok").green().bold()),
            Err(e) => eprintln!("{} {e}", style("error:").red().bold()),
        },
    }

    outcome.map_err(|e| RcError::Http(e.to_string()))
}
