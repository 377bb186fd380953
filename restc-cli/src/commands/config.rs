//! Configuration commands.

use std::path::Path;

use clap::Subcommand;
use console::style;

use restc_core::config::{AppConfig, AuthKind};
use restc_core::error::{RcError, RcResult};

use crate::OutputFormat;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration (secrets masked).
    Show,
    /// Print the configuration file path.
    Path,
    /// Write a default configuration file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

/// Run a config subcommand.
pub fn run(config: &AppConfig, path: &Path, action: ConfigAction, format: OutputFormat) -> RcResult<()> {
    match action {
        ConfigAction::Show => show(config, format),
        ConfigAction::Path => {
            println!("{}", path.display());
            Ok(())
        }
        ConfigAction::Init { force } => init(path, force),
    }
}

fn show(config: &AppConfig, format: OutputFormat) -> RcResult<()> {
    let masked = masked(config);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&masked)?),
        OutputFormat::Text => {
            println!("{}", style("Client").bold().underlined());
            println!("  base_uri:     {}", display_or_unset(&masked.client.base_uri));
            println!("  timeout_ms:   {}", masked.client.timeout_ms);
            println!("  headers:      {}", masked.client.headers.len());
            println!("{}", style("Retry").bold().underlined());
            println!("  max_retries:  {}", masked.retry.max_retries);
            println!("  backoff_step: {} ms", masked.retry.backoff_step_ms);
            println!("{}", style("Auth").bold().underlined());
            println!("  kind:         {:?}", masked.auth.kind);
            if masked.auth.kind == AuthKind::Keycloak {
                println!("  endpoint:     {}", display_or_unset(&masked.auth.endpoint));
                println!("  client_id:    {}", display_or_unset(&masked.auth.client_id));
            }
            println!("{}", style("Processors").bold().underlined());
            println!("  outbound:     {:?}", masked.processors.outbound);
            println!("  inbound:      {:?}", masked.processors.inbound);
        }
    }
    Ok(())
}

fn init(path: &Path, force: bool) -> RcResult<()> {
    if path.exists() && !force {
        return Err(RcError::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    AppConfig::default().save_to_file(path)?;
    println!("{} wrote {}", style("ok").green().bold(), path.display());
    Ok(())
}

/// Copy of `config` with secrets replaced.
fn masked(config: &AppConfig) -> AppConfig {
    let mut masked = config.clone();
    if masked.auth.token.is_some() {
        masked.auth.token = Some("********".into());
    }
    if !masked.auth.secret.is_empty() {
        masked.auth.secret = "********".into();
    }
    masked
}

fn display_or_unset(value: &str) -> &str {
    if value.is_empty() {
        "(not set)"
    } else {
        value
    }
}
