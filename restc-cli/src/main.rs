//! restc CLI - Command-line interface for the restc JSON REST client.
//!
//! Issues requests against a configured base URI through the same retry,
//! auth and processor pipeline the library exposes. Useful for probing an
//! API, scripting, and checking a configuration before embedding it.

mod commands;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::info;

use restc_core::config::AppConfig;
use restc_core::error::RcResult;
use restc_core::logging;

/// restc - retrying, authenticated JSON REST client.
#[derive(Parser)]
#[command(
    name = "restc",
    version,
    about = "Retrying JSON REST client",
    long_about = "A command-line JSON REST client.\n\
                   Requests are retried on server errors, authenticated with bearer tokens \
                   and passed through the configured JSON processors."
)]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json).
    #[arg(short = 'f', long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Base URI (overrides config).
    #[arg(short, long, global = true)]
    base_uri: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output for scripting.
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a GET request.
    Get {
        /// Request path, appended to the base URI.
        path: String,
        /// Extra header as name:value (repeatable).
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
    },
    /// Send a DELETE request.
    Delete {
        /// Request path, appended to the base URI.
        path: String,
        /// Extra header as name:value (repeatable).
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
    },
    /// Send a POST request.
    Post {
        /// Request path, appended to the base URI.
        path: String,
        #[command(flatten)]
        body: commands::request::BodyArgs,
        /// Extra header as name:value (repeatable).
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
    },
    /// Send a PUT request.
    Put {
        /// Request path, appended to the base URI.
        path: String,
        #[command(flatten)]
        body: commands::request::BodyArgs,
        /// Extra header as name:value (repeatable).
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
    },
    /// Authentication commands.
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// View and initialize the configuration file.
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

#[tokio::main]
async fn main() -> RcResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = match cli.config.as_deref() {
        Some(path) => PathBuf::from(path),
        None => AppConfig::default_config_path().unwrap_or_else(|_| PathBuf::from("config.toml")),
    };
    // `config init` creates the file, so it may not exist yet
    let explicit = cli.config.is_some() && !matches!(cli.command, Commands::Config { .. });
    let mut config = load_config(&config_path, explicit)?;
    if let Some(base_uri) = cli.base_uri.as_deref() {
        config.client.base_uri = AppConfig::sanitize_base_uri(base_uri);
    }

    // Initialize logging
    let _guard = match config.effective_log_dir() {
        Ok(log_dir) => Some(logging::init_logging(&config.logging, &log_dir, cli.verbose)?),
        Err(_) => {
            logging::init_console_logging(&config.logging.level, cli.verbose);
            None
        }
    };

    info!("restc CLI v{}", restc_core::constants::APP_VERSION);

    // Dispatch to command handlers
    match cli.command {
        Commands::Get { path, headers } => {
            commands::request::run(&config, reqwest::Method::GET, &path, None, &headers, cli.format).await
        }
        Commands::Delete { path, headers } => {
            commands::request::run(&config, reqwest::Method::DELETE, &path, None, &headers, cli.format).await
        }
        Commands::Post { path, body, headers } => {
            commands::request::run(&config, reqwest::Method::POST, &path, Some(body), &headers, cli.format).await
        }
        Commands::Put { path, body, headers } => {
            commands::request::run(&config, reqwest::Method::PUT, &path, Some(body), &headers, cli.format).await
        }
        Commands::Auth { action } => commands::auth::run(&config, action, cli.format).await,
        Commands::Config { action } => {
            commands::config::run(&config, &config_path, action, cli.format)
        }
    }
}

/// Read the config file. A missing default file means defaults; a missing
/// explicit file is an error.
fn load_config(path: &Path, explicit: bool) -> RcResult<AppConfig> {
    if explicit || path.exists() {
        AppConfig::load_from_file(path)
    } else {
        Ok(AppConfig::default())
    }
}
