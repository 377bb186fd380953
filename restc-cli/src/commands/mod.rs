//! CLI command implementations.

pub mod auth;
pub mod config;
pub mod request;

use console::style;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::{json, Value};

use restc_api::{ApiResponse, RestClient};
use restc_core::config::AppConfig;
use restc_core::error::{RcError, RcResult};

use crate::OutputFormat;

/// Helper to create a REST client from config.
pub fn create_client(config: &AppConfig) -> RcResult<RestClient> {
    if config.client.base_uri.is_empty() {
        return Err(RcError::MissingConfig(
            "client.base_uri (set it in the config file or pass --base-uri)".into(),
        ));
    }
    RestClient::from_config(config)
}

/// Parse repeated `name:value` header arguments.
pub fn parse_headers(raw: &[String]) -> RcResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    for entry in raw {
        let (name, value) = entry
            .split_once(':')
            .ok_or_else(|| RcError::Config(format!("header must be name:value, got {entry:?}")))?;
        let name = HeaderName::from_bytes(name.trim().as_bytes())
            .map_err(|e| RcError::Config(format!("invalid header name {name:?}: {e}")))?;
        let value = HeaderValue::from_str(value.trim())
            .map_err(|e| RcError::Config(format!("invalid value for header {name}: {e}")))?;
        headers.append(name, value);
    }
    Ok(headers)
}

/// Print an envelope and the processed body, failing if the request did.
pub fn print_response(envelope: &ApiResponse, body: Option<&Value>, format: OutputFormat) -> RcResult<()> {
    let success = envelope.is_success();

    match format {
        OutputFormat::Json => {
            let out = json!({
                "status": envelope.status(),
                "attempts": envelope.attempts(),
                "success": success,
                "body": body,
                "error": if success { None } else { Some(envelope.error_message()) },
            });
            println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
        }
        OutputFormat::Text => {
            let status = if success {
                style(envelope.status().to_string()).green().bold()
            } else {
                style(envelope.status().to_string()).red().bold()
            };
            println!(
                "{} {}  {}",
                style("Status:").bold(),
                status,
                style(format!("({} retries)", envelope.attempts())).dim()
            );
            if let Some(body) = body.filter(|b| !b.is_null()) {
                println!("{}", serde_json::to_string_pretty(body).unwrap_or_default());
            }
            if !success {
                eprintln!("{} {}", style("error:").red().bold(), envelope.error_message());
            }
        }
    }

    if success {
        Ok(())
    } else {
        Err(RcError::Http(envelope.error_message()))
    }
}
