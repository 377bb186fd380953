//! Request commands (get, post, put, delete).

use clap::Args;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use restc_api::{RequestOptions, RestClient};
use restc_core::config::AppConfig;
use restc_core::error::RcResult;

use crate::OutputFormat;

/// Body arguments for POST and PUT.
#[derive(Args, Debug, Clone, Default)]
pub struct BodyArgs {
    /// JSON request body.
    #[arg(short, long)]
    pub data: Option<String>,
    /// Send the body as given, without outbound processors.
    #[arg(long)]
    pub raw: bool,
}

/// Run a request command.
pub async fn run(
    config: &AppConfig,
    method: Method,
    path: &str,
    body: Option<BodyArgs>,
    headers: &[String],
    format: OutputFormat,
) -> RcResult<()> {
    let client = super::create_client(config)?;
    let body = body.unwrap_or_default();

    let payload = parse_body(body.data.as_deref())?;
    let mut options = RequestOptions::new().with_headers(super::parse_headers(headers)?);
    options.skip_outbound_processors = body.raw;

    execute(&client, method, path, payload.as_ref(), &options, format).await
}

async fn execute(
    client: &RestClient,
    method: Method,
    path: &str,
    payload: Option<&Value>,
    options: &RequestOptions,
    format: OutputFormat,
) -> RcResult<()> {
    debug!(%method, path, "issuing request");
    let result = client
        .invoke_as::<Value>(method, path, payload, options)
        .await;
    super::print_response(&result, result.value(), format)
}

fn parse_body(data: Option<&str>) -> RcResult<Option<Value>> {
    data.map(serde_json::from_str::<Value>).transpose().map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(None).unwrap(), None);
        assert_eq!(parse_body(Some(r#"{"a":1}"#)).unwrap(), Some(json!({"a": 1})));
        assert!(parse_body(Some("{oops")).is_err());
    }
}
