//! Shared client utilities and error types for the CLI.

use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use anyhow::anyhow;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode, Url};
use seedshelf_api_models::ApiErrorBody;

use crate::storage::StorageError;

pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";

/// CLI-level error type separating local validation, server-reported and
/// operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Server { status: StatusCode, message: String },
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
            Self::Server { .. } => 4,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Server { status, message } => format!("{message} (status {})", status.as_u16()),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<StorageError> for CliError {
    fn from(err: StorageError) -> Self {
        Self::failure(err)
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::failure(anyhow!("failed to write output: {err}"))
    }
}

/// Build the shared HTTP client: request-id header on every call plus the
/// configured timeout.
pub(crate) fn build_http_client(timeout_secs: u64, trace_id: &str) -> CliResult<Client> {
    let mut default_headers = HeaderMap::new();
    let request_id = HeaderValue::from_str(trace_id)
        .map_err(|_| CliError::failure(anyhow!("trace identifier contains invalid characters")))?;
    default_headers.insert(HEADER_REQUEST_ID, request_id);

    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .default_headers(default_headers)
        .build()
        .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))
}

/// Parse the API URL provided to the CLI.
pub(crate) fn parse_url(input: &str) -> Result<Url, String> {
    let url = input
        .parse::<Url>()
        .map_err(|err| format!("invalid URL '{input}': {err}"))?;
    if url.cannot_be_a_base() {
        return Err(format!("invalid URL '{input}': cannot be used as a base"));
    }
    Ok(url)
}

/// Classify a non-2xx response into a server-reported error.
///
/// The catalogue API reports failures as `{"error": ...}` or
/// `{"errors": ...}`; anything else falls back to the raw body text.
pub(crate) async fn classify_problem(response: reqwest::Response) -> CliError {
    let status = response.status();
    let bytes = response.bytes().await.unwrap_or_default();
    problem_from_body(status, &bytes)
}

pub(crate) fn problem_from_body(status: StatusCode, bytes: &[u8]) -> CliError {
    let body_text = String::from_utf8_lossy(bytes).trim().to_string();
    let message = serde_json::from_slice::<ApiErrorBody>(bytes)
        .ok()
        .and_then(|body| body.message())
        .or_else(|| (!body_text.is_empty()).then_some(body_text))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });

    tracing::debug!(status = status.as_u16(), %message, "server rejected request");
    CliError::Server { status, message }
}
