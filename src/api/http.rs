use anyhow::{Context, Result};
use serde_json::Value;
use std::time::Duration;

pub const USER_AGENT: &str = concat!("geofetch/", env!("CARGO_PKG_VERSION"));

/// Per-request settings. Build a fresh one per call; nothing here is shared.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    pub headers: Vec<(String, String)>,
    /// `None` leaves the transport default in place.
    pub timeout: Option<Duration>,
    pub positive_status_codes: Vec<u16>,
}

impl RequestOptions {
    /// `Accept: application/json`, statuses 200 and 206, no explicit timeout.
    pub fn json_api() -> Self {
        Self {
            headers: vec![("Accept".to_string(), "application/json".to_string())],
            timeout: None,
            positive_status_codes: vec![200, 206],
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_status_codes(mut self, codes: Vec<u16>) -> Self {
        self.positive_status_codes = codes;
        self
    }

    pub fn accepts(&self, status: u16) -> bool {
        self.positive_status_codes.contains(&status)
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::json_api()
    }
}

/// Result of a single GET: either a parsed JSON body or the status code that
/// was not in the accepted set.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Json(Value),
    Rejected(u16),
}

pub(crate) fn build_client(timeout: Option<Duration>) -> Result<reqwest::blocking::Client> {
    let mut builder = reqwest::blocking::Client::builder().user_agent(USER_AGENT);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().context("Failed to create HTTP client")
}

/// Issue one GET request and decode the body as JSON when the status is accepted.
///
/// Connection failures and undecodable bodies are errors; a status outside
/// `options.positive_status_codes` is not, it comes back as
/// [`FetchOutcome::Rejected`] without reading the body.
pub fn fetch_json(
    url: &str,
    params: &[(String, String)],
    options: &RequestOptions,
) -> Result<FetchOutcome> {
    let client = build_client(options.timeout)?;

    let mut request = client.get(url).query(params);
    for (name, value) in &options.headers {
        request = request.header(name.as_str(), value.as_str());
    }

    log::debug!("GET {}", url);
    let response = request
        .send()
        .with_context(|| format!("Failed to send request to {}", url))?;

    let status = response.status().as_u16();
    if !options.accepts(status) {
        return Ok(FetchOutcome::Rejected(status));
    }

    let body: Value = response
        .json()
        .with_context(|| format!("Failed to parse JSON response from {}", url))?;
    Ok(FetchOutcome::Json(body))
}
