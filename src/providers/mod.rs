//! API-key shape rules and live connectivity probes for the supported
//! providers. Probes issue a lightweight authenticated model-list call and
//! classify the failure, so the UI can show a precise message instead of a
//! raw transport error. No probe reads or writes shared state; concurrent
//! checks are safe.

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::debug;

use crate::config::Provider;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

static OPENAI_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^sk-[A-Za-z0-9]{32,}$").unwrap());
static ANTHROPIC_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^sk-ant-[A-Za-z0-9]{32,}$").unwrap());

/// Pure shape check, no I/O. The provider is inferred from the key prefix
/// when not given. Gemini keys have no published structure beyond length.
pub fn is_valid_key_format(key: &str, provider: Option<Provider>) -> bool {
    let provider = provider.unwrap_or_else(|| Provider::from_key_prefix(key));
    match provider {
        Provider::OpenAi => OPENAI_KEY.is_match(key),
        Provider::Anthropic => ANTHROPIC_KEY.is_match(key),
        Provider::Gemini => key.trim().len() >= 10,
    }
}

#[derive(Debug, Error)]
pub enum KeyTestError {
    #[error("the provider rejected the API key; check that it is correct and still active")]
    Unauthorized,

    #[error("the provider is rate limiting this key or its quota is exhausted; try again later")]
    RateLimited,

    #[error("the provider returned a server error ({0}); try again in a few minutes")]
    Upstream(u16),

    #[error("could not reach the provider: {0}")]
    Network(String),
}

impl KeyTestError {
    fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            401 | 403 => KeyTestError::Unauthorized,
            429 => KeyTestError::RateLimited,
            s if s >= 500 => KeyTestError::Upstream(s),
            s => KeyTestError::Network(format!("unexpected status {s}")),
        }
    }
}

#[async_trait]
trait KeyProbe: Send + Sync {
    async fn probe(&self, client: &reqwest::Client, key: &str) -> Result<(), KeyTestError>;
}

struct OpenAiProbe;

#[async_trait]
impl KeyProbe for OpenAiProbe {
    async fn probe(&self, client: &reqwest::Client, key: &str) -> Result<(), KeyTestError> {
        let response = client
            .get(format!("{OPENAI_BASE_URL}/models"))
            .bearer_auth(key)
            .send()
            .await
            .map_err(request_error)?;
        check_status(response.status())
    }
}

struct AnthropicProbe;

#[async_trait]
impl KeyProbe for AnthropicProbe {
    async fn probe(&self, client: &reqwest::Client, key: &str) -> Result<(), KeyTestError> {
        let response = client
            .get(format!("{ANTHROPIC_BASE_URL}/v1/models"))
            .header("x-api-key", key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .send()
            .await
            .map_err(request_error)?;
        check_status(response.status())
    }
}

struct GeminiProbe;

#[async_trait]
impl KeyProbe for GeminiProbe {
    async fn probe(&self, client: &reqwest::Client, key: &str) -> Result<(), KeyTestError> {
        // Gemini authenticates through a query parameter, not a header.
        let response = client
            .get(format!("{GEMINI_BASE_URL}/models"))
            .query(&[("key", key)])
            .send()
            .await
            .map_err(request_error)?;
        check_status(response.status())
    }
}

/// Runs live key checks against the provider APIs. Holds a single shared
/// HTTP client with a request timeout; timeouts surface as
/// [`KeyTestError::Network`].
pub struct KeyTester {
    client: reqwest::Client,
}

impl KeyTester {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(PROBE_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { client }
    }

    /// Check a key against its provider with a lightweight authenticated
    /// call. The provider is inferred from the key prefix when not given.
    /// `Ok(())` means the provider accepted the key; failures are classified
    /// per [`KeyTestError`] and never panic.
    pub async fn test_key(
        &self,
        key: &str,
        provider: Option<Provider>,
    ) -> Result<(), KeyTestError> {
        let provider = provider.unwrap_or_else(|| Provider::from_key_prefix(key));
        debug!("probing {provider} to check an API key");

        let probe: Box<dyn KeyProbe> = match provider {
            Provider::OpenAi => Box::new(OpenAiProbe),
            Provider::Anthropic => Box::new(AnthropicProbe),
            Provider::Gemini => Box::new(GeminiProbe),
        };

        probe.probe(&self.client, key).await
    }
}

impl Default for KeyTester {
    fn default() -> Self {
        Self::new()
    }
}

fn check_status(status: StatusCode) -> Result<(), KeyTestError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(KeyTestError::from_status(status))
    }
}

fn request_error(e: reqwest::Error) -> KeyTestError {
    if e.is_timeout() {
        KeyTestError::Network("the request timed out".to_string())
    } else {
        KeyTestError::Network(e.to_string())
    }
}
