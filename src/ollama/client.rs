/// Ollama HTTP client implementation.
///
/// This module provides `OllamaClient` for making synchronous HTTP requests to the Ollama API,
/// along with error types and a builder for configuration.
use std::thread;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

/// Base URL used when neither the builder nor `OLLAMA_HOST` provide one.
pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";

/// Per-request timeout used when the builder is not given one.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Delays between retry attempts for transient `list_models` failures.
const BACKOFF: [Duration; 3] = [
    Duration::from_secs(1),
    Duration::from_secs(2),
    Duration::from_secs(4),
];

/// Errors that can occur when interacting with the Ollama API.
#[derive(Debug, Error)]
pub enum OllamaError {
    /// Network-related errors (connection failures, DNS resolution, etc.)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Request or response timeout errors
    #[error("Request timed out")]
    Timeout(#[source] reqwest::Error),

    /// HTTP errors with status code
    #[error("HTTP error: status {status}")]
    Http { status: u16 },

    /// Ollama API-specific errors
    #[error("Ollama API error: {message}")]
    Api { message: String },

    /// Invalid URL configuration error
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for OllamaError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            OllamaError::Timeout(err)
        } else {
            OllamaError::Network(err)
        }
    }
}

/// Builder for constructing `OllamaClient` instances.
///
/// # Examples
///
/// ```
/// use askd::ollama::OllamaClientBuilder;
///
/// let client = OllamaClientBuilder::new()
///     .base_url("http://localhost:11434")
///     .build()
///     .expect("Failed to create client");
/// assert_eq!(client.base_url(), "http://localhost:11434");
/// ```
#[derive(Debug, Default)]
pub struct OllamaClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl OllamaClientBuilder {
    /// Creates a new `OllamaClientBuilder` with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL for the Ollama API (e.g. "http://localhost:11434").
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the per-request timeout. Defaults to [`DEFAULT_REQUEST_TIMEOUT`].
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the `OllamaClient` with the configured settings.
    ///
    /// If `base_url()` was not called, the `OLLAMA_HOST` environment variable is
    /// used, falling back to [`DEFAULT_OLLAMA_HOST`]. A trailing slash is dropped.
    ///
    /// # Errors
    ///
    /// Returns `OllamaError::InvalidUrl` if the base URL does not parse.
    pub fn build(self) -> Result<OllamaClient, OllamaError> {
        let base_url = match self.base_url {
            Some(url) => url,
            None => {
                std::env::var("OLLAMA_HOST").unwrap_or_else(|_| DEFAULT_OLLAMA_HOST.to_string())
            }
        };
        let base_url = base_url.trim_end_matches('/').to_string();

        reqwest::Url::parse(&base_url)
            .map_err(|e| OllamaError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let timeout = self.timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT);
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(OllamaError::Network)?;

        Ok(OllamaClient {
            client,
            base_url,
            timeout,
        })
    }
}

/// Synchronous HTTP client for the Ollama API.
///
/// Must only be called from blocking contexts (e.g. `spawn_blocking`).
pub struct OllamaClient {
    client: reqwest::blocking::Client,
    base_url: String,
    timeout: Duration,
}

/// Operations the `ollama` inference backend needs from a server.
///
/// This trait enables mocking in unit tests.
pub trait OllamaClientTrait: Send + Sync {
    /// Generates a completion for `prompt` with `model`.
    fn generate(&self, model: &str, prompt: &str) -> Result<String, OllamaError>;

    /// Lists the model tags available on the server.
    fn list_models(&self) -> Result<Vec<String>, OllamaError>;
}

impl OllamaClient {
    /// Returns the base URL configured for this client.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, OllamaError> {
        let response = self.client.post(url).json(body).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(OllamaError::Http {
                status: status.as_u16(),
            });
        }
        Ok(response.json()?)
    }
}

impl OllamaClientTrait for OllamaClient {
    /// Sends one generate request.
    ///
    /// Not retried; callers bound inference with their own deadline.
    fn generate(&self, model: &str, prompt: &str) -> Result<String, OllamaError> {
        let url = format!("{}/api/generate", self.base_url);
        let request_body = serde_json::json!({
            "model": model,
            "prompt": prompt,
            "stream": false
        });

        let json = self.post_json(&url, &request_body)?;

        json.get("response")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| OllamaError::Api {
                message: "Missing 'response' field in API response".to_string(),
            })
    }

    fn list_models(&self) -> Result<Vec<String>, OllamaError> {
        let url = format!("{}/api/tags", self.base_url);

        let json: serde_json::Value = retry_with_backoff(&BACKOFF, || {
            let response = self.client.get(&url).send()?;
            if !response.status().is_success() {
                return Err(OllamaError::Http {
                    status: response.status().as_u16(),
                });
            }
            Ok(response.json()?)
        })?;

        Ok(parse_model_names(&json))
    }
}

/// Extracts `models[].name` from an `/api/tags` response.
fn parse_model_names(json: &serde_json::Value) -> Vec<String> {
    json.get("models")
        .and_then(|m| m.as_array())
        .map(|models| {
            models
                .iter()
                .filter_map(|model| model.get("name").and_then(|n| n.as_str()))
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// Runs `f`, retrying transient failures once per entry in `delays`.
///
/// Only network errors, timeouts and HTTP 5xx are retried; everything else is
/// returned immediately. After the last delay the final error is returned.
pub fn retry_with_backoff<F, T>(delays: &[Duration], mut f: F) -> Result<T, OllamaError>
where
    F: FnMut() -> Result<T, OllamaError>,
{
    let mut last_error = match f() {
        Ok(result) => return Ok(result),
        Err(e) if !should_retry(&e) => return Err(e),
        Err(e) => e,
    };

    for (attempt, delay) in delays.iter().enumerate() {
        debug!(attempt = attempt + 1, error = %last_error, "retrying ollama request");
        thread::sleep(*delay);

        match f() {
            Ok(result) => return Ok(result),
            Err(e) if !should_retry(&e) => return Err(e),
            Err(e) => last_error = e,
        }
    }

    warn!(error = %last_error, "ollama request failed after retries");
    Err(last_error)
}

/// Returns `true` for transient errors (HTTP 5xx, network errors, timeouts).
fn should_retry(error: &OllamaError) -> bool {
    match error {
        OllamaError::Network(_) | OllamaError::Timeout(_) => true,
        OllamaError::Http { status } => (500..600).contains(status),
        OllamaError::Api { .. } | OllamaError::InvalidUrl(_) => false,
    }
}
