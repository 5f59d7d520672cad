//! Ollama polishing client using the `/api/chat` API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::{check_http_response, clean_response, PolishError, Polisher, SamplingParams, SYSTEM_MESSAGE};

/// Default Ollama API base URL.
pub const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Default model tag.
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3:8b";

// ---------------------------------------------------------------------------
// Wire types (pub for integration testing)
// ---------------------------------------------------------------------------

/// Ollama chat API request body.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct OllamaRequest {
    /// Model name.
    pub model: String,
    /// Conversation messages.
    pub messages: Vec<OllamaMessage>,
    /// Disable streaming.
    pub stream: bool,
    /// Sampling options.
    pub options: OllamaOptions,
}

/// A message in Ollama format.
#[doc(hidden)]
#[derive(Debug, Serialize, Deserialize)]
pub struct OllamaMessage {
    /// Role: "system", "user" or "assistant".
    pub role: String,
    /// Message content.
    pub content: String,
}

/// Ollama sampling options.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct OllamaOptions {
    /// Sampling temperature.
    pub temperature: f64,
    /// Nucleus-sampling threshold.
    pub top_p: f64,
    /// Top-k cutoff.
    pub top_k: u32,
    /// Repetition penalty.
    pub repeat_penalty: f64,
    /// Maximum tokens to generate.
    pub num_predict: u32,
    /// Stop sequences.
    pub stop: Vec<String>,
}

impl From<&SamplingParams> for OllamaOptions {
    fn from(params: &SamplingParams) -> Self {
        Self {
            temperature: params.temperature,
            top_p: params.top_p,
            top_k: params.top_k,
            repeat_penalty: params.repeat_penalty,
            num_predict: params.num_predict,
            stop: params.stop.clone(),
        }
    }
}

/// Ollama chat API response body.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct OllamaResponse {
    /// Response message.
    pub message: OllamaMessage,
    /// Model that served the response.
    #[serde(default)]
    pub model: String,
}

// ---------------------------------------------------------------------------
// Request / Response builders (pub for integration testing)
// ---------------------------------------------------------------------------

/// Build the chat request for one scaffolded prompt.
#[doc(hidden)]
pub fn build_request(model: &str, prompt: &str, params: &SamplingParams) -> OllamaRequest {
    OllamaRequest {
        model: model.to_owned(),
        messages: vec![
            OllamaMessage {
                role: "system".to_owned(),
                content: SYSTEM_MESSAGE.to_owned(),
            },
            OllamaMessage {
                role: "user".to_owned(),
                content: prompt.to_owned(),
            },
        ],
        stream: false,
        options: OllamaOptions::from(params),
    }
}

/// Parse a chat response and clean the reply text.
///
/// # Errors
///
/// Returns [`PolishError::Parse`] if the body does not deserialize or the
/// cleaned reply is empty.
#[doc(hidden)]
pub fn parse_response(body: &str) -> Result<String, PolishError> {
    let resp: OllamaResponse =
        serde_json::from_str(body).map_err(|e| PolishError::Parse(e.to_string()))?;
    let cleaned = clean_response(&resp.message.content);
    if cleaned.is_empty() {
        return Err(PolishError::Parse("empty reply".to_owned()));
    }
    Ok(cleaned)
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Ollama chat API polisher.
#[derive(Debug, Clone)]
pub struct OllamaPolisher {
    /// Model name passed to Ollama.
    #[doc(hidden)]
    pub model: String,
    /// Base URL for the Ollama API.
    #[doc(hidden)]
    pub base_url: String,
    params: SamplingParams,
    client: reqwest::Client,
}

impl OllamaPolisher {
    /// Create a polisher for `model` at `base_url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`PolishError::InvalidUrl`] if `base_url` is not an absolute
    /// http(s) URL, or [`PolishError::Request`] if the HTTP client cannot be
    /// built.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        params: SamplingParams,
        timeout: Duration,
    ) -> Result<Self, PolishError> {
        let base_url = validate_base_url(&base_url.into())?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(PolishError::Request)?;
        Ok(Self {
            model: model.into(),
            base_url,
            params,
            client,
        })
    }

    /// Sampling parameters sent with every request.
    pub fn params(&self) -> &SamplingParams {
        &self.params
    }
}

/// Parse `raw` as an http(s) URL and return it without a trailing slash.
fn validate_base_url(raw: &str) -> Result<String, PolishError> {
    let invalid = |reason: String| PolishError::InvalidUrl {
        url: raw.to_owned(),
        reason,
    };
    let parsed = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
    }
    if parsed.host_str().is_none() {
        return Err(invalid("missing host".to_owned()));
    }
    Ok(raw.trim_end_matches('/').to_owned())
}

#[async_trait]
impl Polisher for OllamaPolisher {
    async fn polish(&self, prompt: &str) -> Result<String, PolishError> {
        let api_request = build_request(&self.model, prompt, &self.params);

        let url = format!("{}/api/chat", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&api_request)
            .send()
            .await?;

        let payload = check_http_response(response).await?;
        let text = parse_response(&payload)?;
        debug!(model = %self.model, chars = text.len(), "polished document");
        Ok(text)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
