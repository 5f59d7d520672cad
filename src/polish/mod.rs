//! Optional LLM polishing of assembled documents.
//!
//! A [`Polisher`] takes a fully scaffolded prompt (see [`scaffold`]) and
//! returns one rewritten string. Failures surface as [`PolishError`]; nothing
//! is retried here.
//!
//! One client is implemented: [`ollama::OllamaPolisher`] for the Ollama
//! `/api/chat` API.

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::intent::Intent;

pub mod ollama;

/// System message sent with every polishing request.
pub const SYSTEM_MESSAGE: &str = "Você é um especialista em RH focado em criar prompts de alta \
qualidade. Sempre responda de forma precisa, detalhada e profissional.";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for polishing calls.
#[derive(Debug, Error)]
pub enum PolishError {
    /// HTTP transport failure.
    #[error("polish request failed: {0}")]
    Request(#[source] reqwest::Error),
    /// The request did not complete within the client timeout.
    #[error("polish request timed out")]
    Timeout,
    /// Upstream service responded with an error status.
    #[error("polish service returned non-success status {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Sanitized response body.
        body: String,
    },
    /// Response did not match the expected schema or was empty.
    #[error("polish response parse error: {0}")]
    Parse(String),
    /// The configured base URL is not an absolute http(s) URL.
    #[error("invalid polish base URL '{url}': {reason}")]
    InvalidUrl {
        /// URL as configured.
        url: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl From<reqwest::Error> for PolishError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Request(err)
        }
    }
}

// ---------------------------------------------------------------------------
// Sampling
// ---------------------------------------------------------------------------

/// Named sampling parameters passed to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingParams {
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

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.65,
            top_p: 0.87,
            top_k: 45,
            repeat_penalty: 1.12,
            num_predict: 650,
            stop: ["---", "EXEMPLO", "DIRETRIZES", "OBSERVAÇÃO", "\n\nNota:"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Rewrites a scaffolded prompt into polished text.
#[async_trait]
pub trait Polisher: Send + Sync {
    /// Send `prompt` to the model and return its cleaned reply.
    ///
    /// # Errors
    ///
    /// Returns [`PolishError`] on transport, status, timeout or parse failure.
    async fn polish(&self, prompt: &str) -> Result<String, PolishError>;

    /// Model identifier, for logs.
    fn model_id(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Prompt scaffold and response cleanup
// ---------------------------------------------------------------------------

/// Wrap an assembled document in the rewriting instructions sent to the
/// model.
pub fn scaffold(intent: Intent, text: &str) -> String {
    let focus = intent.as_str().to_uppercase();
    let label = intent.label();
    format!(
        "Você é um especialista sênior em Recursos Humanos, especializado em {label}.\n\n\
         CATEGORIA FOCO: {focus}\n\n\
         TEXTO BASE:\n\"{text}\"\n\n\
         MISSÃO:\n\
         Reescreva o texto base como UM prompt profissional e detalhado da categoria {focus}, \
         preservando todos os nomes, documentos, valores e datas exatamente como aparecem.\n\n\
         IMPORTANTE: Responda APENAS com o texto do prompt final, sem comentários adicionais."
    )
}

/// Strip a leading label (`Prompt:`, `Texto:`, `Aqui está ...:`) and any
/// trailing commentary starting on its own line (`---`, `EXEMPLO`, `NOTA:`,
/// `OBSERVAÇÃO:`, sign-offs).
pub fn clean_response(raw: &str) -> String {
    let mut text = raw.trim().to_owned();
    for (pattern, replacement) in [
        (r"(?i)\A(?:Prompt:|Texto:|Aqui está[^\n]*?:)\s*", ""),
        (
            r"(?ims)^\s*(?:---|EXEMPLO|NOTA:|OBSERVAÇÃO:|Espero |Fico à disposição|Aguardo ).*\z",
            "",
        ),
    ] {
        if let Ok(regex) = Regex::new(pattern) {
            text = regex.replace(&text, replacement).into_owned();
        }
    }
    text.trim().to_owned()
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

/// Check HTTP response status and return body text or a structured error.
///
/// # Errors
///
/// Returns [`PolishError::Request`] (or [`PolishError::Timeout`]) on transport
/// failure, [`PolishError::HttpStatus`] on non-2xx.
pub async fn check_http_response(response: reqwest::Response) -> Result<String, PolishError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(PolishError::HttpStatus {
            status: status.as_u16(),
            body: sanitize_http_error_body(&body),
        });
    }
    Ok(body)
}

fn sanitize_http_error_body(raw: &str) -> String {
    const MAX_ERROR_BODY_CHARS: usize = 256;

    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() > MAX_ERROR_BODY_CHARS {
        let shortened = collapsed
            .chars()
            .take(MAX_ERROR_BODY_CHARS)
            .collect::<String>();
        return format!("{shortened}...[truncated]");
    }
    collapsed
}
