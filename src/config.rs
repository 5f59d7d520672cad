//! Configuration loading.
//!
//! Loads settings from `./papelada.toml` (or `$PAPELADA_CONFIG_PATH`, or an
//! explicit `--config` path). Environment variables override file values;
//! file values override defaults.
//!
//! Precedence: env vars > config file > defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::batch::default_concurrency;
use crate::entities::DEFAULT_INCONSISTENCY_RATE;
use crate::intent::{Intent, IntentMode};
use crate::output::OutputFormat;
use crate::polish::ollama::{DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_URL};
use crate::polish::SamplingParams;
use crate::quality::{DEFAULT_MAX_WORDS, DEFAULT_MIN_WORDS};

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "papelada.toml";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level configuration loaded from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PapeladaConfig {
    /// Batch generation settings (`[generation]`).
    pub generation: GenerationConfig,
    /// Quality heuristics settings (`[quality]`).
    pub quality: QualityConfig,
    /// LLM polishing settings (`[polish]`).
    pub polish: PolishConfig,
}

impl PapeladaConfig {
    /// Load configuration with precedence env vars > TOML file > defaults.
    ///
    /// `explicit` wins over `$PAPELADA_CONFIG_PATH`, which wins over
    /// `./papelada.toml`. A missing file yields defaults, except when the
    /// path was given explicitly.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// if an explicit path does not exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::load_with(explicit, |key| std::env::var(key).ok())
    }

    /// [`load`](Self::load) with a custom env resolver.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load).
    pub fn load_with(
        explicit: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let path = Self::config_path_with(explicit, &env);
        let mut config = match std::fs::read_to_string(&path) {
            Ok(contents) => {
                tracing::info!(path = %path.display(), "loading config from file");
                Self::from_toml(&contents)
                    .with_context(|| format!("failed to parse config at {}", path.display()))?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && explicit.is_none() => {
                tracing::debug!(path = %path.display(), "no config file found, using defaults");
                Self::default()
            }
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "failed to read config at {}: {e}",
                    path.display()
                ))
            }
        };
        config.apply_overrides(env);
        Ok(config)
    }

    /// Resolve the config file path.
    pub fn config_path_with(
        explicit: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        if let Some(p) = env("PAPELADA_CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from(DEFAULT_CONFIG_FILE)
    }

    /// Apply environment variable overrides (env > config > defaults).
    ///
    /// Invalid numeric values are ignored with a warning.
    pub fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(v) = env("PAPELADA_COUNT") {
            match v.trim().parse() {
                Ok(n) => self.generation.count = n,
                Err(_) => warn_invalid("PAPELADA_COUNT", &v),
            }
        }
        if let Some(v) = env("PAPELADA_SEED") {
            match v.trim().parse() {
                Ok(n) => self.generation.seed = Some(n),
                Err(_) => warn_invalid("PAPELADA_SEED", &v),
            }
        }
        if let Some(v) = env("PAPELADA_CONCURRENCY") {
            match v.trim().parse() {
                Ok(n) => self.generation.concurrency = n,
                Err(_) => warn_invalid("PAPELADA_CONCURRENCY", &v),
            }
        }
        if let Some(v) = env("PAPELADA_OUTPUT") {
            self.generation.output = PathBuf::from(v);
        }
        if let Some(v) = env("PAPELADA_TEMPLATES_DIR") {
            self.generation.templates_dir = Some(PathBuf::from(v));
        }

        // Polishing.
        if let Some(v) = env("PAPELADA_OLLAMA_URL") {
            self.polish.base_url = v;
        }
        if let Some(v) = env("PAPELADA_OLLAMA_MODEL") {
            self.polish.model = v;
        }
    }

    /// Parse a TOML string into config.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or has wrongly typed keys.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: PapeladaConfig =
            toml::from_str(toml_str).context("failed to parse config TOML")?;
        Ok(config)
    }
}

fn warn_invalid(var: &str, value: &str) {
    tracing::warn!(var, value, "ignoring invalid env override");
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Batch generation settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Documents per batch.
    pub count: usize,
    /// Master seed; random when absent.
    pub seed: Option<u64>,
    /// Maximum documents in flight.
    pub concurrency: usize,
    /// Slot-to-intent policy.
    pub mode: IntentMode,
    /// Intents allowed; empty means all enabled intents.
    pub intents: Vec<Intent>,
    /// Export path.
    pub output: PathBuf,
    /// Export layout.
    pub format: OutputFormat,
    /// Directory of bank files overriding the built-ins.
    pub templates_dir: Option<PathBuf>,
    /// Share of records that receive a planted contradiction.
    pub inconsistency_rate: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            count: 100,
            seed: None,
            concurrency: default_concurrency(),
            mode: IntentMode::RoundRobin,
            intents: Vec::new(),
            output: PathBuf::from("outputs/prompts_export.jsonl"),
            format: OutputFormat::Jsonl,
            templates_dir: None,
            inconsistency_rate: DEFAULT_INCONSISTENCY_RATE,
        }
    }
}

/// Quality heuristics settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Lower bound of the ideal word count.
    pub min_words: usize,
    /// Upper bound of the ideal word count.
    pub max_words: usize,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            min_words: DEFAULT_MIN_WORDS,
            max_words: DEFAULT_MAX_WORDS,
        }
    }
}

/// LLM polishing settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PolishConfig {
    /// Whether `generate` polishes documents by default.
    pub enabled: bool,
    /// Ollama base URL.
    pub base_url: String,
    /// Model tag.
    pub model: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Sampling parameters, flattened into the section.
    #[serde(flatten)]
    pub sampling: SamplingParams,
}

impl Default for PolishConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: DEFAULT_OLLAMA_URL.to_owned(),
            model: DEFAULT_OLLAMA_MODEL.to_owned(),
            timeout_secs: 120,
            sampling: SamplingParams::default(),
        }
    }
}
