//! Template and persona banks: TOML contract, validation, and registry.
//!
//! Each intent ships one bank file holding its fragment plan (`[template]`)
//! and its voice profiles (`[[personas]]`). The three built-in banks are
//! embedded in the binary; a directory of `.toml` files may override them.
//! Banks are validated once at load and are read-only afterwards.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::intent::Intent;

const BUILTIN_CURRICULO: &str = include_str!("../../templates/curriculo.toml");
const BUILTIN_SUSPENSAO: &str = include_str!("../../templates/suspensao.toml");
const BUILTIN_FINANCEIRO: &str = include_str!("../../templates/financeiro.toml");

/// Error type for bank loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The bank declares no required singleton block.
    #[error("intent {intent}: bank declares no required block")]
    NoRequiredBlocks {
        /// Intent whose bank is malformed.
        intent: Intent,
    },
    /// A required, context or secondary block has zero fragments.
    #[error("intent {intent}: block '{block}' has no fragments")]
    EmptyBlock {
        /// Intent whose bank is malformed.
        intent: Intent,
        /// Name of the empty block.
        block: String,
    },
    /// Two blocks share a name.
    #[error("intent {intent}: block name '{block}' is used more than once")]
    DuplicateBlock {
        /// Intent whose bank is malformed.
        intent: Intent,
        /// Repeated block name.
        block: String,
    },
    /// A keyed narrative set has zero fragments.
    #[error("intent {intent}: narrative set '{key}' has no fragments")]
    EmptyNarrative {
        /// Intent whose bank is malformed.
        intent: Intent,
        /// Narrative key with the empty set.
        key: String,
    },
    /// The bank has no personas.
    #[error("intent {intent}: persona bank is empty")]
    EmptyPersonas {
        /// Intent whose bank is malformed.
        intent: Intent,
    },
    /// A persona has no prefixes or no suffixes.
    #[error("intent {intent}: persona '{persona}' has no {kind}")]
    EmptyPersonaPhrases {
        /// Intent whose bank is malformed.
        intent: Intent,
        /// Persona name.
        persona: String,
        /// `"prefixes"` or `"suffixes"`.
        kind: &'static str,
    },
    /// A persona error probability is outside `[0, 1]`.
    #[error("intent {intent}: persona '{persona}' has error probability {value} outside [0, 1]")]
    InvalidErrorProbability {
        /// Intent whose bank is malformed.
        intent: Intent,
        /// Persona name.
        persona: String,
        /// Offending value.
        value: f64,
    },
    /// The secondary subset range has `min > max`.
    #[error("intent {intent}: secondary range {min}..={max} is empty")]
    InvalidSecondaryRange {
        /// Intent whose bank is malformed.
        intent: Intent,
        /// Configured lower bound.
        min: usize,
        /// Configured upper bound.
        max: usize,
    },
    /// A bank file is not valid TOML or does not match the schema.
    #[error("failed to parse template bank: {0}")]
    Parse(#[from] toml::de::Error),
    /// A bank file or directory could not be read.
    #[error("failed to read template bank {}: {source}", path.display())]
    Io {
        /// Path being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// An intent name did not match any known intent.
    #[error("unknown intent '{0}'")]
    UnknownIntent(String),
}

// ---------------------------------------------------------------------------
// Bank contract
// ---------------------------------------------------------------------------

/// A named set of candidate fragments.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Block {
    /// Block or sub-topic name.
    pub name: String,
    /// Candidate fragments; one is drawn per use.
    pub fragments: Vec<String>,
}

impl Block {
    /// Build a block from string slices.
    pub fn new(name: impl Into<String>, fragments: &[&str]) -> Self {
        Self {
            name: name.into(),
            fragments: fragments.iter().map(|f| (*f).to_owned()).collect(),
        }
    }
}

/// Inclusive bounds on how many secondary sub-topics a document draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SubsetRange {
    /// Lower bound, inclusive.
    pub min: usize,
    /// Upper bound, inclusive.
    pub max: usize,
}

impl SubsetRange {
    /// Clamp both bounds to `available` sub-topics.
    ///
    /// Returns the effective range and whether clamping changed it.
    pub fn clamp_to(self, available: usize) -> (Self, bool) {
        let clamped = Self {
            min: self.min.min(available),
            max: self.max.min(available),
        };
        (clamped, clamped != self)
    }
}

/// Per-intent fragment plan.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateBank {
    /// Intent this bank produces.
    pub intent: Intent,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Singleton blocks, one fragment each, in order.
    pub required: Vec<Block>,
    /// Optional context block, one fragment.
    #[serde(default)]
    pub context: Option<Block>,
    /// Record fields consulted, in order, for the narrative key.
    #[serde(default)]
    pub narrative_keys: Vec<String>,
    /// Narrative fragment sets keyed by narrative key value.
    #[serde(default)]
    pub narratives: BTreeMap<String, Vec<String>>,
    /// Secondary sub-topic groups.
    #[serde(default)]
    pub secondary: Vec<Block>,
    /// How many secondary sub-topics each document draws.
    pub secondary_range: SubsetRange,
}

impl TemplateBank {
    /// Check the structural contract of this bank.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found, naming the intent and block.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let intent = self.intent;
        if self.required.is_empty() {
            return Err(ConfigError::NoRequiredBlocks { intent });
        }
        let blocks = || {
            self.required
                .iter()
                .chain(self.context.iter())
                .chain(self.secondary.iter())
        };
        if let Some(empty) = blocks().find(|b| b.fragments.is_empty()) {
            return Err(ConfigError::EmptyBlock {
                intent,
                block: empty.name.clone(),
            });
        }
        let mut seen = BTreeSet::new();
        if let Some(repeated) = blocks().find(|b| !seen.insert(b.name.as_str())) {
            return Err(ConfigError::DuplicateBlock {
                intent,
                block: repeated.name.clone(),
            });
        }
        if let Some((key, _)) = self.narratives.iter().find(|(_, set)| set.is_empty()) {
            return Err(ConfigError::EmptyNarrative {
                intent,
                key: key.clone(),
            });
        }
        let SubsetRange { min, max } = self.secondary_range;
        if min > max {
            return Err(ConfigError::InvalidSecondaryRange { intent, min, max });
        }
        Ok(())
    }
}

/// A voice profile wrapped around the assembled body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Persona {
    /// Display name (e.g. "Gestor Direto").
    pub name: String,
    /// Opening phrases; one is prepended.
    pub prefixes: Vec<String>,
    /// Closing phrases; one is appended.
    pub suffixes: Vec<String>,
    /// Probability in `[0, 1]` that the finished text goes through noise injection.
    #[serde(default)]
    pub error_probability: f64,
}

impl Persona {
    /// Check this persona's contract within `intent`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for empty phrase sets or an out-of-range probability.
    pub fn validate(&self, intent: Intent) -> Result<(), ConfigError> {
        for (kind, phrases) in [("prefixes", &self.prefixes), ("suffixes", &self.suffixes)] {
            if phrases.is_empty() {
                return Err(ConfigError::EmptyPersonaPhrases {
                    intent,
                    persona: self.name.clone(),
                    kind,
                });
            }
        }
        if !(0.0..=1.0).contains(&self.error_probability) {
            return Err(ConfigError::InvalidErrorProbability {
                intent,
                persona: self.name.clone(),
                value: self.error_probability,
            });
        }
        Ok(())
    }
}

/// One bank file: fragment plan plus persona bank.
#[derive(Debug, Clone, Deserialize)]
pub struct IntentBank {
    /// Fragment plan.
    pub template: TemplateBank,
    /// Persona bank for this intent.
    pub personas: Vec<Persona>,
}

impl IntentBank {
    /// Parse and validate a bank from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML, or the first
    /// validation error.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let bank: Self = toml::from_str(contents)?;
        bank.validate()?;
        Ok(bank)
    }

    /// Intent this bank produces.
    pub fn intent(&self) -> Intent {
        self.template.intent
    }

    /// Validate the fragment plan and every persona.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.template.validate()?;
        let intent = self.intent();
        if self.personas.is_empty() {
            return Err(ConfigError::EmptyPersonas { intent });
        }
        self.personas.iter().try_for_each(|p| p.validate(intent))
    }

    /// Draw a persona uniformly.
    pub fn choose_persona<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Persona> {
        self.personas.choose(rng)
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// A bank that failed to load or validate.
#[derive(Debug)]
pub struct RejectedBank {
    /// Intent the bank was meant for, when it could be determined.
    pub intent: Option<Intent>,
    /// Where the bank came from (`builtin:<intent>` or a file path).
    pub origin: String,
    /// Why it was rejected.
    pub error: ConfigError,
}

/// Validated banks indexed by intent.
///
/// An intent whose bank fails validation is disabled; the others stay usable.
#[derive(Debug, Default)]
pub struct BankRegistry {
    banks: BTreeMap<Intent, IntentBank>,
    rejected: Vec<RejectedBank>,
}

impl BankRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the banks embedded in the binary.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for (intent, contents) in [
            (Intent::Curriculo, BUILTIN_CURRICULO),
            (Intent::Suspensao, BUILTIN_SUSPENSAO),
            (Intent::Financeiro, BUILTIN_FINANCEIRO),
        ] {
            registry.load_str(Some(intent), &format!("builtin:{intent}"), contents);
        }
        registry
    }

    /// Built-in banks, overridden by every `.toml` file in `dir`.
    ///
    /// A file that fails to parse or validate disables the intent it targets
    /// (taken from the bank, or else from the file stem).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the directory or a file cannot be read.
    pub fn with_overrides(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| ConfigError::Io { path, source }
        };

        let mut registry = Self::builtin();
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_err(dir))? {
            let path = entry.map_err(io_err(dir))?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("toml") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            let contents = std::fs::read_to_string(&path).map_err(io_err(&path))?;
            let stem_intent = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<Intent>().ok());
            registry.load_str(stem_intent, &path.display().to_string(), &contents);
        }
        Ok(registry)
    }

    fn load_str(&mut self, fallback: Option<Intent>, origin: &str, contents: &str) {
        let parsed: Result<IntentBank, ConfigError> =
            toml::from_str(contents).map_err(ConfigError::from);
        let intent = parsed.as_ref().ok().map(IntentBank::intent).or(fallback);
        match parsed.and_then(|bank| bank.validate().map(|()| bank)) {
            Ok(bank) => {
                info!(
                    intent = %bank.intent(),
                    origin,
                    required = bank.template.required.len(),
                    secondary = bank.template.secondary.len(),
                    personas = bank.personas.len(),
                    "template bank loaded"
                );
                self.rejected.retain(|r| r.intent != Some(bank.intent()));
                self.banks.insert(bank.intent(), bank);
            }
            Err(error) => {
                warn!(intent = ?intent, origin, %error, "template bank rejected, intent disabled");
                if let Some(intent) = intent {
                    self.banks.remove(&intent);
                }
                self.rejected.push(RejectedBank {
                    intent,
                    origin: origin.to_owned(),
                    error,
                });
            }
        }
    }

    /// Validate and register a bank, replacing any bank for the same intent.
    ///
    /// # Errors
    ///
    /// Returns the validation error; the registry is unchanged.
    pub fn insert(&mut self, bank: IntentBank) -> Result<(), ConfigError> {
        bank.validate()?;
        self.banks.insert(bank.intent(), bank);
        Ok(())
    }

    /// Bank for an intent, if enabled.
    pub fn get(&self, intent: Intent) -> Option<&IntentBank> {
        self.banks.get(&intent)
    }

    /// Intents with a valid bank, in canonical order.
    pub fn enabled(&self) -> Vec<Intent> {
        self.banks.keys().copied().collect()
    }

    /// Intents without a valid bank.
    pub fn disabled(&self) -> Vec<Intent> {
        Intent::ALL
            .into_iter()
            .filter(|i| !self.banks.contains_key(i))
            .collect()
    }

    /// Banks that failed to load.
    pub fn rejected(&self) -> &[RejectedBank] {
        &self.rejected
    }
}
