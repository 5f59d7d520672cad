//! Batch driver.
//!
//! Generates `count` documents on a bounded pool of tokio tasks. Slot `i`
//! gets its intent from the [`IntentMode`] and its own RNG stream derived from
//! `(seed, i)`, so every document's text is independent of scheduling. A
//! failing document is dropped and recorded; the batch always runs to the
//! end. Results are shuffled with the master RNG before they are returned.

use std::collections::HashMap;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::engine::{Assembler, AssemblyError};
use crate::entities::{EntitySource, SourceError};
use crate::intent::{Intent, IntentMode};
use crate::noise::NoiseKind;
use crate::polish::{scaffold, PolishError, Polisher};
use crate::template::{BankRegistry, ConfigError};

/// Multiplier spreading slot indices across the seed space.
const STREAM_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Per-document failure. The document is dropped; the batch continues.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// No enabled intent was available for the slot.
    #[error("no enabled intent available")]
    NoIntent,
    /// The intent's bank is disabled.
    #[error("template bank for intent {0} is disabled")]
    NoBank(Intent),
    /// The entity source failed.
    #[error("entity source: {0}")]
    Source(#[from] SourceError),
    /// The bank or persona is malformed.
    #[error("assembly: {0}")]
    Assembly(#[from] AssemblyError),
    /// The polishing call failed.
    #[error("polish: {0}")]
    Polish(#[from] PolishError),
    /// The generation task panicked or was cancelled.
    #[error("generation task aborted: {0}")]
    Panic(String),
}

/// One generated document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    /// Sequence identifier assigned in generation order (`prompt_0001`).
    pub id: String,
    /// Zero-based slot index.
    pub index: usize,
    /// Document intent.
    pub intent: Intent,
    /// Persona that wrapped the body.
    pub persona: String,
    /// Final text.
    pub text: String,
    /// Noise class applied, if any.
    pub noise: Option<NoiseKind>,
    /// Placeholder paths that did not resolve.
    pub missing_paths: Vec<String>,
    /// Whether the text was rewritten by a polisher.
    pub polished: bool,
}

/// `prompt_0001` for slot 0.
pub fn sequence_id(index: usize) -> String {
    format!("prompt_{:04}", index.saturating_add(1))
}

/// Independent RNG stream for slot `index` of a batch seeded with `seed`.
pub fn document_rng(seed: u64, index: usize) -> StdRng {
    let slot = u64::try_from(index).unwrap_or(u64::MAX);
    StdRng::seed_from_u64(seed.wrapping_add(slot.wrapping_mul(STREAM_STRIDE)))
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Shared, read-only collaborators for building documents.
#[derive(Clone)]
pub struct Generator {
    banks: Arc<BankRegistry>,
    source: Arc<dyn EntitySource>,
    polisher: Option<Arc<dyn Polisher>>,
}

impl Generator {
    /// Generator over `banks` drawing records from `source`.
    pub fn new(banks: Arc<BankRegistry>, source: Arc<dyn EntitySource>) -> Self {
        Self {
            banks,
            source,
            polisher: None,
        }
    }

    /// Rewrite every document through `polisher` after assembly.
    #[must_use]
    pub fn with_polisher(mut self, polisher: Arc<dyn Polisher>) -> Self {
        self.polisher = Some(polisher);
        self
    }

    /// The bank registry.
    pub fn banks(&self) -> &BankRegistry {
        &self.banks
    }

    /// Build and assemble one document.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError`] if the bank is disabled, the source fails
    /// or the bank is malformed.
    pub fn generate_one(
        &self,
        index: usize,
        intent: Intent,
        rng: &mut StdRng,
    ) -> Result<Document, GenerationError> {
        let bank = self.banks.get(intent).ok_or(GenerationError::NoBank(intent))?;
        let assembler = Assembler::new(&bank.template)?;
        let record = self.source.build_record(intent, rng)?;
        let persona = bank
            .choose_persona(rng)
            .ok_or(AssemblyError::Config(ConfigError::EmptyPersonas { intent }))?;
        let assembly = assembler.assemble(persona, &record, rng)?;

        Ok(Document {
            id: sequence_id(index),
            index,
            intent,
            persona: assembly.persona,
            text: assembly.text,
            noise: assembly.noise,
            missing_paths: assembly.missing_paths,
            polished: false,
        })
    }

    /// Pass `doc` through the polisher, if one is configured.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Polish`] if the polishing call fails.
    pub async fn polish(&self, mut doc: Document) -> Result<Document, GenerationError> {
        let Some(polisher) = &self.polisher else {
            return Ok(doc);
        };
        doc.text = polisher.polish(&scaffold(doc.intent, &doc.text)).await?;
        doc.polished = true;
        Ok(doc)
    }
}

// ---------------------------------------------------------------------------
// Batch
// ---------------------------------------------------------------------------

/// Parameters of one batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    /// Documents requested.
    pub count: usize,
    /// Slot-to-intent policy.
    pub mode: IntentMode,
    /// Intents allowed in the pool; empty means every enabled intent.
    pub intents: Vec<Intent>,
    /// Master seed; drawn from OS entropy when absent.
    pub seed: Option<u64>,
    /// Maximum documents in flight.
    pub concurrency: usize,
}

impl BatchRequest {
    /// Round-robin over every enabled intent, unseeded, one worker per CPU.
    pub fn new(count: usize) -> Self {
        Self {
            count,
            mode: IntentMode::RoundRobin,
            intents: Vec::new(),
            seed: None,
            concurrency: default_concurrency(),
        }
    }
}

/// Available parallelism, or 1 when it cannot be determined.
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism().map_or(1, usize::from)
}

/// A dropped document.
#[derive(Debug)]
pub struct BatchFailure {
    /// Slot index.
    pub index: usize,
    /// Intent assigned to the slot, if any.
    pub intent: Option<Intent>,
    /// Why the document was dropped.
    pub error: GenerationError,
}

/// Outcome of a batch run.
#[derive(Debug)]
pub struct BatchReport {
    /// Documents requested.
    pub requested: usize,
    /// Master seed actually used.
    pub seed: u64,
    /// Produced documents, shuffled.
    pub documents: Vec<Document>,
    /// Dropped documents, ordered by slot index.
    pub failures: Vec<BatchFailure>,
    /// Intents without a valid bank.
    pub disabled_intents: Vec<Intent>,
}

impl BatchReport {
    /// Number of documents produced.
    pub fn produced(&self) -> usize {
        self.documents.len()
    }

    /// Number of documents dropped.
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Intents a request may draw from: enabled, and in the request's allow-list
/// when it has one.
pub fn intent_pool(banks: &BankRegistry, requested: &[Intent]) -> Vec<Intent> {
    banks
        .enabled()
        .into_iter()
        .filter(|intent| requested.is_empty() || requested.contains(intent))
        .collect()
}

/// Run a batch to completion.
///
/// Never fails as a whole: every per-document error ends up in
/// [`BatchReport::failures`].
pub async fn run(generator: &Generator, request: &BatchRequest) -> BatchReport {
    let seed = request.seed.unwrap_or_else(|| rand::rng().random());
    let pool = intent_pool(generator.banks(), &request.intents);
    let disabled_intents = generator.banks().disabled();
    let concurrency = request.concurrency.max(1);

    info!(
        requested = request.count,
        mode = %request.mode,
        pool = ?pool,
        disabled = ?disabled_intents,
        concurrency,
        seed,
        "batch started"
    );

    let mut master = StdRng::seed_from_u64(seed);
    let semaphore = Arc::new(Semaphore::new(concurrency));
    let mut tasks = JoinSet::new();
    let mut slots = HashMap::new();
    let mut failures = Vec::new();

    for index in 0..request.count {
        let Some(intent) = request.mode.pick(index, &pool, &mut master) else {
            failures.push(BatchFailure {
                index,
                intent: None,
                error: GenerationError::NoIntent,
            });
            continue;
        };
        let permit = match Arc::clone(&semaphore).acquire_owned().await {
            Ok(permit) => permit,
            Err(err) => {
                failures.push(BatchFailure {
                    index,
                    intent: Some(intent),
                    error: GenerationError::Panic(err.to_string()),
                });
                continue;
            }
        };
        let generator = generator.clone();
        let handle = tasks.spawn(async move {
            let _permit = permit;
            let mut rng = document_rng(seed, index);
            let doc = generator.generate_one(index, intent, &mut rng)?;
            generator.polish(doc).await
        });
        slots.insert(handle.id(), (index, intent));
    }

    let mut documents = Vec::with_capacity(request.count);
    while let Some(joined) = tasks.join_next_with_id().await {
        let (id, error) = match joined {
            Ok((_, Ok(doc))) => {
                documents.push(doc);
                continue;
            }
            Ok((id, Err(err))) => (id, err),
            Err(join_err) => (join_err.id(), GenerationError::Panic(join_err.to_string())),
        };
        let (index, intent) = match slots.get(&id) {
            Some(&(index, intent)) => (index, Some(intent)),
            None => (usize::MAX, None),
        };
        warn!(index, intent = ?intent, %error, "document dropped");
        failures.push(BatchFailure {
            index,
            intent,
            error,
        });
    }

    documents.sort_by_key(|doc| doc.index);
    documents.shuffle(&mut master);
    failures.sort_by_key(|failure| failure.index);

    let report = BatchReport {
        requested: request.count,
        seed,
        documents,
        failures,
        disabled_intents,
    };
    info!(
        requested = report.requested,
        produced = report.produced(),
        failed = report.failed(),
        "batch finished"
    );
    report
}
