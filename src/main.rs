//! Papelada CLI entry point.
//!
//! Provides `generate`, `sample`, and `check` subcommands for running a batch
//! export, printing one assembled document with its selection trace, or
//! validating the template banks.

#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use papelada::batch::{self, BatchRequest, Generator};
use papelada::config::PapeladaConfig;
use papelada::engine::Assembler;
use papelada::entities::{EntitySource, FakeEntitySource};
use papelada::intent::{Intent, IntentMode};
use papelada::output::{self, OutputFormat};
use papelada::polish::ollama::OllamaPolisher;
use papelada::quality::QualityEvaluator;
use papelada::template::BankRegistry;

/// Failures printed after a batch.
const FAILURE_SAMPLE: usize = 5;

/// Papelada: synthetic pt-BR HR document generator.
#[derive(Parser)]
#[command(name = "papelada", version, about)]
struct Cli {
    /// Config file (default: `$PAPELADA_CONFIG_PATH` or `./papelada.toml`).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// Generate a batch of documents and export it.
    Generate(GenerateArgs),
    /// Print one assembled document with its selection trace.
    Sample {
        /// Intent to assemble.
        #[arg(long)]
        intent: Intent,
        /// RNG seed.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Load and validate every template bank.
    Check {
        /// Directory of bank files overriding the built-ins.
        #[arg(long)]
        templates_dir: Option<PathBuf>,
    },
}

/// Flags for `generate`; each overrides the config file.
#[derive(clap::Args)]
struct GenerateArgs {
    /// Documents to generate.
    #[arg(long)]
    count: Option<usize>,
    /// Restrict the intent pool (repeatable).
    #[arg(long = "intent")]
    intents: Vec<Intent>,
    /// `round-robin`, `random`, or an intent name for a single-intent batch.
    #[arg(long)]
    mode: Option<IntentMode>,
    /// Master RNG seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Maximum documents in flight.
    #[arg(long)]
    concurrency: Option<usize>,
    /// Export path.
    #[arg(long)]
    output: Option<PathBuf>,
    /// `jsonl` or `json`.
    #[arg(long)]
    format: Option<OutputFormat>,
    /// Rewrite each document through the configured Ollama model.
    #[arg(long)]
    polish: bool,
    /// Also write JSON logs to this directory.
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match cli.command {
        Command::Generate(args) => handle_generate(cli.config.as_deref(), args).await,
        Command::Sample { intent, seed } => {
            papelada::logging::init_cli();
            let config = load_config(cli.config.as_deref())?;
            handle_sample(&config, intent, seed)
        }
        Command::Check { templates_dir } => {
            papelada::logging::init_cli();
            let config = load_config(cli.config.as_deref())?;
            handle_check(templates_dir.or(config.generation.templates_dir))
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<PapeladaConfig> {
    PapeladaConfig::load(path).context("failed to load configuration")
}

fn load_banks(templates_dir: Option<&Path>) -> anyhow::Result<BankRegistry> {
    match templates_dir {
        Some(dir) => BankRegistry::with_overrides(dir)
            .with_context(|| format!("failed to load template banks from {}", dir.display())),
        None => Ok(BankRegistry::builtin()),
    }
}

/// Run a batch and write the export.
async fn handle_generate(config_path: Option<&Path>, args: GenerateArgs) -> anyhow::Result<()> {
    let _logging_guard = match &args.log_dir {
        Some(dir) => Some(papelada::logging::init_with_file(dir)?),
        None => {
            papelada::logging::init_cli();
            None
        }
    };

    let mut config = load_config(config_path)?;
    let generation = &mut config.generation;
    if let Some(count) = args.count {
        generation.count = count;
    }
    if !args.intents.is_empty() {
        generation.intents = args.intents;
    }
    if let Some(mode) = args.mode {
        generation.mode = mode;
    }
    if args.seed.is_some() {
        generation.seed = args.seed;
    }
    if let Some(concurrency) = args.concurrency {
        generation.concurrency = concurrency;
    }
    if let Some(output) = args.output {
        generation.output = output;
    }
    if let Some(format) = args.format {
        generation.format = format;
    }

    let banks = load_banks(config.generation.templates_dir.as_deref())?;
    let source = FakeEntitySource::today()
        .with_inconsistency_rate(config.generation.inconsistency_rate);
    let mut generator = Generator::new(Arc::new(banks), Arc::new(source));

    if args.polish || config.polish.enabled {
        let polisher = OllamaPolisher::new(
            config.polish.base_url.clone(),
            config.polish.model.clone(),
            config.polish.sampling.clone(),
            Duration::from_secs(config.polish.timeout_secs),
        )
        .context("failed to create polishing client")?;
        info!(model = %config.polish.model, url = %config.polish.base_url, "polishing enabled");
        generator = generator.with_polisher(Arc::new(polisher));
    }

    let request = BatchRequest {
        count: config.generation.count,
        mode: config.generation.mode,
        intents: config.generation.intents.clone(),
        seed: config.generation.seed,
        concurrency: config.generation.concurrency,
    };
    let report = batch::run(&generator, &request).await;

    println!(
        "requested: {}  produced: {}  failed: {}  seed: {}",
        report.requested,
        report.produced(),
        report.failed(),
        report.seed
    );
    for intent in &report.disabled_intents {
        println!("disabled intent: {intent}");
    }
    for failure in report.failures.iter().take(FAILURE_SAMPLE) {
        let intent = failure.intent.map_or("-", Intent::as_str);
        println!("  #{} [{intent}] {}", failure.index, failure.error);
    }

    if report.produced() == 0 {
        anyhow::bail!("no document could be produced");
    }

    let path = &config.generation.output;
    output::write(path, config.generation.format, &report.documents)
        .with_context(|| format!("failed to write export to {}", path.display()))?;
    println!("written: {} ({})", path.display(), config.generation.format);

    let evaluator = QualityEvaluator::new(config.quality.min_words, config.quality.max_words)
        .context("failed to build quality evaluator")?;
    let summary = evaluator.summarize(&report.documents);
    println!(
        "quality: mean score {:.2} ({:.1}%), mean words {:.1}, ideal length {}/{}, unresolved placeholders {}",
        summary.mean_score,
        summary.mean_score_percent,
        summary.mean_word_count,
        summary.ideal_length,
        summary.documents,
        summary.with_missing_placeholders
    );
    for (intent, count) in &summary.by_intent {
        println!("  {intent}: {count}");
    }
    Ok(())
}

/// Assemble one document and print it with its selection trace.
fn handle_sample(config: &PapeladaConfig, intent: Intent, seed: Option<u64>) -> anyhow::Result<()> {
    let banks = load_banks(config.generation.templates_dir.as_deref())?;
    let Some(bank) = banks.get(intent) else {
        anyhow::bail!("template bank for intent {intent} is disabled");
    };

    let seed = seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = StdRng::seed_from_u64(seed);
    let source = FakeEntitySource::today()
        .with_inconsistency_rate(config.generation.inconsistency_rate);
    let record = source
        .build_record(intent, &mut rng)
        .context("failed to build data record")?;
    let persona = bank
        .choose_persona(&mut rng)
        .context("persona bank is empty")?;
    let assembly = Assembler::new(&bank.template)?.assemble(persona, &record, &mut rng)?;

    println!("{}\n", assembly.text);
    let trace = serde_json::to_string_pretty(&serde_json::json!({
        "intent": intent,
        "seed": seed,
        "persona": assembly.persona,
        "selection": assembly.selection,
        "noise": assembly.noise,
        "missing_paths": assembly.missing_paths,
    }))
    .context("failed to serialize selection trace")?;
    println!("{trace}");
    Ok(())
}

/// Validate every bank and report per-intent counts.
fn handle_check(templates_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let banks = load_banks(templates_dir.as_deref())?;

    for intent in banks.enabled() {
        let Some(bank) = banks.get(intent) else {
            continue;
        };
        let template = &bank.template;
        println!(
            "{intent}: ok  required={} context={} narratives={} secondary={} range={}..={} personas={}",
            template.required.len(),
            template.context.is_some(),
            template.narratives.len(),
            template.secondary.len(),
            template.secondary_range.min,
            template.secondary_range.max,
            bank.personas.len()
        );
    }
    for rejected in banks.rejected() {
        let intent = rejected.intent.map_or("?", Intent::as_str);
        println!("{intent}: rejected  {} ({})", rejected.error, rejected.origin);
    }

    let disabled = banks.disabled();
    if !disabled.is_empty() {
        anyhow::bail!("{} intent(s) disabled by invalid template banks", disabled.len());
    }
    Ok(())
}
