//! Coverage for config parsing, env overrides and path resolution.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use papelada::config::{PapeladaConfig, DEFAULT_CONFIG_FILE};
use papelada::intent::{Intent, IntentMode};
use papelada::output::OutputFormat;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_match_documented_values() {
    let config = PapeladaConfig::default();
    assert_eq!(config.generation.count, 100);
    assert_eq!(config.generation.seed, None);
    assert!(config.generation.concurrency >= 1);
    assert_eq!(config.generation.mode, IntentMode::RoundRobin);
    assert_eq!(config.generation.format, OutputFormat::Jsonl);
    assert_eq!(
        config.generation.output,
        PathBuf::from("outputs/prompts_export.jsonl")
    );
    assert!((config.generation.inconsistency_rate - 0.20).abs() < f64::EPSILON);
    assert_eq!(config.quality.min_words, 200);
    assert_eq!(config.quality.max_words, 500);
    assert!(!config.polish.enabled);
    assert_eq!(config.polish.timeout_secs, 120);
}

#[test]
fn from_toml_reads_every_section() {
    let toml = r#"
[generation]
count = 25
seed = 42
concurrency = 3
mode = "random"
intents = ["suspensao", "financeiro"]
output = "out/batch.json"
format = "json"
templates_dir = "bancos"
inconsistency_rate = 0.5

[quality]
min_words = 50
max_words = 80

[polish]
enabled = true
base_url = "http://gpu:11434"
model = "qwen3:8b"
timeout_secs = 30
temperature = 0.3
stop = ["FIM"]
"#;
    let config = match PapeladaConfig::from_toml(toml) {
        Ok(config) => config,
        Err(err) => panic!("config should parse: {err:#}"),
    };
    assert_eq!(config.generation.count, 25);
    assert_eq!(config.generation.seed, Some(42));
    assert_eq!(config.generation.concurrency, 3);
    assert_eq!(config.generation.mode, IntentMode::Random);
    assert_eq!(
        config.generation.intents,
        vec![Intent::Suspensao, Intent::Financeiro]
    );
    assert_eq!(config.generation.format, OutputFormat::Json);
    assert_eq!(config.generation.templates_dir, Some(PathBuf::from("bancos")));
    assert_eq!(config.quality.min_words, 50);
    assert!(config.polish.enabled);
    assert_eq!(config.polish.model, "qwen3:8b");
    assert!((config.polish.sampling.temperature - 0.3).abs() < f64::EPSILON);
    assert_eq!(config.polish.sampling.stop, vec!["FIM".to_owned()]);
    assert_eq!(config.polish.sampling.top_k, 45);
}

#[test]
fn fixed_mode_parses_from_toml() {
    let config = PapeladaConfig::from_toml("[generation]\nmode = { fixed = \"curriculo\" }\n")
        .expect("config should parse");
    assert_eq!(config.generation.mode, IntentMode::Fixed(Intent::Curriculo));
}

#[test]
fn wrongly_typed_key_is_an_error() {
    assert!(PapeladaConfig::from_toml("[generation]\ncount = \"many\"\n").is_err());
}

#[test]
fn env_overrides_file_values() {
    let mut config = PapeladaConfig::from_toml("[generation]\ncount = 5\n").expect("parses");
    config.apply_overrides(env_from(&[
        ("PAPELADA_COUNT", "12"),
        ("PAPELADA_SEED", " 77 "),
        ("PAPELADA_CONCURRENCY", "2"),
        ("PAPELADA_OUTPUT", "x.jsonl"),
        ("PAPELADA_TEMPLATES_DIR", "bancos"),
        ("PAPELADA_OLLAMA_MODEL", "mistral"),
    ]));
    assert_eq!(config.generation.count, 12);
    assert_eq!(config.generation.seed, Some(77));
    assert_eq!(config.generation.concurrency, 2);
    assert_eq!(config.generation.output, PathBuf::from("x.jsonl"));
    assert_eq!(config.generation.templates_dir, Some(PathBuf::from("bancos")));
    assert_eq!(config.polish.model, "mistral");
}

#[test]
fn invalid_env_override_is_ignored() {
    let mut config = PapeladaConfig::from_toml("[generation]\ncount = 5\n").expect("parses");
    config.apply_overrides(env_from(&[("PAPELADA_COUNT", "muitos"), ("PAPELADA_SEED", "-1")]));
    assert_eq!(config.generation.count, 5);
    assert_eq!(config.generation.seed, None);
}

#[test]
fn config_path_prefers_env_over_default() {
    let path = PapeladaConfig::config_path_with(None, env_from(&[(
        "PAPELADA_CONFIG_PATH",
        "/etc/papelada.toml",
    )]));
    assert_eq!(path, PathBuf::from("/etc/papelada.toml"));
    let default = PapeladaConfig::config_path_with(None, env_from(&[]));
    assert_eq!(default, PathBuf::from(DEFAULT_CONFIG_FILE));
}

#[test]
fn load_reads_file_and_applies_env() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("custom.toml");
    std::fs::write(&path, "[generation]\ncount = 8\nseed = 1\n").expect("config written");

    let config = PapeladaConfig::load_with(Some(&path), env_from(&[("PAPELADA_SEED", "2")]))
        .expect("config loads");
    assert_eq!(config.generation.count, 8);
    assert_eq!(config.generation.seed, Some(2));
}

#[test]
fn missing_default_file_yields_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("absent.toml");
    let missing_str = missing.to_string_lossy().into_owned();
    let config = PapeladaConfig::load_with(
        None,
        env_from(&[("PAPELADA_CONFIG_PATH", missing_str.as_str())]),
    )
    .expect("defaults load");
    assert_eq!(config.generation.count, 100);
}

#[test]
fn missing_explicit_file_is_an_error() {
    let result = PapeladaConfig::load_with(Some(Path::new("/nonexistent/papelada.toml")), env_from(&[]));
    assert!(result.is_err());
}

#[test]
fn malformed_file_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[generation\ncount = 1").expect("config written");
    assert!(PapeladaConfig::load_with(Some(&path), env_from(&[])).is_err());
}
