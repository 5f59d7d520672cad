//! Presence heuristics and batch summaries.

use papelada::batch::{sequence_id, Document};
use papelada::intent::Intent;
use papelada::quality::QualityEvaluator;

const SUSPENSION: &str = "Comunicamos a suspensão de Carlos Almeida, CPF 529.982.247-25, \
    por 3 dias a partir de 12/03/2024, conforme relatório da supervisão. \
    Contato: carlos.almeida@empresa.com.br, (11) 98765-4321.";

fn evaluator(min: usize, max: usize) -> QualityEvaluator {
    match QualityEvaluator::new(min, max) {
        Ok(evaluator) => evaluator,
        Err(err) => panic!("patterns should compile: {err}"),
    }
}

fn doc(index: usize, intent: Intent, text: &str) -> Document {
    Document {
        id: sequence_id(index),
        index,
        intent,
        persona: "RH".to_owned(),
        text: text.to_owned(),
        noise: None,
        missing_paths: Vec::new(),
        polished: false,
    }
}

#[test]
fn detects_identifiers_and_contact_data() {
    let report = evaluator(10, 100).evaluate(SUSPENSION, Some(Intent::Suspensao));
    assert!(report.has_cpf);
    assert!(report.has_names);
    assert!(report.has_emails);
    assert!(report.has_phones);
    assert!(report.has_specific_data);
    assert!(report.ideal_length);
    assert!(!report.has_missing_placeholder);
    assert_eq!(report.intent_metrics.get("has_evidence"), Some(&true));
    assert_eq!(report.intent_metrics.get("has_period"), Some(&true));
    assert_eq!(report.max_score, 6);
    assert_eq!(report.score, 6);
}

#[test]
fn plain_text_scores_nothing() {
    let report = evaluator(200, 500).evaluate("texto curto sem dados", None);
    assert_eq!(report.word_count, 4);
    assert!(!report.has_cpf);
    assert!(!report.has_names);
    assert!(!report.ideal_length);
    assert!(report.intent_metrics.is_empty());
    assert_eq!(report.score, 0);
    assert_eq!(report.max_score, 4);
}

#[test]
fn unresolved_placeholders_are_flagged() {
    let report = evaluator(1, 10).evaluate("Olá {rh.nome_NAO_ENCONTRADO}", None);
    assert!(report.has_missing_placeholder);
}

#[test]
fn intent_metrics_follow_the_intent() {
    let evaluator = evaluator(1, 1000);
    let finance = evaluator.evaluate("Auditoria da folha: R$ 12.500,00.", Some(Intent::Financeiro));
    assert_eq!(finance.intent_metrics.get("has_values"), Some(&true));
    assert_eq!(finance.intent_metrics.get("has_calculations"), Some(&true));

    let resume = evaluator.evaluate("Experiência em vendas.", Some(Intent::Curriculo));
    assert_eq!(resume.intent_metrics.get("has_experience"), Some(&true));
    assert_eq!(resume.intent_metrics.get("has_skills"), Some(&false));
}

#[test]
fn summary_aggregates_per_intent() {
    let docs = vec![
        doc(0, Intent::Suspensao, SUSPENSION),
        doc(1, Intent::Suspensao, "sem dados {x_NAO_ENCONTRADO}"),
        doc(2, Intent::Financeiro, "R$ 10,00"),
    ];
    let summary = evaluator(10, 100).summarize(&docs);
    assert_eq!(summary.documents, 3);
    assert_eq!(summary.with_missing_placeholders, 1);
    assert_eq!(summary.ideal_length, 1);
    assert_eq!(summary.by_intent.get(&Intent::Suspensao), Some(&2));
    assert_eq!(summary.by_intent.get(&Intent::Financeiro), Some(&1));
    assert!(summary.mean_score > 0.0);
    assert!(summary.mean_score_percent > 0.0 && summary.mean_score_percent <= 100.0);
}

#[test]
fn empty_batch_summary_is_zeroed() {
    let summary = evaluator(10, 100).summarize(&[]);
    assert_eq!(summary.documents, 0);
    assert!(summary.mean_score.abs() < f64::EPSILON);
    assert!(summary.mean_word_count.abs() < f64::EPSILON);
}
