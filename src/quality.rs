//! Presence heuristics over generated text.
//!
//! The checks are regex matches for the kinds of data a downstream detector
//! is expected to find (CPF numbers, names, e-mails, phones, dates, amounts)
//! plus a few intent-specific keywords. Results are informative only; nothing
//! is filtered on them.

use std::collections::BTreeMap;

use regex::Regex;
use serde::Serialize;

use crate::batch::Document;
use crate::intent::Intent;
use crate::template::MISSING_SUFFIX;

/// Default lower bound of the ideal word count.
pub const DEFAULT_MIN_WORDS: usize = 200;
/// Default upper bound of the ideal word count.
pub const DEFAULT_MAX_WORDS: usize = 500;

/// Metrics for one text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualityReport {
    /// Whitespace-separated words.
    pub word_count: usize,
    /// A CPF-shaped number appears.
    pub has_cpf: bool,
    /// Two consecutive capitalised words appear.
    pub has_names: bool,
    /// An e-mail address appears.
    pub has_emails: bool,
    /// A phone number appears.
    pub has_phones: bool,
    /// A date, an amount in reais or a postcode appears.
    pub has_specific_data: bool,
    /// Word count lies within the configured bounds.
    pub ideal_length: bool,
    /// At least one placeholder failed to resolve.
    pub has_missing_placeholder: bool,
    /// Intent-specific keyword checks, by name.
    pub intent_metrics: BTreeMap<&'static str, bool>,
    /// Number of passed scored checks.
    pub score: usize,
    /// Number of scored checks.
    pub max_score: usize,
}

/// Regex-based text evaluator.
#[derive(Debug, Clone)]
pub struct QualityEvaluator {
    min_words: usize,
    max_words: usize,
    cpf: Regex,
    names: Regex,
    emails: Regex,
    phones: Regex,
    specific_data: Regex,
    evidence: Regex,
    period: Regex,
    values: Regex,
    calculations: Regex,
    experience: Regex,
    skills: Regex,
}

impl QualityEvaluator {
    /// Evaluator with an ideal length of `min_words..=max_words`.
    ///
    /// # Errors
    ///
    /// Returns a [`regex::Error`] if a built-in pattern fails to compile.
    pub fn new(min_words: usize, max_words: usize) -> Result<Self, regex::Error> {
        Ok(Self {
            min_words,
            max_words,
            cpf: Regex::new(r"\d{3}[.\s]?\d{3}[.\s]?\d{3}[-\s]?\d{2}")?,
            names: Regex::new(r"\p{Lu}\p{Ll}+\s+\p{Lu}\p{Ll}+")?,
            emails: Regex::new(r"[A-Za-z0-9_.+-]+@[A-Za-z0-9-]+\.[A-Za-z0-9.-]+")?,
            phones: Regex::new(r"\(?\d{2}\)?\s?9?\s?\d{4}[-\s]?\d{4}")?,
            specific_data: Regex::new(r"\d{1,2}/\d{1,2}/\d{4}|R\$\s*\d+|\d{5}-?\d{3}")?,
            evidence: Regex::new(r"(?i)evidência|testemunha|relatório|laudo")?,
            period: Regex::new(r"(?i)\d+\s*(?:dia|semana|mês)")?,
            values: Regex::new(r"R\$\s*[\d.,]+")?,
            calculations: Regex::new(r"(?i)análise|cálculo|auditoria|crédito")?,
            experience: Regex::new(r"(?i)experiência|formação|cargo|empresa")?,
            skills: Regex::new(r"(?i)competência|habilidade|certificação")?,
        })
    }

    /// Evaluate one text, with intent-specific checks when `intent` is given.
    pub fn evaluate(&self, text: &str, intent: Option<Intent>) -> QualityReport {
        let word_count = text.split_whitespace().count();
        let has_cpf = self.cpf.is_match(text);
        let has_names = self.names.is_match(text);
        let has_specific_data = self.specific_data.is_match(text);
        let ideal_length = (self.min_words..=self.max_words).contains(&word_count);

        let intent_metrics: BTreeMap<&'static str, bool> = match intent {
            Some(Intent::Suspensao) => BTreeMap::from([
                ("has_evidence", self.evidence.is_match(text)),
                ("has_period", self.period.is_match(text)),
            ]),
            Some(Intent::Financeiro) => BTreeMap::from([
                ("has_values", self.values.is_match(text)),
                ("has_calculations", self.calculations.is_match(text)),
            ]),
            Some(Intent::Curriculo) => BTreeMap::from([
                ("has_experience", self.experience.is_match(text)),
                ("has_skills", self.skills.is_match(text)),
            ]),
            None => BTreeMap::new(),
        };

        let scored = [has_cpf, has_names, has_specific_data, ideal_length]
            .into_iter()
            .chain(intent_metrics.values().copied());
        let (score, max_score) = scored.fold((0usize, 0usize), |(score, max), passed| {
            (score.saturating_add(usize::from(passed)), max.saturating_add(1))
        });

        QualityReport {
            word_count,
            has_cpf,
            has_names,
            has_emails: self.emails.is_match(text),
            has_phones: self.phones.is_match(text),
            has_specific_data,
            ideal_length,
            has_missing_placeholder: text.contains(MISSING_SUFFIX),
            intent_metrics,
            score,
            max_score,
        }
    }

    /// Aggregate metrics over a batch of documents.
    pub fn summarize(&self, docs: &[Document]) -> BatchSummary {
        let mut summary = BatchSummary::default();
        let mut score_total = 0usize;
        let mut max_total = 0usize;
        let mut words_total = 0usize;

        for doc in docs {
            let report = self.evaluate(&doc.text, Some(doc.intent));
            summary.documents = summary.documents.saturating_add(1);
            score_total = score_total.saturating_add(report.score);
            max_total = max_total.saturating_add(report.max_score);
            words_total = words_total.saturating_add(report.word_count);
            if report.has_missing_placeholder {
                summary.with_missing_placeholders =
                    summary.with_missing_placeholders.saturating_add(1);
            }
            if report.ideal_length {
                summary.ideal_length = summary.ideal_length.saturating_add(1);
            }
            let count = summary.by_intent.entry(doc.intent).or_insert(0);
            *count = count.saturating_add(1);
        }

        summary.mean_score = ratio(score_total, summary.documents);
        summary.mean_score_percent = ratio(score_total, max_total) * 100.0;
        summary.mean_word_count = ratio(words_total, summary.documents);
        summary
    }
}

/// Aggregate metrics for a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    /// Documents evaluated.
    pub documents: usize,
    /// Mean passed checks per document.
    pub mean_score: f64,
    /// Passed checks as a share of all scored checks, in percent.
    pub mean_score_percent: f64,
    /// Mean words per document.
    pub mean_word_count: f64,
    /// Documents inside the ideal length.
    pub ideal_length: usize,
    /// Documents with at least one unresolved placeholder.
    pub with_missing_placeholders: usize,
    /// Documents per intent.
    pub by_intent: BTreeMap<Intent, usize>,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    let n = u32::try_from(numerator).map_or(f64::from(u32::MAX), f64::from);
    let d = u32::try_from(denominator).map_or(f64::from(u32::MAX), f64::from);
    n / d
}
