//! Single-defect noise injection.
//!
//! [`inject`] picks one of five corruption classes uniformly and applies it.
//! Every class alters at most one localized spot (except case folding) and
//! degrades to a no-op when the text offers nothing to corrupt. Nothing here
//! can fail.

use std::fmt;

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::Serialize;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Letter/digit look-alikes used by [`NoiseKind::OcrConfusion`].
pub const OCR_CONFUSIONS: [(char, char); 4] = [('O', '0'), ('I', '1'), ('S', '5'), ('B', '8')];

/// Corruption class applied to a finished document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseKind {
    /// Replace the first occurrence of one accented letter with its base letter.
    AccentDrop,
    /// Swap one character with its successor.
    Transposition,
    /// Lower-case the whole text.
    CaseFold,
    /// Replace the first occurrence of one OCR-confusable letter with its digit.
    OcrConfusion,
    /// Leave the text unchanged.
    None,
}

impl NoiseKind {
    /// All classes; [`inject`] draws uniformly from this list.
    pub const ALL: [NoiseKind; 5] = [
        NoiseKind::AccentDrop,
        NoiseKind::Transposition,
        NoiseKind::CaseFold,
        NoiseKind::OcrConfusion,
        NoiseKind::None,
    ];
}

impl fmt::Display for NoiseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AccentDrop => "accent_drop",
            Self::Transposition => "transposition",
            Self::CaseFold => "case_fold",
            Self::OcrConfusion => "ocr_confusion",
            Self::None => "none",
        })
    }
}

/// Apply one uniformly chosen corruption class to `text`.
pub fn inject<R: Rng + ?Sized>(text: &str, rng: &mut R) -> (NoiseKind, String) {
    let kind = NoiseKind::ALL
        .choose(rng)
        .copied()
        .unwrap_or(NoiseKind::None);
    (kind, apply(kind, text, rng))
}

/// Apply a specific corruption class to `text`.
pub fn apply<R: Rng + ?Sized>(kind: NoiseKind, text: &str, rng: &mut R) -> String {
    match kind {
        NoiseKind::AccentDrop => drop_accent(text, rng),
        NoiseKind::Transposition => transpose(text, rng),
        NoiseKind::CaseFold => text.to_lowercase(),
        NoiseKind::OcrConfusion => ocr_confuse(text, rng),
        NoiseKind::None => text.to_owned(),
    }
}

/// Base form of `c` with combining marks removed, if `c` carries any.
pub fn strip_accent(c: char) -> Option<String> {
    let base: String = std::iter::once(c)
        .nfd()
        .filter(|d| !is_combining_mark(*d))
        .collect();
    let mut chars = base.chars();
    match (chars.next(), chars.next()) {
        (Some(first), None) if first == c => None,
        (None, _) => None,
        _ => Some(base),
    }
}

fn drop_accent<R: Rng + ?Sized>(text: &str, rng: &mut R) -> String {
    // Every occurrence is a candidate, so frequent letters are picked more often.
    let candidates: Vec<char> = text.chars().filter(|c| strip_accent(*c).is_some()).collect();
    let Some(&target) = candidates.choose(rng) else {
        return text.to_owned();
    };
    match strip_accent(target) {
        Some(base) => text.replacen(target, &base, 1),
        None => text.to_owned(),
    }
}

fn transpose<R: Rng + ?Sized>(text: &str, rng: &mut R) -> String {
    let mut chars: Vec<char> = text.chars().collect();
    if chars.len() <= 2 {
        return text.to_owned();
    }
    let last_start = chars.len().saturating_sub(1);
    let pos = rng.random_range(0..last_start);
    chars.swap(pos, pos.saturating_add(1));
    chars.into_iter().collect()
}

fn ocr_confuse<R: Rng + ?Sized>(text: &str, rng: &mut R) -> String {
    match OCR_CONFUSIONS.choose(rng) {
        Some(&(from, to)) => text.replacen(from, &to.to_string(), 1),
        None => text.to_owned(),
    }
}
