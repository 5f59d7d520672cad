//! Totality and single-defect bounds of the noise injector.

use papelada::noise::{apply, inject, NoiseKind, OCR_CONFUSIONS};
use rand::rngs::StdRng;
use rand::SeedableRng;

const EDGE_INPUTS: [&str; 5] = ["", "a", "ab", "texto sem acentos", "xyz 123"];

fn char_diffs(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).filter(|(x, y)| x != y).count()
}

#[test]
fn every_class_is_total_on_edge_inputs() {
    let mut rng = StdRng::seed_from_u64(0);
    for kind in NoiseKind::ALL {
        for input in EDGE_INPUTS {
            let out = apply(kind, input, &mut rng);
            assert_eq!(out.chars().count(), input.chars().count(), "{kind} on {input:?}");
        }
    }
    for input in EDGE_INPUTS {
        let _ = inject(input, &mut rng);
    }
}

#[test]
fn none_class_is_identity() {
    let mut rng = StdRng::seed_from_u64(1);
    for input in ["", "Ação disciplinar", "OI SB"] {
        assert_eq!(apply(NoiseKind::None, input, &mut rng), input);
    }
}

#[test]
fn short_text_is_never_transposed() {
    let mut rng = StdRng::seed_from_u64(2);
    for input in ["", "a", "ab"] {
        assert_eq!(apply(NoiseKind::Transposition, input, &mut rng), input);
    }
}

#[test]
fn transposition_swaps_one_adjacent_pair() {
    let input = "advertência formal";
    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let out = apply(NoiseKind::Transposition, input, &mut rng);
        let mut sorted_in: Vec<char> = input.chars().collect();
        let mut sorted_out: Vec<char> = out.chars().collect();
        sorted_in.sort_unstable();
        sorted_out.sort_unstable();
        assert_eq!(sorted_in, sorted_out);
        assert!(char_diffs(input, &out) <= 2);
    }
}

#[test]
fn accent_drop_alters_only_the_first_occurrence() {
    let input = "ação ação";
    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let out = apply(NoiseKind::AccentDrop, input, &mut rng);
        assert_eq!(char_diffs(input, &out), 1, "got {out:?}");
        assert!(out.ends_with(" ação"), "second word changed: {out:?}");
    }
}

#[test]
fn accent_drop_without_accents_is_noop() {
    let mut rng = StdRng::seed_from_u64(4);
    assert_eq!(apply(NoiseKind::AccentDrop, "texto simples", &mut rng), "texto simples");
}

#[test]
fn ocr_confusion_replaces_at_most_one_character() {
    let input = "OBS: SISTEMA BLOQUEADO";
    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let out = apply(NoiseKind::OcrConfusion, input, &mut rng);
        assert!(char_diffs(input, &out) <= 1, "got {out:?}");
        for (before, after) in input.chars().zip(out.chars()) {
            if before != after {
                assert!(OCR_CONFUSIONS.contains(&(before, after)));
            }
        }
    }
}

#[test]
fn ocr_confusion_without_confusable_letters_is_noop() {
    let mut rng = StdRng::seed_from_u64(6);
    assert_eq!(apply(NoiseKind::OcrConfusion, "texto minúsculo", &mut rng), "texto minúsculo");
}

#[test]
fn case_fold_lowercases_everything() {
    let mut rng = StdRng::seed_from_u64(7);
    assert_eq!(
        apply(NoiseKind::CaseFold, "Relatório de SUSPENSÃO", &mut rng),
        "relatório de suspensão"
    );
}

#[test]
fn inject_draws_every_class() {
    let mut rng = StdRng::seed_from_u64(8);
    let mut seen = std::collections::HashSet::new();
    for _ in 0..500 {
        let (kind, _) = inject("Ação de SUSPENSÃO aplicada", &mut rng);
        seen.insert(kind);
    }
    assert_eq!(seen.len(), NoiseKind::ALL.len());
}
