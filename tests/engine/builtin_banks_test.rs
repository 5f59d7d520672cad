//! Assembly over the embedded banks and fake records.

use chrono::NaiveDate;
use papelada::engine::Assembler;
use papelada::entities::{EntitySource, FakeEntitySource};
use papelada::intent::Intent;
use papelada::noise::NoiseKind;
use papelada::template::{render_text, BankRegistry, IntentBank, Persona};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Paths the fake records leave null or never fill.
const SPARSE_PATHS: [&str; 5] = [
    "advogado_interno.profissional.oab",
    "funcionario.financeiro.cartao_de_credito",
    "controller.profissional.crc",
    "contador.profissional.crc",
    "operadora_saude.nome",
];

fn source() -> FakeEntitySource {
    let today = NaiveDate::from_ymd_opt(2024, 6, 15).expect("valid date");
    FakeEntitySource::new(today)
}

fn bank(registry: &BankRegistry, intent: Intent) -> &IntentBank {
    match registry.get(intent) {
        Some(bank) => bank,
        None => panic!("builtin bank for {intent} should be enabled"),
    }
}

fn quiet(persona: &Persona) -> Persona {
    Persona {
        error_probability: 0.0,
        ..persona.clone()
    }
}

#[test]
fn every_required_block_contributes_exactly_once() {
    let registry = BankRegistry::builtin();
    let source = source();
    for intent in Intent::ALL {
        let bank = bank(&registry, intent);
        let assembler = Assembler::new(&bank.template).expect("builtin bank is valid");
        let mut rng = StdRng::seed_from_u64(40);
        for _ in 0..40 {
            let record = source.build_record(intent, &mut rng).expect("record builds");
            let selection = assembler.select(&record, &mut rng);
            let names: Vec<&str> = selection.required.iter().map(|p| p.block.as_str()).collect();
            let expected: Vec<&str> = bank.template.required.iter().map(|b| b.name.as_str()).collect();
            assert_eq!(names, expected, "{intent}: required blocks out of order");
            for (pick, block) in selection.required.iter().zip(&bank.template.required) {
                assert!(pick.index < block.fragments.len());
            }
            assert_eq!(selection.context.is_some(), bank.template.context.is_some());
        }
    }
}

#[test]
fn text_contains_a_rendered_fragment_of_every_required_block() {
    let registry = BankRegistry::builtin();
    let source = source();
    let mut rng = StdRng::seed_from_u64(41);
    for intent in Intent::ALL {
        let bank = bank(&registry, intent);
        let assembler = Assembler::new(&bank.template).expect("builtin bank is valid");
        for _ in 0..40 {
            let record = source.build_record(intent, &mut rng).expect("record builds");
            let persona = quiet(bank.choose_persona(&mut rng).expect("bank has personas"));
            let assembly = assembler
                .assemble(&persona, &record, &mut rng)
                .expect("assembly succeeds");
            for block in &bank.template.required {
                assert!(
                    block
                        .fragments
                        .iter()
                        .any(|fragment| assembly.text.contains(&render_text(fragment, &record))),
                    "{intent}: no fragment of required block '{}' in {}",
                    block.name,
                    assembly.text
                );
            }
        }
    }
}

#[test]
fn builtin_documents_only_miss_sparse_fields() {
    let registry = BankRegistry::builtin();
    let source = source();
    let mut rng = StdRng::seed_from_u64(1234);
    for intent in Intent::ALL {
        let bank = bank(&registry, intent);
        let assembler = Assembler::new(&bank.template).expect("builtin bank is valid");
        for _ in 0..60 {
            let record = source.build_record(intent, &mut rng).expect("record builds");
            let persona = bank.choose_persona(&mut rng).expect("bank has personas");
            let assembly = assembler
                .assemble(persona, &record, &mut rng)
                .expect("assembly succeeds");
            for path in &assembly.missing_paths {
                assert!(
                    SPARSE_PATHS.contains(&path.as_str()),
                    "{intent}: unexpected unresolved path {path}"
                );
            }
        }
    }
}

#[test]
fn documents_are_wrapped_in_persona_phrases() {
    let registry = BankRegistry::builtin();
    let source = source();
    let mut rng = StdRng::seed_from_u64(99);
    for intent in Intent::ALL {
        let bank = bank(&registry, intent);
        let assembler = Assembler::new(&bank.template).expect("builtin bank is valid");
        for persona in &bank.personas {
            let record = source.build_record(intent, &mut rng).expect("record builds");
            let assembly = assembler
                .assemble(&quiet(persona), &record, &mut rng)
                .expect("assembly succeeds");
            let prefixes: Vec<String> =
                persona.prefixes.iter().map(|p| render_text(p, &record)).collect();
            let suffixes: Vec<String> =
                persona.suffixes.iter().map(|s| render_text(s, &record)).collect();
            assert!(
                prefixes.iter().any(|p| assembly.text.starts_with(p.as_str())),
                "{intent}/{}: text does not start with a prefix",
                persona.name
            );
            assert!(
                suffixes.iter().any(|s| assembly.text.ends_with(s.as_str())),
                "{intent}/{}: text does not end with a suffix",
                persona.name
            );
        }
    }
}

#[test]
fn case_folding_keeps_persona_phrases() {
    let registry = BankRegistry::builtin();
    let source = source();
    let bank = bank(&registry, Intent::Suspensao);
    let assembler = Assembler::new(&bank.template).expect("builtin bank is valid");
    let mut rng = StdRng::seed_from_u64(5);
    let mut folded = 0usize;
    for _ in 0..200 {
        let record = source.build_record(Intent::Suspensao, &mut rng).expect("record builds");
        let persona = Persona {
            error_probability: 1.0,
            ..bank.personas[0].clone()
        };
        let assembly = assembler
            .assemble(&persona, &record, &mut rng)
            .expect("assembly succeeds");
        if assembly.noise != Some(NoiseKind::CaseFold) {
            continue;
        }
        folded += 1;
        let text = assembly.text.to_lowercase();
        assert!(persona
            .prefixes
            .iter()
            .any(|p| text.starts_with(&render_text(p, &record).to_lowercase())));
        assert!(persona
            .suffixes
            .iter()
            .any(|s| text.ends_with(&render_text(s, &record).to_lowercase())));
    }
    assert!(folded > 0, "no document was case-folded");
}

#[test]
fn same_seed_reproduces_builtin_documents() {
    let registry = BankRegistry::builtin();
    let source = source();
    let run = |intent: Intent, seed: u64| {
        let bank = bank(&registry, intent);
        let mut rng = StdRng::seed_from_u64(seed);
        let record = source.build_record(intent, &mut rng).expect("record builds");
        let persona = bank.choose_persona(&mut rng).expect("bank has personas");
        Assembler::new(&bank.template)
            .expect("builtin bank is valid")
            .assemble(persona, &record, &mut rng)
            .expect("assembly succeeds")
    };
    for intent in Intent::ALL {
        assert_eq!(run(intent, 17), run(intent, 17));
        let texts: std::collections::HashSet<String> =
            (0..5).map(|seed| run(intent, seed).text).collect();
        assert!(texts.len() > 1, "{intent}: different seeds gave one text");
    }
}
