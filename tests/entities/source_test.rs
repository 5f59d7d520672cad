//! Records built by the fake entity source.

use chrono::NaiveDate;
use papelada::entities::inconsistency::{self, Inconsistency};
use papelada::entities::identifiers::is_valid_cpf;
use papelada::entities::suspensao::MOTIVOS_DISCIPLINARES;
use papelada::entities::{EntitySource, FakeEntitySource, DATE_FORMAT};
use papelada::intent::Intent;
use papelada::record::{DataRecord, Lookup};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).expect("valid date")
}

fn text(record: &DataRecord, path: &str) -> String {
    match record.lookup(path) {
        Lookup::Found(field) => match field.render() {
            Some(value) => value.into_owned(),
            None => panic!("{path} is not a leaf"),
        },
        Lookup::Missing { reason, .. } => panic!("{path} missing: {reason:?}"),
    }
}

fn date(record: &DataRecord, path: &str) -> NaiveDate {
    let value = text(record, path);
    match NaiveDate::parse_from_str(&value, DATE_FORMAT) {
        Ok(date) => date,
        Err(err) => panic!("{path} = {value:?} is not dd/mm/yyyy: {err}"),
    }
}

#[test]
fn same_seed_builds_the_same_record() {
    let source = FakeEntitySource::new(today());
    for intent in Intent::ALL {
        let a = source
            .build_record(intent, &mut StdRng::seed_from_u64(3))
            .expect("record builds");
        let b = source
            .build_record(intent, &mut StdRng::seed_from_u64(3))
            .expect("record builds");
        assert_eq!(a, b, "{intent}");
    }
}

#[test]
fn people_carry_valid_cpfs() {
    let source = FakeEntitySource::new(today());
    let mut rng = StdRng::seed_from_u64(4);
    for _ in 0..50 {
        let record = source
            .build_clean(Intent::Curriculo, &mut rng)
            .expect("record builds");
        assert!(is_valid_cpf(&text(&record, "candidato.documentos.cpf")));
        let suspension = source
            .build_clean(Intent::Suspensao, &mut rng)
            .expect("record builds");
        assert!(is_valid_cpf(&text(&suspension, "funcionario.documentos.cpf")));
    }
}

#[test]
fn suspension_dates_follow_the_incident() {
    let source = FakeEntitySource::new(today());
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..50 {
        let record = source
            .build_clean(Intent::Suspensao, &mut rng)
            .expect("record builds");
        let incident = date(&record, "data_incidente");
        assert!(incident < today());
        assert!(date(&record, "data_relatorio") > incident);
        assert!(date(&record, "data_advertencia") < incident);
    }
}

#[test]
fn every_narrative_set_is_reachable_from_a_motive() {
    let registry = papelada::template::BankRegistry::builtin();
    let bank = registry.get(Intent::Suspensao).expect("builtin bank enabled");
    for key in bank.template.narratives.keys() {
        assert!(
            MOTIVOS_DISCIPLINARES.iter().any(|(motive, _)| *motive == key.as_str()),
            "narrative set {key} has no matching motive"
        );
    }
    assert!(MOTIVOS_DISCIPLINARES.len() > bank.template.narratives.len());
}

#[test]
fn motive_key_and_description_come_from_the_same_entry() {
    let source = FakeEntitySource::new(today());
    let mut rng = StdRng::seed_from_u64(6);
    for _ in 0..50 {
        let record = source
            .build_clean(Intent::Suspensao, &mut rng)
            .expect("record builds");
        let key = text(&record, "motivo_chave");
        let description = text(&record, "motivo_descritivo");
        assert!(MOTIVOS_DISCIPLINARES
            .iter()
            .any(|&(k, d)| k == key && d == description));
    }
}

#[test]
fn conflicting_dates_move_target_before_anchor() {
    let source = FakeEntitySource::new(today());
    let mut rng = StdRng::seed_from_u64(7);
    let mut record = source
        .build_clean(Intent::Suspensao, &mut rng)
        .expect("record builds");
    let kind = Inconsistency::ConflictingDates {
        anchor: "data_incidente",
        target: "data_relatorio",
    };
    assert!(inconsistency::apply(kind, &mut record, &mut rng));
    assert!(date(&record, "data_relatorio") < date(&record, "data_incidente"));
}

#[test]
fn duplicated_role_copies_the_title() {
    let source = FakeEntitySource::new(today());
    let mut rng = StdRng::seed_from_u64(8);
    let mut record = source
        .build_clean(Intent::Suspensao, &mut rng)
        .expect("record builds");
    let kind = Inconsistency::DuplicatedRole {
        source: "funcionario.profissional.cargo",
        target: "testemunha.profissional.cargo",
    };
    assert!(inconsistency::apply(kind, &mut record, &mut rng));
    assert_eq!(
        text(&record, "testemunha.profissional.cargo"),
        text(&record, "funcionario.profissional.cargo")
    );
}

#[test]
fn inconsistency_on_missing_field_leaves_record_unchanged() {
    let mut record = DataRecord::new().with("outro", "valor");
    let before = record.clone();
    let mut rng = StdRng::seed_from_u64(9);
    for kind in inconsistency::supported(Intent::Suspensao) {
        assert!(!inconsistency::apply(*kind, &mut record, &mut rng));
    }
    assert_eq!(record, before);
    assert!(inconsistency::supported(Intent::Curriculo).is_empty());
}

#[test]
fn planted_inconsistencies_keep_record_shape() {
    let source = FakeEntitySource::new(today()).with_inconsistency_rate(1.0);
    let clean = FakeEntitySource::new(today()).with_inconsistency_rate(0.0);
    let mut rng = StdRng::seed_from_u64(10);
    for intent in [Intent::Suspensao, Intent::Financeiro] {
        for _ in 0..20 {
            let planted = source.build_record(intent, &mut rng).expect("record builds");
            let reference = clean.build_record(intent, &mut rng).expect("record builds");
            let planted_keys: Vec<&str> = planted.keys().collect();
            let reference_keys: Vec<&str> = reference.keys().collect();
            assert_eq!(planted_keys, reference_keys, "{intent}");
        }
    }
}
