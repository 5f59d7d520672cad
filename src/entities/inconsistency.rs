//! Deliberate data contradictions for stress-testing downstream checks.
//!
//! Each intent lists the contradictions it supports. Applying one only ever
//! replaces a leaf that already resolves with another well-formed string, so a
//! template that referenced the field still renders.

use chrono::{Days, NaiveDate};
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::Serialize;

use super::people::full_address;
use super::{format_date, DATE_FORMAT};
use crate::intent::Intent;
use crate::record::{DataRecord, Lookup};

/// One contradiction that can be planted in a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Inconsistency {
    /// Replace an address with one whose postcode belongs to another city.
    PostcodeCityMismatch {
        /// Address leaf to replace.
        target: &'static str,
    },
    /// Move a date so it precedes the date it should follow.
    ConflictingDates {
        /// Date that stays put.
        anchor: &'static str,
        /// Date moved to before the anchor.
        target: &'static str,
    },
    /// Copy one person's job title onto another.
    DuplicatedRole {
        /// Leaf whose value is copied.
        source: &'static str,
        /// Leaf overwritten with the copy.
        target: &'static str,
    },
}

const SUSPENSAO: [Inconsistency; 3] = [
    Inconsistency::PostcodeCityMismatch {
        target: "cliente.endereco_fiscal",
    },
    Inconsistency::ConflictingDates {
        anchor: "data_incidente",
        target: "data_relatorio",
    },
    Inconsistency::DuplicatedRole {
        source: "funcionario.profissional.cargo",
        target: "testemunha.profissional.cargo",
    },
];

const FINANCEIRO: [Inconsistency; 2] = [
    Inconsistency::PostcodeCityMismatch {
        target: "fornecedor.endereco_fiscal",
    },
    Inconsistency::ConflictingDates {
        anchor: "data_inicio",
        target: "data_fim",
    },
];

/// Contradictions supported by an intent's data shape.
pub fn supported(intent: Intent) -> &'static [Inconsistency] {
    match intent {
        Intent::Curriculo => &[],
        Intent::Suspensao => &SUSPENSAO,
        Intent::Financeiro => &FINANCEIRO,
    }
}

/// Pick one supported contradiction for `intent` and plant it.
///
/// Returns the contradiction actually applied, or `None` when the intent has
/// none or the record lacks the fields involved.
pub fn inject<R: Rng + ?Sized>(
    intent: Intent,
    record: &mut DataRecord,
    rng: &mut R,
) -> Option<Inconsistency> {
    let kind = *supported(intent).choose(rng)?;
    apply(kind, record, rng).then_some(kind)
}

/// Plant a specific contradiction. Returns whether the record changed.
pub fn apply<R: Rng + ?Sized>(kind: Inconsistency, record: &mut DataRecord, rng: &mut R) -> bool {
    match kind {
        Inconsistency::PostcodeCityMismatch { target } => {
            let address = full_address(rng);
            record.replace_leaf(target, address)
        }
        Inconsistency::ConflictingDates { anchor, target } => {
            let Some(anchor_date) = text_at(record, anchor)
                .and_then(|text| NaiveDate::parse_from_str(&text, DATE_FORMAT).ok())
            else {
                return false;
            };
            let shift = Days::new(rng.random_range(1..=5));
            match anchor_date.checked_sub_days(shift) {
                Some(earlier) => record.replace_leaf(target, format_date(earlier)),
                None => false,
            }
        }
        Inconsistency::DuplicatedRole { source, target } => match text_at(record, source) {
            Some(role) => record.replace_leaf(target, role),
            None => false,
        },
    }
}

fn text_at(record: &DataRecord, path: &str) -> Option<String> {
    match record.lookup(path) {
        Lookup::Found(field) => field.render().map(|value| value.into_owned()),
        Lookup::Missing { .. } => None,
    }
}
