//! Fake entity source.
//!
//! Builds one [`DataRecord`] per document with the field names each intent's
//! bank expects. People, companies and places come from the `fake` crate's
//! pt-BR locale; identifiers (CPF, CNPJ, phones, postcodes) are generated here
//! with valid check digits and varied layouts.
//!
//! Leaves are always populated strings/numbers or explicit nulls; building a
//! record only fails on date arithmetic at the calendar limits.

use chrono::{Days, NaiveDate};
use rand::rngs::StdRng;
use rand::Rng;
use thiserror::Error;
use tracing::debug;

use crate::intent::Intent;
use crate::record::DataRecord;

pub mod curriculo;
pub mod financeiro;
pub mod identifiers;
pub mod inconsistency;
pub mod people;
pub mod suspensao;

pub use inconsistency::Inconsistency;

/// Date layout used in every generated record.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Default share of records that receive one planted contradiction.
pub const DEFAULT_INCONSISTENCY_RATE: f64 = 0.20;

/// Errors raised while building a record.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Date arithmetic left the supported calendar range.
    #[error("date offset of {days} days from {from} is out of range")]
    DateOutOfRange {
        /// Starting date.
        from: NaiveDate,
        /// Offset in days.
        days: u64,
    },
    /// The source could not produce a record.
    #[error("entity source failed: {0}")]
    Unavailable(String),
}

/// Produces the data record for one document.
///
/// Implementations must be `Send + Sync`; the batch driver shares one source
/// across worker tasks, each with its own RNG stream.
pub trait EntitySource: Send + Sync {
    /// Build a fresh record for `intent`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the record cannot be built. The batch drops
    /// that document and carries on.
    fn build_record(&self, intent: Intent, rng: &mut StdRng) -> Result<DataRecord, SourceError>;
}

/// `dd/mm/yyyy`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn days_before(date: NaiveDate, days: u64) -> Result<NaiveDate, SourceError> {
    date.checked_sub_days(Days::new(days))
        .ok_or(SourceError::DateOutOfRange { from: date, days })
}

pub(crate) fn days_after(date: NaiveDate, days: u64) -> Result<NaiveDate, SourceError> {
    date.checked_add_days(Days::new(days))
        .ok_or(SourceError::DateOutOfRange { from: date, days })
}

/// Entity source backed by the `fake` crate.
#[derive(Debug, Clone)]
pub struct FakeEntitySource {
    reference_date: NaiveDate,
    inconsistency_rate: f64,
}

impl FakeEntitySource {
    /// Source anchored at `reference_date` ("today" for relative dates).
    pub fn new(reference_date: NaiveDate) -> Self {
        Self {
            reference_date,
            inconsistency_rate: DEFAULT_INCONSISTENCY_RATE,
        }
    }

    /// Source anchored at the current local date.
    pub fn today() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }

    /// Override the share of records that receive a contradiction.
    ///
    /// Values are clamped to `[0, 1]`.
    #[must_use]
    pub fn with_inconsistency_rate(mut self, rate: f64) -> Self {
        self.inconsistency_rate = if rate.is_nan() {
            0.0
        } else {
            rate.clamp(0.0, 1.0)
        };
        self
    }

    /// Reference date used for relative dates.
    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    /// Build the record without planting any contradiction.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::DateOutOfRange`] near the calendar limits.
    pub fn build_clean<R: Rng + ?Sized>(
        &self,
        intent: Intent,
        rng: &mut R,
    ) -> Result<DataRecord, SourceError> {
        match intent {
            Intent::Curriculo => Ok(curriculo::build(rng)),
            Intent::Suspensao => suspensao::build(rng, self.reference_date),
            Intent::Financeiro => financeiro::build(rng, self.reference_date),
        }
    }
}

impl EntitySource for FakeEntitySource {
    fn build_record(&self, intent: Intent, rng: &mut StdRng) -> Result<DataRecord, SourceError> {
        let mut record = self.build_clean(intent, rng)?;
        if rng.random_bool(self.inconsistency_rate) {
            if let Some(kind) = inconsistency::inject(intent, &mut record, rng) {
                debug!(%intent, ?kind, "planted inconsistency");
            }
        }
        Ok(record)
    }
}
