//! Document assembly engine.
//!
//! Turns a template bank, a persona and a data record into one finished
//! document:
//!
//! 1. one fragment from every required block, in bank order
//! 2. one fragment from the context block, if any
//! 3. one fragment from the narrative set matching the record's narrative key,
//!    if the key resolves and the bank has that set
//! 4. a uniformly sized subset of secondary sub-topics, sampled without
//!    replacement, one fragment from each in sampled order
//! 5. fragments joined by single spaces and rendered against the record
//! 6. wrapped in one persona prefix and one persona suffix
//! 7. passed through the noise injector with the persona's error probability
//!
//! All randomness comes from the caller's RNG, so a fixed seed reproduces the
//! document exactly.

use rand::seq::index;
use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::noise::{self, NoiseKind};
use crate::record::{DataRecord, Lookup};
use crate::template::{render, Block, ConfigError, Persona, TemplateBank};

/// Errors from [`Assembler`].
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// The bank or persona breaks its structural contract.
    #[error("malformed template bank: {0}")]
    Config(#[from] ConfigError),
}

/// One fragment drawn from a named block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pick {
    /// Block, sub-topic or narrative key the fragment came from.
    pub block: String,
    /// Index of the fragment within its block.
    pub index: usize,
}

/// Every fragment chosen for one document, in inclusion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    /// One pick per required block.
    pub required: Vec<Pick>,
    /// Context pick, when the bank has a context block.
    pub context: Option<Pick>,
    /// Narrative pick, when the record's key matched a narrative set.
    pub narrative: Option<Pick>,
    /// Secondary picks in sampled order.
    pub secondary: Vec<Pick>,
    /// Whether the secondary range had to be clamped to the available groups.
    pub clamped: bool,
}

/// A finished document plus how it was built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assembly {
    /// Final text.
    pub text: String,
    /// Persona that wrapped the body.
    pub persona: String,
    /// Fragments chosen.
    pub selection: Selection,
    /// Noise class applied, if the persona's error roll fired.
    pub noise: Option<NoiseKind>,
    /// Placeholder paths that did not resolve against the record.
    pub missing_paths: Vec<String>,
}

/// Assembles documents from one validated template bank.
#[derive(Debug, Clone, Copy)]
pub struct Assembler<'a> {
    bank: &'a TemplateBank,
}

impl<'a> Assembler<'a> {
    /// Validate `bank` and wrap it.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::Config`] if any required block is empty or
    /// the bank is otherwise malformed.
    pub fn new(bank: &'a TemplateBank) -> Result<Self, AssemblyError> {
        bank.validate()?;
        Ok(Self { bank })
    }

    /// The wrapped bank.
    pub fn bank(&self) -> &'a TemplateBank {
        self.bank
    }

    /// Draw the fragments for one document (steps 1-4).
    pub fn select<R: Rng + ?Sized>(&self, record: &DataRecord, rng: &mut R) -> Selection {
        let bank = self.bank;
        let mut selection = Selection {
            required: bank
                .required
                .iter()
                .filter_map(|block| pick_from(block, rng))
                .collect(),
            ..Selection::default()
        };

        selection.context = bank.context.as_ref().and_then(|block| pick_from(block, rng));

        selection.narrative = self.narrative_key(record).and_then(|key| {
            let set = bank.narratives.get(&key)?;
            Some(Pick {
                block: key,
                index: pick_index(set.len(), rng)?,
            })
        });

        let available = bank.secondary.len();
        let (range, clamped) = bank.secondary_range.clamp_to(available);
        if clamped {
            warn!(
                intent = %bank.intent,
                min = bank.secondary_range.min,
                max = bank.secondary_range.max,
                available,
                "secondary range exceeds available sub-topics, clamping"
            );
        }
        selection.clamped = clamped;

        let amount = rng.random_range(range.min..=range.max);
        selection.secondary = index::sample(rng, available, amount)
            .into_iter()
            .filter_map(|group| bank.secondary.get(group))
            .filter_map(|block| pick_from(block, rng))
            .collect();

        selection
    }

    /// Narrative key value: the first designated field that resolves to a
    /// leaf naming a narrative set.
    fn narrative_key(&self, record: &DataRecord) -> Option<String> {
        self.bank.narrative_keys.iter().find_map(|field| {
            let value = match record.lookup(field) {
                Lookup::Found(leaf) => leaf.render()?.into_owned(),
                Lookup::Missing { .. } => return None,
            };
            self.bank.narratives.contains_key(&value).then_some(value)
        })
    }

    /// Fragment texts of a selection, in inclusion order.
    pub fn fragments(&self, selection: &Selection) -> Vec<&'a str> {
        let bank = self.bank;
        let required = selection
            .required
            .iter()
            .zip(&bank.required)
            .filter_map(|(pick, block)| block.fragments.get(pick.index));
        let context = selection
            .context
            .iter()
            .filter_map(|pick| bank.context.as_ref()?.fragments.get(pick.index));
        let narrative = selection
            .narrative
            .iter()
            .filter_map(|pick| bank.narratives.get(&pick.block)?.get(pick.index));
        let secondary = selection.secondary.iter().filter_map(|pick| {
            bank.secondary
                .iter()
                .find(|block| block.name == pick.block)?
                .fragments
                .get(pick.index)
        });
        required
            .chain(context)
            .chain(narrative)
            .chain(secondary)
            .map(String::as_str)
            .collect()
    }

    /// Build one finished document.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::Config`] if `persona` has no prefixes or
    /// suffixes or an invalid error probability.
    pub fn assemble<R: Rng + ?Sized>(
        &self,
        persona: &Persona,
        record: &DataRecord,
        rng: &mut R,
    ) -> Result<Assembly, AssemblyError> {
        persona.validate(self.bank.intent)?;

        let selection = self.select(record, rng);
        let body = render(&self.fragments(&selection).join(" "), record);

        let prefix = pick_phrase(&persona.prefixes, rng).map(|p| render(p, record));
        let suffix = pick_phrase(&persona.suffixes, rng).map(|s| render(s, record));

        let mut missing_paths = Vec::new();
        let mut parts = Vec::with_capacity(3);
        for rendered in [prefix, Some(body), suffix].into_iter().flatten() {
            missing_paths.extend(rendered.missing);
            parts.push(rendered.text);
        }
        let wrapped = parts.join(" ");

        let (text, noise) = if rng.random_bool(persona.error_probability) {
            let (kind, noisy) = noise::inject(&wrapped, rng);
            (noisy, Some(kind))
        } else {
            (wrapped, None)
        };

        Ok(Assembly {
            text,
            persona: persona.name.clone(),
            selection,
            noise,
            missing_paths,
        })
    }
}

fn pick_index<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Option<usize> {
    (len > 0).then(|| rng.random_range(0..len))
}

fn pick_from<R: Rng + ?Sized>(block: &Block, rng: &mut R) -> Option<Pick> {
    Some(Pick {
        block: block.name.clone(),
        index: pick_index(block.fragments.len(), rng)?,
    })
}

fn pick_phrase<'p, R: Rng + ?Sized>(phrases: &'p [String], rng: &mut R) -> Option<&'p str> {
    let index = pick_index(phrases.len(), rng)?;
    phrases.get(index).map(String::as_str)
}
