//! Papelada: a synthetic pt-BR HR document generator.
//!
//! Documents (résumé analyses, disciplinary suspension notices, financial
//! reports) are assembled from banks of template fragments, filled from a
//! nested fake-entity record, wrapped in a persona voice, and optionally
//! given one organic-looking defect. Batches run on a bounded task pool and
//! are exported as JSON Lines.
//!
//! See `DESIGN.md` for the module map.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod logging;

pub mod intent;
pub mod record;
pub mod template;

pub mod engine;
pub mod entities;
pub mod noise;

pub mod batch;
pub mod output;
pub mod polish;
pub mod quality;
